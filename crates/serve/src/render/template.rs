// crates/serve/src/render/template.rs

use super::error::RenderError;
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Template engines that can render a named template to an arbitrary
/// `Write`.
pub trait TemplateEngine: Send + Sync {
    fn has_template(&self, name: &str) -> bool;

    fn render_to_write<M, W>(&self, name: &str, model: &M, out: &mut W) -> Result<(), RenderError>
    where
        M: Serialize,
        W: Write;

    fn render_to_string<M: Serialize>(&self, name: &str, model: &M) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.render_to_write(name, model, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlebars engine
// ─────────────────────────────────────────────────────────────────────────────

handlebars_helper!(dump_json: |v: Json| {
    serde_json::to_string_pretty(&v).unwrap_or_else(|_| "<invalid json>".into())
});

handlebars_helper!(media_url: |origin: str, url: str| {
    domain::media::resolve_media_url(url, origin)
});

/// Handlebars-based engine. Templates are registered once and looked up by
/// name; HTML escaping stays on.
pub struct HbsEngine {
    handlebars: Handlebars<'static>,
}

impl Default for HbsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HbsEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("dump", Box::new(dump_json));
        handlebars.register_helper("media_url", Box::new(media_url));
        Self { handlebars }
    }

    pub fn register_template_str(&mut self, name: &str, template: &str) -> Result<(), RenderError> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(RenderError::from)
    }

    /// Register every `*.hbs` file directly under `dir`, named by file stem.
    /// Returns the registered names, sorted.
    pub fn register_dir(&mut self, dir: &Path) -> Result<Vec<String>, RenderError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("hbs") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let src = fs::read_to_string(&path)?;
            self.register_template_str(name, &src)?;
            debug!(template = name, "component template registered");
            names.push(name.to_string());
        }
        names.sort();
        Ok(names)
    }
}

impl TemplateEngine for HbsEngine {
    fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    fn render_to_write<M, W>(&self, name: &str, model: &M, out: &mut W) -> Result<(), RenderError>
    where
        M: Serialize,
        W: Write,
    {
        self.handlebars
            .render_to_write(name, model, out)
            .map_err(RenderError::from)
    }
}

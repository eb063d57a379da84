// crates/serve/src/render/registry.rs

use domain::block::{registry_name, Block};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use super::blocks;
use super::error::RenderError;
use super::html::{text, RenderCtx};
use super::template::{HbsEngine, TemplateEngine};
use super::translation::translation_block;

/// A block that could not be rendered by its own component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub component: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderOutput {
    pub fn push_str(&mut self, s: &str) {
        self.html.push_str(s);
    }

    pub fn append(&mut self, other: RenderOutput) {
        self.html.push_str(&other.html);
        self.diagnostics.extend(other.diagnostics);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Component registry
// ─────────────────────────────────────────────────────────────────────────────

/// Templates for block kinds without a built-in renderer, keyed by the
/// name derived from their discriminator (`blocks.pricing-table` →
/// `PricingTable`). Built once at start-up.
pub struct ComponentRegistry<E: TemplateEngine = HbsEngine> {
    engine: E,
}

impl ComponentRegistry<HbsEngine> {
    pub fn empty() -> Self {
        ComponentRegistry {
            engine: HbsEngine::new(),
        }
    }

    /// Load `<dir>/<Name>.hbs`. A missing directory yields an empty registry.
    pub fn load(dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut engine = HbsEngine::new();
        if let Some(dir) = dir.filter(|d| d.is_dir()) {
            let names = engine.register_dir(dir)?;
            info!(count = names.len(), dir = %dir.display(), "component templates loaded");
        }
        Ok(ComponentRegistry { engine })
    }
}

impl<E: TemplateEngine> ComponentRegistry<E> {
    pub fn with_engine(engine: E) -> Self {
        ComponentRegistry { engine }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engine.has_template(name)
    }

    pub fn render(&self, name: &str, attributes: &Value) -> Result<String, RenderError> {
        self.engine.render_to_string(name, attributes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Block dispatch: the built-in renderer for a typed variant, else a
/// registry template by derived name, else a visible placeholder.
pub struct BlockRenderer<E: TemplateEngine = HbsEngine> {
    components: ComponentRegistry<E>,
}

impl<E: TemplateEngine> BlockRenderer<E> {
    pub fn new(components: ComponentRegistry<E>) -> Self {
        BlockRenderer { components }
    }

    pub fn render_blocks(&self, blocks: &[Block], ctx: &RenderCtx<'_>) -> RenderOutput {
        let mut out = RenderOutput::default();
        for block in blocks {
            self.render_block(block, ctx, &mut out);
        }
        out
    }

    pub fn render_block(&self, block: &Block, ctx: &RenderCtx<'_>, out: &mut RenderOutput) {
        let html = match block {
            Block::Text(b) => blocks::text_block(b),
            Block::Image(b) => blocks::image_block(b, ctx),
            Block::Button(b) => blocks::button_block(b, ctx),
            Block::Cards(b) => blocks::cards_block(b, ctx),
            Block::TextImage(b) => blocks::text_image_block(b, ctx),
            Block::Hero(b) => blocks::hero_block(b),
            Block::Carousel(b) => blocks::carousel_block(b, ctx),
            Block::ContactForm(b) => blocks::contact_form_block(b),
            Block::Work(b) => blocks::work_block(b, ctx),
            Block::Portfolio(b) => blocks::portfolio_block(b, ctx),
            Block::Timeline(b) => blocks::timeline_block(b, ctx),
            Block::Translation(b) => translation_block(b),
            Block::Unknown {
                component,
                attributes,
            } => match self.by_convention(component, attributes) {
                Ok(html) => html,
                Err(reason) => placeholder(component, reason, out),
            },
            Block::Malformed {
                component, reason, ..
            } => placeholder(component, format!("invalid attributes: {reason}"), out),
        };
        out.push_str(&html);
    }

    fn by_convention(&self, component: &str, attributes: &Value) -> Result<String, String> {
        let name = registry_name(component).ok_or_else(|| "no registry name".to_string())?;
        if !self.components.contains(&name) {
            return Err(format!("no component named {name}"));
        }
        self.components
            .render(&name, attributes)
            .map(|html| format!(r#"<div class="block block-custom" data-component="{name}">{html}</div>"#))
            .map_err(|e| format!("component {name} failed: {e}"))
    }
}

/// Visible marker for editors, one warning and one diagnostic per block.
fn placeholder(component: &str, reason: String, out: &mut RenderOutput) -> String {
    warn!(component = %component, reason = %reason, "block has no renderer");
    let shown = if component.is_empty() { "(sans type)" } else { component };
    let html = format!(
        r#"<div class="block block-placeholder" role="note" data-component="{0}"><strong>Bloc non pris en charge</strong> <code>{0}</code></div>"#,
        text(shown)
    );
    out.diagnostics.push(Diagnostic {
        component: component.to_string(),
        reason,
    });
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CTX: RenderCtx<'static> = RenderCtx {
        cms_origin: "http://cms",
        locale: "fr",
    };

    fn renderer_with(templates: &[(&str, &str)]) -> BlockRenderer {
        let mut engine = HbsEngine::new();
        for (name, src) in templates {
            engine.register_template_str(name, src).expect("template");
        }
        BlockRenderer::new(ComponentRegistry::with_engine(engine))
    }

    #[test]
    fn typed_blocks_use_built_in_renderers() {
        let r = renderer_with(&[]);
        let blocks = vec![Block::from_json(json!({
            "__component": "blocks.text-block",
            "content": "Salut"
        }))];
        let out = r.render_blocks(&blocks, &CTX);
        assert!(out.html.contains("block-text"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn unknown_blocks_fall_back_to_named_template() {
        let r = renderer_with(&[("PricingTable", "<table>{{#each plans}}<tr><td>{{name}}</td></tr>{{/each}}</table>")]);
        let blocks = vec![Block::from_json(json!({
            "__component": "blocks.pricing-table",
            "plans": [{ "name": "Pro" }]
        }))];
        let out = r.render_blocks(&blocks, &CTX);
        assert!(out.html.contains(r#"data-component="PricingTable""#));
        assert!(out.html.contains("<td>Pro</td>"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn unmatched_blocks_render_placeholder_with_one_diagnostic_each() {
        let r = renderer_with(&[]);
        let blocks = vec![
            Block::from_json(json!({ "__component": "blocks.mystery" })),
            Block::from_json(json!({ "__component": "blocks.text-block", "content": "ok" })),
            Block::from_json(json!({ "__component": "blocks.mystery" })),
            Block::from_json(json!({ "__component": "blocks.image-block" })),
        ];
        let out = r.render_blocks(&blocks, &CTX);
        assert_eq!(out.html.matches("block-placeholder").count(), 3);
        assert_eq!(out.diagnostics.len(), 3);
        assert_eq!(out.diagnostics[0].component, "blocks.mystery");
        assert!(out.diagnostics[2].reason.starts_with("invalid attributes"));
        // Order is preserved around the placeholders.
        let text_at = out.html.find("block-text").expect("text block");
        let second = out.html.rfind("blocks.mystery").expect("second placeholder");
        assert!(text_at < second);
    }

    #[test]
    fn rendering_is_repeatable() {
        let r = renderer_with(&[]);
        let blocks = vec![
            Block::from_json(json!({ "__component": "blocks.hero-block-simple-text", "content": "Hi" })),
            Block::from_json(json!({ "__component": "blocks.unknown" })),
        ];
        assert_eq!(r.render_blocks(&blocks, &CTX), r.render_blocks(&blocks, &CTX));
    }

    #[test]
    fn missing_component_dir_gives_empty_registry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        let reg = ComponentRegistry::load(Some(missing.as_path())).expect("registry");
        assert!(!reg.contains("Anything"));
    }
}

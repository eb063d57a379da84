// crates/serve/src/preview.rs
//
// The CMS preview button lands on `/api/preview?secret=&url=&status=`. This
// module decides what that request turns into, and builds the link the CMS
// side hands out.

use domain::page::{Page, HOME_SLUG};
use secrecy::{ExposeSecret, SecretString};
use url::{Position, Url};

use crate::client::ContentSource;
use crate::query::Query;
use crate::Error;

/// Content type id of pages in the CMS.
pub const PAGE_UID: &str = "api::page.page";

const PUBLISHED: &str = "published";

/// Outcome of a preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewPlan {
    Unauthorized,
    Redirect {
        /// Root-relative location.
        location: String,
        /// Switch the session into draft mode before redirecting.
        enable_draft_mode: bool,
    },
}

/// Query parameters of the preview endpoint.
#[derive(Debug, Clone, Default)]
pub struct PreviewRequest<'a> {
    pub secret: Option<&'a str>,
    pub url: Option<&'a str>,
    pub status: Option<&'a str>,
}

/// A configured secret must match exactly; with none configured every
/// request passes.
pub fn plan_redirect(
    req: &PreviewRequest<'_>,
    secret: Option<&SecretString>,
    use_draft_mode: bool,
) -> PreviewPlan {
    if let Some(expected) = secret {
        if req.secret != Some(expected.expose_secret()) {
            return PreviewPlan::Unauthorized;
        }
    }
    let published = req.status == Some(PUBLISHED);
    PreviewPlan::Redirect {
        location: destination(req.url.unwrap_or("/"), !published),
        enable_draft_mode: use_draft_mode,
    }
}

/// Only site-local targets are followed; anything else goes to the root.
fn destination(target: &str, draft: bool) -> String {
    let local = target.starts_with('/') && !target.starts_with("//");
    let target = if local { target } else { "/" };
    let Ok(mut url) = Url::parse("http://site.invalid").and_then(|base| base.join(target)) else {
        return "/".to_string();
    };
    if draft {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "draft")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("draft", "true");
    }
    url[Position::BeforePath..].to_string()
}

/// Site path the CMS should preview for a content entry; `None` for types
/// without a public page.
pub fn preview_path(uid: &str, locale: &str, slug: Option<&str>) -> Option<String> {
    if uid != PAGE_UID {
        return None;
    }
    Some(match slug.filter(|s| !s.is_empty()) {
        None => "/".to_string(),
        Some(HOME_SLUG) => format!("/{locale}"),
        Some(slug) => format!("/{locale}/{slug}"),
    })
}

/// Fully qualified link to the preview endpoint for `path`.
pub fn preview_link(
    site_base: &str,
    path: &str,
    secret: Option<&SecretString>,
    status: &str,
) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("url", path);
    if let Some(secret) = secret {
        params.append_pair("secret", secret.expose_secret());
    }
    params.append_pair("status", status);
    format!("{}/api/preview?{}", site_base.trim_end_matches('/'), params.finish())
}

/// Look up the entry by document id and build its preview link.
#[tracing::instrument(skip_all, fields(uid = %uid, document_id = %document_id))]
pub async fn resolve_preview_link(
    source: &dyn ContentSource,
    site_base: &str,
    secret: Option<&SecretString>,
    uid: &str,
    document_id: &str,
    locale: &str,
    status: &str,
) -> Result<Option<String>, Error> {
    if uid != PAGE_UID {
        return Ok(None);
    }
    let query = Query::new()
        .filter_eq("documentId", document_id)
        .fields(["slug", "locale"])
        .locale(locale);
    let pages: Vec<Page> = source.find_pages(&query, status != PUBLISHED).await?;
    let slug = pages.first().map(|p| p.slug.as_str());
    Ok(preview_path(uid, locale, slug).map(|path| preview_link(site_base, &path, secret, status)))
}

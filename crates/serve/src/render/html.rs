// crates/serve/src/render/html.rs
//
// Small markup helpers shared by every renderer. All text that reaches the
// output passes through `text` or `attr`.

use domain::media::Media;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// What a renderer needs to know about the request besides the block itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx<'a> {
    /// Origin relative media URLs are resolved against.
    pub cms_origin: &'a str,
    pub locale: &'a str,
}

pub fn text(s: &str) -> String {
    encode_text(s).into_owned()
}

pub fn attr(s: &str) -> String {
    encode_double_quoted_attribute(s).into_owned()
}

/// A link target safe to emit: relative paths, anchors and the usual
/// schemes pass; anything else (`javascript:`, `data:`) becomes `#`.
pub fn safe_href(url: &str) -> String {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let allowed = ["http://", "https://", "mailto:", "tel:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
        || url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with('?')
        || !lower.contains(':');
    if allowed && !url.is_empty() {
        attr(url)
    } else {
        "#".to_string()
    }
}

/// `class="a b"` from the non-empty parts.
pub fn classes(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!(r#"class="{}""#, attr(&joined))
}

pub fn img(media: &Media, ctx: &RenderCtx<'_>, class: &str) -> String {
    let mut out = format!(
        r#"<img src="{}" alt="{}""#,
        attr(&media.absolute_url(ctx.cms_origin)),
        attr(media.alt())
    );
    if let (Some(w), Some(h)) = (media.width, media.height) {
        out.push_str(&format!(r#" width="{w}" height="{h}""#));
    }
    if !class.is_empty() {
        out.push_str(&format!(r#" class="{}""#, attr(class)));
    }
    out.push_str(r#" loading="lazy">"#);
    out
}

/// `<tag class="...">` + escaped text + `</tag>`, or nothing for blank text.
pub fn optional(tag: &str, class: &str, value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => format!(r#"<{tag} class="{class}">{}</{tag}>"#, text(v)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_are_sanitised() {
        assert_eq!(safe_href("https://a.b/?x=1&y=2"), "https://a.b/?x=1&amp;y=2");
        assert_eq!(safe_href("/fr/contact"), "/fr/contact");
        assert_eq!(safe_href("#team"), "#team");
        assert_eq!(safe_href("JavaScript:alert(1)"), "#");
        assert_eq!(safe_href("data:text/html,x"), "#");
        assert_eq!(safe_href(""), "#");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(text("<b>&"), "&lt;b&gt;&amp;");
        assert_eq!(attr(r#"a"b"#), "a&quot;b");
    }

    #[test]
    fn images_carry_dimensions_when_known() {
        let m = Media {
            url: "/uploads/x.png".into(),
            alternative_text: Some("X".into()),
            width: Some(10),
            height: Some(20),
            ..Media::default()
        };
        let ctx = RenderCtx {
            cms_origin: "http://cms",
            locale: "fr",
        };
        let html = img(&m, &ctx, "rounded");
        assert!(html.contains(r#"src="http://cms/uploads/x.png""#));
        assert!(html.contains(r#"width="10" height="20""#));
        assert!(html.contains(r#"class="rounded""#));
    }
}

// crates/domain/src/locale.rs

use serde::{Deserialize, Serialize};

/// Compiled-in locales, used whenever the CMS cannot be asked.
pub const STATIC_LOCALES: [&str; 3] = ["fr", "en", "it"];
pub const STATIC_DEFAULT_LOCALE: &str = "fr";

/// The supported locales and which of them is the default.
///
/// Order matters: the language switcher walks the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleSet {
    pub locales: Vec<String>,
    pub default_locale: String,
}

impl Default for LocaleSet {
    fn default() -> Self {
        LocaleSet::new(
            STATIC_LOCALES.iter().map(|s| s.to_string()).collect(),
            STATIC_DEFAULT_LOCALE,
        )
    }
}

impl LocaleSet {
    /// Build a set; an empty list becomes the static list and a default
    /// outside the list becomes its first entry.
    pub fn new(locales: Vec<String>, default_locale: &str) -> Self {
        let mut seen = Vec::with_capacity(locales.len());
        for l in locales {
            let l = l.trim().to_string();
            if !l.is_empty() && !seen.contains(&l) {
                seen.push(l);
            }
        }
        if seen.is_empty() {
            seen = STATIC_LOCALES.iter().map(|s| s.to_string()).collect();
        }
        let default_locale = if seen.iter().any(|l| l == default_locale) {
            default_locale.to_string()
        } else {
            seen[0].clone()
        };
        LocaleSet {
            locales: seen,
            default_locale,
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.locales.iter().any(|l| l == code)
    }

    /// The segment itself when supported, else the default.
    pub fn resolve<'a>(&'a self, segment: Option<&'a str>) -> &'a str {
        match segment {
            Some(s) if self.contains(s) => s,
            _ => &self.default_locale,
        }
    }

    /// Next locale in list order, wrapping around. `None` when there is
    /// nothing to switch to.
    pub fn switch_target(&self, current: &str) -> Option<&str> {
        if self.locales.len() <= 1 {
            return None;
        }
        let next = match self.locales.iter().position(|l| l == current) {
            Some(i) => (i + 1) % self.locales.len(),
            None => 0,
        };
        Some(&self.locales[next])
    }

    /// Path of the current page under the switch target, keeping whatever
    /// follows the locale segment.
    pub fn switch_path(&self, current: &str, path: &str) -> Option<String> {
        let target = self.switch_target(current)?;
        let rest = strip_locale(path, current);
        Some(join_locale(target, rest))
    }

    /// Redirect target for a path whose first segment is not a supported
    /// locale: that segment is replaced by the default locale and the
    /// remaining segments are kept. `None` if the path is empty or already
    /// starts with a supported locale.
    pub fn not_found_redirect(&self, path: &str) -> Option<String> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        if self.contains(first) {
            return None;
        }
        let rest = segments.collect::<Vec<_>>().join("/");
        Some(join_locale(&self.default_locale, &rest))
    }
}

fn strip_locale<'a>(path: &'a str, locale: &str) -> &'a str {
    let trimmed = path.trim_start_matches('/');
    match trimmed.strip_prefix(locale) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => trimmed,
    }
}

fn join_locale(locale: &str, rest: &str) -> String {
    let rest = rest.trim_matches('/');
    if rest.is_empty() {
        format!("/{locale}")
    } else {
        format!("/{locale}/{rest}")
    }
}

/// Human name of a language code, as shown to visitors.
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "it" => "Italian",
        "fr" => "Français",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> LocaleSet {
        LocaleSet::new(vec!["fr".into(), "en".into(), "it".into()], "fr")
    }

    #[test]
    fn switcher_walks_and_wraps() {
        let set = three();
        assert_eq!(set.switch_target("en"), Some("it"));
        assert_eq!(set.switch_target("it"), Some("fr"));
        assert_eq!(set.switch_target("fr"), Some("en"));
    }

    #[test]
    fn single_locale_has_no_switcher() {
        let set = LocaleSet::new(vec!["fr".into()], "fr");
        assert_eq!(set.switch_target("fr"), None);
        assert_eq!(set.switch_path("fr", "/fr/about"), None);
    }

    #[test]
    fn switch_path_keeps_rest() {
        let set = three();
        assert_eq!(set.switch_path("fr", "/fr/about").as_deref(), Some("/en/about"));
        assert_eq!(set.switch_path("it", "/it").as_deref(), Some("/fr"));
    }

    #[test]
    fn not_found_redirect_preserves_rest() {
        let set = three();
        assert_eq!(set.not_found_redirect("/de/about/team").as_deref(), Some("/fr/about/team"));
        assert_eq!(set.not_found_redirect("/de").as_deref(), Some("/fr"));
        assert_eq!(set.not_found_redirect("/"), None);
        assert_eq!(set.not_found_redirect("/en/missing"), None);
    }

    #[test]
    fn resolve_and_normalise() {
        let set = LocaleSet::new(vec![" en ".into(), "en".into(), "".into()], "de");
        assert_eq!(set.locales, ["en"]);
        assert_eq!(set.default_locale, "en");
        assert_eq!(set.resolve(Some("zz")), "en");
        assert_eq!(LocaleSet::new(vec![], "fr"), LocaleSet::default());
    }

    #[test]
    fn serialises_camel_case() {
        let v = serde_json::to_value(three()).expect("json");
        assert_eq!(v["defaultLocale"], "fr");
        assert_eq!(v["locales"][2], "it");
    }
}

// crates/domain/src/setting.rs

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::locale::{LocaleSet, STATIC_DEFAULT_LOCALE, STATIC_LOCALES};
use crate::validate::site::{validate_base_url, validate_site_name};

/// Empty strings count as unset so `VITRINE__CMS__API_TOKEN=` disables a token.
fn secret<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| SecretString::new(s.into_boxed_str())))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
    /// CMS origin; media URLs are resolved against it too.
    pub url: String,
    #[serde(deserialize_with = "secret")]
    pub api_token: Option<SecretString>,
    /// Used for draft requests; falls back to `api_token`.
    #[serde(deserialize_with = "secret")]
    pub preview_token: Option<SecretString>,
    pub timeout_secs: u64,
}

impl Default for CmsSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:1337".into(),
            api_token: None,
            preview_token: None,
            timeout_secs: 10,
        }
    }
}

impl CmsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Public base URL, used for canonical and alternate links.
    pub url: String,
    pub name: String,
    /// Directory of `<ComponentName>.hbs` block templates.
    pub components_dir: Option<PathBuf>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".into(),
            name: "My Website".into(),
            components_dir: None,
        }
    }
}

impl SiteSettings {
    pub fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocaleSettings {
    /// Static fallback list, used until the CMS answers.
    pub supported: Vec<String>,
    pub default: String,
    pub cache_ttl_secs: u64,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            supported: STATIC_LOCALES.iter().map(|s| s.to_string()).collect(),
            default: STATIC_DEFAULT_LOCALE.into(),
            cache_ttl_secs: 60,
        }
    }
}

impl LocaleSettings {
    pub fn fallback(&self) -> LocaleSet {
        LocaleSet::new(self.supported.clone(), &self.default)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub revalidate_secs: u64,
    pub max_capacity: u64,
    /// Shared secret for the revalidation hook; the hook is closed without it.
    #[serde(deserialize_with = "secret")]
    pub revalidate_secret: Option<SecretString>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            revalidate_secs: 3600,
            max_capacity: 1_000,
            revalidate_secret: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    #[serde(deserialize_with = "secret")]
    pub secret: Option<SecretString>,
    /// Site-wide switch: when set, a valid preview request turns on draft mode.
    pub use_draft_mode: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    pub api_url: String,
    #[serde(deserialize_with = "secret")]
    pub api_key: Option<SecretString>,
    pub from: String,
    pub to: String,
    pub timeout_secs: u64,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.resend.com".into(),
            api_key: None,
            from: "onboarding@resend.dev".into(),
            to: "contact@votre-domaine.com".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Adds HSTS.
    pub production: bool,
    pub extra_connect_src: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cms: CmsSettings,
    pub site: SiteSettings,
    pub locales: LocaleSettings,
    pub cache: CacheSettings,
    pub preview: PreviewSettings,
    pub mail: MailSettings,
    pub security: SecuritySettings,
}

impl Settings {
    #[tracing::instrument(skip_all)]
    pub fn validate(&self) -> Result<(), String> {
        validate_base_url(&self.cms.url).map_err(|e| format!("cms.url: {e}"))?;
        validate_base_url(&self.site.url).map_err(|e| format!("site.url: {e}"))?;
        validate_base_url(&self.mail.api_url).map_err(|e| format!("mail.api_url: {e}"))?;
        validate_site_name(&self.site.name).map_err(|e| format!("site.name: {e}"))?;
        if self.locales.supported.iter().all(|l| l.trim().is_empty()) {
            return Err("locales.supported: empty".into());
        }
        if !self.locales.supported.iter().any(|l| l == &self.locales.default) {
            return Err(format!(
                "locales.default: {} is not in locales.supported",
                self.locales.default
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.cache.revalidate_secs, 3600);
        assert_eq!(s.locales.fallback().default_locale, "fr");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let s: Settings = serde_json::from_value(serde_json::json!({
            "cms": { "url": "https://cms.example.com", "api_token": "tok", "preview_token": "" },
            "locales": { "supported": ["en", "fr"], "default": "en" }
        }))
        .expect("settings");
        assert_eq!(s.cms.timeout_secs, 10);
        assert_eq!(s.cms.api_token.as_ref().map(|t| t.expose_secret()), Some("tok"));
        assert!(s.cms.preview_token.is_none());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn default_locale_must_be_supported() {
        let mut s = Settings::default();
        s.locales.default = "de".into();
        assert!(s.validate().unwrap_err().contains("locales.default"));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let s: Settings = serde_json::from_value(serde_json::json!({
            "preview": { "secret": "hunter2" }
        }))
        .expect("settings");
        assert!(!format!("{s:?}").contains("hunter2"));
    }
}

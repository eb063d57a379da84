// crates/edge/src/settings.rs

use config::{Config, Environment, File, FileFormat};
use domain::setting::Settings;
use std::path::Path;
use tracing::debug;

use crate::Error;

pub const SETTINGS_FILE: &str = "settings.toml";

/// `VITRINE__SECTION__KEY` overrides, e.g. `VITRINE__CMS__API_TOKEN`.
pub fn environment() -> Environment {
    Environment::with_prefix("VITRINE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("locales.supported")
        .with_list_parse_key("security.extra_connect_src")
}

/// Load `<dir>/settings.toml` layered with the process environment.
pub fn load_settings(dir: &Path) -> Result<Settings, Error> {
    load_settings_with(dir, environment())
}

/// Load `<dir>/settings.toml` layered with `env`, then validate.
#[tracing::instrument(skip_all)]
pub fn load_settings_with(dir: &Path, env: Environment) -> Result<Settings, Error> {
    let path = dir.join(SETTINGS_FILE);
    if !path.is_file() {
        return Err(Error::Config(format!(
            "{SETTINGS_FILE} not found at {}",
            path.display()
        )));
    }

    let settings: Settings = Config::builder()
        .add_source(File::from(path.as_path()).format(FileFormat::Toml))
        .add_source(env)
        .build()?
        .try_deserialize()?;

    settings
        .validate()
        .map_err(|e| Error::Config(format!("Invalid {}: {e}", path.display())))?;
    debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use secrecy::ExposeSecret;
    use std::fs;
    use tempfile::TempDir;

    fn no_env() -> Environment {
        environment().source(Some(Map::new()))
    }

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn site(toml: &str) -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(SETTINGS_FILE), toml).expect("write");
        dir
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_settings_with(dir.path(), no_env()).unwrap_err();
        assert!(matches!(err, Error::Config(m) if m.contains("settings.toml")));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = site(
            r#"
            [cms]
            url = "https://cms.example.com"
            api_token = "tok"

            [site]
            name = "Atelier"
            "#,
        );
        let s = load_settings_with(dir.path(), no_env()).expect("settings");
        assert_eq!(s.cms.url, "https://cms.example.com");
        assert_eq!(s.cms.api_token.as_ref().map(|t| t.expose_secret()), Some("tok"));
        assert_eq!(s.site.name, "Atelier");
        assert_eq!(s.server.port, 3000);
        assert_eq!(s.locales.default, "fr");
    }

    #[test]
    fn environment_overrides_the_file() {
        let dir = site("[server]\nport = 8080\n");
        let s = load_settings_with(
            dir.path(),
            env(&[
                ("VITRINE__SERVER__PORT", "9000"),
                ("VITRINE__LOCALES__SUPPORTED", "en,it"),
                ("VITRINE__LOCALES__DEFAULT", "en"),
            ]),
        )
        .expect("settings");
        assert_eq!(s.server.port, 9000);
        assert_eq!(s.locales.supported, ["en", "it"]);
        assert_eq!(s.locales.default, "en");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = site("[cms]\nurl = \"ftp://cms.example.com\"\n");
        let err = load_settings_with(dir.path(), no_env()).unwrap_err();
        assert!(matches!(err, Error::Config(m) if m.contains("cms.url")));
    }
}

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::FailurePolicy;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub listen: Option<SocketAddr>,
    pub default_lang: Option<String>,
    pub fallback_langs: Option<Vec<String>>,
    pub allow_cross_origin: Option<bool>,
    pub failure_policy: Option<FailurePolicy>,
}

impl Config {
    /// Load config from ~/.config/ytx-api/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Load config from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytx-api")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
listen = "127.0.0.1:8080"
default_lang = "en"
fallback_langs = ["en-US", "en"]
allow_cross_origin = false
failure_policy = "collapse"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.listen, Some("127.0.0.1:8080".parse::<SocketAddr>().unwrap()));
        assert_eq!(config.default_lang.as_deref(), Some("en"));
        assert_eq!(
            config.fallback_langs,
            Some(vec!["en-US".to_string(), "en".to_string()])
        );
        assert_eq!(config.allow_cross_origin, Some(false));
        assert_eq!(config.failure_policy, Some(FailurePolicy::Collapse));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.listen.is_none());
        assert!(config.default_lang.is_none());
        assert!(config.failure_policy.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"default_lang = "fr""#).unwrap();
        assert_eq!(config.default_lang.as_deref(), Some("fr"));
        assert!(config.allow_cross_origin.is_none());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(toml::from_str::<Config>(r#"failure_policy = "lenient""#).is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("ytx-api-does-not-exist").join("config.toml");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("ytx-api-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "allow_cross_origin = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.allow_cross_origin, Some(true));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

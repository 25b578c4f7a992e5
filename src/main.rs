use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use eyre::Result;
use log::{debug, info};

mod cli;

use cli::Cli;
use ytx_api::config::Config;
use ytx_api::server::Settings;
use ytx_api::youtube::YouTubeProvider;

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

/// CLI flags take priority over the config file, which takes priority over built-in defaults
fn resolve_settings(cli: &Cli, config: Config) -> Settings {
    Settings {
        listen: cli
            .listen
            .or(config.listen)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000))),
        default_lang: cli
            .lang
            .clone()
            .or(config.default_lang)
            .unwrap_or_else(|| ytx_api::DEFAULT_LANG.to_string()),
        fallback_langs: config
            .fallback_langs
            .unwrap_or_else(|| ytx_api::FALLBACK_LANGS.iter().map(|l| l.to_string()).collect()),
        allow_cross_origin: !cli.no_cors && config.allow_cross_origin.unwrap_or(true),
        failure_policy: cli.failure_policy.or(config.failure_policy).unwrap_or_default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug!("Config: {config:?}");

    let settings = resolve_settings(&cli, config);
    info!(
        "Default language: {} (fallbacks: {:?})",
        settings.default_lang, settings.fallback_langs
    );

    let provider = Arc::new(YouTubeProvider::new(reqwest::Client::new()));
    ytx_api::server::serve(settings, provider).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytx_api::error::FailurePolicy;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ytx-api"]);
        let settings = resolve_settings(&cli, Config::default());
        assert_eq!(settings.listen, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert_eq!(settings.default_lang, "zh");
        assert_eq!(settings.fallback_langs, vec!["zh-Hans", "zh-Hant", "en"]);
        assert!(settings.allow_cross_origin);
        assert_eq!(settings.failure_policy, FailurePolicy::Strict);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "ytx-api",
            "--listen",
            "127.0.0.1:9000",
            "--lang",
            "en",
            "--no-cors",
            "--failure-policy",
            "collapse",
        ]);
        let config: Config = toml::from_str(
            r#"
listen = "0.0.0.0:8080"
default_lang = "ja"
allow_cross_origin = true
failure_policy = "strict"
"#,
        )
        .unwrap();
        let settings = resolve_settings(&cli, config);
        assert_eq!(settings.listen, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(settings.default_lang, "en");
        assert!(!settings.allow_cross_origin);
        assert_eq!(settings.failure_policy, FailurePolicy::Collapse);
    }

    #[test]
    fn test_config_fills_unset_flags() {
        let cli = Cli::parse_from(["ytx-api"]);
        let config: Config = toml::from_str(
            r#"
default_lang = "ja"
fallback_langs = ["en"]
allow_cross_origin = false
"#,
        )
        .unwrap();
        let settings = resolve_settings(&cli, config);
        assert_eq!(settings.default_lang, "ja");
        assert_eq!(settings.fallback_langs, vec!["en"]);
        assert!(!settings.allow_cross_origin);
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::MuxConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MuxConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MuxConfig, ConfigError> {
    let config: MuxConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            listen = "127.0.0.1:25585"
            debug = true

            [metrics]
            enabled = true

            [[servers]]
            name = "mojang"
            prefix = "https://sessionserver.mojang.com/"

            [[servers]]
            prefix = "https://littleskin.cn/api/yggdrasil/sessionserver"
            proxy = "socks5://127.0.0.1:1080"
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:25585");
        assert!(config.debug);
        assert!(config.metrics.enabled);
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers[0].display_name(), "mojang");
        assert_eq!(config.servers[0].timeout_secs, 10);
        assert_eq!(
            config.servers[1].display_name(),
            "https://littleskin.cn/api/yggdrasil/sessionserver"
        );
        assert_eq!(config.servers[1].proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
        assert_eq!(config.servers[1].timeout_secs, 3);
    }

    #[test]
    fn test_defaults() {
        let config = parse_config("[[servers]]\nprefix = \"https://example.com\"\n").unwrap();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert!(!config.debug);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_validation_failure_is_reported() {
        let err = parse_config("debug = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: no yggdrasil server specified");
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_config("servers = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/ymux.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

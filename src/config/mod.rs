//! Runtime configuration for msgfold
//!
//! A small TOML document covering resolver behavior, codec toggles and the
//! default log level. Every section and key is optional.
//!
//! ```toml
//! [resolver]
//! default_vendor = "acme"
//!
//! [codec]
//! binary_base64 = true
//!
//! [logging]
//! level = "debug"
//! ```

pub mod error;

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::resolver::MessageResolver;
use crate::types::set_binary_base64;

pub use error::{ConfigError, ConfigResult};

const LOG_LEVELS: [&str; 6] = ["error", "warn", "info", "debug", "trace", "off"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resolver: ResolverSettings,
    pub codec: CodecSettings,
    pub logging: LogSettings,
}

/// Resolver section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Vendor substituted for the `*` wildcard in curies and qnames
    pub default_vendor: Option<String>,
}

/// Codec section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Encode binary fields as base64 (true) or as raw text (false)
    pub binary_base64: bool,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self { binary_base64: true }
    }
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default level filter, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level [{}], expected one of {}",
                self.logging.level,
                LOG_LEVELS.join("|")
            )));
        }

        if let Some(vendor) = &self.resolver.default_vendor {
            let valid = !vendor.is_empty()
                && vendor
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                return Err(ConfigError::Validation(format!(
                    "Default vendor [{vendor}] must be lowercase alphanumeric or dashes"
                )));
            }
        }
        Ok(())
    }

    /// Pushes the settings into the process-wide codec toggle and `resolver`.
    pub fn apply(&self, resolver: &MessageResolver) {
        set_binary_base64(self.codec.binary_base64);
        resolver.set_default_vendor(self.resolver.default_vendor.as_deref());
        info!(
            "Applied msgfold configuration: default_vendor={:?}, binary_base64={}",
            self.resolver.default_vendor, self.codec.binary_base64
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.codec.binary_base64);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.resolver.default_vendor, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[resolver]\ndefault_vendor = \"acme\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.resolver.default_vendor.as_deref(), Some("acme"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.codec.binary_base64);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Config::from_toml_str("[resolver]\ndefault_vendor = \"Acme Inc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Config::from_toml_str("[codec\nbinary_base64 = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_apply_sets_default_vendor() {
        let resolver = MessageResolver::new();
        let config = Config::from_toml_str("[resolver]\ndefault_vendor = \"acme\"").unwrap();
        config.apply(&resolver);
        assert_eq!(resolver.default_vendor().as_deref(), Some("acme"));
    }
}

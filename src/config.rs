use std::env;
use std::fmt;
use std::path::{Component, PathBuf};
use thiserror::Error;

pub const DEFAULT_MANIFEST_TAG: &str = "MacIntuneManifest";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1MB
const DEFAULT_RESPECT_GITIGNORE: bool = true;
const MIN_FILE_SIZE_BYTES: u64 = 1024;
const MAX_FILE_SIZE_BYTES: u64 = 64 * 1_048_576;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct MdmdocConfig {
    pub log_level: String,
    pub max_file_size_bytes: u64,
    pub respect_gitignore: bool,
    pub manifest_tag: String,
    /// Directories, relative to the root, that JSON documents and profiles
    /// are collected from. Empty means the whole tree.
    pub source_dirs: Vec<PathBuf>,
}

impl Default for MdmdocConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            respect_gitignore: DEFAULT_RESPECT_GITIGNORE,
            manifest_tag: DEFAULT_MANIFEST_TAG.to_string(),
            source_dirs: Vec::new(),
        }
    }
}

impl MdmdocConfig {
    /// Reads `MDMDOC_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_level = env::var("MDMDOC_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let max_file_size_bytes = match env::var("MDMDOC_MAX_FILE_SIZE") {
            Ok(v) => v.parse::<u64>().map_err(|e| ConfigError::ParseError {
                field: "MDMDOC_MAX_FILE_SIZE".to_string(),
                error: e.to_string(),
            })?,
            Err(_) => DEFAULT_MAX_FILE_SIZE_BYTES,
        };

        let respect_gitignore = match env::var("MDMDOC_RESPECT_GITIGNORE") {
            Ok(v) => v.parse::<bool>().map_err(|e| ConfigError::ParseError {
                field: "MDMDOC_RESPECT_GITIGNORE".to_string(),
                error: e.to_string(),
            })?,
            Err(_) => DEFAULT_RESPECT_GITIGNORE,
        };

        let manifest_tag =
            env::var("MDMDOC_MANIFEST_TAG").unwrap_or_else(|_| DEFAULT_MANIFEST_TAG.to_string());

        let source_dirs = env::var("MDMDOC_SOURCE_DIRS")
            .map(|v| parse_source_dirs(&v))
            .unwrap_or_default();

        Ok(Self {
            log_level,
            max_file_size_bytes,
            respect_gitignore,
            manifest_tag,
            source_dirs,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.max_file_size_bytes < MIN_FILE_SIZE_BYTES {
            return Err(ConfigError::ValidationFailed(
                "Max file size must be at least 1KB".to_string(),
            ));
        }
        if self.max_file_size_bytes > MAX_FILE_SIZE_BYTES {
            return Err(ConfigError::ValidationFailed(
                "Max file size cannot exceed 64MB".to_string(),
            ));
        }

        if self.manifest_tag.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Manifest root tag cannot be empty".to_string(),
            ));
        }

        for dir in &self.source_dirs {
            if !dir.components().all(|c| matches!(c, Component::Normal(_))) {
                return Err(ConfigError::ValidationFailed(format!(
                    "Source directory must be relative to the repository root: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for MdmdocConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mdmdoc Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Max File Size: {} bytes", self.max_file_size_bytes)?;
        writeln!(f, "  Respect .gitignore: {}", self.respect_gitignore)?;
        writeln!(f, "  Manifest Root Tag: {}", self.manifest_tag)?;
        if self.source_dirs.is_empty() {
            writeln!(f, "  Source Dirs: (entire tree)")?;
        } else {
            let dirs: Vec<String> = self
                .source_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect();
            writeln!(f, "  Source Dirs: {}", dirs.join(", "))?;
        }
        Ok(())
    }
}

fn parse_source_dirs(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = [
            EnvGuard::unset("MDMDOC_LOG_LEVEL"),
            EnvGuard::unset("MDMDOC_MAX_FILE_SIZE"),
            EnvGuard::unset("MDMDOC_RESPECT_GITIGNORE"),
            EnvGuard::unset("MDMDOC_MANIFEST_TAG"),
            EnvGuard::unset("MDMDOC_SOURCE_DIRS"),
        ];

        let config = MdmdocConfig::from_env().unwrap();

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE_BYTES);
        assert_eq!(config.respect_gitignore, DEFAULT_RESPECT_GITIGNORE);
        assert_eq!(config.manifest_tag, DEFAULT_MANIFEST_TAG);
        assert!(config.source_dirs.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = [
            EnvGuard::set("MDMDOC_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("MDMDOC_MAX_FILE_SIZE", "4096"),
            EnvGuard::set("MDMDOC_RESPECT_GITIGNORE", "false"),
            EnvGuard::set("MDMDOC_MANIFEST_TAG", "ProfileManifest"),
            EnvGuard::set("MDMDOC_SOURCE_DIRS", "configurations, mde,,"),
        ];

        let config = MdmdocConfig::from_env().unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.max_file_size_bytes, 4096);
        assert!(!config.respect_gitignore);
        assert_eq!(config.manifest_tag, "ProfileManifest");
        assert_eq!(
            config.source_dirs,
            vec![PathBuf::from("configurations"), PathBuf::from("mde")]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_unparseable_environment_value() {
        let _guard = EnvGuard::set("MDMDOC_MAX_FILE_SIZE", "lots");

        match MdmdocConfig::from_env() {
            Err(ConfigError::ParseError { field, .. }) => {
                assert_eq!(field, "MDMDOC_MAX_FILE_SIZE")
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_configuration_validation_invalid_log_level() {
        let config = MdmdocConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_configuration_validation_file_size_bounds() {
        let too_small = MdmdocConfig {
            max_file_size_bytes: 10,
            ..Default::default()
        };
        assert!(too_small.validate().is_err());

        let too_large = MdmdocConfig {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES + 1,
            ..Default::default()
        };
        assert!(too_large.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_empty_tag() {
        let config = MdmdocConfig {
            manifest_tag: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_source_dirs() {
        for bad in ["/etc", "../outside", "configurations/../.."] {
            let config = MdmdocConfig {
                source_dirs: vec![PathBuf::from(bad)],
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{} should be rejected", bad);
        }

        let nested = MdmdocConfig {
            source_dirs: vec![PathBuf::from("configurations/intune")],
            ..Default::default()
        };
        assert!(nested.validate().is_ok());
    }

    #[test]
    fn test_display() {
        let rendered = MdmdocConfig::default().to_string();
        assert!(rendered.contains("Manifest Root Tag: MacIntuneManifest"));
        assert!(rendered.contains("Max File Size: 1048576 bytes"));
        assert!(rendered.contains("Source Dirs: (entire tree)"));
    }
}

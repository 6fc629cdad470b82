use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MAX_FENCE_TOKENS: usize = 100;
pub const DEFAULT_MAX_REGION_TAGS: usize = 100;
pub const DEFAULT_LINE_HEIGHT: f32 = 20.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key} in {config_path}: {reason}")]
    InvalidValue {
        config_path: PathBuf,
        key: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root that document ids are relative to. Relative document
    /// paths given on the command line resolve against it.
    pub document_dir: Option<PathBuf>,
    /// Pandoc fence tokens scanned before giving up on a balanced close.
    pub max_fence_tokens: usize,
    /// Region start tags examined per lookup.
    pub max_region_tags: usize,
    /// Height of one rendered line, used when measuring fragments.
    pub line_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_dir: None,
            max_fence_tokens: DEFAULT_MAX_FENCE_TOKENS,
            max_region_tags: DEFAULT_MAX_REGION_TAGS,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate(config_path)?;

        // Expand shell variables and tilde in the document directory
        config.document_dir = config
            .document_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The stored config, or defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-multicolumn");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn validate(&self, config_path: &Path) -> Result<(), ConfigError> {
        let invalid = |key, reason: &str| ConfigError::InvalidValue {
            config_path: config_path.to_path_buf(),
            key,
            reason: reason.to_string(),
        };
        if self.max_fence_tokens == 0 {
            return Err(invalid("max_fence_tokens", "must be at least 1"));
        }
        if self.max_region_tags == 0 {
            return Err(invalid("max_region_tags", "must be at least 1"));
        }
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(invalid("line_height", "must be a positive number"));
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-multicolumn/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            document_dir: Some(PathBuf::from("/tmp/test-docs")),
            max_fence_tokens: 50,
            ..Config::default()
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: Config = toml::from_str("max_region_tags = 7\n").unwrap();

        assert_eq!(config.max_region_tags, 7);
        assert_eq!(config.max_fence_tokens, DEFAULT_MAX_FENCE_TOKENS);
        assert_eq!(config.line_height, DEFAULT_LINE_HEIGHT);
        assert!(config.document_dir.is_none());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = Config {
            document_dir: Some(PathBuf::from("/tmp/test-docs")),
            line_height: 18.5,
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_env_var_in_document_dir() {
        unsafe {
            env::set_var("MULTICOLUMN_DOCS", "/custom/docs");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "document_dir = \"$MULTICOLUMN_DOCS/notes\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.document_dir, Some(PathBuf::from("/custom/docs/notes")));

        unsafe {
            env::remove_var("MULTICOLUMN_DOCS");
        }
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "max_fence_tokens = 0\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "max_fence_tokens",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "line_height = \"tall\"\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}

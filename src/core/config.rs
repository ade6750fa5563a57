use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::simd::Backend;

/// Default stream chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Backend choice as written in configuration files.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Fastest backend the CPU supports
    #[default]
    Auto,
    Scalar,
    Portable,
    Ssse3,
    Neon,
}

impl BackendPreference {
    /// The backend to run. Unavailable choices fall back to portable.
    pub fn resolve(self) -> Backend {
        match self {
            BackendPreference::Auto => Backend::detect(),
            BackendPreference::Scalar => Backend::Scalar,
            BackendPreference::Portable => Backend::Portable,
            BackendPreference::Ssse3 => Backend::Ssse3.resolve(),
            BackendPreference::Neon => Backend::Neon.resolve(),
        }
    }

    /// The explicitly requested backend, if any.
    pub fn requested(self) -> Option<Backend> {
        match self {
            BackendPreference::Auto => None,
            BackendPreference::Scalar => Some(Backend::Scalar),
            BackendPreference::Portable => Some(Backend::Portable),
            BackendPreference::Ssse3 => Some(Backend::Ssse3),
            BackendPreference::Neon => Some(Backend::Neon),
        }
    }
}

/// When the CLI ends encoded output with a newline.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewlineMode {
    /// Only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// `[codec]` table.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct CodecSettings {
    #[serde(default)]
    pub backend: Option<BackendPreference>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

/// `[output]` table.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    #[serde(default)]
    pub newline: Option<NewlineMode>,
}

/// Codec configuration loaded from TOML files.
///
/// Every field is optional so that override files only need to name what
/// they change; accessors supply the defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct CodecConfig {
    #[serde(default)]
    pub codec: CodecSettings,
    #[serde(default)]
    pub output: OutputSettings,
    /// Files merged into this configuration, in load order
    #[serde(skip)]
    pub sources: Vec<PathBuf>,
}

impl CodecConfig {
    /// Parses a configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the built-in configuration.
    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        let content = include_str!("../../rcnb.toml");
        Ok(Self::from_toml(content)?)
    }

    /// Loads configuration from a file path.
    ///
    /// A leading `~` and environment variables in `path` are expanded.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let expanded = shellexpand::full(&path.to_string_lossy())?.into_owned();
        let path = PathBuf::from(expanded);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let mut config = Self::from_toml(&content)
            .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
        config.validate()?;
        config.sources.push(path);
        Ok(config)
    }

    /// Path of the per-user configuration file, `~/.config/rcnb/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rcnb").join("config.toml"))
    }

    /// Loads configuration with user overrides from standard locations.
    ///
    /// Searches in priority order:
    /// 1. Built-in defaults (from library)
    /// 2. `~/.config/rcnb/config.toml` (user overrides)
    /// 3. `./rcnb.toml` (project-local overrides)
    ///
    /// Later files override earlier ones key by key. Files that fail to load
    /// are reported on stderr and skipped.
    pub fn load_with_overrides() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::load_default()?;

        if let Some(user_config_path) = Self::user_config_path()
            && user_config_path.exists()
        {
            match Self::load_from_file(&user_config_path) {
                Ok(user_config) => config.merge(user_config),
                Err(e) => eprintln!("Warning: {}", e),
            }
        }

        let local_config_path = Path::new("rcnb.toml");
        if local_config_path.exists() {
            match Self::load_from_file(local_config_path) {
                Ok(local_config) => config.merge(local_config),
                Err(e) => eprintln!("Warning: {}", e),
            }
        }

        Ok(config)
    }

    /// Merges another configuration into this one; set keys in `other` win.
    pub fn merge(&mut self, other: CodecConfig) {
        if other.codec.backend.is_some() {
            self.codec.backend = other.codec.backend;
        }
        if other.codec.chunk_size.is_some() {
            self.codec.chunk_size = other.codec.chunk_size;
        }
        if other.output.newline.is_some() {
            self.output.newline = other.output.newline;
        }
        self.sources.extend(other.sources);
    }

    /// Rejects values no stream can run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.codec.chunk_size == Some(0) {
            return Err("codec.chunk_size must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn backend(&self) -> BackendPreference {
        self.codec.backend.unwrap_or_default()
    }

    pub fn chunk_size(&self) -> usize {
        self.codec.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE).max(1)
    }

    pub fn newline(&self) -> NewlineMode {
        self.output.newline.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = CodecConfig::load_default().unwrap();
        assert_eq!(config.backend(), BackendPreference::Auto);
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.newline(), NewlineMode::Auto);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_load_from_toml_string() {
        let toml_content = r#"
[codec]
backend = "scalar"
chunk_size = 64

[output]
newline = "never"
"#;
        let config = CodecConfig::from_toml(toml_content).unwrap();
        assert_eq!(config.backend(), BackendPreference::Scalar);
        assert_eq!(config.chunk_size(), 64);
        assert_eq!(config.newline(), NewlineMode::Never);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = CodecConfig::from_toml("[codec]\nbackend = \"avx9\"\n").unwrap_err();
        assert!(err.to_string().contains("avx9"));
    }

    #[test]
    fn test_merge_configs() {
        let mut base =
            CodecConfig::from_toml("[codec]\nbackend = \"portable\"\nchunk_size = 10\n").unwrap();
        let local = CodecConfig::from_toml("[codec]\nchunk_size = 99\n").unwrap();
        base.merge(local);
        assert_eq!(base.backend(), BackendPreference::Portable);
        assert_eq!(base.chunk_size(), 99);
    }

    #[test]
    fn test_validate_chunk_size() {
        let config = CodecConfig::from_toml("[codec]\nchunk_size = 0\n").unwrap();
        assert!(config.validate().is_err());
        assert_eq!(config.chunk_size(), 1);
    }

    #[test]
    fn test_load_from_file_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[output]\nnewline = \"always\"\n").unwrap();

        let config = CodecConfig::load_from_file(&path).unwrap();
        assert_eq!(config.newline(), NewlineMode::Always);
        assert_eq!(config.sources, vec![path]);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = CodecConfig::load_from_file(Path::new("/nonexistent/rcnb.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }

    #[test]
    fn test_backend_preference_resolves_to_available() {
        for pref in [
            BackendPreference::Auto,
            BackendPreference::Scalar,
            BackendPreference::Portable,
            BackendPreference::Ssse3,
            BackendPreference::Neon,
        ] {
            assert!(pref.resolve().is_available());
        }
        assert_eq!(BackendPreference::Auto.requested(), None);
        assert_eq!(BackendPreference::Neon.requested(), Some(Backend::Neon));
    }
}

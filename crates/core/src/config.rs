//! Editor configuration.
//!
//! Values come from defaults, then an optional TOML file, then `DOCNOTE_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use viewer_core::ScaleBounds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lower zoom bound
    pub min_scale: f32,
    /// Upper zoom bound
    pub max_scale: f32,
    /// Zoom in/out increment
    pub zoom_step: f32,
    /// Horizontal padding removed from the container width for fit-to-width
    pub fit_padding: f32,
    /// Range of the randomized x placement for new elements
    pub placement_width: f32,
    /// Range of the randomized y placement for new elements
    pub placement_height: f32,
    /// Root of the directory store; platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    /// Default tracing filter
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.0,
            zoom_step: 0.1,
            fit_padding: 64.0,
            placement_width: 600.0,
            placement_height: 400.0,
            store_dir: None,
            log_filter: "info".to_string(),
        }
    }
}

impl EditorConfig {
    /// Defaults, overlaid with `path` when given, overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// ```toml
    /// min_scale = 0.5
    /// max_scale = 2.0
    /// zoom_step = 0.1
    /// store_dir = "/path/to/documents"
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_toml()?)?;
        Ok(())
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Environment variables:
    /// - `DOCNOTE_MIN_SCALE`, `DOCNOTE_MAX_SCALE`, `DOCNOTE_ZOOM_STEP`
    /// - `DOCNOTE_FIT_PADDING`
    /// - `DOCNOTE_STORE_DIR`
    /// - `DOCNOTE_LOG`
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(value) = env_f32("DOCNOTE_MIN_SCALE")? {
            self.min_scale = value;
        }
        if let Some(value) = env_f32("DOCNOTE_MAX_SCALE")? {
            self.max_scale = value;
        }
        if let Some(value) = env_f32("DOCNOTE_ZOOM_STEP")? {
            self.zoom_step = value;
        }
        if let Some(value) = env_f32("DOCNOTE_FIT_PADDING")? {
            self.fit_padding = value;
        }
        if let Ok(value) = std::env::var("DOCNOTE_STORE_DIR") {
            self.store_dir = Some(PathBuf::from(value));
        }
        if let Ok(value) = std::env::var("DOCNOTE_LOG") {
            self.log_filter = value;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if !positive(self.min_scale) || !positive(self.max_scale) {
            return Err(ConfigError::Inconsistent("scale bounds must be positive".to_string()));
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Inconsistent(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !positive(self.zoom_step) {
            return Err(ConfigError::Inconsistent("zoom_step must be positive".to_string()));
        }
        if !self.fit_padding.is_finite() || self.fit_padding < 0.0 {
            return Err(ConfigError::Inconsistent("fit_padding must not be negative".to_string()));
        }
        if !positive(self.placement_width) || !positive(self.placement_height) {
            return Err(ConfigError::Inconsistent("placement region must be positive".to_string()));
        }
        Ok(())
    }

    pub fn scale_bounds(&self) -> ScaleBounds {
        ScaleBounds { min: self.min_scale, max: self.max_scale, step: self.zoom_step }
    }
}

fn env_f32(key: &'static str) -> Result<Option<f32>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<f32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key: key.to_string(), value }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for configuration key {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML write error: {0}")]
    Write(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ENV_KEYS: [&str; 6] = [
        "DOCNOTE_MIN_SCALE",
        "DOCNOTE_MAX_SCALE",
        "DOCNOTE_ZOOM_STEP",
        "DOCNOTE_FIT_PADDING",
        "DOCNOTE_STORE_DIR",
        "DOCNOTE_LOG",
    ];

    #[test]
    fn defaults_match_viewer_controls() {
        let config = EditorConfig::default();
        assert_eq!(config.scale_bounds(), ScaleBounds { min: 0.5, max: 2.0, step: 0.1 });
        assert_eq!(config.fit_padding, 64.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml("max_scale = 3.0\n").expect("valid toml");
        assert_eq!(config.max_scale, 3.0);
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.store_dir, None);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = EditorConfig::from_toml("min_scale = 2.5\nmax_scale = 1.0\n")
            .expect_err("inverted bounds");
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = EditorConfig::from_toml("min_scale = \"big\"").expect_err("wrong type");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn file_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("docnote.toml");

        let config = EditorConfig {
            zoom_step: 0.25,
            store_dir: Some(PathBuf::from("/tmp/docnote")),
            ..EditorConfig::default()
        };
        config.save_to_file(&path).expect("save");

        assert_eq!(EditorConfig::from_file(&path).expect("load"), config);
    }

    #[test]
    #[serial]
    fn env_overrides_file_values() {
        let _guard = EnvGuard::new(&ENV_KEYS);
        env::set_var("DOCNOTE_MAX_SCALE", "4");
        env::set_var("DOCNOTE_STORE_DIR", "/tmp/env-store");
        env::remove_var("DOCNOTE_MIN_SCALE");
        env::remove_var("DOCNOTE_ZOOM_STEP");
        env::remove_var("DOCNOTE_FIT_PADDING");
        env::remove_var("DOCNOTE_LOG");

        let config = EditorConfig::from_toml("max_scale = 3.0")
            .expect("valid toml")
            .with_env_overrides()
            .expect("valid env");

        assert_eq!(config.max_scale, 4.0);
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/env-store")));
    }

    #[test]
    #[serial]
    fn non_numeric_env_value_is_rejected() {
        let _guard = EnvGuard::new(&ENV_KEYS);
        env::set_var("DOCNOTE_ZOOM_STEP", "fast");

        let err = EditorConfig::from_env().expect_err("invalid step");
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "DOCNOTE_ZOOM_STEP"));
    }

    // Saves and restores environment variables around a test.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(var_names: &[&str]) -> Self {
            let vars = var_names
                .iter()
                .map(|name| (name.to_string(), env::var(name).ok()))
                .collect();
            Self { vars }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }
}

//! Interaction tool configuration
//!
//! Tolerances and timings used by drawing, editing and measuring. Configuration
//! can be loaded from a JSON file, environment variables, or created
//! programmatically.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Configuration for the interaction tools.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Pixel radius within which a click hits a feature
    pub hit_tolerance_px: f64,
    /// Pixel radius for grabbing a vertex or closing a polygon
    pub vertex_tolerance_px: f64,
    /// Delay between completing a shape and leaving draw mode, in milliseconds
    pub draw_settle_ms: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            hit_tolerance_px: 5.0,
            vertex_tolerance_px: 10.0,
            draw_settle_ms: 100,
        }
    }
}

impl ToolsConfig {
    /// Sets the feature hit tolerance in pixels.
    pub fn with_hit_tolerance_px(mut self, px: f64) -> Self {
        self.hit_tolerance_px = px;
        self
    }

    /// Sets the vertex snapping tolerance in pixels.
    pub fn with_vertex_tolerance_px(mut self, px: f64) -> Self {
        self.vertex_tolerance_px = px;
        self
    }

    /// Sets the post-draw settle delay in milliseconds.
    pub fn with_draw_settle_ms(mut self, ms: u64) -> Self {
        self.draw_settle_ms = ms;
        self
    }

    /// Post-draw settle delay as a duration
    pub fn draw_settle_delay(&self) -> Duration {
        Duration::from_millis(self.draw_settle_ms)
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MAPSKETCH_HIT_TOLERANCE_PX`: hit tolerance in pixels (default: 5)
    /// - `MAPSKETCH_VERTEX_TOLERANCE_PX`: vertex tolerance in pixels (default: 10)
    /// - `MAPSKETCH_DRAW_SETTLE_MS`: post-draw delay in milliseconds (default: 100)
    ///
    /// # Errors
    /// Returns an error if any environment variable contains an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Applies any `MAPSKETCH_*` environment variables on top of this configuration.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(px) = parse_env::<f64>("MAPSKETCH_HIT_TOLERANCE_PX")? {
            self.hit_tolerance_px = px;
        }
        if let Some(px) = parse_env::<f64>("MAPSKETCH_VERTEX_TOLERANCE_PX")? {
            self.vertex_tolerance_px = px;
        }
        if let Some(ms) = parse_env::<u64>("MAPSKETCH_DRAW_SETTLE_MS")? {
            self.draw_settle_ms = ms;
        }
        self.validate()?;
        Ok(self)
    }

    /// Loads configuration from a JSON file.
    ///
    /// Missing keys keep their defaults:
    /// ```json
    /// { "hit_tolerance_px": 5.0, "vertex_tolerance_px": 10.0, "draw_settle_ms": 100 }
    /// ```
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hit_tolerance_px.is_finite() && self.hit_tolerance_px >= 0.0) {
            return Err(ConfigError::InvalidValue("hit_tolerance_px".to_string()));
        }
        if !(self.vertex_tolerance_px.is_finite() && self.vertex_tolerance_px >= 0.0) {
            return Err(ConfigError::InvalidValue("vertex_tolerance_px".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for configuration key: {0}")]
    InvalidValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 3] = [
        "MAPSKETCH_HIT_TOLERANCE_PX",
        "MAPSKETCH_VERTEX_TOLERANCE_PX",
        "MAPSKETCH_DRAW_SETTLE_MS",
    ];

    #[test]
    fn test_default_config() {
        let config = ToolsConfig::default();
        assert_eq!(config.hit_tolerance_px, 5.0);
        assert_eq!(config.vertex_tolerance_px, 10.0);
        assert_eq!(config.draw_settle_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_builder_methods() {
        let config = ToolsConfig::default()
            .with_hit_tolerance_px(8.0)
            .with_vertex_tolerance_px(12.0)
            .with_draw_settle_ms(0);

        assert_eq!(config.hit_tolerance_px, 8.0);
        assert_eq!(config.vertex_tolerance_px, 12.0);
        assert_eq!(config.draw_settle_ms, 0);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let _guard = EnvGuard::new(&VARS);

        env::set_var("MAPSKETCH_HIT_TOLERANCE_PX", "3.5");
        env::set_var("MAPSKETCH_VERTEX_TOLERANCE_PX", "6");
        env::set_var("MAPSKETCH_DRAW_SETTLE_MS", "250");

        let config = ToolsConfig::from_env().unwrap();
        assert_eq!(config.hit_tolerance_px, 3.5);
        assert_eq!(config.vertex_tolerance_px, 6.0);
        assert_eq!(config.draw_settle_ms, 250);
    }

    #[test]
    #[serial]
    fn test_from_env_partial() {
        let _guard = EnvGuard::new(&VARS);

        env::remove_var("MAPSKETCH_VERTEX_TOLERANCE_PX");
        env::remove_var("MAPSKETCH_DRAW_SETTLE_MS");
        env::set_var("MAPSKETCH_HIT_TOLERANCE_PX", "2");

        let config = ToolsConfig::from_env().unwrap();
        assert_eq!(config.hit_tolerance_px, 2.0);
        assert_eq!(config.vertex_tolerance_px, 10.0); // default
        assert_eq!(config.draw_settle_ms, 100); // default
    }

    #[test]
    #[serial]
    fn test_from_env_invalid() {
        let _guard = EnvGuard::new(&VARS);

        env::set_var("MAPSKETCH_DRAW_SETTLE_MS", "soon");
        let result = ToolsConfig::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidValue(key)) if key == "MAPSKETCH_DRAW_SETTLE_MS"));
    }

    // Helper to save and restore environment variables
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

    #[test]
    fn test_from_json_partial() {
        let config = ToolsConfig::from_json(r#"{ "draw_settle_ms": 0 }"#).unwrap();
        assert_eq!(config.draw_settle_ms, 0);
        assert_eq!(config.hit_tolerance_px, 5.0); // default
    }

    #[test]
    fn test_from_json_rejects_negative_tolerance() {
        let result = ToolsConfig::from_json(r#"{ "hit_tolerance_px": -1.0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(ToolsConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.json");

        let config = ToolsConfig::default().with_hit_tolerance_px(7.0).with_draw_settle_ms(40);
        config.save_to_file(&path).unwrap();

        let loaded = ToolsConfig::from_file(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ToolsConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

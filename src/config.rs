//! Configuration for beacon_drive.
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file at all) yields the stock lemon-tracking setup.

use crate::core_modules::color_mask::ColorRange;
use crate::core_modules::control_mapper::ControlConfig;
use crate::error::DriveError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What to look for and how strictly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    #[serde(flatten)]
    pub color_range: ColorRange,
    /// Regions with fewer pixels than this are treated as noise.
    pub min_area: usize,
    /// Erode/dilate passes applied to the mask before locating; 0 disables.
    pub denoise_iterations: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            color_range: ColorRange::lemon(),
            // About the area of a disc with a 10 pixel radius.
            min_area: 300,
            denoise_iterations: 2,
        }
    }
}

/// Exponential smoothing over successive commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Weight of the newest command, in (0, 1].
    pub alpha: f64,
}

/// Host loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Time between cycles.
    pub refresh_interval_ms: u64,
    /// Consecutive frame-source failures tolerated before the loop gives up.
    pub device_retry_limit: u32,
    /// Minimum throttle change that triggers a new send.
    pub throttle_threshold: f64,
    /// Minimum steering change that triggers a new send.
    pub steering_threshold: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 100,
            device_retry_limit: 3,
            throttle_threshold: 0.1,
            steering_threshold: 0.1,
        }
    }
}

impl DriverConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub target: TargetConfig,
    pub control: ControlConfig,
    pub smoothing: Option<SmoothingConfig>,
    pub driver: DriverConfig,
}

impl DriveConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, DriveError> {
        let config: DriveConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriveError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), DriveError> {
        self.target.color_range.validate().map_err(DriveError::Config)?;
        self.control.validate().map_err(DriveError::Config)?;

        if let Some(smoothing) = &self.smoothing {
            if !(smoothing.alpha > 0.0 && smoothing.alpha <= 1.0) {
                return Err(DriveError::Config(format!(
                    "smoothing alpha must be in (0, 1], got {}",
                    smoothing.alpha
                )));
            }
        }

        if self.driver.refresh_interval_ms == 0 {
            return Err(DriveError::Config("refresh_interval_ms must be non-zero".to_string()));
        }
        if !(self.driver.throttle_threshold >= 0.0) || !(self.driver.steering_threshold >= 0.0) {
            return Err(DriveError::Config("send thresholds must be non-negative".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_mask::ColorSpace;

    #[test]
    fn test_config_default() {
        let config = DriveConfig::default();
        assert_eq!(config.target.color_range, ColorRange::lemon());
        assert_eq!(config.target.min_area, 300);
        assert_eq!(config.control.dead_zone, 0.1);
        assert!(config.control.invert_vertical);
        assert!(config.smoothing.is_none());
        assert_eq!(config.driver.refresh_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = DriveConfig::from_toml_str("").unwrap();
        assert_eq!(config, DriveConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = DriveConfig::from_toml_str(
            r#"
            [target]
            space = "rgb"
            lower = [200, 0, 0]
            upper = [255, 60, 60]
            min_area = 50
            denoise_iterations = 0

            [control]
            dead_zone = 0.2
            max_throttle = 0.5
            max_steering = 0.8
            invert_vertical = false
            forward_ratio = 2.0

            [smoothing]
            alpha = 0.3

            [driver]
            refresh_interval_ms = 50
            device_retry_limit = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.target.color_range.space, ColorSpace::Rgb);
        assert_eq!(config.target.color_range.upper, [255, 60, 60]);
        assert_eq!(config.target.min_area, 50);
        assert_eq!(config.control.max_throttle, 0.5);
        assert!(!config.control.invert_vertical);
        assert!(!config.control.invert_horizontal);
        assert_eq!(config.smoothing, Some(SmoothingConfig { alpha: 0.3 }));
        assert_eq!(config.driver.refresh_interval_ms, 50);
        assert_eq!(config.driver.throttle_threshold, 0.1);
    }

    #[test]
    fn test_partial_target_keeps_default_color() {
        let config = DriveConfig::from_toml_str("[target]\nmin_area = 40\n").unwrap();
        assert_eq!(config.target.min_area, 40);
        assert_eq!(config.target.color_range, ColorRange::lemon());
        assert_eq!(config.target.denoise_iterations, 2);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drive.toml");
        std::fs::write(&path, "[control]\nmax_steering = 0.5\n").unwrap();

        let config = DriveConfig::load(&path).unwrap();
        assert_eq!(config.control.max_steering, 0.5);
        assert!(matches!(DriveConfig::load(dir.path().join("missing.toml")), Err(DriveError::Io(_))));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = DriveConfig::from_toml_str(include_str!("../beacon_drive.toml")).unwrap();
        assert_eq!(config, DriveConfig::default());
    }

    #[test]
    fn test_invalid_dead_zone_rejected() {
        let result = DriveConfig::from_toml_str("[control]\ndead_zone = 1.0\n");
        assert!(matches!(result, Err(DriveError::Config(_))));
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let result = DriveConfig::from_toml_str("[smoothing]\nalpha = 0.0\n");
        assert!(matches!(result, Err(DriveError::Config(_))));
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let result = DriveConfig::from_toml_str("[driver]\nrefresh_interval_ms = 0\n");
        assert!(matches!(result, Err(DriveError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = DriveConfig::from_toml_str("[control\n");
        assert!(matches!(result, Err(DriveError::Toml(_))));
    }

    #[test]
    fn test_unknown_color_space_is_parse_error() {
        let result = DriveConfig::from_toml_str("[target]\nspace = \"lab\"\n");
        assert!(matches!(result, Err(DriveError::Toml(_))));
    }
}

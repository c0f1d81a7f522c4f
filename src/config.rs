use crate::color::ColorScheme;
use crate::error::Result;
use crate::settings::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default pause between timer-driven rounds, in milliseconds
pub const DEFAULT_ROUND_DELAY_MS: u64 = 100;
/// Longest allowed pause between rounds
pub const MAX_ROUND_DELAY_MS: u64 = 2000;

/// Complete application configuration for export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Parameters of the simulation run
    pub simulation: SimulationConfig,
    /// Pause between timer-driven rounds (app-level)
    pub round_delay_ms: u64,
    /// Color scheme (app-level)
    pub color_scheme: ColorScheme,
    /// Hide the sidebar (app-level)
    pub fullscreen: bool,
}

impl AppConfig {
    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Import config from a JSON file; the simulation part is validated
    /// and the round delay is clamped
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.simulation.validate()?;
        config.round_delay_ms = config.round_delay_ms.min(MAX_ROUND_DELAY_MS);
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            simulation: SimulationConfig::default(),
            round_delay_ms: DEFAULT_ROUND_DELAY_MS,
            color_scheme: ColorScheme::default(),
            fullscreen: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::settings::RelocationPolicy;
    use tempfile::NamedTempFile;

    #[test]
    fn test_all_fields_preserved() {
        let original = AppConfig {
            version: 1,
            simulation: SimulationConfig {
                width: 48,
                empty_fraction: 0.25,
                occupant_a_ratio: 0.7,
                similarity_threshold: 62.5,
                relocation_policy: RelocationPolicy::NearestSatisfying,
                seed: Some(99),
            },
            round_delay_ms: 350,
            color_scheme: ColorScheme::Ocean,
            fullscreen: true,
        };

        let json = serde_json::to_string(&original).unwrap();
        let restored: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.simulation, original.simulation);
        assert_eq!(restored.round_delay_ms, 350);
        assert_eq!(restored.color_scheme, ColorScheme::Ocean);
        assert!(restored.fullscreen);
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::default();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.version, config.version);
        assert_eq!(loaded.simulation, config.simulation);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let loaded: AppConfig =
            serde_json::from_str(r#"{ "simulation": { "width": 12 }, "round_delay_ms": 40 }"#).unwrap();
        assert_eq!(loaded.simulation.width, 12);
        assert_eq!(loaded.simulation.similarity_threshold, 30.0);
        assert_eq!(loaded.round_delay_ms, 40);
        assert_eq!(loaded.color_scheme, ColorScheme::Classic);
    }

    #[test]
    fn test_out_of_range_config_file_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{ "simulation": { "empty_fraction": 1.5 } }"#,
        )
        .unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(SimulationError::InvalidConfig { .. })));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(SimulationError::Serde(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(SimulationError::Io(_))));
    }

    #[test]
    fn test_loaded_round_delay_clamped() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{ "round_delay_ms": 99999 }"#).unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.round_delay_ms, MAX_ROUND_DELAY_MS);
    }
}

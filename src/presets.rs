use crate::error::{Result, SimulationError};
use crate::settings::{RelocationPolicy, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A named preset containing simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub config: SimulationConfig,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        config: SimulationConfig,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            config,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-in presets plus user presets from the platform config directory
    pub fn new() -> Self {
        Self::load(default_presets_dir())
    }

    /// Built-in presets plus user presets from `dir`
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self::load(Some(dir.into()))
    }

    fn load(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Load user presets from disk, skipping unreadable or invalid files
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_deref() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match read_preset(&path) {
                Ok(preset) => self.user.push(preset),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "Skipping unreadable preset")
                }
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Save a preset to disk
    pub fn save_preset(&mut self, preset: Preset) -> Result<()> {
        preset.config.validate()?;
        let dir = self.dir.as_deref().ok_or(SimulationError::NoConfigDir)?;

        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", sanitize_filename(&preset.name)));
        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json)?;
        tracing::info!(name = %preset.name, path = %path.display(), "Saved preset");

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<()> {
        let dir = self.dir.as_deref().ok_or(SimulationError::NoConfigDir)?;

        let pos = self
            .user
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| SimulationError::PresetNotFound(name.to_string()))?;
        self.user.remove(pos);

        let path = dir.join(format!("{}.json", sanitize_filename(name)));
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Like `find`, but a missing preset is an error
    pub fn get(&self, name: &str) -> Result<&Preset> {
        self.find(name)
            .ok_or_else(|| SimulationError::PresetNotFound(name.to_string()))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}

/// Get the presets directory path
fn default_presets_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("schelling-simulator").join("presets"))
}

fn read_preset(path: &Path) -> Result<Preset> {
    let content = fs::read_to_string(path)?;
    let preset: Preset = serde_json::from_str(&content)?;
    preset.config.validate()?;
    Ok(preset)
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        // Classic - the default classroom setup
        Preset::new(
            "Classic",
            "Mild preference for like neighbors still segregates",
            SimulationConfig::default(),
        ),
        // Tolerant - settles almost at once
        Preset::new(
            "Tolerant",
            "Low threshold, little movement",
            SimulationConfig {
                similarity_threshold: 20.0,
                ..Default::default()
            },
        ),
        // Intolerant - strong preference, long churn
        Preset::new(
            "Intolerant",
            "Majority-like neighborhoods demanded, large clusters",
            SimulationConfig {
                similarity_threshold: 70.0,
                empty_fraction: 0.20,
                ..Default::default()
            },
        ),
        // Minority - unequal group sizes
        Preset::new(
            "Minority",
            "One group is a fifth of the population",
            SimulationConfig {
                occupant_a_ratio: 0.80,
                similarity_threshold: 40.0,
                ..Default::default()
            },
        ),
        // Crowded - very few vacancies
        Preset::new(
            "Crowded",
            "Almost no empty cells to move into",
            SimulationConfig {
                empty_fraction: 0.02,
                similarity_threshold: 40.0,
                ..Default::default()
            },
        ),
        // Sparse - lots of room
        Preset::new(
            "Sparse",
            "Half the grid empty",
            SimulationConfig {
                empty_fraction: 0.50,
                similarity_threshold: 50.0,
                ..Default::default()
            },
        ),
        // Nearest Move - agents look for a close satisfying spot
        Preset::new(
            "Nearest Move",
            "Unsatisfied occupants prefer the closest cell that suits them",
            SimulationConfig {
                similarity_threshold: 50.0,
                empty_fraction: 0.15,
                relocation_policy: RelocationPolicy::NearestSatisfying,
                ..Default::default()
            },
        ),
    ]
}

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Smallest grid side length the engine accepts
pub const MIN_WIDTH: usize = 2;
/// Largest grid side length the engine accepts
pub const MAX_WIDTH: usize = 200;

/// Where an unsatisfied occupant moves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelocationPolicy {
    /// Any empty cell, chosen uniformly at random
    #[default]
    Random,
    /// Closest empty cell that would satisfy the occupant, else random
    NearestSatisfying,
}

impl RelocationPolicy {
    pub fn name(&self) -> &str {
        match self {
            RelocationPolicy::Random => "Random",
            RelocationPolicy::NearestSatisfying => "Nearest",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            RelocationPolicy::Random => RelocationPolicy::NearestSatisfying,
            RelocationPolicy::NearestSatisfying => RelocationPolicy::Random,
        }
    }

    pub fn prev(&self) -> Self {
        // Two variants, so backwards is the same walk
        self.next()
    }

    /// Parse a policy name as typed on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" | "rand" => Some(RelocationPolicy::Random),
            "nearest" | "nearest-satisfying" | "near" => Some(RelocationPolicy::NearestSatisfying),
            _ => None,
        }
    }
}

/// Parameters of one simulation run.
///
/// Fractions are stored in [0, 1]; the threshold is a percentage in
/// [0, 100]. A config is fixed for the lifetime of a run: changing any
/// field means building a fresh simulation from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid side length (2-200)
    pub width: usize,
    /// Fraction of cells left empty (0.0-1.0)
    pub empty_fraction: f64,
    /// Fraction of occupied cells holding type A (0.0-1.0)
    pub occupant_a_ratio: f64,
    /// Minimum percentage of similar occupied neighbors (0-100)
    pub similarity_threshold: f64,
    /// How unsatisfied occupants pick a destination
    pub relocation_policy: RelocationPolicy,
    /// Fixed random seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 30,
            empty_fraction: 0.10,
            occupant_a_ratio: 0.50,
            similarity_threshold: 30.0,
            relocation_policy: RelocationPolicy::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Reject out-of-range values instead of clamping them
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_WIDTH || self.width > MAX_WIDTH {
            return Err(SimulationError::invalid(
                "width",
                format!("must be in {}..={}, got {}", MIN_WIDTH, MAX_WIDTH, self.width),
            ));
        }
        check_range("empty_fraction", self.empty_fraction, 0.0, 1.0)?;
        check_range("occupant_a_ratio", self.occupant_a_ratio, 0.0, 1.0)?;
        check_range("similarity_threshold", self.similarity_threshold, 0.0, 100.0)?;
        Ok(())
    }

    /// Adjust grid width within bounds
    pub fn adjust_width(&mut self, delta: i32) {
        let new_val = (self.width as i32 + delta).clamp(MIN_WIDTH as i32, MAX_WIDTH as i32);
        self.width = new_val as usize;
    }

    /// Adjust empty fraction within bounds
    pub fn adjust_empty_fraction(&mut self, delta: f64) {
        self.empty_fraction = round_to_hundredths((self.empty_fraction + delta).clamp(0.0, 1.0));
    }

    /// Adjust type A ratio within bounds
    pub fn adjust_occupant_a_ratio(&mut self, delta: f64) {
        self.occupant_a_ratio = round_to_hundredths((self.occupant_a_ratio + delta).clamp(0.0, 1.0));
    }

    /// Adjust similarity threshold within bounds
    pub fn adjust_similarity_threshold(&mut self, delta: f64) {
        self.similarity_threshold = (self.similarity_threshold + delta).clamp(0.0, 100.0);
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(SimulationError::invalid(
            field,
            format!("must be in {}..={}, got {}", min, max, value),
        ));
    }
    Ok(())
}

// Keeps repeated 0.05 steps from drifting to 0.30000000000000004
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_width_bounds_rejected() {
        let config = SimulationConfig {
            width: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig { field: "width", .. })
        ));

        let config = SimulationConfig {
            width: MAX_WIDTH + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            width: MIN_WIDTH,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fraction_bounds_rejected() {
        let config = SimulationConfig {
            empty_fraction: 1.01,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig { field: "empty_fraction", .. })
        ));

        let config = SimulationConfig {
            occupant_a_ratio: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            similarity_threshold: 100.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            empty_fraction: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inclusive_bounds_accepted() {
        let config = SimulationConfig {
            empty_fraction: 1.0,
            occupant_a_ratio: 0.0,
            similarity_threshold: 100.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_adjust_clamps() {
        let mut config = SimulationConfig::default();
        config.adjust_width(-1000);
        assert_eq!(config.width, MIN_WIDTH);
        config.adjust_width(1000);
        assert_eq!(config.width, MAX_WIDTH);

        config.adjust_empty_fraction(5.0);
        assert_eq!(config.empty_fraction, 1.0);
        config.adjust_occupant_a_ratio(-5.0);
        assert_eq!(config.occupant_a_ratio, 0.0);
        config.adjust_similarity_threshold(500.0);
        assert_eq!(config.similarity_threshold, 100.0);
    }

    #[test]
    fn test_adjust_steps_stay_exact() {
        let mut config = SimulationConfig {
            empty_fraction: 0.1,
            ..Default::default()
        };
        config.adjust_empty_fraction(0.05);
        config.adjust_empty_fraction(0.05);
        config.adjust_empty_fraction(0.05);
        assert_eq!(config.empty_fraction, 0.25);
    }

    #[test]
    fn test_policy_cycle_and_parse() {
        assert_eq!(
            RelocationPolicy::Random.next(),
            RelocationPolicy::NearestSatisfying
        );
        assert_eq!(RelocationPolicy::Random.next().next(), RelocationPolicy::Random);
        assert_eq!(RelocationPolicy::parse("NEAREST"), Some(RelocationPolicy::NearestSatisfying));
        assert_eq!(RelocationPolicy::parse("rand"), Some(RelocationPolicy::Random));
        assert_eq!(RelocationPolicy::parse("closest"), None);
    }
}

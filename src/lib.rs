//! Schelling segregation model.
//!
//! A square grid holds two kinds of occupants and some empty cells. Each
//! round, every occupant whose share of like neighbors falls below the
//! similarity threshold moves to an empty cell, until everyone is satisfied.
//!
//! ```
//! use schelling_simulator::{SegregationSimulation, SimulationConfig};
//!
//! let config = SimulationConfig { width: 20, seed: Some(7), ..Default::default() };
//! let mut sim = SegregationSimulation::initialize(config).unwrap();
//! let summary = sim.advance_round();
//! assert_eq!(summary.round, 1);
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod presets;
pub mod settings;
pub mod simulation;

pub use error::{Result, SimulationError};
pub use settings::{RelocationPolicy, SimulationConfig};
pub use simulation::{CellState, Grid, Population, RoundSummary, SegregationSimulation};

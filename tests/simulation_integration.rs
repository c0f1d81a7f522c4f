//! End-to-end runs of the segregation engine

use schelling_simulator::presets::PresetManager;
use schelling_simulator::*;
use std::thread;
use std::time::{Duration, Instant};

fn seeded(width: usize, threshold: f64, seed: u64) -> SimulationConfig {
    SimulationConfig {
        width,
        similarity_threshold: threshold,
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_empty_grid_converges_in_one_round() {
    let config = SimulationConfig {
        width: 5,
        empty_fraction: 1.0,
        ..Default::default()
    };
    let mut sim = SegregationSimulation::initialize(config).unwrap();
    assert_eq!(sim.population().occupants(), 0);

    let summary = sim.advance_round();
    assert_eq!(summary.round, 1);
    assert_eq!(summary.satisfied_percentage, 100.0);
    assert!(summary.converged);
    assert_eq!(summary.moved, 0);
}

#[test]
fn test_full_grid_never_moves() {
    let config = SimulationConfig {
        width: 10,
        empty_fraction: 0.0,
        similarity_threshold: 90.0,
        seed: Some(4),
        ..Default::default()
    };
    let mut sim = SegregationSimulation::initialize(config).unwrap();
    let before = sim.current_grid().clone();

    for _ in 0..5 {
        let summary = sim.advance_round();
        assert_eq!(summary.moved, 0);
    }
    assert_eq!(sim.current_grid(), &before);
    assert_eq!(sim.current_round(), 5);
}

#[test]
fn test_two_by_two_scenario() {
    let grid = Grid::parse(&["AB", "A."]).unwrap();

    // Each A sees one A and one B, the B sees two As
    let mut strict = SegregationSimulation::from_grid(seeded(2, 50.0, 1), grid.clone()).unwrap();
    assert_eq!(strict.neighbor_similarity(0, 0), Some(50.0));
    assert_eq!(strict.neighbor_similarity(0, 1), Some(0.0));
    let summary = strict.advance_round();
    assert_eq!(summary.moved, 1);
    assert_eq!(strict.current_grid().get(1, 1), Some(CellState::OccupantB));
    assert_eq!(strict.current_grid().get(0, 1), Some(CellState::Empty));

    let mut relaxed = SegregationSimulation::from_grid(seeded(2, 0.0, 1), grid).unwrap();
    let summary = relaxed.advance_round();
    assert!(summary.converged);
    assert_eq!(summary.moved, 0);
}

#[test]
fn test_run_segregates_and_converges() {
    let mut sim = SegregationSimulation::initialize(seeded(20, 30.0, 2024)).unwrap();
    let population = sim.population();

    let summary = sim.run_until_converged(500).unwrap();
    assert!(summary.converged);
    assert_eq!(summary.satisfied_percentage, 100.0);
    assert_eq!(sim.population(), population);

    let (satisfied, total) = sim.satisfaction_counts();
    assert_eq!(satisfied, total);
}

#[test]
fn test_nearest_policy_converges() {
    let config = SimulationConfig {
        relocation_policy: RelocationPolicy::NearestSatisfying,
        ..seeded(16, 30.0, 77)
    };
    let mut sim = SegregationSimulation::initialize(config).unwrap();
    let population = sim.population();
    let summary = sim.run_until_converged(500).unwrap();
    assert!(summary.converged);
    assert_eq!(sim.population(), population);
}

#[test]
fn test_nearest_policy_large_grid_round_is_fast() {
    let config = SimulationConfig {
        width: 200,
        empty_fraction: 0.5,
        similarity_threshold: 90.0,
        relocation_policy: RelocationPolicy::NearestSatisfying,
        seed: Some(1),
        ..Default::default()
    };
    let mut sim = SegregationSimulation::initialize(config).unwrap();
    let population = sim.population();

    let start = Instant::now();
    let summary = sim.advance_round();
    let elapsed = start.elapsed();

    assert!(summary.moved > 10_000);
    assert_eq!(sim.population(), population);
    assert!(elapsed < Duration::from_secs(5), "round took {:?}", elapsed);
}

#[test]
fn test_builtin_presets_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let presets = PresetManager::with_dir(dir.path());
    for preset in presets.all_presets() {
        let config = SimulationConfig {
            width: 12,
            seed: Some(9),
            ..preset.config.clone()
        };
        let mut sim = SegregationSimulation::initialize(config).unwrap();
        let population = sim.population();
        for _ in 0..20 {
            sim.advance_round();
        }
        assert_eq!(sim.population(), population, "{}", preset.name);
    }
}

#[test]
fn test_independent_engines_on_threads() {
    let handles: Vec<_> = (0..4u64)
        .map(|seed| {
            thread::spawn(move || {
                let mut sim = SegregationSimulation::initialize(seeded(12, 50.0, seed)).unwrap();
                for _ in 0..10 {
                    sim.advance_round();
                }
                (seed, sim.current_grid().clone(), sim.current_round())
            })
        })
        .collect();

    for handle in handles {
        let (seed, grid, round) = handle.join().unwrap();
        assert!(round <= 10);

        // The same seed on this thread replays the same run
        let mut replay = SegregationSimulation::initialize(seeded(12, 50.0, seed)).unwrap();
        for _ in 0..10 {
            replay.advance_round();
        }
        assert_eq!(replay.current_grid(), &grid);
    }
}

#[test]
fn test_invalid_configs_rejected() {
    let cases = [
        SimulationConfig { width: 0, ..Default::default() },
        SimulationConfig { empty_fraction: -0.1, ..Default::default() },
        SimulationConfig { occupant_a_ratio: 1.01, ..Default::default() },
        SimulationConfig { similarity_threshold: 101.0, ..Default::default() },
        SimulationConfig { similarity_threshold: f64::NAN, ..Default::default() },
    ];
    for config in cases {
        assert!(matches!(
            SegregationSimulation::initialize(config),
            Err(SimulationError::InvalidConfig { .. })
        ));
    }
}

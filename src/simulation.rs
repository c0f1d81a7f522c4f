use crate::error::{Result, SimulationError};
use crate::settings::{RelocationPolicy, SimulationConfig, MIN_WIDTH};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Moore neighborhood: the 8 cells around a cell
static MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Contents of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Empty,
    OccupantA,
    OccupantB,
}

impl CellState {
    pub fn is_occupied(&self) -> bool {
        !matches!(self, CellState::Empty)
    }

    /// Single character used by the text rendering of a grid
    pub fn symbol(&self) -> char {
        match self {
            CellState::Empty => '.',
            CellState::OccupantA => 'A',
            CellState::OccupantB => 'B',
        }
    }

    /// Inverse of `symbol`; lowercase letters and a space are also accepted
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' | ' ' => Some(CellState::Empty),
            'A' | 'a' => Some(CellState::OccupantA),
            'B' | 'b' => Some(CellState::OccupantB),
            _ => None,
        }
    }
}

/// Cell counts of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Population {
    pub empty: usize,
    pub occupant_a: usize,
    pub occupant_b: usize,
}

impl Population {
    pub fn occupants(&self) -> usize {
        self.occupant_a + self.occupant_b
    }

    pub fn total(&self) -> usize {
        self.empty + self.occupants()
    }
}

/// Square grid of cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// All-empty grid of the given side length
    pub fn new(width: usize) -> Self {
        Self {
            width,
            cells: vec![CellState::Empty; width * width],
        }
    }

    /// Build a grid from literal rows; rows must form a square of side >= 2
    pub fn from_rows(rows: &[Vec<CellState>]) -> Result<Self> {
        let width = rows.len();
        if width < MIN_WIDTH {
            return Err(SimulationError::InvalidGrid(format!(
                "need at least {} rows, got {}",
                MIN_WIDTH, width
            )));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(SimulationError::InvalidGrid(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                width
            )));
        }
        Ok(Self {
            width,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    /// Parse a grid from text lines of `A`, `B` and `.`
    pub fn parse(lines: &[&str]) -> Result<Self> {
        let rows = lines
            .iter()
            .map(|line| {
                line.chars()
                    .map(|c| {
                        CellState::from_symbol(c).ok_or_else(|| {
                            SimulationError::InvalidGrid(format!("unknown cell symbol {:?}", c))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(&rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.width && col < self.width).then(|| row * self.width + col)
    }

    /// Cell at (row, col), or None when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    fn set(&mut self, row: usize, col: usize, state: CellState) {
        if let Some(idx) = self.index(row, col) {
            self.cells[idx] = state;
        }
    }

    /// Rows of the grid, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.width)
    }

    /// Every cell with its coordinates, in row-major order
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), CellState)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &state)| ((idx / width, idx % width), state))
    }

    pub fn population(&self) -> Population {
        let mut population = Population::default();
        for &cell in &self.cells {
            match cell {
                CellState::Empty => population.empty += 1,
                CellState::OccupantA => population.occupant_a += 1,
                CellState::OccupantB => population.occupant_b += 1,
            }
        }
        population
    }

    /// In-bounds Moore neighbors of (row, col); edges and corners have fewer than 8
    fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        MOORE_OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let nr = row as i64 + dr as i64;
            let nc = col as i64 + dc as i64;
            if nr >= 0 && nc >= 0 && (nr as usize) < self.width && (nc as usize) < self.width {
                Some((nr as usize, nc as usize))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
        }
        Ok(())
    }
}

/// Outcome of one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Round counter after this round
    pub round: u64,
    /// Satisfied occupants as a percentage, one decimal place
    pub satisfied_percentage: f64,
    /// True once every occupant is satisfied
    pub converged: bool,
    /// Occupants relocated during the round
    pub moved: usize,
}

/// Schelling segregation simulation state
pub struct SegregationSimulation {
    config: SimulationConfig,
    grid: Grid,
    round: u64,
    converged: bool,
    last_summary: Option<RoundSummary>,
    rng: ChaCha8Rng,
}

impl SegregationSimulation {
    /// Validate the config and fill a fresh random grid
    pub fn initialize(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut sim = Self {
            grid: Grid::new(config.width),
            rng: make_rng(config.seed),
            config,
            round: 0,
            converged: false,
            last_summary: None,
        };
        sim.fill_random();
        Ok(sim)
    }

    /// Start from a literal grid instead of a random fill.
    /// The config's width is taken from the grid.
    pub fn from_grid(config: SimulationConfig, grid: Grid) -> Result<Self> {
        let config = SimulationConfig {
            width: grid.width(),
            ..config
        };
        config.validate()?;
        Ok(Self {
            rng: make_rng(config.seed),
            config,
            grid,
            round: 0,
            converged: false,
            last_summary: None,
        })
    }

    /// Replace the whole state with a fresh run of `config`.
    /// On error the current run is left untouched.
    pub fn reset(&mut self, config: SimulationConfig) -> Result<()> {
        *self = Self::initialize(config)?;
        Ok(())
    }

    fn fill_random(&mut self) {
        let width = self.config.width;
        for row in 0..width {
            for col in 0..width {
                let state = if self.rng.gen::<f64>() < self.config.empty_fraction {
                    CellState::Empty
                } else if self.rng.gen::<f64>() < self.config.occupant_a_ratio {
                    CellState::OccupantA
                } else {
                    CellState::OccupantB
                };
                self.grid.set(row, col, state);
            }
        }

        let population = self.grid.population();
        tracing::info!(
            width,
            empty = population.empty,
            occupant_a = population.occupant_a,
            occupant_b = population.occupant_b,
            "Initialized segregation grid"
        );
    }

    /// Percentage of the occupied neighbors of (row, col) sharing its type.
    /// None for empty or out-of-bounds cells.
    pub fn neighbor_similarity(&self, row: usize, col: usize) -> Option<f64> {
        let state = self.grid.get(row, col)?;
        if !state.is_occupied() {
            return None;
        }
        Some(self.similarity_for(row, col, state, None))
    }

    /// Whether the occupant at (row, col) meets the similarity threshold
    pub fn is_satisfied(&self, row: usize, col: usize) -> bool {
        self.neighbor_similarity(row, col)
            .is_some_and(|similarity| similarity >= self.config.similarity_threshold)
    }

    /// Similarity an occupant of `kind` would see at (row, col), ignoring
    /// the `vacated` cell if given
    fn similarity_for(
        &self,
        row: usize,
        col: usize,
        kind: CellState,
        vacated: Option<(usize, usize)>,
    ) -> f64 {
        let mut occupied = 0usize;
        let mut similar = 0usize;

        for (nr, nc) in self.grid.neighbors(row, col) {
            if Some((nr, nc)) == vacated {
                continue;
            }
            if let Some(neighbor) = self.grid.get(nr, nc) {
                if neighbor.is_occupied() {
                    occupied += 1;
                    if neighbor == kind {
                        similar += 1;
                    }
                }
            }
        }

        // An isolated occupant counts as satisfied
        if occupied == 0 {
            100.0
        } else {
            100.0 * similar as f64 / occupied as f64
        }
    }

    /// Run one round: move every occupant that was unsatisfied at the start
    /// of the round, then re-measure satisfaction.
    ///
    /// Once converged this is a no-op returning the stored summary; the
    /// round counter does not advance.
    pub fn advance_round(&mut self) -> RoundSummary {
        if self.converged {
            if let Some(summary) = self.last_summary {
                return summary;
            }
        }

        // Snapshot: who moves is decided before anyone moves
        let mut unsatisfied = Vec::new();
        let mut pool = EmptyPool::new(self.grid.width());
        for ((row, col), state) in self.grid.iter() {
            if !state.is_occupied() {
                pool.push(row, col);
            } else if !self.is_satisfied(row, col) {
                unsatisfied.push((row, col, state));
            }
        }

        let mut moved = 0;
        if !pool.is_empty() {
            for (row, col, kind) in unsatisfied {
                let idx = self.choose_destination(row, col, kind, &pool);
                let (dest_row, dest_col) = pool.take(idx);
                self.grid.set(dest_row, dest_col, kind);
                self.grid.set(row, col, CellState::Empty);
                pool.push(row, col);
                moved += 1;
            }
        }

        let (satisfied, total) = self.satisfaction_counts();
        self.round += 1;
        self.converged = satisfied == total;

        let summary = RoundSummary {
            round: self.round,
            satisfied_percentage: satisfied_percentage(satisfied, total),
            converged: self.converged,
            moved,
        };
        self.last_summary = Some(summary);

        tracing::debug!(
            round = summary.round,
            moved,
            satisfied,
            total,
            "Round complete"
        );
        if self.converged {
            tracing::info!(round = self.round, "Simulation converged");
        }

        summary
    }

    /// Advance until converged or `max_rounds` rounds have run in this call
    pub fn run_until_converged(&mut self, max_rounds: u64) -> Option<RoundSummary> {
        let mut summary = self.last_summary;
        for _ in 0..max_rounds {
            let current = self.advance_round();
            summary = Some(current);
            if current.converged {
                break;
            }
        }
        summary
    }

    /// Index into `pool` of the cell the occupant at (row, col) moves to
    fn choose_destination(
        &mut self,
        row: usize,
        col: usize,
        kind: CellState,
        pool: &EmptyPool,
    ) -> usize {
        let nearest = match self.config.relocation_policy {
            RelocationPolicy::Random => None,
            RelocationPolicy::NearestSatisfying => self.nearest_satisfying(row, col, kind, pool),
        };
        nearest.unwrap_or_else(|| self.rng.gen_range(0..pool.len()))
    }

    /// Closest empty cell (Chebyshev distance, ties row-major) where the
    /// occupant would be satisfied after leaving (row, col).
    /// Walks square rings outward from the origin and stops at the first hit.
    fn nearest_satisfying(
        &self,
        row: usize,
        col: usize,
        kind: CellState,
        pool: &EmptyPool,
    ) -> Option<usize> {
        let width = self.grid.width();
        let max_radius = row.max(width - 1 - row).max(col).max(width - 1 - col);

        let satisfying = |r: usize, c: usize| {
            pool.position(r, c).filter(|_| {
                self.similarity_for(r, c, kind, Some((row, col))) >= self.config.similarity_threshold
            })
        };

        for radius in 1..=max_radius {
            let top = row.saturating_sub(radius);
            let bottom = (row + radius).min(width - 1);
            let left = col.saturating_sub(radius);
            let right = (col + radius).min(width - 1);

            for r in top..=bottom {
                if r.abs_diff(row) == radius {
                    // Top or bottom edge of the ring
                    if let Some(idx) = (left..=right).find_map(|c| satisfying(r, c)) {
                        return Some(idx);
                    }
                } else {
                    let sides = [col.checked_sub(radius), Some(col + radius).filter(|&c| c < width)];
                    if let Some(idx) = sides.into_iter().flatten().find_map(|c| satisfying(r, c)) {
                        return Some(idx);
                    }
                }
            }
        }
        None
    }

    /// (satisfied occupants, total occupants) on the current grid
    pub fn satisfaction_counts(&self) -> (usize, usize) {
        let mut satisfied = 0;
        let mut total = 0;
        for ((row, col), state) in self.grid.iter() {
            if state.is_occupied() {
                total += 1;
                if self.is_satisfied(row, col) {
                    satisfied += 1;
                }
            }
        }
        (satisfied, total)
    }

    /// Read-only snapshot for rendering
    pub fn current_grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current_round(&self) -> u64 {
        self.round
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn population(&self) -> Population {
        self.grid.population()
    }

    /// Summary of the most recent round, None before the first
    pub fn last_summary(&self) -> Option<RoundSummary> {
        self.last_summary
    }
}

/// Empty cells available during a round, with O(1) lookup and removal
struct EmptyPool {
    width: usize,
    cells: Vec<(usize, usize)>,
    /// Index into `cells` for every grid cell that is in the pool
    slots: Vec<Option<usize>>,
}

impl EmptyPool {
    fn new(width: usize) -> Self {
        Self {
            width,
            cells: Vec::new(),
            slots: vec![None; width * width],
        }
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn position(&self, row: usize, col: usize) -> Option<usize> {
        self.slots[row * self.width + col]
    }

    fn push(&mut self, row: usize, col: usize) {
        self.slots[row * self.width + col] = Some(self.cells.len());
        self.cells.push((row, col));
    }

    /// Remove the entry at `idx`; the last entry takes its place
    fn take(&mut self, idx: usize) -> (usize, usize) {
        let (row, col) = self.cells.swap_remove(idx);
        self.slots[row * self.width + col] = None;
        if let Some(&(moved_row, moved_col)) = self.cells.get(idx) {
            self.slots[moved_row * self.width + moved_col] = Some(idx);
        }
        (row, col)
    }
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// 100 * satisfied / total rounded half away from zero to one decimal;
/// an empty population counts as fully satisfied
fn satisfied_percentage(satisfied: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let pct = 100.0 * satisfied as f64 / total as f64;
    (pct * 10.0).round() / 10.0
}

use schelling_simulator::color::ColorScheme;
use schelling_simulator::config::{AppConfig, MAX_ROUND_DELAY_MS};
use schelling_simulator::{Result, SegregationSimulation, SimulationConfig};
use std::time::{Duration, Instant};

/// Focus state for parameter editing in the sidebar
/// Alphabetically ordered for consistent UI display
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    // Alphabetical order
    ColorScheme,
    Delay,
    Empty,
    Policy,
    Ratio,
    Similar,
    Size,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in alphabetical order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::ColorScheme,
            Focus::ColorScheme => Focus::Delay,
            Focus::Delay => Focus::Empty,
            Focus::Empty => Focus::Policy,
            Focus::Policy => Focus::Ratio,
            Focus::Ratio => Focus::Similar,
            Focus::Similar => Focus::Size,
            Focus::Size => Focus::Controls,
        }
    }

    /// Shift+Tab walks backwards
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Size,
            Focus::ColorScheme => Focus::Controls,
            Focus::Delay => Focus::ColorScheme,
            Focus::Empty => Focus::Delay,
            Focus::Policy => Focus::Empty,
            Focus::Ratio => Focus::Policy,
            Focus::Similar => Focus::Ratio,
            Focus::Size => Focus::Similar,
        }
    }

    /// Get the line index in the parameters box for this focus
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::ColorScheme => 0,
            Focus::Delay => 1,
            Focus::Empty => 2,
            Focus::Policy => 3,
            Focus::Ratio => 4,
            Focus::Similar => 5,
            Focus::Size => 6,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

/// Main application state
pub struct App {
    pub simulation: SegregationSimulation,
    pub color_scheme: ColorScheme,
    pub round_delay_ms: u64,
    /// Timer state: rounds advance on their own while true
    pub running: bool,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// Last rejected parameter change, shown in the status box
    pub last_error: Option<String>,
    last_round_at: Option<Instant>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        Ok(Self {
            simulation: SegregationSimulation::initialize(config.simulation)?,
            color_scheme: config.color_scheme,
            round_delay_ms: config.round_delay_ms,
            running: false,
            focus: Focus::Controls,
            fullscreen_mode: config.fullscreen,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            last_error: None,
            last_round_at: None,
        })
    }

    /// Current settings as a saveable config
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            simulation: self.simulation.config().clone(),
            round_delay_ms: self.round_delay_ms,
            color_scheme: self.color_scheme,
            fullscreen: self.fullscreen_mode,
            ..Default::default()
        }
    }

    /// Advance one round if the timer is running and the delay has elapsed
    pub fn tick(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        let due = match self.last_round_at {
            Some(last) => now.duration_since(last) >= Duration::from_millis(self.round_delay_ms),
            None => true,
        };
        if due {
            self.last_round_at = Some(now);
            self.advance();
        }
    }

    fn advance(&mut self) {
        let summary = self.simulation.advance_round();
        if summary.converged {
            self.running = false;
        }
    }

    /// Start or stop the round timer
    pub fn toggle_running(&mut self) {
        if self.running {
            self.stop();
        } else if !self.simulation.is_converged() {
            self.running = true;
            self.last_round_at = None;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop the timer and run exactly one round
    pub fn step(&mut self) {
        self.stop();
        self.advance();
    }

    /// New run with the current parameters; a fixed seed replays the same grid
    pub fn reset(&mut self) {
        let config = self.simulation.config().clone();
        self.apply_config(config);
    }

    /// Start a new run with `config`; an invalid config keeps the current run
    fn apply_config(&mut self, config: SimulationConfig) {
        self.stop();
        match self.simulation.reset(config) {
            Ok(()) => self.last_error = None,
            Err(err) => {
                tracing::warn!(%err, "Rejected parameter change");
                self.last_error = Some(err.to_string());
            }
        }
    }

    fn edit_config(&mut self, edit: impl FnOnce(&mut SimulationConfig)) {
        let mut config = self.simulation.config().clone();
        edit(&mut config);
        if &config != self.simulation.config() {
            self.apply_config(config);
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::ColorScheme => self.color_scheme = self.color_scheme.next(),
            Focus::Delay => self.adjust_delay(50),
            Focus::Empty => self.edit_config(|c| c.adjust_empty_fraction(0.05)),
            Focus::Policy => self.cycle_policy(),
            Focus::Ratio => self.edit_config(|c| c.adjust_occupant_a_ratio(0.05)),
            Focus::Similar => self.edit_config(|c| c.adjust_similarity_threshold(5.0)),
            Focus::Size => self.edit_config(|c| c.adjust_width(5)),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::ColorScheme => self.color_scheme = self.color_scheme.prev(),
            Focus::Delay => self.adjust_delay(-50),
            Focus::Empty => self.edit_config(|c| c.adjust_empty_fraction(-0.05)),
            Focus::Policy => self.cycle_policy(),
            Focus::Ratio => self.edit_config(|c| c.adjust_occupant_a_ratio(-0.05)),
            Focus::Similar => self.edit_config(|c| c.adjust_similarity_threshold(-5.0)),
            Focus::Size => self.edit_config(|c| c.adjust_width(-5)),
        }
    }

    /// Adjust the round delay; applies to the running timer without a reset
    pub fn adjust_delay(&mut self, delta: i64) {
        let new_val = (self.round_delay_ms as i64 + delta).clamp(0, MAX_ROUND_DELAY_MS as i64);
        self.round_delay_ms = new_val as u64;
    }

    /// Switch relocation policy (starts a new run)
    pub fn cycle_policy(&mut self) {
        self.edit_config(|c| c.relocation_policy = c.relocation_policy.next());
    }

    /// Cycle color scheme
    pub fn cycle_color_scheme(&mut self) {
        self.color_scheme = self.color_scheme.next();
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    pub fn status_text(&self) -> &'static str {
        if self.simulation.is_converged() {
            "CONVERGED"
        } else if self.running {
            "RUNNING"
        } else {
            "STOPPED"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(config: SimulationConfig) -> App {
        App::new(AppConfig {
            simulation: config,
            ..Default::default()
        })
        .unwrap()
    }

    fn seeded_app() -> App {
        app_with(SimulationConfig {
            width: 12,
            similarity_threshold: 60.0,
            seed: Some(21),
            ..Default::default()
        })
    }

    #[test]
    fn test_tick_waits_for_delay() {
        let mut app = seeded_app();
        app.round_delay_ms = 100;
        let start = Instant::now();

        app.tick(start);
        assert_eq!(app.simulation.current_round(), 0, "timer not started");

        app.toggle_running();
        app.tick(start);
        assert_eq!(app.simulation.current_round(), 1);
        app.tick(start + Duration::from_millis(50));
        assert_eq!(app.simulation.current_round(), 1);
        app.tick(start + Duration::from_millis(100));
        assert_eq!(app.simulation.current_round(), 2);
    }

    #[test]
    fn test_step_stops_timer() {
        let mut app = seeded_app();
        app.toggle_running();
        assert!(app.running);
        app.step();
        assert!(!app.running);
        assert_eq!(app.simulation.current_round(), 1);
    }

    #[test]
    fn test_convergence_stops_timer() {
        let mut app = app_with(SimulationConfig {
            width: 4,
            empty_fraction: 1.0,
            ..Default::default()
        });
        app.toggle_running();
        app.tick(Instant::now());
        assert!(app.simulation.is_converged());
        assert!(!app.running);
        assert_eq!(app.status_text(), "CONVERGED");

        // A converged run cannot be restarted without a reset
        app.toggle_running();
        assert!(!app.running);
    }

    #[test]
    fn test_parameter_change_starts_new_run() {
        let mut app = seeded_app();
        app.step();
        app.step();
        app.focus = Focus::Size;
        app.adjust_focused_up();
        assert_eq!(app.simulation.config().width, 17);
        assert_eq!(app.simulation.current_round(), 0);
    }

    #[test]
    fn test_delay_change_keeps_run() {
        let mut app = seeded_app();
        app.step();
        app.focus = Focus::Delay;
        let before = app.round_delay_ms;
        app.adjust_focused_up();
        assert_eq!(app.round_delay_ms, before + 50);
        assert_eq!(app.simulation.current_round(), 1);
    }

    #[test]
    fn test_change_at_bound_is_noop() {
        let mut app = app_with(SimulationConfig {
            similarity_threshold: 100.0,
            seed: Some(1),
            ..Default::default()
        });
        app.step();
        app.focus = Focus::Similar;
        app.adjust_focused_up();
        assert_eq!(app.simulation.current_round(), 1);
    }

    #[test]
    fn test_delay_clamped_to_bounds() {
        let mut app = seeded_app();
        app.adjust_delay(-1000);
        assert_eq!(app.round_delay_ms, 0);
        app.adjust_delay(10_000);
        assert_eq!(app.round_delay_ms, MAX_ROUND_DELAY_MS);
    }

    #[test]
    fn test_reset_with_seed_replays_grid() {
        let mut app = seeded_app();
        let initial = app.simulation.current_grid().clone();
        app.step();
        app.step();
        app.reset();
        assert_eq!(app.simulation.current_round(), 0);
        assert_eq!(app.simulation.current_grid(), &initial);
    }

    #[test]
    fn test_focus_cycle_round_trip() {
        let mut focus = Focus::Controls;
        for _ in 0..8 {
            assert_eq!(focus.next().prev(), focus);
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Controls);
    }

    #[test]
    fn test_app_config_reflects_state() {
        let mut app = seeded_app();
        app.cycle_color_scheme();
        app.adjust_delay(-50);
        let saved = app.app_config();
        assert_eq!(saved.color_scheme, ColorScheme::Night);
        assert_eq!(saved.round_delay_ms, 50);
        assert_eq!(saved.simulation.width, 12);
    }
}

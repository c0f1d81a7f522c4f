mod app;
mod canvas;
mod ui;

use app::{App, Focus};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use schelling_simulator::color::ColorScheme;
use schelling_simulator::config::{AppConfig, MAX_ROUND_DELAY_MS};
use schelling_simulator::presets::PresetManager;
use schelling_simulator::{
    RelocationPolicy, SegregationSimulation, SimulationConfig, SimulationError,
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "schelling-simulator")]
#[command(about = "Schelling segregation model simulation in the terminal")]
struct Args {
    // === Simulation Parameters ===
    /// Grid side length (2-200) [default: 30]
    #[arg(long)]
    size: Option<usize>,

    /// Percentage of empty cells (0-100) [default: 10]
    #[arg(long)]
    empty: Option<f64>,

    /// Percentage of occupants in group A (0-100) [default: 50]
    #[arg(long = "red-blue")]
    red_blue: Option<f64>,

    /// Percentage of like neighbors an occupant wants (0-100) [default: 30]
    #[arg(long)]
    similar: Option<f64>,

    /// Relocation policy (random, nearest) [default: random]
    #[arg(long)]
    policy: Option<String>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    // === Front End ===
    /// Delay between rounds in milliseconds (0-2000) [default: 100]
    #[arg(long)]
    delay: Option<u64>,

    /// Color scheme (classic, night, ocean, contrast, mono) [default: classic]
    #[arg(long)]
    colors: Option<String>,

    // === Config Files ===
    /// Start from a named preset (see --list-presets)
    #[arg(long)]
    preset: Option<String>,

    /// Load settings from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the resulting settings to a JSON config file (again on exit from the UI)
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// List available presets and exit
    #[arg(long = "list-presets", default_value = "false")]
    list_presets: bool,

    // === Headless Mode ===
    /// Run without the terminal UI and print the outcome
    #[arg(long, default_value = "false")]
    headless: bool,

    /// Maximum rounds in headless mode
    #[arg(long, default_value = "1000")]
    rounds: u64,

    /// Print the final grid in headless mode
    #[arg(long = "print-grid", default_value = "false")]
    print_grid: bool,
}

/// Layer settings: config file, then preset, then individual flags
fn build_config(args: &Args, presets: &PresetManager) -> schelling_simulator::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };

    if let Some(name) = &args.preset {
        let preset = presets.get(name)?;
        config.simulation = preset.config.clone();
    }

    let sim = &mut config.simulation;
    if let Some(size) = args.size {
        sim.width = size;
    }
    if let Some(empty) = args.empty {
        sim.empty_fraction = empty / 100.0;
    }
    if let Some(red) = args.red_blue {
        sim.occupant_a_ratio = red / 100.0;
    }
    if let Some(similar) = args.similar {
        sim.similarity_threshold = similar;
    }
    if let Some(policy) = &args.policy {
        sim.relocation_policy =
            RelocationPolicy::parse(policy).ok_or_else(|| SimulationError::InvalidConfig {
                field: "policy",
                reason: format!("unknown policy {:?}", policy),
            })?;
    }
    if args.seed.is_some() {
        sim.seed = args.seed;
    }
    sim.validate()?;

    if let Some(delay) = args.delay {
        config.round_delay_ms = delay.min(MAX_ROUND_DELAY_MS);
    }
    if let Some(colors) = &args.colors {
        config.color_scheme =
            ColorScheme::parse(colors).ok_or_else(|| SimulationError::InvalidConfig {
                field: "colors",
                reason: format!("unknown color scheme {:?}", colors),
            })?;
    }

    Ok(config)
}

/// Logs go to stderr. The TUI owns the terminal, so it only logs when
/// RUST_LOG asks for it.
fn init_tracing(headless: bool) {
    let from_env = EnvFilter::try_from_default_env();
    if from_env.is_err() && !headless {
        return;
    }
    let filter = from_env.unwrap_or_else(|_| EnvFilter::new("schelling_simulator=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.headless);

    let presets = PresetManager::new();
    if args.list_presets {
        for preset in presets.all_presets() {
            println!("{:<14} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    let config = build_config(&args, &presets)?;
    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        tracing::info!(path = %path.display(), "Saved config");
    }

    if args.headless {
        run_headless(config.simulation, args.rounds, args.print_grid)?;
        return Ok(());
    }

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    // Keep whatever was adjusted in the UI
    if let Some(path) = &args.save_config {
        app.app_config().save_to_file(path)?;
    }

    Ok(())
}

fn run_headless(
    config: SimulationConfig,
    max_rounds: u64,
    print_grid: bool,
) -> schelling_simulator::Result<()> {
    let mut sim = SegregationSimulation::initialize(config)?;

    for _ in 0..max_rounds {
        let summary = sim.advance_round();
        tracing::info!(
            round = summary.round,
            satisfied = summary.satisfied_percentage,
            moved = summary.moved,
            "Round"
        );
        if summary.converged {
            break;
        }
    }

    let population = sim.population();
    let satisfied = sim
        .last_summary()
        .map_or(0.0, |summary| summary.satisfied_percentage);
    println!(
        "round={} satisfied={:.1}% converged={} empty={} a={} b={}",
        sim.current_round(),
        satisfied,
        sim.is_converged(),
        population.empty,
        population.occupant_a,
        population.occupant_b,
    );
    if print_grid {
        println!("{}", sim.current_grid());
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps; round pacing is handled by App::tick
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only process Press events
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Handle Ctrl+C
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match key.code {
                    // System controls
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char(' ') => app.toggle_running(),
                    KeyCode::Char('.') | KeyCode::Char('n') | KeyCode::Char('N') => app.step(),
                    KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                    KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
                    KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        app.cycle_color_scheme();
                        app.focus = Focus::ColorScheme;
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        app.cycle_policy();
                        app.focus = Focus::Policy;
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        app.adjust_delay(-50);
                        app.focus = Focus::Delay;
                    }
                    KeyCode::Char('-') | KeyCode::Char('_') => {
                        app.adjust_delay(50);
                        app.focus = Focus::Delay;
                    }

                    // Navigation
                    KeyCode::Tab => app.next_focus(),
                    KeyCode::BackTab => app.prev_focus(),
                    KeyCode::Up => {
                        if !app.show_help {
                            if app.focus.is_param() {
                                app.adjust_focused_up();
                            } else {
                                app.scroll_controls_up();
                            }
                        }
                    }
                    KeyCode::Down => {
                        if !app.show_help {
                            if app.focus.is_param() {
                                app.adjust_focused_down();
                            } else {
                                let term_size = terminal.size().unwrap_or_default();
                                let visible = ui::get_controls_visible_lines(term_size.height);
                                app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                            }
                        }
                    }
                    KeyCode::Esc => {
                        if app.show_help {
                            app.toggle_help();
                        } else if app.focus.is_param() {
                            app.focus = Focus::Controls;
                        }
                    }
                    KeyCode::Char('j') | KeyCode::Char('J') => {
                        if app.show_help {
                            app.scroll_help_down(ui::HELP_CONTENT_LINES);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Char('K') => {
                        if app.show_help {
                            app.scroll_help_up();
                        }
                    }
                    _ => {}
                }
            }
        }

        // Advance the round timer
        app.tick(Instant::now());
    }
}

use crate::app::{App, Focus};
use crate::canvas;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use schelling_simulator::CellState;

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 10;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Visible lines in the controls box for a given terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    // Status (7) + Parameters (9) + controls borders (2)
    terminal_height.saturating_sub(7 + 9 + 2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Status
            Constraint::Length(9), // Parameters
            Constraint::Min(5),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Schelling ");
    let sim = &app.simulation;

    let satisfied = match sim.last_summary() {
        Some(summary) => summary.satisfied_percentage,
        None => 0.0,
    };
    let bar_width = (area.width.saturating_sub(4)) as usize;
    let filled = ((satisfied / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let status_color = if sim.is_converged() {
        Color::Green
    } else if app.running {
        BORDER_COLOR
    } else {
        HIGHLIGHT_COLOR
    };

    let population = sim.population();
    let scheme = app.color_scheme;

    let mut content = vec![
        Line::from(Span::styled(
            format!("Round {}  {:.1}%", sim.current_round(), satisfied),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(vec![
            Span::styled("█".repeat(filled), Style::default().fg(Color::Green)),
            Span::styled("░".repeat(empty), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(scheme.color_for(CellState::OccupantA))),
            Span::styled(format!("{} ", population.occupant_a), Style::default().fg(TEXT_COLOR)),
            Span::styled("■ ", Style::default().fg(scheme.color_for(CellState::OccupantB))),
            Span::styled(format!("{}", population.occupant_b), Style::default().fg(TEXT_COLOR)),
        ]),
        Line::from(Span::styled(app.status_text(), Style::default().fg(status_color))),
    ];
    if let Some(err) = &app.last_error {
        content.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    }

    let paragraph = Paragraph::new(content).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let config = app.simulation.config();
    let red = (config.occupant_a_ratio * 100.0).round() as u32;

    let content = vec![
        make_line(
            "Colors",
            app.color_scheme.name().to_string(),
            app.focus == Focus::ColorScheme,
        ),
        make_line(
            "Delay",
            format!("{} ms", app.round_delay_ms),
            app.focus == Focus::Delay,
        ),
        make_line(
            "Empty",
            format!("{:.0}%", config.empty_fraction * 100.0),
            app.focus == Focus::Empty,
        ),
        make_line(
            "Move",
            config.relocation_policy.name().to_string(),
            app.focus == Focus::Policy,
        ),
        make_line(
            "A/B",
            format!("{}/{}", red, 100 - red.min(100)),
            app.focus == Focus::Ratio,
        ),
        make_line(
            "Similar",
            format!("{:.0}%", config.similarity_threshold),
            app.focus == Focus::Similar,
        ),
        make_line(
            "Size",
            format!("{}x{}", config.width, config.width),
            app.focus == Focus::Size,
        ),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0 // No scrolling needed
    } else if focus_line >= visible_height {
        // Scroll to show focused line at bottom of visible area
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0 // Focus is within first visible lines
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let start_stop = if app.running { "stop" } else { "start" };

    let content = vec![
        make_control("Space", start_stop),
        make_control(".", "single round"),
        make_control("R", "reset"),
        make_control("Tab", "select param"),
        make_control("↑/↓", "adjust param"),
        make_control("P", "move policy"),
        make_control("C", "color scheme"),
        make_control("V", "fullscreen"),
        make_control("H", "help"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = canvas::render_grid(
        app.simulation.current_grid(),
        inner.width,
        inner.height,
        app.color_scheme,
    );

    let buf = frame.buffer_mut();
    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            if let Some(target) = buf.cell_mut((x, y)) {
                target
                    .set_char(canvas::HALF_BLOCK)
                    .set_fg(cell.top)
                    .set_bg(cell.bottom);
            }
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("SCHELLING SEGREGATION MODEL", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Two groups share a grid. An occupant is satisfied when at least the Similar percentage of its occupied neighbors belong to its own group. Each round every unsatisfied occupant moves to an empty cell; the run ends when everyone is satisfied."),
        Line::from(""),
        Line::from(Span::styled("PARAMETERS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from(""),
        Line::from(Span::styled("Similar", Style::default().fg(TEXT_COLOR))),
        Line::from("Share of like neighbors an occupant wants"),
        Line::from(Span::styled("Empty / A/B / Size", Style::default().fg(TEXT_COLOR))),
        Line::from("Vacancy rate, group split and grid side. Changing them starts a new run."),
        Line::from(Span::styled("Move (P)", Style::default().fg(TEXT_COLOR))),
        Line::from("Random: any empty cell. Nearest: closest empty cell that would satisfy, else random."),
        Line::from(Span::styled("Delay", Style::default().fg(TEXT_COLOR))),
        Line::from("Pause between rounds while running"),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Space=Start/Stop, .=Step, R=Reset, C=Colors, V=Fullscreen, Tab/Arrows=Adjust, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

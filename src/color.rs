use crate::simulation::CellState;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Palette used to draw the two occupant types and empty cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorScheme {
    /// Red and blue on white, like the classroom demo
    #[default]
    Classic,
    /// Red and blue on a dark background
    Night,
    /// Orange and teal
    Ocean,
    /// Yellow and purple, readable for red-green color blindness
    Contrast,
    /// Light and dark gray
    Mono,
}

impl ColorScheme {
    pub fn name(&self) -> &str {
        match self {
            ColorScheme::Classic => "Classic",
            ColorScheme::Night => "Night",
            ColorScheme::Ocean => "Ocean",
            ColorScheme::Contrast => "Contrast",
            ColorScheme::Mono => "Mono",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ColorScheme::Classic => ColorScheme::Night,
            ColorScheme::Night => ColorScheme::Ocean,
            ColorScheme::Ocean => ColorScheme::Contrast,
            ColorScheme::Contrast => ColorScheme::Mono,
            ColorScheme::Mono => ColorScheme::Classic,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ColorScheme::Classic => ColorScheme::Mono,
            ColorScheme::Night => ColorScheme::Classic,
            ColorScheme::Ocean => ColorScheme::Night,
            ColorScheme::Contrast => ColorScheme::Ocean,
            ColorScheme::Mono => ColorScheme::Contrast,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(ColorScheme::Classic),
            "night" | "dark" => Some(ColorScheme::Night),
            "ocean" => Some(ColorScheme::Ocean),
            "contrast" => Some(ColorScheme::Contrast),
            "mono" | "gray" | "grey" => Some(ColorScheme::Mono),
            _ => None,
        }
    }

    /// Color for a cell state under this scheme
    pub fn color_for(&self, state: CellState) -> Color {
        match (self, state) {
            (ColorScheme::Classic, CellState::OccupantA) => Color::Rgb(255, 85, 85),
            (ColorScheme::Classic, CellState::OccupantB) => Color::Rgb(85, 85, 255),
            (ColorScheme::Classic, CellState::Empty) => Color::Rgb(255, 255, 255),
            (ColorScheme::Night, CellState::OccupantA) => Color::Rgb(230, 70, 70),
            (ColorScheme::Night, CellState::OccupantB) => Color::Rgb(70, 110, 240),
            (ColorScheme::Night, CellState::Empty) => Color::Rgb(20, 20, 28),
            (ColorScheme::Ocean, CellState::OccupantA) => Color::Rgb(255, 140, 50),
            (ColorScheme::Ocean, CellState::OccupantB) => Color::Rgb(0, 150, 160),
            (ColorScheme::Ocean, CellState::Empty) => Color::Rgb(10, 30, 50),
            (ColorScheme::Contrast, CellState::OccupantA) => Color::Rgb(255, 210, 0),
            (ColorScheme::Contrast, CellState::OccupantB) => Color::Rgb(110, 40, 170),
            (ColorScheme::Contrast, CellState::Empty) => Color::Rgb(0, 0, 0),
            (ColorScheme::Mono, CellState::OccupantA) => Color::Rgb(220, 220, 220),
            (ColorScheme::Mono, CellState::OccupantB) => Color::Rgb(90, 90, 90),
            (ColorScheme::Mono, CellState::Empty) => Color::Rgb(0, 0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_visits_every_scheme() {
        let mut scheme = ColorScheme::default();
        let mut seen = vec![scheme];
        for _ in 0..4 {
            scheme = scheme.next();
            seen.push(scheme);
        }
        assert_eq!(scheme.next(), ColorScheme::Classic);
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_prev_undoes_next() {
        let mut scheme = ColorScheme::Classic;
        for _ in 0..5 {
            assert_eq!(scheme.next().prev(), scheme);
            scheme = scheme.next();
        }
    }

    #[test]
    fn test_occupant_colors_differ() {
        for scheme in [
            ColorScheme::Classic,
            ColorScheme::Night,
            ColorScheme::Ocean,
            ColorScheme::Contrast,
            ColorScheme::Mono,
        ] {
            let a = scheme.color_for(CellState::OccupantA);
            let b = scheme.color_for(CellState::OccupantB);
            let empty = scheme.color_for(CellState::Empty);
            assert_ne!(a, b, "{}", scheme.name());
            assert_ne!(a, empty);
            assert_ne!(b, empty);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(ColorScheme::parse("Ocean"), Some(ColorScheme::Ocean));
        assert_eq!(ColorScheme::parse("grey"), Some(ColorScheme::Mono));
        assert_eq!(ColorScheme::parse("plaid"), None);
    }
}

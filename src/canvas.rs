use ratatui::style::Color;
use schelling_simulator::color::ColorScheme;
use schelling_simulator::Grid;

/// Half-block rendering of the simulation grid.
///
/// Each terminal character shows two vertically stacked "pixels": the upper
/// half is drawn with the foreground color of `▀` and the lower half with
/// the background color. A terminal character is about twice as tall as it
/// is wide, so each pixel comes out roughly square.
pub const HALF_BLOCK: char = '▀';

/// A single rendered terminal cell with position and its two pixel colors
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasCell {
    pub x: u16,
    pub y: u16,
    pub top: Color,
    pub bottom: Color,
}

/// Placement of the grid inside the canvas, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    /// Side length of the drawn square
    pub side: usize,
    pub offset_x: usize,
    pub offset_y: usize,
}

/// Fit a `grid_width` square grid into the canvas.
/// Grids smaller than the canvas are scaled up by a whole factor; larger
/// ones are sampled down.
pub fn layout(grid_width: usize, canvas_width: u16, canvas_height: u16) -> GridLayout {
    let px_width = canvas_width as usize;
    let px_height = canvas_height as usize * 2;
    let available = px_width.min(px_height);

    let side = if grid_width == 0 || available < grid_width {
        available
    } else {
        grid_width * (available / grid_width)
    };

    GridLayout {
        side,
        offset_x: (px_width - side) / 2,
        // Keep the top edge on a character boundary
        offset_y: ((px_height - side) / 2) & !1,
    }
}

/// Render the grid to half-block cells using the scheme's colors
pub fn render_grid(
    grid: &Grid,
    canvas_width: u16,
    canvas_height: u16,
    scheme: ColorScheme,
) -> Vec<CanvasCell> {
    let width = grid.width();
    let placement = layout(width, canvas_width, canvas_height);
    if placement.side == 0 {
        return Vec::new();
    }

    let pixel = |px: usize, py: usize| -> Option<Color> {
        let gx = px.checked_sub(placement.offset_x)?;
        let gy = py.checked_sub(placement.offset_y)?;
        if gx >= placement.side || gy >= placement.side {
            return None;
        }
        let col = gx * width / placement.side;
        let row = gy * width / placement.side;
        grid.get(row, col).map(|state| scheme.color_for(state))
    };

    let mut cells = Vec::with_capacity(canvas_width as usize * canvas_height as usize);
    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let px = cx as usize;
            let py = cy as usize * 2;
            let top = pixel(px, py);
            let bottom = pixel(px, py + 1);
            if top.is_none() && bottom.is_none() {
                continue;
            }
            cells.push(CanvasCell {
                x: cx,
                y: cy,
                top: top.unwrap_or(Color::Reset),
                bottom: bottom.unwrap_or(Color::Reset),
            });
        }
    }

    cells
}

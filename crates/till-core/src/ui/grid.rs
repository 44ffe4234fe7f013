//! The shared cell-grid widget.
//!
//! All three keypads (text keyboard, numeric trackpad, PIN pad) are a
//! rows x columns arrangement of selectable cells navigated by directional
//! edges with wrap-around. Each keypad implements [`GridSpec`] to supply its
//! dimensions, pixel metrics, per-cell labels, and per-cell visual class;
//! the draw routines here render any of them.
//!
//! Cursor movement repaints exactly two cells (the previous and the new
//! selection); anything that changes other cells' appearance is a full grid
//! repaint.

use embedded_graphics::{
    Drawable as _,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Alignment, Text},
};

use super::{colors, small_text};

/// A grid cursor with the shadow position used for two-cell repaints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    pub x: usize,
    pub y: usize,
    pub last_x: usize,
    pub last_y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl GridCursor {
    pub const fn at(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            last_x: x,
            last_y: y,
        }
    }

    /// Move one cell, wrapping modulo the grid dimensions. The previous
    /// position is kept so the caller can repaint both cells.
    pub fn step(&mut self, dir: Direction, rows: usize, cols: usize) {
        self.last_x = self.x;
        self.last_y = self.y;
        match dir {
            Direction::Up => self.y = (self.y + rows - 1) % rows,
            Direction::Down => self.y = (self.y + 1) % rows,
            Direction::Left => self.x = (self.x + cols - 1) % cols,
            Direction::Right => self.x = (self.x + 1) % cols,
        }
    }
}

/// Pixel placement of a grid on screen.
#[derive(Debug, Clone, Copy)]
pub struct GridMetrics {
    pub origin: Point,
    pub cell_w: u32,
    pub cell_h: u32,
    pub radius: u32,
    pub gap: u32,
}

impl GridMetrics {
    /// Horizontally centered placement for `cols` cells at `top`.
    pub const fn centered(cols: usize, cell_w: u32, gap: u32, top: i32) -> Self {
        let total_w = cols as u32 * cell_w + (cols as u32 - 1) * gap;
        let left = (super::DISPLAY_WIDTH_PX as i32 - total_w as i32) / 2;
        Self {
            origin: Point::new(left, top),
            cell_w,
            cell_h: 0,
            radius: 0,
            gap,
        }
    }

    pub const fn with_cell_h(mut self, cell_h: u32) -> Self {
        self.cell_h = cell_h;
        self
    }

    pub const fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    pub fn cell_top_left(&self, x: usize, y: usize) -> Point {
        Point::new(
            self.origin.x + x as i32 * (self.cell_w + self.gap) as i32,
            self.origin.y + y as i32 * (self.cell_h + self.gap) as i32,
        )
    }

    pub fn cell_rect(&self, x: usize, y: usize) -> Rectangle {
        Rectangle::new(self.cell_top_left(x, y), Size::new(self.cell_w, self.cell_h))
    }
}

/// What a cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLabel {
    Char(char),
    Text(&'static str),
}

/// Visual class of a cell, selecting face and border colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyVisual {
    /// Plain character cell.
    Normal,
    /// Command cell (shift, backspace, clear, ...).
    Special,
    /// Plain cell in the symbols layout.
    Symbols,
    /// Command cell with its own face/border colors (withdraw, deposit).
    Accent(Rgb565, Rgb565),
    /// Inert placeholder; drawn dimmed, selecting it does nothing.
    Disabled,
}

/// One keypad variant: dimensions, placement, and per-cell appearance.
pub trait GridSpec {
    const ROWS: usize;
    const COLS: usize;

    fn metrics(&self) -> GridMetrics;

    fn label(&self, x: usize, y: usize) -> KeyLabel;

    fn visual(&self, x: usize, y: usize) -> KeyVisual;

    /// Label color override for modifier cells that light up while active.
    fn label_color(&self, _x: usize, _y: usize) -> Option<Rgb565> {
        None
    }

    /// Whether unselected cells get a drop shadow. Dense grids with tiny
    /// cells skip it.
    fn shadow(&self) -> bool {
        true
    }

    /// Background the cell area is cleared to before the face is drawn.
    fn clear_color(&self) -> Rgb565;
}

/// Draw one cell of `spec`, selected or not.
pub fn draw_key<S, D>(
    spec: &S,
    display: &mut D,
    x: usize,
    y: usize,
    selected: bool,
) -> Result<(), D::Error>
where
    S: GridSpec,
    D: DrawTarget<Color = Rgb565>,
{
    let m = spec.metrics();
    let rect = m.cell_rect(x, y);
    let visual = spec.visual(x, y);

    let (face, border) = match (selected, visual) {
        (true, _) => (colors::KEY_PRESSED, colors::KEY_BORDER_SELECTED),
        (false, KeyVisual::Normal) => (colors::KEY_NORMAL, colors::KEY_BORDER),
        (false, KeyVisual::Special) => (colors::KEY_SPECIAL, colors::KEY_BORDER_SPECIAL),
        (false, KeyVisual::Symbols) => (colors::KEY_SYMBOLS, colors::KEY_BORDER),
        (false, KeyVisual::Accent(face, border)) => (face, border),
        (false, KeyVisual::Disabled) => (colors::KEY_SHADOW, colors::KEY_SHADOW),
    };

    // Clear the cell area (including the shadow offset) to kill artifacts
    // from the previous selection state.
    Rectangle::new(
        rect.top_left - Point::new(1, 1),
        Size::new(m.cell_w + 3, m.cell_h + 4),
    )
    .into_styled(PrimitiveStyle::with_fill(spec.clear_color()))
    .draw(display)?;

    if spec.shadow() && !selected {
        RoundedRectangle::with_equal_corners(
            Rectangle::new(rect.top_left + Point::new(1, 2), rect.size),
            Size::new(m.radius, m.radius),
        )
        .into_styled(PrimitiveStyle::with_fill(colors::KEY_SHADOW))
        .draw(display)?;
    }

    RoundedRectangle::with_equal_corners(rect, Size::new(m.radius, m.radius))
        .into_styled(PrimitiveStyle::with_fill(face))
        .draw(display)?;
    RoundedRectangle::with_equal_corners(rect, Size::new(m.radius, m.radius))
        .into_styled(PrimitiveStyle::with_stroke(border, 1))
        .draw(display)?;

    if selected {
        let inner = Rectangle::new(
            rect.top_left + Point::new(1, 1),
            Size::new(m.cell_w.saturating_sub(2), m.cell_h.saturating_sub(2)),
        );
        RoundedRectangle::with_equal_corners(inner, Size::new(m.radius.saturating_sub(1), m.radius.saturating_sub(1)))
            .into_styled(PrimitiveStyle::with_stroke(colors::KEY_HIGHLIGHT, 1))
            .draw(display)?;
    }

    let label_color = if matches!(visual, KeyVisual::Disabled) {
        colors::TEXT_DISABLED
    } else if selected {
        colors::TEXT_PRIMARY
    } else {
        spec.label_color(x, y).unwrap_or(colors::TEXT_PRIMARY)
    };

    let center = rect.center();
    let style = small_text(label_color);
    match spec.label(x, y) {
        KeyLabel::Char(ch) => {
            let mut buf = [0u8; 4];
            let s: &str = ch.encode_utf8(&mut buf);
            Text::with_alignment(s, Point::new(center.x, center.y + 3), style, Alignment::Center)
                .draw(display)?;
        }
        KeyLabel::Text(s) => {
            Text::with_alignment(s, Point::new(center.x, center.y + 3), style, Alignment::Center)
                .draw(display)?;
        }
    }
    Ok(())
}

/// Repaint every cell.
pub fn draw_all<S, D>(spec: &S, display: &mut D, cursor: &GridCursor) -> Result<(), D::Error>
where
    S: GridSpec,
    D: DrawTarget<Color = Rgb565>,
{
    for y in 0..S::ROWS {
        for x in 0..S::COLS {
            draw_key(spec, display, x, y, x == cursor.x && y == cursor.y)?;
        }
    }
    Ok(())
}

/// Repaint only the previous and current cell after a cursor step, then
/// collapse the shadow position onto the current one.
pub fn redraw_cursor_cells<S, D>(
    spec: &S,
    display: &mut D,
    cursor: &mut GridCursor,
) -> Result<(), D::Error>
where
    S: GridSpec,
    D: DrawTarget<Color = Rgb565>,
{
    draw_key(spec, display, cursor.last_x, cursor.last_y, false)?;
    draw_key(spec, display, cursor.x, cursor.y, true)?;
    cursor.last_x = cursor.x;
    cursor.last_y = cursor.y;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_on_all_edges() {
        let mut c = GridCursor::at(0, 0);
        c.step(Direction::Up, 4, 10);
        assert_eq!((c.x, c.y), (0, 3));
        assert_eq!((c.last_x, c.last_y), (0, 0));

        c.step(Direction::Down, 4, 10);
        assert_eq!((c.x, c.y), (0, 0));

        c.step(Direction::Left, 4, 10);
        assert_eq!((c.x, c.y), (9, 0));

        c.step(Direction::Right, 4, 10);
        assert_eq!((c.x, c.y), (0, 0));
    }

    #[test]
    fn cursor_stays_in_bounds_under_any_walk() {
        let mut c = GridCursor::at(1, 0);
        let dirs = [
            Direction::Up,
            Direction::Left,
            Direction::Left,
            Direction::Down,
            Direction::Down,
            Direction::Right,
            Direction::Up,
            Direction::Left,
        ];
        for (i, dir) in dirs.iter().cycle().take(100).enumerate() {
            c.step(*dir, 5, 3);
            assert!(c.x < 3 && c.y < 5, "step {i} escaped the grid");
        }
    }

    #[test]
    fn centered_metrics() {
        // 10 cells of 29 px with 2 px gaps: 308 px total, 6 px left margin.
        let m = GridMetrics::centered(10, 29, 2, 85).with_cell_h(24).with_radius(3);
        assert_eq!(m.origin, Point::new(6, 85));
        assert_eq!(m.cell_top_left(1, 1), Point::new(6 + 31, 85 + 26));
    }
}

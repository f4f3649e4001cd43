//! Character-cell rendering: a double-buffered canvas, panel coordinate
//! mapping, and the drawing primitives for arrows, circles, dots, and bars.

use crate::math::Vec2;
use crossterm::cursor;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::QueueableCommand;
use std::io::Write;

/// Coordinate limits for the x-y panels (plots span -2..2 in both axes)
pub const AXIS_LIMIT: f64 = 2.0;

pub const INPUT_VECTOR_COLOR: Color = Color::Red;
pub const OUTPUT_VECTOR_COLOR: Color = Color::Magenta;
pub const MATRIX_ROW0_COLOR: Color = Color::Blue;
pub const MATRIX_ROW1_COLOR: Color = Color::Green;
pub const SHADOW0_COLOR: Color = Color::DarkBlue;
pub const SHADOW1_COLOR: Color = Color::DarkGreen;
pub const CIRCLE_COLOR: Color = Color::DarkGrey;
pub const CIRCUM_INPUT_COLOR: Color = Color::DarkRed;
pub const CIRCUM_OUTPUT_COLOR: Color = Color::DarkMagenta;
pub const TEXT_COLOR: Color = Color::White;

/// Formats one number with 3 decimals and an explicit sign: `+1.000`.
pub fn fmt(n: f64) -> String {
    format!("{:+.3}", n)
}

/// Formats a 2-vector as bracketed text: `[+1.000, +0.000]`.
pub fn fmt_row(r: &Vec2) -> String {
    format!("[{}, {}]", fmt(r[0]), fmt(r[1]))
}

/// Formats a single component in brackets: `[+1.000]`.
pub fn fmt_bracket(n: f64) -> String {
    format!("[{}]", fmt(n))
}

/// A rectangular region of the terminal mapping logical coordinates in
/// [-AXIS_LIMIT, AXIS_LIMIT] to character cells. Cells are roughly twice as
/// tall as wide, so panels are laid out 2:1 to keep circles round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

impl Panel {
    /// Logical point to absolute cell. May land outside the panel; the
    /// canvas clips when plotting.
    pub fn to_cell(&self, p: &Vec2) -> (i32, i32) {
        let span = 2.0 * AXIS_LIMIT;
        let col = (p[0] + AXIS_LIMIT) / span * (self.width.saturating_sub(1)) as f64;
        let row = (AXIS_LIMIT - p[1]) / span * (self.height.saturating_sub(1)) as f64;
        (
            self.left as i32 + col.round() as i32,
            self.top as i32 + row.round() as i32,
        )
    }

    /// Absolute cell back to a logical point, or None when the cell lies
    /// outside this panel. Used to translate mouse events.
    pub fn from_cell(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        if column < self.left
            || row < self.top
            || column >= self.left + self.width
            || row >= self.top + self.height
        {
            return None;
        }
        let span = 2.0 * AXIS_LIMIT;
        let x = (column - self.left) as f64 / (self.width.saturating_sub(1)) as f64 * span
            - AXIS_LIMIT;
        let y = AXIS_LIMIT
            - (row - self.top) as f64 / (self.height.saturating_sub(1)) as f64 * span;
        Some((x, y))
    }
}

/// Where each panel sits on screen: text top-left, input plot top-right,
/// bars bottom-left, output plot bottom-right.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub text_origin: (u16, u16),
    pub input: Panel,
    pub bars: Panel,
    pub output: Panel,
    pub status_row: u16,
}

impl Layout {
    pub fn new(term_width: u16, term_height: u16) -> Self {
        let half_w = term_width / 2;
        // Bottom row is reserved for the status line.
        let half_h = (term_height.saturating_sub(1)) / 2;

        // Square-ish plot area: cells are about 2:1, so width = 2 * height.
        let plot_h = half_h.saturating_sub(2).max(5);
        let plot_w = (plot_h * 2).min(half_w.saturating_sub(2)).max(10);
        let plot_h = (plot_w / 2).max(5);

        let input = Panel {
            left: half_w + 1,
            top: 1,
            width: plot_w,
            height: plot_h,
        };
        let output = Panel {
            left: half_w + 1,
            top: half_h + 1,
            width: plot_w,
            height: plot_h,
        };
        let bars = Panel {
            left: 1,
            top: half_h + 1,
            width: half_w.saturating_sub(2).max(10),
            height: plot_h,
        };

        Layout {
            text_origin: (2, 2),
            input,
            bars,
            output,
            status_row: term_height.saturating_sub(1),
        }
    }
}

/// Character and color buffers covering the whole terminal, rebuilt each
/// frame and flushed in one pass.
pub struct Canvas {
    pub width: u16,
    pub height: u16,
    chars: Vec<char>,
    colors: Vec<Color>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Canvas {
            width,
            height,
            chars: vec![' '; size],
            colors: vec![Color::Reset; size],
        }
    }

    pub fn clear(&mut self) {
        self.chars.fill(' ');
        self.colors.fill(Color::Reset);
    }

    /// Plots one cell, clipping silently at the canvas edges.
    pub fn set(&mut self, col: i32, row: i32, ch: char, color: Color) {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return;
        }
        let idx = row as usize * self.width as usize + col as usize;
        self.chars[idx] = ch;
        self.colors[idx] = color;
    }

    pub fn char_at(&self, col: u16, row: u16) -> char {
        self.chars[row as usize * self.width as usize + col as usize]
    }

    /// Draws a line of cells between two endpoints using Bresenham's
    /// algorithm. `dash` plots every other cell for dotted segments.
    pub fn draw_line(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        ch: char,
        color: Color,
        dash: bool,
    ) {
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut phase = 0usize;

        loop {
            if !dash || phase % 2 == 0 {
                self.set(x0, y0, ch, color);
            }
            phase += 1;

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    pub fn draw_text(&mut self, col: i32, row: i32, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.set(col + i as i32, row, ch, color);
        }
    }

    /// Flushes the buffers to the terminal, one MoveTo per row (raw mode
    /// does not translate newlines).
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = Color::Reset;
        writer.queue(SetForegroundColor(current))?;
        for row in 0..self.height {
            writer.queue(cursor::MoveTo(0, row))?;
            for col in 0..self.width {
                let idx = row as usize * self.width as usize + col as usize;
                if self.colors[idx] != current {
                    current = self.colors[idx];
                    writer.queue(SetForegroundColor(current))?;
                }
                writer.queue(Print(self.chars[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Draws a vector as an arrow from the panel origin with a head glyph at
/// the tip.
pub fn draw_arrow(canvas: &mut Canvas, panel: &Panel, tip: &Vec2, color: Color) {
    let origin = panel.to_cell(&[0.0, 0.0]);
    let end = panel.to_cell(tip);
    canvas.draw_line(origin, end, '*', color, false);
    canvas.set(end.0, end.1, '@', color);
}

/// Draws a plain segment between two logical points.
pub fn draw_segment(
    canvas: &mut Canvas,
    panel: &Panel,
    from: &Vec2,
    to: &Vec2,
    ch: char,
    color: Color,
    dash: bool,
) {
    canvas.draw_line(panel.to_cell(from), panel.to_cell(to), ch, color, dash);
}

/// Dashed unit circle as a ring of faint dots.
pub fn draw_unit_circle(canvas: &mut Canvas, panel: &Panel) {
    for i in 0..120 {
        if i % 2 == 0 {
            let p = crate::math::sample_unit_vector(i, 120);
            let (c, r) = panel.to_cell(&p);
            canvas.set(c, r, '.', CIRCLE_COLOR);
        }
    }
}

/// A single circumference dot.
pub fn draw_dot(canvas: &mut Canvas, panel: &Panel, p: &Vec2, color: Color) {
    let (c, r) = panel.to_cell(p);
    canvas.set(c, r, 'o', color);
}

/// Vertical bar pair for the two dot products. Bars grow up or down from a
/// zero axis across the panel middle; values are clipped at the axis limit.
pub fn draw_bars(canvas: &mut Canvas, panel: &Panel, value0: f64, value1: Option<f64>) {
    let zero_row = panel.top as i32 + panel.height as i32 / 2;
    let axis_end = panel.left as i32 + panel.width as i32 - 1;
    canvas.draw_line(
        (panel.left as i32, zero_row),
        (axis_end, zero_row),
        '-',
        CIRCLE_COLOR,
        false,
    );

    let bars: [(f64, Color, i32); 2] = [
        (value0, MATRIX_ROW0_COLOR, panel.width as i32 / 3),
        (
            value1.unwrap_or(0.0),
            MATRIX_ROW1_COLOR,
            2 * panel.width as i32 / 3,
        ),
    ];

    for (i, (value, color, offset)) in bars.iter().enumerate() {
        if i == 1 && value1.is_none() {
            continue;
        }
        let col = panel.left as i32 + offset;
        let clipped = value.clamp(-AXIS_LIMIT, AXIS_LIMIT);
        let extent = (clipped / AXIS_LIMIT * (panel.height as f64 / 2.0)).round() as i32;
        let (lo, hi) = if extent >= 0 {
            (zero_row - extent, zero_row)
        } else {
            (zero_row, zero_row - extent)
        };
        for row in lo..=hi {
            canvas.set(col, row, '#', *color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_has_sign_and_three_decimals() {
        assert_eq!(fmt(1.0), "+1.000");
        assert_eq!(fmt(-0.5), "-0.500");
        assert_eq!(fmt(0.0), "+0.000");
    }

    #[test]
    fn fmt_row_brackets_both_components() {
        assert_eq!(fmt_row(&[1.0, 0.0]), "[+1.000, +0.000]");
        assert_eq!(fmt_row(&[-0.7071, 0.7071]), "[-0.707, +0.707]");
    }

    #[test]
    fn fmt_bracket_single_component() {
        assert_eq!(fmt_bracket(0.25), "[+0.250]");
    }

    #[test]
    fn panel_cell_mapping_round_trips() {
        let panel = Panel {
            left: 10,
            top: 2,
            width: 41,
            height: 21,
        };
        // Origin maps to the panel center.
        let (c, r) = panel.to_cell(&[0.0, 0.0]);
        assert_eq!((c, r), (30, 12));
        let (x, y) = panel.from_cell(c as u16, r as u16).unwrap();
        assert!(x.abs() < 0.1);
        assert!(y.abs() < 0.1);
    }

    #[test]
    fn panel_corners() {
        let panel = Panel {
            left: 0,
            top: 0,
            width: 11,
            height: 11,
        };
        assert_eq!(panel.to_cell(&[-AXIS_LIMIT, AXIS_LIMIT]), (0, 0));
        assert_eq!(panel.to_cell(&[AXIS_LIMIT, -AXIS_LIMIT]), (10, 10));
    }

    #[test]
    fn from_cell_outside_panel_is_none() {
        let panel = Panel {
            left: 5,
            top: 5,
            width: 10,
            height: 10,
        };
        assert_eq!(panel.from_cell(4, 7), None);
        assert_eq!(panel.from_cell(15, 7), None);
        assert!(panel.from_cell(5, 5).is_some());
    }

    #[test]
    fn canvas_clips_out_of_range_plots() {
        let mut canvas = Canvas::new(10, 5);
        canvas.set(-1, 0, 'x', TEXT_COLOR);
        canvas.set(10, 0, 'x', TEXT_COLOR);
        canvas.set(0, 5, 'x', TEXT_COLOR);
        for row in 0..5 {
            for col in 0..10 {
                assert_eq!(canvas.char_at(col, row), ' ');
            }
        }
    }

    #[test]
    fn draw_line_plots_endpoints() {
        let mut canvas = Canvas::new(20, 10);
        canvas.draw_line((1, 1), (8, 6), '*', TEXT_COLOR, false);
        assert_eq!(canvas.char_at(1, 1), '*');
        assert_eq!(canvas.char_at(8, 6), '*');
    }

    #[test]
    fn layout_panels_do_not_overlap() {
        let layout = Layout::new(120, 40);
        assert!(layout.input.left > layout.bars.left + layout.bars.width - 1);
        assert!(layout.output.top > layout.input.top + layout.input.height - 1);
        assert!(layout.status_row >= layout.output.top + layout.output.height);
    }
}

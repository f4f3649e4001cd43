/// What the next matrix change applies to. Drags target a row; the two
/// button-style actions get their own variants so they can never be
/// confused with each other or with a row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustTarget {
    Row(usize),
    Orthogonalize,
    Normalize,
}

/// Application state: mode flags toggled by user input and read once per
/// frame, plus drag and animation state. Owned by the app, never global.
#[derive(Debug, Clone)]
pub struct Settings {
    /// When true, the frame loop exits
    pub quit: bool,
    /// When true, the input vector rotates each tick
    pub animate: bool,
    /// Animation speed as a percentage, 0-100
    pub speed: u8,
    /// Show 1 or 2 matrix rows
    pub rows_to_show: usize,
    /// Plot the ring of circumference dots
    pub show_circumference: bool,
    /// Draw shadow/normal projection segments
    pub show_projection: bool,
    /// Dragging one row keeps the other orthogonal to it
    pub keep_orthogonal: bool,

    /// One-shot: a matrix change is pending (cleared after it is applied)
    pub change_matrix: bool,
    /// One-shot: panel layout must be rebuilt (cleared after redraw)
    pub recalc: bool,
    /// One-shot: a drag just started and the active row is not yet chosen
    pub mouse_down_onset: bool,

    pub mouse_down: bool,
    pub adjust: AdjustTarget,
    /// Cursor in logical coordinates; None while outside the input panel
    pub cursor: Option<(f64, f64)>,

    /// Continuous animation phase, in units of steps
    pub step_float: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            quit: false,
            animate: true,
            speed: 10,
            rows_to_show: 1,
            show_circumference: false,
            show_projection: true,
            keep_orthogonal: false,
            change_matrix: false,
            recalc: false,
            mouse_down_onset: false,
            mouse_down: false,
            adjust: AdjustTarget::Row(0),
            cursor: None,
            step_float: 0.0,
        }
    }
}

impl Settings {
    /// Flips between the 1-row and 2-row matrix views.
    pub fn toggle_rows(&mut self) {
        self.rows_to_show = 3 - self.rows_to_show;
        self.recalc = true;
    }

    /// Nudges the animation speed, staying within 0-100.
    pub fn adjust_speed(&mut self, delta: i16) {
        self.speed = (self.speed as i16 + delta).clamp(0, 100) as u8;
    }
}

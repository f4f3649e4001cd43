//! Frame loop and event dispatch: translates terminal input into settings
//! flags, consumes the flags once per frame, and hands geometry to the
//! graphics layer.

use crate::engine::{advance, Mat2, UnitCircle};
use crate::graphics::{
    draw_arrow, draw_bars, draw_dot, draw_segment, draw_unit_circle, fmt_bracket, fmt_row,
    Canvas, Layout, CIRCLE_COLOR, CIRCUM_INPUT_COLOR, CIRCUM_OUTPUT_COLOR, INPUT_VECTOR_COLOR,
    MATRIX_ROW0_COLOR, MATRIX_ROW1_COLOR, OUTPUT_VECTOR_COLOR, SHADOW0_COLOR, SHADOW1_COLOR,
    TEXT_COLOR,
};
use crate::math::Vec2;
use crate::state::{AdjustTarget, Settings};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::{cursor, execute, terminal};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

const TARGET_FRAME_TIME: Duration = Duration::from_millis(33);

pub struct App {
    matrix: Mat2,
    circle: UnitCircle,
    settings: Settings,
    canvas: Canvas,
    layout: Layout,
    /// Completed orbits since the circumference overlay was enabled;
    /// dots are revealed one by one during the first orbit only
    cycles: u32,
    /// Auto-exit after this long, for demos and smoke tests
    run_for: Option<Duration>,
    frame_count: u32,
    last_fps_calculation: Instant,
    fps: f64,
}

impl App {
    pub fn new(
        steps_per_orbit: usize,
        dots_per_orbit: usize,
        speed: u8,
        run_for: Option<Duration>,
    ) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let circle = UnitCircle::new(steps_per_orbit, dots_per_orbit);
        log::info!(
            "total steps {}, circumference dots {}",
            circle.num_steps,
            circle.num_dots
        );

        let mut settings = Settings::default();
        settings.speed = speed;

        Ok(App {
            matrix: Mat2::identity(),
            circle,
            settings,
            canvas: Canvas::new(width, height),
            layout: Layout::new(width, height),
            cycles: 0,
            run_for,
            frame_count: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            terminal::LeaveAlternateScreen,
            DisableMouseCapture,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let started = Instant::now();

        while !self.settings.quit {
            let frame_start = Instant::now();

            // Drain every pending event before acting, so a fast drag
            // collapses into one matrix update per frame.
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.apply_matrix_actions();
            self.update();
            self.render()?;

            self.frame_count += 1;
            let now = Instant::now();
            let since_fps = now.duration_since(self.last_fps_calculation);
            if since_fps.as_secs_f64() >= 1.0 {
                self.fps = self.frame_count as f64 / since_fps.as_secs_f64();
                self.frame_count = 0;
                self.last_fps_calculation = now;
            }

            if let Some(limit) = self.run_for {
                if started.elapsed() >= limit {
                    log::info!("run duration elapsed, exiting");
                    self.settings.quit = true;
                }
            }

            let elapsed = frame_start.elapsed();
            if elapsed < TARGET_FRAME_TIME {
                std::thread::sleep(TARGET_FRAME_TIME - elapsed);
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::Key(KeyEvent { code, kind, .. }) if kind == KeyEventKind::Press => {
                self.handle_key(code)
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.canvas = Canvas::new(width, height);
                self.layout = Layout::new(width, height);
                self.settings.recalc = true;
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let s = &mut self.settings;
        match code {
            KeyCode::Char(' ') => s.animate = !s.animate,
            KeyCode::Char('m') => s.toggle_rows(),
            KeyCode::Char('c') => {
                // The overlay only means anything with both rows visible.
                if s.rows_to_show == 2 {
                    s.show_circumference = !s.show_circumference;
                    s.recalc = true;
                    if s.show_circumference {
                        self.cycles = 0;
                    }
                }
            }
            KeyCode::Char('p') => {
                s.show_projection = !s.show_projection;
                s.recalc = true;
            }
            KeyCode::Char('o') => {
                if s.rows_to_show == 2 {
                    s.keep_orthogonal = !s.keep_orthogonal;
                    if s.keep_orthogonal {
                        // Snap row 1 into place immediately; later drags
                        // keep the pair orthogonal via the lock flag.
                        s.adjust = AdjustTarget::Orthogonalize;
                        s.change_matrix = true;
                    }
                }
            }
            KeyCode::Char('n') => {
                s.adjust = AdjustTarget::Normalize;
                s.change_matrix = true;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => s.adjust_speed(10),
            KeyCode::Char('-') | KeyCode::Char('_') => s.adjust_speed(-10),
            KeyCode::Char('q') | KeyCode::Esc => s.quit = true,
            // Every other key is ignored
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let s = &mut self.settings;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // Presses outside the input panel are not drags.
                if let Some(point) = self.layout.input.from_cell(mouse.column, mouse.row) {
                    s.cursor = Some(point);
                    s.mouse_down = true;
                    s.mouse_down_onset = true;
                    s.change_matrix = true;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                if s.mouse_down {
                    // None while the cursor is out of bounds: the drag is
                    // simply not committed this tick.
                    s.cursor = self.layout.input.from_cell(mouse.column, mouse.row);
                    s.change_matrix = true;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                s.mouse_down = false;
                s.change_matrix = false;
            }
            _ => {}
        }
    }

    /// Consumes the one-shot matrix flags set by input handlers.
    fn apply_matrix_actions(&mut self) {
        let s = &mut self.settings;

        if s.mouse_down_onset {
            s.mouse_down_onset = false;
            if s.rows_to_show == 1 {
                // Only one row showing, so it is the only drag target.
                s.adjust = AdjustTarget::Row(0);
            } else if let Some((x, y)) = s.cursor {
                s.adjust = AdjustTarget::Row(self.matrix.pick_active_row(&[x, y]));
            }
        }

        if s.change_matrix {
            s.change_matrix = false;
            match s.adjust {
                AdjustTarget::Orthogonalize => {
                    self.matrix.force_row_orthogonal(0);
                    s.adjust = AdjustTarget::Row(0);
                }
                AdjustTarget::Normalize => {
                    if let Err(e) = self.matrix.normalize_rows() {
                        log::warn!("cannot normalize: {e}");
                    }
                    s.adjust = AdjustTarget::Row(0);
                }
                AdjustTarget::Row(r) => {
                    if let Some((x, y)) = s.cursor {
                        let lock = s.keep_orthogonal && s.rows_to_show == 2;
                        self.matrix.set_row_from_point(r, x, y, lock);
                    }
                }
            }
        }
    }

    fn update(&mut self) {
        if self.settings.animate {
            let next = advance(
                self.settings.step_float,
                self.settings.speed,
                self.circle.num_steps,
            );
            if next < self.settings.step_float {
                self.cycles += 1;
            }
            self.settings.step_float = next;
        }
    }

    fn current_step(&self) -> usize {
        (self.settings.step_float as usize).min(self.circle.num_steps - 1)
    }

    /// How many circumference dots to show: revealed one per dot-step
    /// during the first orbit after enabling, all of them afterwards.
    fn dots_revealed(&self) -> usize {
        if self.cycles > 0 {
            self.circle.num_dots
        } else {
            (self.current_step() / self.circle.steps_per_dot + 1).min(self.circle.num_dots)
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.settings.recalc = false;
        self.canvas.clear();

        let input_vector = self.circle.step_point(self.current_step());
        let output_vector = self.matrix.transform(&input_vector);

        self.draw_input_panel(&input_vector);
        self.draw_output_panel(&output_vector);
        self.draw_bar_panel(&output_vector);
        self.draw_text_panel(&input_vector, &output_vector);
        self.draw_status_line();

        let mut out = stdout();
        self.canvas.draw(&mut out)?;
        out.flush()
    }

    fn draw_input_panel(&mut self, input_vector: &Vec2) {
        let panel = self.layout.input;
        self.canvas.draw_text(
            panel.left as i32,
            panel.top as i32 - 1,
            "Input vectors (drag with mouse)",
            TEXT_COLOR,
        );
        draw_unit_circle(&mut self.canvas, &panel);

        if self.settings.show_circumference && self.settings.rows_to_show == 2 {
            for p in &self.circle.dot_points()[..self.dots_revealed()] {
                draw_dot(&mut self.canvas, &panel, p, CIRCUM_INPUT_COLOR);
            }
        }

        if self.settings.show_projection {
            for row in 0..self.settings.rows_to_show {
                match self.matrix.projection(row, input_vector) {
                    Ok(foot) => {
                        let shadow_color = if row == 0 { SHADOW0_COLOR } else { SHADOW1_COLOR };
                        // Perpendicular from the input tip down to the row
                        // direction, then the shadow along it.
                        draw_segment(
                            &mut self.canvas,
                            &panel,
                            input_vector,
                            &foot,
                            ':',
                            CIRCLE_COLOR,
                            true,
                        );
                        draw_segment(
                            &mut self.canvas,
                            &panel,
                            &[0.0, 0.0],
                            &foot,
                            '=',
                            shadow_color,
                            false,
                        );
                    }
                    Err(e) => log::debug!("skipping projection: {e}"),
                }
            }
        }

        draw_arrow(&mut self.canvas, &panel, &self.matrix.rows[0], MATRIX_ROW0_COLOR);
        if self.settings.rows_to_show == 2 {
            draw_arrow(&mut self.canvas, &panel, &self.matrix.rows[1], MATRIX_ROW1_COLOR);
        }
        draw_arrow(&mut self.canvas, &panel, input_vector, INPUT_VECTOR_COLOR);
    }

    fn draw_output_panel(&mut self, output_vector: &Vec2) {
        let panel = self.layout.output;
        self.canvas.draw_text(
            panel.left as i32,
            panel.top as i32 - 1,
            "Output vector",
            TEXT_COLOR,
        );
        draw_unit_circle(&mut self.canvas, &panel);

        // With one row shown the output is a scalar drawn on the x axis.
        let tip = if self.settings.rows_to_show == 2 {
            *output_vector
        } else {
            [output_vector[0], 0.0]
        };

        if self.settings.show_projection {
            draw_segment(
                &mut self.canvas,
                &panel,
                &[0.0, 0.0],
                &[tip[0], 0.0],
                '=',
                SHADOW0_COLOR,
                false,
            );
            if self.settings.rows_to_show == 2 {
                draw_segment(
                    &mut self.canvas,
                    &panel,
                    &[tip[0], 0.0],
                    &tip,
                    '=',
                    SHADOW1_COLOR,
                    false,
                );
            }
        }

        if self.settings.show_circumference && self.settings.rows_to_show == 2 {
            let dots = self.circle.transformed_dots(&self.matrix);
            for p in &dots[..self.dots_revealed()] {
                draw_dot(&mut self.canvas, &panel, p, CIRCUM_OUTPUT_COLOR);
            }
        } else {
            draw_arrow(&mut self.canvas, &panel, &tip, OUTPUT_VECTOR_COLOR);
        }
    }

    fn draw_bar_panel(&mut self, output_vector: &Vec2) {
        let panel = self.layout.bars;
        self.canvas.draw_text(
            panel.left as i32,
            panel.top as i32 - 1,
            "Dot product output(s)",
            TEXT_COLOR,
        );
        let second = (self.settings.rows_to_show == 2).then_some(output_vector[1]);
        draw_bars(&mut self.canvas, &panel, output_vector[0], second);
    }

    fn draw_text_panel(&mut self, input_vector: &Vec2, output_vector: &Vec2) {
        let (x, y) = self.layout.text_origin;
        let (x, y) = (x as i32, y as i32);

        // Matrix rows, stacked
        self.canvas
            .draw_text(x, y, &fmt_row(&self.matrix.rows[0]), MATRIX_ROW0_COLOR);
        if self.settings.rows_to_show == 2 {
            self.canvas
                .draw_text(x, y + 1, &fmt_row(&self.matrix.rows[1]), MATRIX_ROW1_COLOR);
        }

        // "* input = output" column layout
        let star_x = x + 17;
        let in_x = star_x + 2;
        let eq_x = in_x + 9;
        let out_x = eq_x + 2;

        self.canvas.draw_text(star_x, y, "*", TEXT_COLOR);
        self.canvas
            .draw_text(in_x, y, &fmt_bracket(input_vector[0]), INPUT_VECTOR_COLOR);
        self.canvas
            .draw_text(in_x, y + 1, &fmt_bracket(input_vector[1]), INPUT_VECTOR_COLOR);
        self.canvas.draw_text(eq_x, y, "=", TEXT_COLOR);
        self.canvas
            .draw_text(out_x, y, &fmt_bracket(output_vector[0]), OUTPUT_VECTOR_COLOR);
        if self.settings.rows_to_show == 2 {
            self.canvas.draw_text(
                out_x,
                y + 1,
                &fmt_bracket(output_vector[1]),
                OUTPUT_VECTOR_COLOR,
            );
        }
    }

    fn draw_status_line(&mut self) {
        let s = &self.settings;
        let status = format!(
            "speed {:3}% | {} | fps {:4.1} | [space] animate  [m] 1/2 rows  [c] dots  [p] shadows  [o] ortho {}  [n] normalize  [+/-] speed  [q] quit",
            s.speed,
            if s.animate { "animating" } else { "paused   " },
            self.fps,
            if s.keep_orthogonal { "on " } else { "off" },
        );
        self.canvas
            .draw_text(0, self.layout.status_row as i32, &status, TEXT_COLOR);
    }
}

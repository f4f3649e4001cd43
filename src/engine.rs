//! Matrix state and per-frame geometry.
//!
//! Owns the user-adjustable 2x2 matrix and derives everything the renderer
//! needs each tick: the rotating input vector, its image under the matrix,
//! and the projection of the input onto each row direction.

use crate::math::{distance_squared, dot, norm, perp_ccw, sample_unit_vector, Vec2};
use thiserror::Error;

/// A matrix row whose length is zero cannot be normalized or projected onto.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("matrix row {row} is the zero vector")]
pub struct DegenerateRowError {
    pub row: usize,
}

/// The 2x2 matrix being visualized, stored by rows. Rows are rendered as
/// arrows from the origin and dragged independently with the mouse.
#[derive(Debug, Clone, PartialEq)]
pub struct Mat2 {
    pub rows: [Vec2; 2],
}

impl Mat2 {
    pub fn identity() -> Self {
        Mat2 {
            rows: [[1.0, 0.0], [0.0, 1.0]],
        }
    }

    /// Standard matrix-vector product.
    pub fn transform(&self, v: &Vec2) -> Vec2 {
        [dot(&self.rows[0], v), dot(&self.rows[1], v)]
    }

    /// Projects `input` onto the direction of row `row`, returning the
    /// projected point. The same point serves as the foot of the
    /// perpendicular from the input tip and as the far end of the shadow
    /// segment from the origin.
    pub fn projection(&self, row: usize, input: &Vec2) -> Result<Vec2, DegenerateRowError> {
        let r = &self.rows[row];
        let len = norm(r);
        if len == 0.0 {
            return Err(DegenerateRowError { row });
        }
        let unit = [r[0] / len, r[1] / len];
        let d = dot(&unit, input);
        Ok([unit[0] * d, unit[1] * d])
    }

    /// Replaces row `row` with the dragged point. With the orthogonality
    /// lock on, the other row follows as the 90-degree counterclockwise
    /// rotation of the dragged one.
    pub fn set_row_from_point(&mut self, row: usize, x: f64, y: f64, keep_orthogonal: bool) {
        self.rows[row] = [x, y];
        if keep_orthogonal {
            self.rows[1 - row] = perp_ccw(&self.rows[row]);
        }
    }

    /// Scales each row to unit length. If either row is the zero vector the
    /// matrix is left untouched and the offending row is reported.
    pub fn normalize_rows(&mut self) -> Result<(), DegenerateRowError> {
        let lengths = [norm(&self.rows[0]), norm(&self.rows[1])];
        for (row, len) in lengths.iter().enumerate() {
            if *len == 0.0 {
                return Err(DegenerateRowError { row });
            }
        }
        for (r, len) in self.rows.iter_mut().zip(lengths) {
            r[0] /= len;
            r[1] /= len;
        }
        Ok(())
    }

    /// Replaces the row opposite `source` with the 90-degree counterclockwise
    /// rotation of `source`'s row. The source row itself is unchanged.
    pub fn force_row_orthogonal(&mut self, source: usize) {
        self.rows[1 - source] = perp_ccw(&self.rows[source]);
    }

    /// Decides which row a drag starting at the cursor should affect: the
    /// row whose tip is farther from the cursor. Equal distances pick row 0.
    //
    // Picking the farther tip is deliberate; it matches the long-standing
    // behavior users of the demo expect, counterintuitive as it reads.
    pub fn pick_active_row(&self, cursor: &Vec2) -> usize {
        let d0 = distance_squared(&self.rows[0], cursor);
        let d1 = distance_squared(&self.rows[1], cursor);
        if d1 > d0 {
            1
        } else {
            0
        }
    }
}

/// Advances the continuous animation phase by one tick. `speed` is a
/// percentage (0-100); 25% moves exactly one sample step per tick. Wraps
/// modularly at `steps_per_orbit` so the phase never jumps.
pub fn advance(step_float: f64, speed: u8, steps_per_orbit: usize) -> f64 {
    let mut next = step_float + speed as f64 / 25.0;
    if next >= steps_per_orbit as f64 {
        next -= steps_per_orbit as f64;
    }
    next
}

/// Precomputed points around the unit circle: one fine set for the animation
/// steps and one coarse set for the circumference dots. The step count is
/// rounded to an integer multiple of the dot count so the rotating vector
/// lands exactly on each dot.
pub struct UnitCircle {
    pub steps_per_dot: usize,
    pub num_steps: usize,
    pub num_dots: usize,
    step_points: Vec<Vec2>,
    dot_points: Vec<Vec2>,
}

impl UnitCircle {
    pub fn new(requested_steps: usize, num_dots: usize) -> Self {
        let steps_per_dot =
            ((requested_steps as f64 / num_dots as f64).round() as usize).max(1);
        let num_steps = steps_per_dot * num_dots;

        let step_points = (0..num_steps)
            .map(|i| sample_unit_vector(i, num_steps))
            .collect();
        let dot_points = (0..num_dots)
            .map(|i| sample_unit_vector(i, num_dots))
            .collect();

        UnitCircle {
            steps_per_dot,
            num_steps,
            num_dots,
            step_points,
            dot_points,
        }
    }

    pub fn step_point(&self, step: usize) -> Vec2 {
        self.step_points[step % self.num_steps]
    }

    pub fn dot_points(&self) -> &[Vec2] {
        &self.dot_points
    }

    /// The circumference dots after multiplication by the matrix, for the
    /// output panel.
    pub fn transformed_dots(&self, matrix: &Mat2) -> Vec<Vec2> {
        self.dot_points.iter().map(|p| matrix.transform(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_vec2_eq(a: &Vec2, b: &Vec2) {
        assert_relative_eq!(a[0], b[0], epsilon = 1e-9);
        assert_relative_eq!(a[1], b[1], epsilon = 1e-9);
    }

    #[test]
    fn transform_matches_matrix_vector_product() {
        let m = Mat2 {
            rows: [[1.5, -2.0], [0.25, 3.0]],
        };
        let v = [0.6, 0.8];
        let out = m.transform(&v);
        assert_relative_eq!(out[0], 1.5 * 0.6 + -2.0 * 0.8, epsilon = 1e-9);
        assert_relative_eq!(out[1], 0.25 * 0.6 + 3.0 * 0.8, epsilon = 1e-9);
    }

    #[test]
    fn identity_transform_is_noop() {
        let m = Mat2::identity();
        let v = [-0.3, 0.954];
        assert_vec2_eq(&m.transform(&v), &v);
    }

    #[test]
    fn projection_onto_axis_row() {
        let m = Mat2::identity();
        // Projecting onto the x axis keeps only the x component.
        let p = m.projection(0, &[0.6, 0.8]).unwrap();
        assert_vec2_eq(&p, &[0.6, 0.0]);
    }

    #[test]
    fn projection_scale_invariant_in_row_length() {
        // The row is normalized first, so only its direction matters.
        let m1 = Mat2 {
            rows: [[2.0, 0.0], [0.0, 1.0]],
        };
        let m2 = Mat2 {
            rows: [[0.5, 0.0], [0.0, 1.0]],
        };
        let v = [0.6, 0.8];
        assert_vec2_eq(&m1.projection(0, &v).unwrap(), &m2.projection(0, &v).unwrap());
    }

    #[test]
    fn projection_rejects_zero_row() {
        let m = Mat2 {
            rows: [[0.0, 0.0], [0.0, 1.0]],
        };
        assert_eq!(m.projection(0, &[1.0, 0.0]), Err(DegenerateRowError { row: 0 }));
    }

    #[test]
    fn set_row_with_orthogonal_lock() {
        let mut m = Mat2::identity();
        m.set_row_from_point(0, 2.0, 3.0, true);
        assert_eq!(m.rows[0], [2.0, 3.0]);
        assert_eq!(m.rows[1], [-3.0, 2.0]);

        let mut m = Mat2::identity();
        m.set_row_from_point(1, 1.0, 1.0, true);
        assert_eq!(m.rows[1], [1.0, 1.0]);
        assert_eq!(m.rows[0], [-1.0, 1.0]);
    }

    #[test]
    fn set_row_without_lock_leaves_other_row() {
        let mut m = Mat2::identity();
        m.set_row_from_point(0, 1.0, 1.0, false);
        assert_eq!(m.rows[0], [1.0, 1.0]);
        assert_eq!(m.rows[1], [0.0, 1.0]);
        // End to end: output of (1, 0) under the new matrix.
        assert_vec2_eq(&m.transform(&[1.0, 0.0]), &[1.0, 0.0]);
    }

    #[test]
    fn normalize_rows_is_idempotent() {
        let mut m = Mat2 {
            rows: [[3.0, 4.0], [0.0, -2.0]],
        };
        m.normalize_rows().unwrap();
        assert_relative_eq!(norm(&m.rows[0]), 1.0, epsilon = 1e-9);
        assert_relative_eq!(norm(&m.rows[1]), 1.0, epsilon = 1e-9);

        let first = m.clone();
        m.normalize_rows().unwrap();
        assert_vec2_eq(&m.rows[0], &first.rows[0]);
        assert_vec2_eq(&m.rows[1], &first.rows[1]);
    }

    #[test]
    fn normalize_rows_rejects_zero_row_and_leaves_matrix_alone() {
        let mut m = Mat2 {
            rows: [[3.0, 4.0], [0.0, 0.0]],
        };
        let before = m.clone();
        assert_eq!(m.normalize_rows(), Err(DegenerateRowError { row: 1 }));
        assert_eq!(m, before);
    }

    #[test]
    fn force_row_orthogonal_keeps_source_row() {
        let mut m = Mat2 {
            rows: [[2.0, 1.0], [5.0, 5.0]],
        };
        m.force_row_orthogonal(0);
        assert_eq!(m.rows[0], [2.0, 1.0]);
        assert_eq!(m.rows[1], [-1.0, 2.0]);
        assert_relative_eq!(dot(&m.rows[0], &m.rows[1]), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pick_active_row_selects_farther_tip() {
        let m = Mat2::identity();
        // Cursor sits exactly on row 0's tip, so row 1 is farther.
        assert_eq!(m.pick_active_row(&[1.0, 0.0]), 1);
        assert_eq!(m.pick_active_row(&[0.0, 1.0]), 0);
    }

    #[test]
    fn pick_active_row_tie_goes_to_row_zero() {
        let m = Mat2::identity();
        assert_eq!(m.pick_active_row(&[0.5, 0.5]), 0);
    }

    #[test]
    fn advance_steps_by_speed_over_25() {
        assert_relative_eq!(advance(0.0, 10, 400), 0.4, epsilon = 1e-12);
        assert_relative_eq!(advance(10.0, 100, 400), 14.0, epsilon = 1e-12);
    }

    #[test]
    fn advance_wraps_modularly() {
        let next = advance(399.9, 25, 400);
        assert_relative_eq!(next, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn advance_full_orbit_returns_to_start() {
        let orbit = 400;
        let mut phase = 17.0;
        for _ in 0..orbit {
            phase = advance(phase, 25, orbit);
        }
        assert_relative_eq!(phase, 17.0, epsilon = 1e-6);
    }

    #[test]
    fn unit_circle_rounds_steps_to_dot_multiple() {
        let u = UnitCircle::new(400, 40);
        assert_eq!(u.steps_per_dot, 10);
        assert_eq!(u.num_steps, 400);

        let u = UnitCircle::new(45, 7);
        assert_eq!(u.num_steps, u.steps_per_dot * 7);
    }

    #[test]
    fn unit_circle_points_have_unit_length() {
        let u = UnitCircle::new(60, 12);
        for i in 0..u.num_steps {
            assert_relative_eq!(norm(&u.step_point(i)), 1.0, epsilon = 1e-12);
        }
        for p in u.dot_points() {
            assert_relative_eq!(norm(p), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn transformed_dots_follow_matrix() {
        let m = Mat2 {
            rows: [[2.0, 0.0], [0.0, 0.5]],
        };
        let u = UnitCircle::new(40, 4);
        let dots = u.transformed_dots(&m);
        assert_eq!(dots.len(), 4);
        // First dot is (1, 0) which maps to (2, 0).
        assert_vec2_eq(&dots[0], &[2.0, 0.0]);
    }
}

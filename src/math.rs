use std::f64::consts::PI;

/// A point or vector in the plane
pub type Vec2 = [f64; 2];

/// Dot product of two 2-dimensional vectors
pub fn dot(a: &Vec2, b: &Vec2) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Euclidean length of a 2-dimensional vector
pub fn norm(v: &Vec2) -> f64 {
    dot(v, v).sqrt()
}

/// Squared distance between two points
pub fn distance_squared(a: &Vec2, b: &Vec2) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Rotates a vector 90 degrees counterclockwise
pub fn perp_ccw(v: &Vec2) -> Vec2 {
    [-v[1], v[0]]
}

/// Returns the point on the unit circle for `step` out of `total_steps`
/// samples per revolution.
pub fn sample_unit_vector(step: usize, total_steps: usize) -> Vec2 {
    debug_assert!(total_steps > 0);
    let theta = 2.0 * PI * step as f64 / total_steps as f64;
    [theta.cos(), theta.sin()]
}

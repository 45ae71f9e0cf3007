use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Position reached after moving `speed` units along `angle` from `(x, y)`.
#[inline(always)]
pub fn move_by(x: f32, y: f32, speed: f32, angle: f32) -> (f32, f32) {
    (x + speed * angle.cos(), y + speed * angle.sin())
}

/// Euclidean distance between two points.
#[inline(always)]
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Heading that, followed from `from`, approaches `to`.
///
/// The angle is `acos(dx / dist)`, negated when the target lies below the origin, so the result
/// is in `[-PI, PI]`.
///
/// # Panics
///
/// Panics when `from == to`. Callers must handle the zero-distance case (usually by snapping to
/// the target) before asking for a bearing.
pub fn bearing_to(from: (f32, f32), to: (f32, f32)) -> f32 {
    let dist = distance(from, to);
    assert!(
        dist > 0.0,
        "bearing_to called with coincident points ({}, {})",
        from.0,
        from.1
    );
    // Rounding can push the ratio a hair outside [-1, 1]
    let cos = ((to.0 - from.0) / dist).clamp(-1.0, 1.0);
    let angle = cos.acos();
    if to.1 < from.1 { -angle } else { angle }
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Uniformly distributed heading in `(-PI, PI]`.
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    PI - rng.random::<f32>() * TAU
}

/// True when `(x, y)` lies outside the half-open arena `[0, width) x [0, height)`.
#[inline(always)]
pub fn is_out_of_bounds(x: f32, y: f32, width: f32, height: f32) -> bool {
    x < 0.0 || y < 0.0 || x >= width || y >= height
}

//! Vector and joint-angle math
//!
//! Pure functions over `nalgebra` vectors of any dimension (2D image
//! plane and 3D landmark space in practice). Degenerate input never
//! panics: normalisation yields the zero vector and angles yield NaN.

use nalgebra::SVector;
use std::f64::consts::{FRAC_PI_2, PI};

/// Magnitudes below this are treated as zero-length
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// Relative tolerance on cos²/sin² for the exact-angle branches
const EXACT_ANGLE_TOLERANCE: f64 = 1e-12;

pub fn magnitude<const D: usize>(v: &SVector<f64, D>) -> f64 {
    v.norm()
}

/// Squared length, for comparisons that don't need the root
pub fn magnitude_squared<const D: usize>(v: &SVector<f64, D>) -> f64 {
    v.norm_squared()
}

pub fn distance<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> f64 {
    (b - a).norm()
}

/// Unit vector in the direction of `v`, or zero when `v` is degenerate
pub fn normalize<const D: usize>(v: &SVector<f64, D>) -> SVector<f64, D> {
    let mag = magnitude(v);
    if mag >= DEGENERATE_EPSILON {
        v / mag
    } else {
        SVector::zeros()
    }
}

pub fn dot<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> f64 {
    a.dot(b)
}

enum AngleClass {
    Degenerate,
    SameDirection,
    OppositeDirection,
    Perpendicular,
    General(f64),
}

/// Sort the angle between two vectors into exact cases before `acos`.
///
/// `acos(dot / (|a||b|))` loses precision close to 0°, 90° and 180°, so
/// those are decided on the sign of the dot product and on the Lagrange
/// identity `|a|²|b|² - dot² = |a × b|²`.
fn classify<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> AngleClass {
    let sq_a = magnitude_squared(a);
    let sq_b = magnitude_squared(b);
    let min_sq = DEGENERATE_EPSILON * DEGENERATE_EPSILON;
    if !(sq_a >= min_sq && sq_b >= min_sq) {
        return AngleClass::Degenerate;
    }

    let d = dot(a, b);
    let scale = sq_a * sq_b;
    if !scale.is_finite() || !d.is_finite() {
        return AngleClass::Degenerate;
    }

    if d * d <= EXACT_ANGLE_TOLERANCE * scale {
        return AngleClass::Perpendicular;
    }

    let cross_sq = scale - d * d;
    if cross_sq <= EXACT_ANGLE_TOLERANCE * scale {
        return if d > 0.0 {
            AngleClass::SameDirection
        } else {
            AngleClass::OppositeDirection
        };
    }

    AngleClass::General((d / scale.sqrt()).clamp(-1.0, 1.0))
}

/// Angle between two vectors in radians, NaN if either is degenerate
pub fn angle_between<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> f64 {
    match classify(a, b) {
        AngleClass::Degenerate => f64::NAN,
        AngleClass::SameDirection => 0.0,
        AngleClass::OppositeDirection => PI,
        AngleClass::Perpendicular => FRAC_PI_2,
        AngleClass::General(cos) => cos.acos(),
    }
}

/// Angle ABC at `vertex` in degrees.
///
/// Exactly 0, 90 or 180 for same-direction, perpendicular and opposite
/// arms. NaN when either arm is shorter than `DEGENERATE_EPSILON`
/// (e.g. coincident points).
pub fn angle_deg<const D: usize>(
    a: &SVector<f64, D>,
    vertex: &SVector<f64, D>,
    c: &SVector<f64, D>,
) -> f64 {
    let v1 = a - vertex;
    let v2 = c - vertex;
    match classify(&v1, &v2) {
        AngleClass::Degenerate => f64::NAN,
        AngleClass::SameDirection => 0.0,
        AngleClass::OppositeDirection => 180.0,
        AngleClass::Perpendicular => 90.0,
        AngleClass::General(cos) => cos.acos().to_degrees(),
    }
}

pub mod distance;
pub mod environment;
pub mod flocking;
pub mod walls;

use nalgebra::Vector3;

/// Unit vector along `v`, or zero when `v` has no length.
pub fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

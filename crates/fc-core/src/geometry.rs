//! Vector angle primitives shared by classification and chain growth.

use nalgebra::Vector3;

use crate::error::{ForceChainError, Result};

/// Angle between two vectors in `[0, pi]`.
///
/// Symmetric in its arguments. Computed as `atan2(|a x b|, a . b)`.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Same as [`angle_between`] but rejects zero-length inputs, for which the
/// angle is meaningless.
pub fn checked_angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Result<f64> {
    if a.norm_squared() == 0.0 || b.norm_squared() == 0.0 {
        return Err(ForceChainError::Geometry(format!(
            "angle requested for zero-length vector ({a:?}, {b:?})"
        )));
    }
    Ok(angle_between(a, b))
}

/// Unit vector along `v`, or a geometry error for a zero vector.
pub fn unit(v: &Vector3<f64>) -> Result<Vector3<f64>> {
    v.try_normalize(0.0).ok_or_else(|| {
        ForceChainError::Geometry(format!("cannot normalise zero-length vector {v:?}"))
    })
}

/// Folds an axis angle into `[0, pi/2]`; an axis has no sense of direction.
pub fn fold_axis_angle(angle: f64) -> f64 {
    if angle <= std::f64::consts::FRAC_PI_2 {
        angle
    } else {
        std::f64::consts::PI - angle
    }
}

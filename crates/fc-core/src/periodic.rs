//! Single-image periodic boundary correction for contact vectors.

use fc_dump::BoxBounds;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ForceChainError, Result};

/// Orthogonal simulation domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub low: [f64; 3],
    pub upp: [f64; 3],
}

impl Domain {
    pub fn new(low: [f64; 3], upp: [f64; 3]) -> Result<Self> {
        for axis in 0..3 {
            if !(low[axis] < upp[axis]) {
                return Err(ForceChainError::ContractViolation(format!(
                    "domain axis {axis} has low {} >= upp {}",
                    low[axis], upp[axis]
                )));
            }
        }
        Ok(Self { low, upp })
    }
}

impl TryFrom<BoxBounds> for Domain {
    type Error = ForceChainError;

    fn try_from(bounds: BoxBounds) -> Result<Self> {
        Domain::new(bounds.low, bounds.upp)
    }
}

/// Returns the periodic image of `x2` that sits next to `x1`.
///
/// The wrap axis is the one with the largest `|x1 - x2|` component; on a
/// tie the lowest axis wins. Only that axis moves and only by one domain
/// length, so corner contacts that wrap two axes at once are not
/// corrected. Callers invoke this only when the direct separation exceeds
/// the contact distance.
pub fn periodic_adjust(x1: &Vector3<f64>, x2: &Vector3<f64>, domain: &Domain) -> Vector3<f64> {
    let x12 = x1 - x2;

    let mut axis = 0;
    if x12[1].abs() > x12[0].abs() {
        axis = 1;
    }
    if x12[2].abs() > x12[axis].abs() {
        axis = 2;
    }

    let mut image = *x2;
    if x12[axis] < 0.0 {
        // x2 sits near the upper boundary, its image lies below `low`.
        let margin = domain.upp[axis] - x2[axis];
        image[axis] = domain.low[axis] - margin;
    } else {
        let margin = x2[axis] - domain.low[axis];
        image[axis] = domain.upp[axis] + margin;
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Domain {
        Domain::new([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]).expect("valid domain")
    }

    #[test]
    fn wraps_from_upper_boundary() {
        let x1 = Vector3::new(0.5, 5.0, 5.0);
        let x2 = Vector3::new(9.7, 5.0, 5.0);
        let image = periodic_adjust(&x1, &x2, &unit_box());
        assert_relative_eq!(image.x, -0.3, epsilon = 1e-12);
        assert_eq!((image.y, image.z), (5.0, 5.0));
        assert_relative_eq!((x1 - image).norm(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn wraps_from_lower_boundary() {
        let x1 = Vector3::new(5.0, 9.6, 5.0);
        let x2 = Vector3::new(5.2, 0.1, 5.0);
        let image = periodic_adjust(&x1, &x2, &unit_box());
        assert_relative_eq!(image.y, 10.1, epsilon = 1e-12);
        assert_eq!(image.x, 5.2);
        let expected = (0.2f64.powi(2) + 0.5f64.powi(2)).sqrt();
        assert_relative_eq!((x1 - image).norm(), expected, epsilon = 1e-12);
    }

    #[test]
    fn tie_picks_first_axis() {
        let x1 = Vector3::new(9.0, 9.0, 5.0);
        let x2 = Vector3::new(1.0, 1.0, 5.0);
        let image = periodic_adjust(&x1, &x2, &unit_box());
        assert_relative_eq!(image.x, 11.0, epsilon = 1e-12);
        assert_eq!(image.y, 1.0);
    }

    #[test]
    fn inverted_axis_is_rejected() {
        let err = Domain::new([0.0, 1.0, 0.0], [1.0, 1.0, 1.0]).expect_err("should fail");
        assert!(matches!(err, ForceChainError::ContractViolation(_)));
    }

    #[test]
    fn converts_dump_bounds() {
        let bounds = BoxBounds {
            low: [0.0, -1.0, 0.0],
            upp: [2.0, 1.0, 0.5],
        };
        let domain = Domain::try_from(bounds).expect("valid bounds");
        assert_eq!(domain.low, [0.0, -1.0, 0.0]);
        assert_eq!(domain.upp, [2.0, 1.0, 0.5]);
    }
}

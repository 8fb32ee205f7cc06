//! Particle predicates used to narrow a chain sample.

use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// Axis-aligned box, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxFilter {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoxFilter {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, position: &[f64; 3]) -> bool {
        (0..3).all(|i| self.min[i] <= position[i] && position[i] <= self.max[i])
    }

    /// Box moved by `offset` along every axis.
    pub fn shifted(&self, offset: [f64; 3]) -> Self {
        Self {
            min: std::array::from_fn(|i| self.min[i] + offset[i]),
            max: std::array::from_fn(|i| self.max[i] + offset[i]),
        }
    }

    /// The eight corners in VTK hexahedron order.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            [lo[0], lo[1], lo[2]],
            [hi[0], lo[1], lo[2]],
            [hi[0], hi[1], lo[2]],
            [lo[0], hi[1], lo[2]],
            [lo[0], lo[1], hi[2]],
            [hi[0], lo[1], hi[2]],
            [hi[0], hi[1], hi[2]],
            [lo[0], hi[1], hi[2]],
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleFilter {
    /// Minor stress magnitude at least `|threshold|`
    MinorStressAtLeast(f64),
    Box(BoxFilter),
}

impl ParticleFilter {
    pub fn accepts(&self, particle: &Particle) -> bool {
        match self {
            ParticleFilter::MinorStressAtLeast(threshold) => particle
                .minor_stress()
                .is_some_and(|value| value.abs() >= threshold.abs()),
            ParticleFilter::Box(bounds) => {
                let x = &particle.position;
                bounds.contains(&[x.x, x.y, x.z])
            }
        }
    }
}

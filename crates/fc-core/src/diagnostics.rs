//! Human-readable stress report for a single particle.

use std::fmt::{self, Display, Formatter};

use nalgebra::{Complex, Matrix3, Vector3};

use crate::geometry::{angle_between, fold_axis_angle};
use crate::particle::{IMAG_EPSILON, Particle};

/// Everything the classification derived for one particle, plus checks
/// that help judge whether the decomposition is trustworthy.
#[derive(Debug, Clone, PartialEq)]
pub struct StressDiagnostics {
    pub particle: usize,
    pub force: Vector3<f64>,
    pub stress: Matrix3<f64>,
    pub determinant: f64,
    pub principal_stresses: Vector3<Complex<f64>>,
    pub principal_dirs: Matrix3<f64>,
    pub real_principal_stresses: Vector3<f64>,
    pub all_real: bool,
    pub real_count: usize,
    pub has_real_negative: bool,
    pub minor_stress: Option<f64>,
    /// `det(stress - s I)` per real principal stress, should be ~0
    pub characteristic_determinants: Vector3<f64>,
    /// Angles between direction pairs (0,1), (1,2), (0,2), radians in `[0, pi/2]`
    pub principal_dir_angles: Vector3<f64>,
    /// Minor direction angles with x, y, z, radians in `[0, pi/2]`
    pub minor_dir_angles: Vector3<f64>,
}

impl StressDiagnostics {
    pub fn new(particle: &Particle) -> Self {
        let stresses = *particle.principal_stresses();
        let dirs = *particle.principal_dirs();
        let real = particle.real_principal_stresses();
        let is_real = |c: &Complex<f64>| c.im.abs() <= IMAG_EPSILON;

        let all_real = stresses.iter().all(is_real);
        let real_count = stresses.iter().filter(|c| is_real(c)).count();
        let has_real_negative = stresses.iter().any(|c| is_real(c) && c.re < 0.0);

        let characteristic_determinants = real.map(|s| {
            (particle.stress - Matrix3::identity() * s).determinant()
        });

        let mut principal_dir_angles = Vector3::zeros();
        if all_real {
            let pairs = [(0, 1), (1, 2), (0, 2)];
            for (k, (a, b)) in pairs.into_iter().enumerate() {
                let (da, db) = (dirs.column(a).into_owned(), dirs.column(b).into_owned());
                let angle = angle_between(&da, &db);
                principal_dir_angles[k] = fold_axis_angle(angle);
            }
        }

        let mut minor_dir_angles = Vector3::zeros();
        if let Some(dir) = particle.minor_dir() {
            for axis in 0..3 {
                let angle = angle_between(&dir, &Vector3::ith(axis, 1.0));
                minor_dir_angles[axis] = fold_axis_angle(angle);
            }
        }

        Self {
            particle: particle.id,
            force: particle.force,
            stress: particle.stress,
            determinant: particle.stress.determinant(),
            principal_stresses: stresses,
            principal_dirs: dirs,
            real_principal_stresses: real,
            all_real,
            real_count,
            has_real_negative,
            minor_stress: particle.minor_stress(),
            characteristic_determinants,
            principal_dir_angles,
            minor_dir_angles,
        }
    }
}

impl Display for StressDiagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let deg = 180.0 / std::f64::consts::PI;
        writeln!(f, "Particle {}", self.particle)?;
        writeln!(f, "Force = {:?}", self.force.as_slice())?;
        writeln!(f, "Stress = {}", self.stress)?;
        writeln!(f, "Stress determinant = {}", self.determinant)?;
        write!(f, "Principal stresses:")?;
        for c in self.principal_stresses.iter() {
            write!(f, " ({}, {})", c.re, c.im)?;
        }
        writeln!(f)?;
        writeln!(f, "Principal directions = {}", self.principal_dirs)?;
        writeln!(f, "Real principal stresses = {:?}", self.real_principal_stresses.as_slice())?;
        writeln!(f, "All real: {}", self.all_real)?;
        writeln!(f, "Real count: {}", self.real_count)?;
        writeln!(f, "Has real negative: {}", self.has_real_negative)?;
        match self.minor_stress {
            Some(value) => writeln!(f, "Minor stress = {value}")?,
            None => writeln!(f, "Minor stress = none")?,
        }
        writeln!(
            f,
            "Characteristic determinants = {:?}",
            self.characteristic_determinants.as_slice()
        )?;
        writeln!(
            f,
            "Angles between principal directions (deg) = {:?}",
            (self.principal_dir_angles * deg).as_slice()
        )?;
        write!(
            f,
            "Minor direction angles with x, y, z (deg) = {:?}",
            (self.minor_dir_angles * deg).as_slice()
        )
    }
}

//! Assembly of one simulation snapshot from its dumps.
//!
//! Builds the particle arena, the symmetric contact adjacency and the
//! per-particle stress tensors. Compressive stress is negative.

use fc_dump::{PairDump, PairRow, ParticleDump, WallDump, WallRow};
use nalgebra::{Matrix3, Vector3};
use tracing::{debug, info};

use crate::error::{ForceChainError, Result};
use crate::geometry::unit;
use crate::particle::Particle;
use crate::periodic::{Domain, periodic_adjust};

/// Particles of one time step, indexed by their id.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timestep: Option<u64>,
    /// Arena with `particles[i].id == i`; slot 0 is an unused placeholder
    /// when ids start at 1, as they do in dumps.
    pub particles: Vec<Particle>,
    pub domain: Option<Domain>,
}

impl Snapshot {
    /// Snapshot from an existing arena, checking ids and adjacency.
    pub fn from_particles(particles: Vec<Particle>, domain: Option<Domain>) -> Result<Self> {
        let snapshot = Self {
            timestep: None,
            particles,
            domain,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Builds the arena from a particle dump and accumulates forces, stresses
    /// and neighbors from the pair dump and, if given, the wall dump.
    pub fn assemble(
        particles: &ParticleDump,
        pairs: &PairDump,
        walls: Option<&WallDump>,
    ) -> Result<Self> {
        let mut arena: Vec<Particle> = (0..=particles.declared_count)
            .map(|id| Particle::new(id, 0.0, Vector3::zeros()))
            .collect();

        for row in &particles.rows {
            let slot = arena.get_mut(row.id).ok_or_else(|| {
                ForceChainError::ContractViolation(format!(
                    "line {}: particle id {} exceeds declared count {}",
                    row.line, row.id, particles.declared_count
                ))
            })?;
            slot.kind = row.kind;
            slot.radius = row.radius;
            slot.position = Vector3::from(row.position);
        }

        let domain = Domain::try_from(pairs.bounds)?;
        let mut snapshot = Self {
            timestep: particles.timestep,
            particles: arena,
            domain: Some(domain),
        };

        for row in &pairs.rows {
            snapshot.add_pair(row)?;
        }
        if let Some(walls) = walls {
            for row in &walls.rows {
                snapshot.add_wall_contact(row)?;
            }
        }
        snapshot.validate()?;

        info!(
            particles = particles.rows.len(),
            contacts = pairs.rows.len(),
            wall_contacts = walls.map_or(0, |w| w.rows.len()),
            "assembled snapshot"
        );
        Ok(snapshot)
    }

    fn checked_index(&self, id: usize, line: usize) -> Result<usize> {
        if id < self.particles.len() {
            Ok(id)
        } else {
            Err(ForceChainError::ContractViolation(format!(
                "line {line}: particle id {id} out of range (arena holds {})",
                self.particles.len()
            )))
        }
    }

    fn add_pair(&mut self, row: &PairRow) -> Result<()> {
        let id1 = self.checked_index(row.id1, row.line)?;
        let id2 = self.checked_index(row.id2, row.line)?;
        if id1 == id2 {
            return Err(ForceChainError::ContractViolation(format!(
                "line {}: particle {id1} in contact with itself",
                row.line
            )));
        }

        self.particles[id1].neighbors.push(id2);
        self.particles[id2].neighbors.push(id1);

        let x1 = Vector3::from(row.x1);
        let mut x2 = Vector3::from(row.x2);
        let (r1, r2) = (self.particles[id1].radius, self.particles[id2].radius);
        if (x1 - x2).norm() > r1 + r2
            && let Some(domain) = &self.domain
        {
            x2 = periodic_adjust(&x1, &x2, domain);
        }
        // Points from particle 2 toward particle 1, along the compressive
        // force acting on particle 1.
        let x12 = unit(&(x1 - x2)).map_err(|_| {
            ForceChainError::Geometry(format!(
                "line {}: particles {id1} and {id2} share a center",
                row.line
            ))
        })?;
        let force = Vector3::from(row.force);

        let p1 = &mut self.particles[id1];
        let share = branch_stress(&force, &(-x12), p1.radius, row.overlap, p1.volume());
        p1.force += force;
        p1.stress += share;

        let p2 = &mut self.particles[id2];
        let share = branch_stress(&(-force), &x12, p2.radius, row.overlap, p2.volume());
        p2.force -= force;
        p2.stress += share;
        Ok(())
    }

    fn add_wall_contact(&mut self, row: &WallRow) -> Result<()> {
        let id = self.checked_index(row.particle_id, row.line)?;
        let x12 = unit(&(Vector3::from(row.mesh_point) - Vector3::from(row.particle_point)))
            .map_err(|_| {
                ForceChainError::Geometry(format!(
                    "line {}: wall contact point coincides with particle {id}",
                    row.line
                ))
            })?;
        let force = Vector3::from(row.force);

        let p = &mut self.particles[id];
        let share = branch_stress(&force, &x12, p.radius, row.overlap, p.volume());
        p.force += force;
        p.stress += share;
        Ok(())
    }

    /// Checks arena ids, neighbor ranges, self contacts and symmetry.
    pub fn validate(&self) -> Result<()> {
        validate_arena(&self.particles)
    }

    /// Classifies every particle's stress tensor.
    pub fn classify_stresses(&mut self) {
        for particle in &mut self.particles {
            particle.classify();
        }
        debug!(
            with_minor = self.particles.iter().filter(|p| p.has_minor_stress()).count(),
            "classified stresses"
        );
    }

    /// Resets chain search state so the finder can run again.
    pub fn reset_chains(&mut self) {
        for particle in &mut self.particles {
            particle.reset_for_search();
        }
    }
}

/// `f (x) l * (r - overlap/2) / V`: one contact's share of the average
/// particle stress.
fn branch_stress(
    force: &Vector3<f64>,
    branch: &Vector3<f64>,
    radius: f64,
    overlap: f64,
    volume: f64,
) -> Matrix3<f64> {
    force * branch.transpose() * ((radius - overlap / 2.0) / volume)
}

pub(crate) fn validate_arena(particles: &[Particle]) -> Result<()> {
    for (index, particle) in particles.iter().enumerate() {
        if particle.id != index {
            return Err(ForceChainError::ContractViolation(format!(
                "particle at index {index} carries id {}",
                particle.id
            )));
        }
        for &nei in &particle.neighbors {
            let Some(other) = particles.get(nei) else {
                return Err(ForceChainError::ContractViolation(format!(
                    "particle {index} lists neighbor {nei} beyond {} particles",
                    particles.len()
                )));
            };
            if nei == index {
                return Err(ForceChainError::ContractViolation(format!(
                    "particle {index} lists itself as neighbor"
                )));
            }
            if !other.neighbors.contains(&index) {
                return Err(ForceChainError::ContractViolation(format!(
                    "neighbor relation {index} -> {nei} is not symmetric"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HEADER: &str = "ITEM: TIMESTEP\n100\nITEM: NUMBER\n3\nITEM: BOX\n0 10\n0 10\n0 10\nITEM: ATOMS id type x y z radius\n";

    fn particle_dump() -> ParticleDump {
        let src = format!(
            "{HEADER}1 1 1 5 5 1\n2 1 3 5 5 1\n3 1 9.5 5 5 1\n"
        );
        ParticleDump::parse_str(&src).expect("particles")
    }

    fn pair_dump(rows: &str) -> PairDump {
        PairDump::parse_str(&format!("{HEADER}{rows}")).expect("pairs")
    }

    #[test]
    fn pair_contact_builds_symmetric_compressive_stress() {
        // Particle 1 is pushed in -x by particle 2.
        let pairs = pair_dump("1 5 5 3 5 5 1 2 0 -2 0 0 0\n");
        let snapshot = Snapshot::assemble(&particle_dump(), &pairs, None).expect("assemble");

        assert_eq!(snapshot.timestep, Some(100));
        assert_eq!(snapshot.particles.len(), 4);
        assert_eq!(snapshot.particles[1].neighbors, vec![2]);
        assert_eq!(snapshot.particles[2].neighbors, vec![1]);

        let p1 = &snapshot.particles[1];
        let p2 = &snapshot.particles[2];
        assert_relative_eq!(p1.force.x, -2.0);
        assert_relative_eq!(p2.force.x, 2.0);

        let expected = -2.0 / p1.volume();
        assert_relative_eq!(p1.stress[(0, 0)], expected, epsilon = 1e-12);
        assert_relative_eq!(p2.stress[(0, 0)], expected, epsilon = 1e-12);
        assert_relative_eq!(p1.stress.norm(), expected.abs(), epsilon = 1e-12);
    }

    #[test]
    fn periodic_contact_uses_wrapped_branch() {
        // 3 at x=9.5 touches 1 at x=1 across the x boundary.
        let pairs = pair_dump("9.5 5 5 1 5 5 3 1 1 -2 0 0 0\n");
        let snapshot = Snapshot::assemble(&particle_dump(), &pairs, None).expect("assemble");
        let p3 = &snapshot.particles[3];
        // Image of 1 sits at x = 11, so the branch points in -x and the
        // -x force on 3 is compressive.
        assert!(p3.stress[(0, 0)] < 0.0);
    }

    #[test]
    fn wall_contact_adds_stress() {
        let pairs = pair_dump("");
        let walls = WallDump::parse_str(&format!("{HEADER}1 4 5 1 5 5 0 0 1 0 3 0 0\n"))
            .expect("walls");
        let snapshot =
            Snapshot::assemble(&particle_dump(), &pairs, Some(&walls)).expect("assemble");
        let p1 = &snapshot.particles[1];
        assert_relative_eq!(p1.force.y, 3.0);
        // Wall below pushes up: branch -y, force +y.
        assert!(p1.stress[(1, 1)] < 0.0);
    }

    #[test]
    fn out_of_range_contact_is_a_contract_violation() {
        let pairs = pair_dump("1 5 5 3 5 5 1 8 0 -2 0 0 0\n");
        let err = Snapshot::assemble(&particle_dump(), &pairs, None).expect_err("should fail");
        assert!(matches!(err, ForceChainError::ContractViolation(msg) if msg.contains("line 10")));
    }

    #[test]
    fn coincident_centers_are_a_geometry_error() {
        let pairs = pair_dump("1 5 5 1 5 5 1 2 0 -2 0 0 0\n");
        let err = Snapshot::assemble(&particle_dump(), &pairs, None).expect_err("should fail");
        assert!(matches!(err, ForceChainError::Geometry(_)));
    }

    #[test]
    fn asymmetric_adjacency_is_rejected() {
        let particles = vec![
            Particle::new(0, 1.0, Vector3::zeros()).with_neighbors(vec![1]),
            Particle::new(1, 1.0, Vector3::new(2.0, 0.0, 0.0)),
        ];
        let err = Snapshot::from_particles(particles, None).expect_err("should fail");
        assert!(matches!(
            err,
            ForceChainError::ContractViolation(msg) if msg.contains("symmetric")
        ));
    }

    #[test]
    fn misplaced_id_is_rejected() {
        let particles = vec![Particle::new(5, 1.0, Vector3::zeros())];
        assert!(Snapshot::from_particles(particles, None).is_err());
    }
}

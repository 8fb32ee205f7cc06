//! Snapshot to chains in one call.

use std::path::PathBuf;

use fc_dump::{PairDump, ParticleDump, WallDump};
use tracing::debug;

use crate::chain_finder::{Chain, ChainFinder};
use crate::error::Result;
use crate::particle::Particle;
use crate::snapshot::Snapshot;
use crate::stat::ChainSample;

/// Dump files of one time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInput {
    pub particles: PathBuf,
    pub pairs: PathBuf,
    pub walls: Option<PathBuf>,
}

/// Classified snapshot together with the chains found in it.
#[derive(Debug, Clone)]
pub struct ChainAnalysis {
    pub snapshot: Snapshot,
    pub chains: Vec<Chain>,
    pub alpha: f64,
}

impl ChainAnalysis {
    /// Assembles, classifies and searches chains, using the pair dump box
    /// for periodic contacts.
    pub fn run(
        particles: &ParticleDump,
        pairs: &PairDump,
        walls: Option<&WallDump>,
        alpha: f64,
    ) -> Result<Self> {
        let mut snapshot = Snapshot::assemble(particles, pairs, walls)?;
        snapshot.classify_stresses();
        let chains = ChainFinder::new(&mut snapshot.particles, alpha)
            .with_domain(snapshot.domain)
            .find_chains()?;
        Ok(Self {
            snapshot,
            chains,
            alpha,
        })
    }

    pub fn from_files(input: &SnapshotInput, alpha: f64) -> Result<Self> {
        let (particles, pairs, walls) = read_dumps(input)?;
        Self::run(&particles, &pairs, walls.as_ref(), alpha)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.snapshot.particles
    }

    /// Sample over every chain of this analysis.
    pub fn sample(&self) -> ChainSample<'_> {
        ChainSample::new(&self.chains, &self.snapshot.particles)
    }
}

/// Assembled and classified snapshot, without a chain search.
pub fn load_snapshot(input: &SnapshotInput) -> Result<Snapshot> {
    let (particles, pairs, walls) = read_dumps(input)?;
    let mut snapshot = Snapshot::assemble(&particles, &pairs, walls.as_ref())?;
    snapshot.classify_stresses();
    Ok(snapshot)
}

fn read_dumps(input: &SnapshotInput) -> Result<(ParticleDump, PairDump, Option<WallDump>)> {
    debug!(
        particles = %input.particles.display(),
        pairs = %input.pairs.display(),
        "reading snapshot"
    );
    let particles = ParticleDump::parse_file(&input.particles)?;
    let pairs = PairDump::parse_file(&input.pairs)?;
    let walls = input
        .walls
        .as_ref()
        .map(|path| WallDump::parse_file(path))
        .transpose()?;
    Ok((particles, pairs, walls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    const HEADER: &str = "ITEM: TIMESTEP\n5\nITEM: NUMBER OF ATOMS\n4\nITEM: BOX BOUNDS pp pp pp\n0 10\n0 10\n0 10\nITEM: ATOMS id type x y z radius\n";

    #[test]
    fn compressed_column_forms_one_chain() {
        let particles = ParticleDump::parse_str(&format!(
            "{HEADER}1 1 5 5 1 1\n2 1 5 5 3 1\n3 1 5 5 5 1\n4 1 5 5 7 1\n"
        ))
        .expect("particles");
        // Each contact pushes the lower particle down along z.
        let pairs = PairDump::parse_str(&format!(
            "{HEADER}5 5 1 5 5 3 1 2 0 0 0 -1 0\n5 5 3 5 5 5 2 3 0 0 0 -1 0\n5 5 5 5 5 7 3 4 0 0 0 -1 0\n"
        ))
        .expect("pairs");

        let analysis = ChainAnalysis::run(&particles, &pairs, None, FRAC_PI_4).expect("analysis");
        assert_eq!(analysis.chains, vec![vec![1, 2, 3, 4]]);
        assert_eq!(analysis.particles()[0].chain_id(), None);
        assert_eq!(analysis.sample().count(), 1);
    }
}

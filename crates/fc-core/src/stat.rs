//! Chain sampling and length/orientation statistics.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::chain_finder::Chain;
use crate::error::Result;
use crate::filter::ParticleFilter;
use crate::particle::Particle;
use crate::regression::PlaneFit;

/// Summary of the chain lengths in a sample. Length fields are `None` for an
/// empty sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStatistics {
    pub count: usize,
    pub average_length: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub median_length: Option<f64>,
}

/// Subset of chains, addressed by their index in the chain list.
///
/// Starts with every chain; each filter narrows the current sample.
#[derive(Debug, Clone)]
pub struct ChainSample<'a> {
    chains: &'a [Chain],
    particles: &'a [Particle],
    ids: Vec<usize>,
}

impl<'a> ChainSample<'a> {
    pub fn new(chains: &'a [Chain], particles: &'a [Particle]) -> Self {
        Self {
            chains,
            particles,
            ids: (0..chains.len()).collect(),
        }
    }

    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Sampled chains with their index.
    pub fn chains(&self) -> impl Iterator<Item = (usize, &'a Chain)> + '_ {
        self.ids.iter().map(|&id| (id, &self.chains[id]))
    }

    /// Keeps chains whose every member passes `filter`.
    pub fn apply_filter_all(&mut self, filter: &ParticleFilter) -> &[usize] {
        let (chains, particles) = (self.chains, self.particles);
        self.ids
            .retain(|&id| chains[id].iter().all(|&p| filter.accepts(&particles[p])));
        &self.ids
    }

    /// Keeps chains with at least one member passing `filter`.
    pub fn apply_filter_any(&mut self, filter: &ParticleFilter) -> &[usize] {
        let (chains, particles) = (self.chains, self.particles);
        self.ids
            .retain(|&id| chains[id].iter().any(|&p| filter.accepts(&particles[p])));
        &self.ids
    }

    /// Back to the full chain list.
    pub fn reset(&mut self) {
        self.ids = (0..self.chains.len()).collect();
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    fn lengths(&self) -> Vec<usize> {
        self.ids.iter().map(|&id| self.chains[id].len()).collect()
    }

    pub fn average_length(&self) -> Option<f64> {
        if self.ids.is_empty() {
            return None;
        }
        let total: usize = self.lengths().iter().sum();
        Some(total as f64 / self.ids.len() as f64)
    }

    pub fn min_length(&self) -> Option<usize> {
        self.lengths().into_iter().min()
    }

    pub fn max_length(&self) -> Option<usize> {
        self.lengths().into_iter().max()
    }

    /// Middle length, or the mean of the two middle lengths for an even
    /// sample.
    pub fn median_length(&self) -> Option<f64> {
        let mut lengths = self.lengths();
        if lengths.is_empty() {
            return None;
        }
        lengths.sort_unstable();
        let n = lengths.len() / 2;
        if lengths.len() % 2 == 1 {
            Some(lengths[n] as f64)
        } else {
            Some(0.5 * (lengths[n - 1] + lengths[n]) as f64)
        }
    }

    pub fn statistics(&self) -> ChainStatistics {
        ChainStatistics {
            count: self.count(),
            average_length: self.average_length(),
            min_length: self.min_length(),
            max_length: self.max_length(),
            median_length: self.median_length(),
        }
    }

    /// Normal of the regression plane through the chain members.
    pub fn chain_normal(&self, chain: &[usize]) -> Result<Vector3<f64>> {
        let points: Vec<Vector3<f64>> = chain.iter().map(|&p| self.particles[p].position).collect();
        Ok(PlaneFit::fit(&points)?.normal())
    }

    /// Angle of the chain with the bed seen in the x-z view, degrees in
    /// `[0, 180]`; 0 and 180 mean horizontal.
    pub fn angle_with_bed(&self, chain: &[usize]) -> Result<f64> {
        let n = self.chain_normal(chain)?;
        Ok((n.z / n.x).atan().to_degrees() + 90.0)
    }

    /// `(chain index, angle)` for every sampled chain. Chains too short for
    /// a plane fit are skipped.
    pub fn angles_with_bed(&self) -> Vec<(usize, f64)> {
        let mut angles = Vec::with_capacity(self.ids.len());
        for &id in &self.ids {
            match self.angle_with_bed(&self.chains[id]) {
                Ok(angle) => angles.push((id, angle)),
                Err(err) => warn!(chain = id, %err, "skipping chain angle"),
            }
        }
        angles
    }
}

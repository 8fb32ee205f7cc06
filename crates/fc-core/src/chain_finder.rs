//! Force chain detection over a classified particle arena.
//!
//! Every particle with a minor stress that is not yet part of a chain
//! becomes a chain center. The chain grows from the center along its minor
//! direction, then along the opposite sense, accepting a neighbor when the
//! contact vector lines up with both minor axes within `alpha`. A link may
//! accept several neighbors, so a chain is a tree flattened in visiting
//! order. Attempts with fewer than three members are discarded.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, info, trace};

use crate::error::{ForceChainError, Result};
use crate::geometry::{angle_between, checked_angle_between};
use crate::particle::{LinkNode, Particle};
use crate::periodic::{Domain, periodic_adjust};
use crate::snapshot::validate_arena;

/// Particle ids of one chain, in the order they were reached.
pub type Chain = Vec<usize>;

/// Shortest chain that is kept.
pub const MIN_CHAIN_LEN: usize = 3;

pub struct ChainFinder<'a> {
    particles: &'a mut [Particle],
    /// Maximum deviation in radians, in `(0, pi/2]`
    alpha: f64,
    domain: Option<Domain>,
}

impl<'a> ChainFinder<'a> {
    pub fn new(particles: &'a mut [Particle], alpha: f64) -> Self {
        Self {
            particles,
            alpha,
            domain: None,
        }
    }

    /// Enables the periodic image correction for contacts that are farther
    /// apart than their radii allow.
    pub fn with_domain(mut self, domain: Option<Domain>) -> Self {
        self.domain = domain;
        self
    }

    /// Runs the sweep and returns the committed chains.
    ///
    /// The particles keep the chain ids, linkages, link nodes and flipped
    /// minor directions written during the search. Running again requires
    /// [`Particle::reset_for_search`] first.
    pub fn find_chains(mut self) -> Result<Vec<Chain>> {
        self.check_preconditions()?;
        let mut chains: Vec<Chain> = Vec::new();

        for center in 0..self.particles.len() {
            let candidate = &self.particles[center];
            if !candidate.has_minor_stress() || candidate.chain_id().is_some() {
                continue;
            }

            let mut chain = vec![center];
            self.particles[center].traversal.chain_id = Some(chains.len());
            self.grow_side(&mut chain, center)?;
            self.particles[center].scale_minor_dir(-1.0);
            self.grow_side(&mut chain, center)?;

            if chain.len() < MIN_CHAIN_LEN {
                for &member in &chain {
                    self.particles[member].traversal.chain_id = None;
                }
                if let &[_, second] = chain.as_slice()
                    && let Some(node) = self.particles[second].traversal.link_nodes.last_mut()
                {
                    node.discarded = true;
                }
                trace!(center, members = chain.len(), "discarded short chain");
            } else {
                debug!(chain = chains.len(), center, members = chain.len(), "committed chain");
                chains.push(chain);
            }
        }

        info!(
            chains = chains.len(),
            members = chains.iter().map(Vec::len).sum::<usize>(),
            alpha = self.alpha,
            "chain search finished"
        );
        Ok(chains)
    }

    fn check_preconditions(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= FRAC_PI_2) {
            return Err(ForceChainError::ContractViolation(format!(
                "alpha must lie in (0, pi/2], got {}",
                self.alpha
            )));
        }
        validate_arena(self.particles)?;
        for particle in self.particles.iter() {
            if !particle.is_classified() {
                return Err(ForceChainError::Precondition(format!(
                    "particle {} has not been classified",
                    particle.id
                )));
            }
            if !particle.traversal().is_fresh() {
                return Err(ForceChainError::Precondition(format!(
                    "particle {} carries state from an earlier search",
                    particle.id
                )));
            }
        }
        Ok(())
    }

    /// Depth-first growth from `root`. A frame holds a link and the index of
    /// its next neighbor to examine; an accepted neighbor is explored before
    /// the link's remaining neighbors.
    fn grow_side(&mut self, chain: &mut Chain, root: usize) -> Result<()> {
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (link, cursor) = *frame;
            let Some(&nei) = self.particles[link].neighbors.get(cursor) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let Some(sign) = self.is_next_link(link, nei)? else {
                continue;
            };

            chain.push(nei);
            let chain_id = self.particles[link].traversal.chain_id;
            self.particles[link].traversal.linkages.push(nei);

            let next = &mut self.particles[nei];
            next.traversal.chain_id = chain_id;
            next.traversal.link_nodes.push(LinkNode::entered_from(link));
            next.traversal.linkages.push(link);
            // The neighbor continues along the sense it was entered with.
            next.scale_minor_dir(-sign);

            stack.push((nei, 0));
        }
        Ok(())
    }

    /// Decides whether `nei` extends the chain at `link`. On acceptance
    /// returns the sign (`1.0` or `-1.0`) under which `nei`'s minor
    /// direction points back at `link`.
    fn is_next_link(&self, link: usize, nei: usize) -> Result<Option<f64>> {
        let l = &self.particles[link];
        let n = &self.particles[nei];

        let Some(nei_dir) = n.minor_dir() else {
            return Ok(None);
        };
        if n.chain_id().is_some() && n.chain_id() != l.chain_id() {
            return Ok(None);
        }
        if n.chain_id() == l.chain_id() && l.linkages().contains(&nei) {
            return Ok(None);
        }
        let link_dir = l.minor_dir().ok_or_else(|| {
            ForceChainError::Precondition(format!("link {link} has no minor stress"))
        })?;

        let mut xln = n.position - l.position;
        if xln.norm() > n.radius + l.radius
            && let Some(domain) = &self.domain
        {
            xln = periodic_adjust(&l.position, &n.position, domain) - l.position;
        }

        let forward = checked_angle_between(&xln, &link_dir).map_err(|_| {
            ForceChainError::Geometry(format!("particles {link} and {nei} share a center"))
        })?;
        if self.alpha <= forward && forward < PI - self.alpha {
            return Ok(None);
        }

        let mut back = angle_between(&(-xln), &nei_dir);
        let mut sign = 1.0;
        if back > FRAC_PI_2 {
            back = PI - back;
            sign = -1.0;
        }
        if back >= self.alpha {
            return Ok(None);
        }
        Ok(Some(sign))
    }
}

/// Convenience wrapper around [`ChainFinder`].
pub fn find_chains(
    particles: &mut [Particle],
    alpha: f64,
    domain: Option<Domain>,
) -> Result<Vec<Chain>> {
    ChainFinder::new(particles, alpha).with_domain(domain).find_chains()
}

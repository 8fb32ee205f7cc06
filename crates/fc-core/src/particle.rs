//! Particle records and minor principal stress classification.
//!
//! A particle's stress tensor is summed from its contacts, so it is only
//! nominally symmetric and its eigen-decomposition may produce complex
//! values. Complex numbers are confined to [`Particle::principal_stresses`];
//! everything derived from them (directions, minor stress) is real.

use nalgebra::{Complex, Matrix3, Vector3};
use tracing::warn;

/// Eigenvalues with `|imag|` above this are treated as non-real.
pub const IMAG_EPSILON: f64 = 1e-10;

/// A minor principal stress must be below this to count as compressive.
pub const COMPRESSIVE_THRESHOLD: f64 = -1e-14;

/// Most compressive principal stress and its unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinorStress {
    pub value: f64,
    pub dir: Vector3<f64>,
}

/// Entry recorded each time the traversal enters a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkNode {
    /// Particle the traversal came from
    pub predecessor: usize,
    /// Set when the entry closed a two-particle attempt that was discarded
    pub discarded: bool,
}

impl LinkNode {
    pub fn entered_from(predecessor: usize) -> Self {
        Self {
            predecessor,
            discarded: false,
        }
    }

    /// Predecessor id, negated for discarded entries.
    pub fn signed(&self) -> i64 {
        let id = self.predecessor as i64;
        if self.discarded { -id } else { id }
    }
}

/// Per-particle chain search state, written only by the chain finder.
///
/// The chain id doubles as the visited marker, so result and visited state
/// cannot drift apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalState {
    pub chain_id: Option<usize>,
    /// Ids already consumed as next link from (or into) this particle
    pub linkages: Vec<usize>,
    pub link_nodes: Vec<LinkNode>,
}

impl TraversalState {
    pub fn is_fresh(&self) -> bool {
        self.chain_id.is_none() && self.linkages.is_empty() && self.link_nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: usize,
    pub kind: usize,
    pub radius: f64,
    pub position: Vector3<f64>,
    pub force: Vector3<f64>,
    pub stress: Matrix3<f64>,
    /// Contact partners, symmetric across the snapshot
    pub neighbors: Vec<usize>,
    principal_stresses: Vector3<Complex<f64>>,
    principal_dirs: Matrix3<f64>,
    minor: Option<MinorStress>,
    classified: bool,
    pub(crate) traversal: TraversalState,
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(0, 0.0, Vector3::zeros())
    }
}

impl Particle {
    pub fn new(id: usize, radius: f64, position: Vector3<f64>) -> Self {
        Self {
            id,
            kind: 0,
            radius,
            position,
            force: Vector3::zeros(),
            stress: Matrix3::zeros(),
            neighbors: Vec::new(),
            principal_stresses: Vector3::zeros(),
            principal_dirs: Matrix3::zeros(),
            minor: None,
            classified: false,
            traversal: TraversalState::default(),
        }
    }

    pub fn with_kind(mut self, kind: usize) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_stress(mut self, stress: Matrix3<f64>) -> Self {
        self.stress = stress;
        self
    }

    pub fn with_neighbors(mut self, neighbors: Vec<usize>) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3)
    }

    /// Derives principal stresses, directions and the minor stress from
    /// `stress`.
    ///
    /// Tensile, degenerate or non-real tensors are not errors; they leave
    /// the particle without a minor stress and out of chain detection.
    pub fn classify(&mut self) {
        self.classified = true;
        self.minor = None;
        self.principal_stresses = Vector3::zeros();
        self.principal_dirs = Matrix3::zeros();

        if self.stress.iter().any(|v| !v.is_finite()) {
            warn!(particle = self.id, "non-finite stress tensor, no minor stress");
            return;
        }

        let eigenvalues = self.stress.complex_eigenvalues();
        for (i, lambda) in eigenvalues.iter().enumerate() {
            if lambda.im.abs() > IMAG_EPSILON {
                continue;
            }
            if let Some(dir) = real_eigenvector(&self.stress, lambda.re) {
                self.principal_dirs.set_column(i, &dir);
            }
        }
        self.principal_stresses = eigenvalues;

        // First of equal minima wins.
        let mut smallest: Option<(usize, f64)> = None;
        for (i, lambda) in eigenvalues.iter().enumerate() {
            if lambda.im.abs() > IMAG_EPSILON {
                continue;
            }
            match smallest {
                Some((_, value)) if value <= lambda.re => {}
                _ => smallest = Some((i, lambda.re)),
            }
        }

        self.minor = smallest
            .filter(|&(_, value)| value < COMPRESSIVE_THRESHOLD)
            .and_then(|(i, value)| {
                let dir = self.principal_dirs.column(i).into_owned().try_normalize(0.0)?;
                Some(MinorStress { value, dir })
            });
    }

    pub fn is_classified(&self) -> bool {
        self.classified
    }

    /// Raw eigenvalues of `stress`, possibly complex.
    pub fn principal_stresses(&self) -> &Vector3<Complex<f64>> {
        &self.principal_stresses
    }

    /// Real parts of the principal stresses, zero for non-real ones.
    pub fn real_principal_stresses(&self) -> Vector3<f64> {
        self.principal_stresses.map(|c| if c.im.abs() > IMAG_EPSILON { 0.0 } else { c.re })
    }

    /// Unit principal directions as columns, zero columns for non-real
    /// principal stresses.
    pub fn principal_dirs(&self) -> &Matrix3<f64> {
        &self.principal_dirs
    }

    pub fn minor(&self) -> Option<&MinorStress> {
        self.minor.as_ref()
    }

    pub fn has_minor_stress(&self) -> bool {
        self.minor.is_some()
    }

    pub fn minor_stress(&self) -> Option<f64> {
        self.minor.map(|m| m.value)
    }

    /// Current minor direction. Its sign may have been flipped by the chain
    /// finder to follow the direction of travel.
    pub fn minor_dir(&self) -> Option<Vector3<f64>> {
        self.minor.map(|m| m.dir)
    }

    pub fn chain_id(&self) -> Option<usize> {
        self.traversal.chain_id
    }

    pub fn linkages(&self) -> &[usize] {
        &self.traversal.linkages
    }

    pub fn link_nodes(&self) -> &[LinkNode] {
        &self.traversal.link_nodes
    }

    pub fn traversal(&self) -> &TraversalState {
        &self.traversal
    }

    /// Clears chain search state and re-derives the minor direction, so the
    /// particle can take part in a new search.
    pub fn reset_for_search(&mut self) {
        self.traversal = TraversalState::default();
        if self.classified {
            self.classify();
        }
    }

    pub(crate) fn scale_minor_dir(&mut self, factor: f64) {
        if let Some(minor) = self.minor.as_mut() {
            minor.dir *= factor;
        }
    }
}

/// Unit right eigenvector of `a` for the real eigenvalue `lambda`: the right
/// singular vector of `a - lambda I` with the smallest singular value.
fn real_eigenvector(a: &Matrix3<f64>, lambda: f64) -> Option<Vector3<f64>> {
    let shifted = a - Matrix3::identity() * lambda;
    let svd = shifted.svd(false, true);
    let v_t = svd.v_t?;
    let k = svd.singular_values.imin();
    v_t.row(k).transpose().try_normalize(0.0)
}

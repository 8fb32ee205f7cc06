//! Force-chain detection for DEM granular snapshots.
//!
//! This crate provides:
//! - **Snapshot assembly**: particle arena, symmetric contacts and the
//!   per-particle stress tensor summed from pair and wall contacts
//! - **Stress classification**: principal stresses and the minor
//!   (most compressive) direction of every particle
//! - **Chain detection**: two-sided, branching growth of aligned contacts
//!   with single-image periodic correction
//! - **Statistics**: particle filters, chain samples, length statistics and
//!   regression-plane chain angles
//! - **Diagnostics**: a readable stress report for one particle

pub mod chain_finder;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod particle;
pub mod periodic;
pub mod pipeline;
pub mod regression;
pub mod snapshot;
pub mod stat;

pub use chain_finder::{Chain, ChainFinder, MIN_CHAIN_LEN, find_chains};
pub use diagnostics::StressDiagnostics;
pub use error::{ForceChainError, Result};
pub use filter::{BoxFilter, ParticleFilter};
pub use geometry::{angle_between, checked_angle_between};
pub use particle::{
    COMPRESSIVE_THRESHOLD, IMAG_EPSILON, LinkNode, MinorStress, Particle, TraversalState,
};
pub use periodic::{Domain, periodic_adjust};
pub use pipeline::{ChainAnalysis, SnapshotInput, load_snapshot};
pub use regression::PlaneFit;
pub use snapshot::Snapshot;
pub use stat::{ChainSample, ChainStatistics};

//! Error types for fc-core

use fc_dump::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForceChainError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForceChainError {
    /// A direction was required from a zero-length vector.
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Input broke a structural contract (ids, adjacency, parameters).
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// A stage was invoked on state that was not prepared for it.
    #[error("Failed precondition: {0}")]
    Precondition(String),

    #[error("Dump parse error: {0}")]
    Parse(#[from] ParseError),
}

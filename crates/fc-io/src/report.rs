use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fc_core::ChainStatistics;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Machine-readable summary of one analysed snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub schema_version: u32,
    /// RFC 3339 creation time
    pub created_at: String,
    pub timestep: Option<u64>,
    /// Alignment tolerance in radians
    pub alpha: f64,
    pub particle_count: usize,
    pub chain_count: usize,
    pub statistics: ChainStatistics,
    /// Statistics of the filtered sample, if a filter was applied
    pub filtered: Option<ChainStatistics>,
    /// Input and output paths keyed by role
    pub files: BTreeMap<String, String>,
}

impl RunReport {
    pub fn new(
        timestep: Option<u64>,
        alpha: f64,
        particle_count: usize,
        statistics: ChainStatistics,
    ) -> Self {
        Self {
            schema_version: 1,
            created_at: chrono::Utc::now().to_rfc3339(),
            timestep,
            alpha,
            particle_count,
            chain_count: statistics.count,
            statistics,
            filtered: None,
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, role: &str, path: impl AsRef<Path>) -> Self {
        self.files
            .insert(role.to_string(), path.as_ref().display().to_string());
        self
    }
}

pub fn save_report(path: impl AsRef<Path>, report: &RunReport) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(report)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_report(path: impl AsRef<Path>) -> Result<RunReport> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

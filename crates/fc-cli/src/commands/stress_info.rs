use anyhow::{Context, Result, bail};
use fc_core::{StressDiagnostics, load_snapshot};

use super::snapshot_input;
use crate::config::ConfigFile;

pub fn run(config: &ConfigFile, particle: usize) -> Result<()> {
    let input = snapshot_input(config)?;
    let snapshot = load_snapshot(&input)
        .with_context(|| format!("failed to load {}", input.particles.display()))?;

    // Slot 0 is the arena placeholder, not a dump particle.
    if particle == 0 || particle >= snapshot.particles.len() {
        bail!(
            "particle {particle} not in snapshot (ids run from 1 to {})",
            snapshot.particles.len().saturating_sub(1)
        );
    }
    println!("{}", StressDiagnostics::new(&snapshot.particles[particle]));
    Ok(())
}

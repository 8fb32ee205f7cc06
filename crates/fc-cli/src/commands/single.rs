use std::io;

use anyhow::{Context, Result};
use fc_io::{RunReport, VtpWriter, save_report, write_chain_listing, write_chains_csv};
use tracing::info;

use super::{analyse, csv_options, output_base, snapshot_input};
use crate::cli::CsvArgs;
use crate::config::{ConfigFile, with_suffix};

pub fn run(config: &ConfigFile, csv: &CsvArgs, list: bool) -> Result<()> {
    let input = snapshot_input(config)?;
    let base = output_base(config)?;
    let analysis = analyse(&input, config.alpha())?;

    let csv_path = with_suffix(&base, ".csv");
    let vtp_path = with_suffix(&base, ".vtp");
    let report_path = with_suffix(&base, ".json");

    write_chains_csv(&csv_path, analysis.particles(), &csv_options(csv))
        .with_context(|| format!("failed to write {}", csv_path.display()))?;
    VtpWriter::new(&analysis.chains, analysis.particles())
        .write_all(&vtp_path)
        .with_context(|| format!("failed to write {}", vtp_path.display()))?;

    let statistics = analysis.sample().statistics();
    let report = RunReport::new(
        analysis.snapshot.timestep,
        analysis.alpha,
        analysis.particles().len(),
        statistics,
    )
    .with_file("particles", &input.particles)
    .with_file("pairs", &input.pairs)
    .with_file("csv", &csv_path)
    .with_file("vtp", &vtp_path);
    save_report(&report_path, &report)
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    if list {
        write_chain_listing(&mut io::stdout().lock(), &analysis.chains, analysis.particles())?;
    }

    info!(
        chains = analysis.chains.len(),
        output = %base.display(),
        "single snapshot done"
    );
    Ok(())
}

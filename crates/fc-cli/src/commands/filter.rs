use anyhow::{Context, Result};
use fc_io::{RunReport, VtpWriter, save_report, write_angles_csv, write_box_vtk, write_filtered_csv};
use tracing::info;

use super::{analyse, apply_filters, csv_options, output_base, snapshot_input};
use crate::cli::{CsvArgs, FilterArgs};
use crate::config::{ConfigFile, with_suffix};

pub fn run(config: &ConfigFile, csv: &CsvArgs, filters: &FilterArgs) -> Result<()> {
    let input = snapshot_input(config)?;
    let base = output_base(config)?;
    let bounds = filters.box_filter()?;
    let analysis = analyse(&input, config.alpha())?;

    let all = analysis.sample().statistics();
    let mut sample = analysis.sample();
    apply_filters(&mut sample, filters.min_minor_stress, bounds.as_ref());
    let filtered = sample.statistics();

    let csv_path = with_suffix(&base, ".csv");
    let vtp_path = with_suffix(&base, ".vtp");
    let angles_path = with_suffix(&base, "_angles.csv");
    write_filtered_csv(
        &csv_path,
        &analysis.chains,
        sample.ids(),
        analysis.particles(),
        &csv_options(csv),
    )
    .with_context(|| format!("failed to write {}", csv_path.display()))?;
    VtpWriter::new(&analysis.chains, analysis.particles())
        .write_filtered(&vtp_path, sample.ids())
        .with_context(|| format!("failed to write {}", vtp_path.display()))?;
    write_angles_csv(&angles_path, &sample.angles_with_bed())
        .with_context(|| format!("failed to write {}", angles_path.display()))?;

    let mut report = RunReport::new(
        analysis.snapshot.timestep,
        analysis.alpha,
        analysis.particles().len(),
        all,
    )
    .with_file("particles", &input.particles)
    .with_file("pairs", &input.pairs)
    .with_file("csv", &csv_path)
    .with_file("vtp", &vtp_path)
    .with_file("angles", &angles_path);

    if let Some(bounds) = &bounds {
        let box_path = with_suffix(&base, "_box.vtk");
        write_box_vtk(&box_path, bounds)
            .with_context(|| format!("failed to write {}", box_path.display()))?;
        report = report.with_file("box", &box_path);
    }
    report.filtered = Some(filtered.clone());
    save_report(with_suffix(&base, ".json"), &report)?;

    println!("Sample info:");
    println!("num of chains: {}", filtered.count);
    println!("Average Length: {}", display_or_dash(filtered.average_length));
    println!("Max Length: {}", display_or_dash(filtered.max_length));
    println!("Min Length: {}", display_or_dash(filtered.min_length));
    println!("Median Length: {}", display_or_dash(filtered.median_length));

    info!(
        chains = analysis.chains.len(),
        kept = filtered.count,
        output = %base.display(),
        "filtered snapshot done"
    );
    Ok(())
}

fn display_or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub mod batch;
pub mod filter;
pub mod single;
pub mod stress_info;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use fc_core::{BoxFilter, ChainAnalysis, ChainSample, ParticleFilter, SnapshotInput};
use fc_io::CsvOptions;

use crate::cli::{CsvArgs, FilterArgs};
use crate::config::ConfigFile;

/// Dump paths of a single snapshot.
pub fn snapshot_input(config: &ConfigFile) -> Result<SnapshotInput> {
    let dir = config.input_dir();
    Ok(SnapshotInput {
        particles: dir.join(ConfigFile::require(&config.particle_file_name, "particleFile_name")?),
        pairs: dir.join(ConfigFile::require(&config.pair_file_name, "pairFile_name")?),
        walls: config.wall_name().map(|name| dir.join(name)),
    })
}

/// Output path without extension.
pub fn output_base(config: &ConfigFile) -> Result<PathBuf> {
    let name = ConfigFile::require(&config.output_file_name, "outputFile_name")?;
    Ok(config.output_dir().join(name))
}

pub fn analyse(input: &SnapshotInput, alpha: f64) -> Result<ChainAnalysis> {
    ChainAnalysis::from_files(input, alpha)
        .with_context(|| format!("failed to analyse {}", input.particles.display()))
}

pub fn csv_options(args: &CsvArgs) -> CsvOptions {
    CsvOptions {
        with_headers: !args.no_headers,
        delimiter: args.delimiter.clone(),
    }
}

/// `XMIN XMAX YMIN YMAX ZMIN ZMAX` as a box.
pub fn box_filter(bounds: &[f64]) -> Result<BoxFilter> {
    let &[x0, x1, y0, y1, z0, z1] = bounds else {
        bail!("--box expects 6 values, got {}", bounds.len());
    };
    if x0 > x1 || y0 > y1 || z0 > z1 {
        bail!("--box lower bounds must not exceed upper bounds");
    }
    Ok(BoxFilter::new([x0, y0, z0], [x1, y1, z1]))
}

/// Narrows `sample` to chains with a strong enough member, then to chains
/// fully inside `bounds`.
pub fn apply_filters(
    sample: &mut ChainSample<'_>,
    min_minor_stress: Option<f64>,
    bounds: Option<&BoxFilter>,
) {
    if let Some(threshold) = min_minor_stress {
        sample.apply_filter_any(&ParticleFilter::MinorStressAtLeast(threshold));
    }
    if let Some(bounds) = bounds {
        sample.apply_filter_all(&ParticleFilter::Box(*bounds));
    }
}

impl FilterArgs {
    pub fn box_filter(&self) -> Result<Option<BoxFilter>> {
        self.bounds.as_deref().map(box_filter).transpose()
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use fc_core::{BoxFilter, SnapshotInput};
use fc_io::{VtpWriter, numeric_file_names, write_box_vtk, write_chains_csv};
use rayon::prelude::*;
use tracing::{error, info};

use super::{analyse, apply_filters, csv_options};
use crate::cli::{CsvArgs, FilterArgs};
use crate::config::{ConfigFile, with_suffix};

/// Settings for the moving box of a series.
pub struct MovingBox {
    pub initial: BoxFilter,
    pub speed: f64,
    pub delay: usize,
}

impl MovingBox {
    /// Box at series position `index`: still for the first `delay + 1`
    /// steps, then shifted along x by `speed` per step.
    pub fn at(&self, index: usize) -> BoxFilter {
        let offset = if index > self.delay {
            (index - self.delay) as f64 * self.speed
        } else {
            0.0
        };
        self.initial.shifted([offset, 0.0, 0.0])
    }
}

/// File names of one series step.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStep {
    pub input: SnapshotInput,
    pub output: PathBuf,
}

pub fn series_steps(config: &ConfigFile) -> Result<Vec<SeriesStep>> {
    let dir = config.input_dir();
    let prefix = |name: &str| dir.join(name).display().to_string();
    let (Some(start), Some(last), Some(step)) = (config.start, config.last, config.step) else {
        bail!("batch runs need `start`, `last` and `step`");
    };

    let particle_name = ConfigFile::require(&config.particle_file_name, "particleFile_name")?;
    let particle_ext = config.particle_file_ext.as_deref().unwrap_or(".liggghts");
    let pair_name = config.pair_file_name.as_deref().unwrap_or("pair");
    let output_name = config.output_file_name.as_deref().unwrap_or("forceChains_");

    let particles = numeric_file_names(&prefix(particle_name), particle_ext, start, last, step)?;
    let pairs = numeric_file_names(&prefix(pair_name), ".txt", start, last, step)?;
    let walls = match config.wall_name() {
        Some(name) => {
            let ext = config.pair_wall_ext.as_deref().unwrap_or(".txt");
            Some(numeric_file_names(&prefix(name), ext, start, last, step)?)
        }
        None => None,
    };
    let outputs = numeric_file_names(
        &config.output_dir().join(output_name).display().to_string(),
        "",
        start,
        last,
        step,
    )?;

    Ok(particles
        .into_iter()
        .zip(pairs)
        .zip(outputs)
        .enumerate()
        .map(|(i, ((particles, pairs), output))| SeriesStep {
            input: SnapshotInput {
                particles: PathBuf::from(particles),
                pairs: PathBuf::from(pairs),
                walls: walls.as_ref().map(|w| PathBuf::from(&w[i])),
            },
            output: PathBuf::from(output),
        })
        .collect())
}

pub fn run(
    config: &ConfigFile,
    csv: &CsvArgs,
    filters: &FilterArgs,
    box_speed: f64,
    box_delay: usize,
) -> Result<()> {
    let steps = series_steps(config)?;
    let options = csv_options(csv);
    let moving = filters.box_filter()?.map(|initial| MovingBox {
        initial,
        speed: box_speed,
        delay: box_delay,
    });
    let alpha = config.alpha();
    info!(steps = steps.len(), alpha, "starting batch");

    let failures: Vec<(usize, anyhow::Error)> = steps
        .par_iter()
        .enumerate()
        .filter_map(|(index, step)| {
            let result = process_step(step, index, alpha, &options, filters, moving.as_ref());
            result.err().map(|err| (index, err))
        })
        .collect();

    for (index, err) in &failures {
        error!(step = index, "{err:#}");
    }
    if !failures.is_empty() {
        bail!("{} of {} snapshots failed", failures.len(), steps.len());
    }
    info!(steps = steps.len(), "batch done");
    Ok(())
}

fn process_step(
    step: &SeriesStep,
    index: usize,
    alpha: f64,
    options: &fc_io::CsvOptions,
    filters: &FilterArgs,
    moving: Option<&MovingBox>,
) -> Result<()> {
    let analysis = analyse(&step.input, alpha)?;
    let csv_path = with_suffix(&step.output, ".csv");
    write_chains_csv(&csv_path, analysis.particles(), options)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    if let Some(moving) = moving {
        let bounds = moving.at(index);
        let mut sample = analysis.sample();
        apply_filters(&mut sample, filters.min_minor_stress, Some(&bounds));
        write_box_vtk(with_suffix(&step.output, "_box.vtk"), &bounds)?;
        VtpWriter::new(&analysis.chains, analysis.particles())
            .write_filtered(with_suffix(&step.output, ".vtp"), sample.ids())?;
    }

    info!(
        file = %step.input.particles.display(),
        chains = analysis.chains.len(),
        "snapshot done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_waits_for_delay_then_moves() {
        let moving = MovingBox {
            initial: BoxFilter::new([0.0, 0.03, 0.0], [0.05, 0.07, 0.0055]),
            speed: 0.5,
            delay: 2,
        };
        assert_eq!(moving.at(0).min[0], 0.0);
        assert_eq!(moving.at(2).min[0], 0.0);
        assert_eq!(moving.at(3).min[0], 0.5);
        assert!((moving.at(4).max[0] - 1.05).abs() < 1e-12);
        assert_eq!(moving.at(4).min[1], 0.03);
    }

    #[test]
    fn series_names_follow_numbering() {
        let config = ConfigFile {
            input_path: Some("post".to_string()),
            particle_file_name: Some("compress".to_string()),
            pair_wall_name: Some("wall_pair".to_string()),
            output_path: Some("out".to_string()),
            start: Some(0),
            last: Some(1000),
            step: Some(500),
            ..ConfigFile::default()
        };
        let steps = series_steps(&config).expect("steps");
        assert_eq!(steps.len(), 3);
        let post = PathBuf::from("post");
        let named =
            |name: &str, ext: &str| PathBuf::from(format!("{}{ext}", post.join(name).display()));
        assert_eq!(steps[1].input.particles, named("compress500", ".liggghts"));
        assert_eq!(steps[2].input.pairs, named("pair1000", ".txt"));
        assert_eq!(steps[0].input.walls, Some(named("wall_pair0", ".txt")));
        assert_eq!(steps[2].output, PathBuf::from("out").join("forceChains_1000"));
    }

    #[test]
    fn series_without_range_is_rejected() {
        let config = ConfigFile {
            particle_file_name: Some("compress".to_string()),
            ..ConfigFile::default()
        };
        assert!(series_steps(&config).is_err());
    }
}

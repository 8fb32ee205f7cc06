use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigFile;

#[derive(Parser)]
#[command(name = "fc-cli")]
#[command(version, about = "Detect force chains in LIGGGHTS snapshots")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Parameter file with `key=value` lines; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find chains in one snapshot and write CSV, VTP and a JSON report
    Single {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        #[command(flatten)]
        csv: CsvArgs,

        /// Print every chain on stdout
        #[arg(long)]
        list: bool,
    },

    /// Like `single`, keeping only chains that pass the filters
    Filter {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        #[command(flatten)]
        csv: CsvArgs,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Process a numbered series of snapshots in parallel
    Batch {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        #[command(flatten)]
        series: SeriesArgs,

        #[command(flatten)]
        csv: CsvArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Box displacement along x per step once the delay has passed
        #[arg(long, default_value_t = 0.0)]
        box_speed: f64,

        /// Number of steps before the box starts moving
        #[arg(long, default_value_t = 0)]
        box_delay: usize,
    },

    /// Print the stress decomposition of one particle
    StressInfo {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Particle id as it appears in the dump
        #[arg(long)]
        particle: usize,
    },
}

/// Input and output locations of a snapshot; each overrides the matching
/// configuration key.
#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotArgs {
    /// Directory holding the dumps (`inputPath`)
    #[arg(long)]
    pub input_path: Option<String>,

    /// Particle dump name (`particleFile_name`)
    #[arg(long)]
    pub particle_file: Option<String>,

    /// Pair dump name (`pairFile_name`)
    #[arg(long)]
    pub pair_file: Option<String>,

    /// Wall dump name (`pairWall_name`)
    #[arg(long)]
    pub wall_file: Option<String>,

    /// Output directory (`outputPath`)
    #[arg(long)]
    pub output_path: Option<String>,

    /// Output base name without extension (`outputFile_name`)
    #[arg(long)]
    pub output_name: Option<String>,

    /// Maximum alignment deviation in radians (`alpha`)
    #[arg(long)]
    pub alpha: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SeriesArgs {
    /// First file number (`start`)
    #[arg(long)]
    pub start: Option<usize>,

    /// Last file number, inclusive (`last`)
    #[arg(long)]
    pub last: Option<usize>,

    /// File number increment (`step`)
    #[arg(long)]
    pub step: Option<usize>,

    /// Particle dump extension (`particleFile_ext`)
    #[arg(long)]
    pub particle_ext: Option<String>,

    /// Wall dump extension (`pairWall_ext`)
    #[arg(long)]
    pub wall_ext: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CsvArgs {
    /// Omit the header row
    #[arg(long)]
    pub no_headers: bool,

    /// Field delimiter
    #[arg(long, default_value = ",")]
    pub delimiter: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep chains lying entirely inside the box
    #[arg(
        long = "box",
        num_args = 6,
        value_names = ["XMIN", "XMAX", "YMIN", "YMAX", "ZMIN", "ZMAX"],
        allow_negative_numbers = true
    )]
    pub bounds: Option<Vec<f64>>,

    /// Keep chains with at least one member whose minor stress magnitude
    /// reaches this value
    #[arg(long, allow_negative_numbers = true)]
    pub min_minor_stress: Option<f64>,
}

impl SnapshotArgs {
    /// Flags as a configuration layer.
    pub fn as_config(&self) -> ConfigFile {
        ConfigFile {
            input_path: self.input_path.clone(),
            particle_file_name: self.particle_file.clone(),
            pair_file_name: self.pair_file.clone(),
            pair_wall_name: self.wall_file.clone(),
            output_path: self.output_path.clone(),
            output_file_name: self.output_name.clone(),
            alpha: self.alpha,
            ..ConfigFile::default()
        }
    }
}

impl SeriesArgs {
    pub fn as_config(&self) -> ConfigFile {
        ConfigFile {
            start: self.start,
            last: self.last,
            step: self.step,
            particle_file_ext: self.particle_ext.clone(),
            pair_wall_ext: self.wall_ext.clone(),
            ..ConfigFile::default()
        }
    }
}

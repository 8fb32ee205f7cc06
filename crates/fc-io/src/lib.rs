//! Output formats for detected force chains.
//!
//! This crate provides:
//! - **CSV** tables of chain members and chain angles with the bed
//! - **VTP XML** point clouds for ParaView, plus a legacy **VTK** box for
//!   the filter region
//! - **Chain listings** for quick inspection on a terminal
//! - **JSON run reports** saved and loaded with serde
//! - **Numbered file names** for snapshot series

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

pub mod csv;
mod error;
mod listing;
mod names;
mod report;
pub mod vtk;

pub use csv::{
    CHAIN_COLUMNS, CsvOptions, link_nodes_cell, write_angles_csv, write_chains_csv,
    write_filtered_csv,
};
pub use error::{IoError, Result};
pub use listing::write_chain_listing;
pub use names::numeric_file_names;
pub use report::{RunReport, load_report, save_report};
pub use vtk::{VtpWriter, write_box_vtk};

/// Creates `path` for writing, along with any missing parent directories.
pub(crate) fn create_output(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

//! ParaView output for chains and filter boxes
//!
//! - **VTP XML**: ASCII PolyData with one vertex per chain member (.vtp)
//! - **VTK Legacy**: unstructured grid holding a single box (.vtk)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fc_core::{BoxFilter, Chain, Particle};
//! use fc_io::{VtpWriter, write_box_vtk};
//!
//! # let chains: Vec<Chain> = Vec::new();
//! # let particles: Vec<Particle> = Vec::new();
//! let writer = VtpWriter::new(&chains, &particles);
//! writer.write_all("chains.vtp")?;
//! write_box_vtk("box.vtk", &BoxFilter::new([0.0; 3], [1.0; 3]))?;
//! # Ok::<(), fc_io::IoError>(())
//! ```

use std::io::Write;
use std::path::Path;

use fc_core::{BoxFilter, Chain, Particle};
use tracing::debug;

use crate::create_output;
use crate::error::{IoError, Result};

/// VTK cell type code of an eight-node brick
const VTK_HEXAHEDRON: u8 = 12;

/// Writes chain members as a point cloud.
pub struct VtpWriter<'a> {
    chains: &'a [Chain],
    particles: &'a [Particle],
}

impl<'a> VtpWriter<'a> {
    pub fn new(chains: &'a [Chain], particles: &'a [Particle]) -> Self {
        Self { chains, particles }
    }

    /// Write every chain
    pub fn write_all(&self, path: impl AsRef<Path>) -> Result<()> {
        let ids: Vec<usize> = (0..self.chains.len()).collect();
        self.write_filtered(path, &ids)
    }

    /// Write the chains listed in `chain_ids`, in that order
    pub fn write_filtered(&self, path: impl AsRef<Path>, chain_ids: &[usize]) -> Result<()> {
        let path = path.as_ref();
        let members = self.members(chain_ids)?;
        let mut out = create_output(path)?;
        self.write_document(&mut out, &members)?;
        out.flush()?;
        debug!(path = %path.display(), points = members.len(), "wrote vtp");
        Ok(())
    }

    fn members(&self, chain_ids: &[usize]) -> Result<Vec<&'a Particle>> {
        let mut members = Vec::new();
        for &id in chain_ids {
            let chain = self.chains.get(id).ok_or_else(|| {
                IoError::InvalidArgument(format!("chain {id} does not exist"))
            })?;
            for &member in chain {
                members.push(self.particles.get(member).ok_or_else(|| {
                    IoError::InvalidArgument(format!("chain {id} lists unknown particle {member}"))
                })?);
            }
        }
        Ok(members)
    }

    fn write_document<W: Write>(&self, out: &mut W, members: &[&Particle]) -> Result<()> {
        let n = members.len();
        writeln!(out, "<?xml version=\"1.0\"?>")?;
        writeln!(
            out,
            "<VTKFile type=\"PolyData\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        writeln!(out, "  <PolyData>")?;
        writeln!(
            out,
            "    <Piece NumberOfPoints=\"{n}\" NumberOfVerts=\"{n}\" NumberOfLines=\"0\" NumberOfStrips=\"0\" NumberOfPolys=\"0\">"
        )?;

        writeln!(out, "      <PointData>")?;
        write_array(out, "Int32", "LiggghtsId", members.iter().map(|p| p.id.to_string()))?;
        write_array(
            out,
            "Int32",
            "chainId",
            members
                .iter()
                .map(|p| p.chain_id().map_or_else(|| "-1".to_string(), |c| c.to_string())),
        )?;
        write_array(
            out,
            "Float64",
            "MinorStress",
            members.iter().map(|p| p.minor_stress().unwrap_or(0.0).to_string()),
        )?;
        write_array(out, "Float64", "Radius", members.iter().map(|p| p.radius.to_string()))?;
        writeln!(out, "      </PointData>")?;

        writeln!(out, "      <Points>")?;
        writeln!(
            out,
            "        <DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">"
        )?;
        for p in members {
            writeln!(out, "          {} {} {}", p.position.x, p.position.y, p.position.z)?;
        }
        writeln!(out, "        </DataArray>")?;
        writeln!(out, "      </Points>")?;

        // One vertex cell per point
        writeln!(out, "      <Verts>")?;
        write_array(out, "Int32", "connectivity", (0..n).map(|i| i.to_string()))?;
        write_array(out, "Int32", "offsets", (1..=n).map(|i| i.to_string()))?;
        writeln!(out, "      </Verts>")?;

        writeln!(out, "    </Piece>")?;
        writeln!(out, "  </PolyData>")?;
        writeln!(out, "</VTKFile>")?;
        Ok(())
    }
}

fn write_array<W: Write>(
    out: &mut W,
    kind: &str,
    name: &str,
    values: impl Iterator<Item = String>,
) -> Result<()> {
    writeln!(
        out,
        "        <DataArray type=\"{kind}\" Name=\"{name}\" format=\"ascii\">"
    )?;
    let values: Vec<String> = values.collect();
    if !values.is_empty() {
        writeln!(out, "          {}", values.join(" "))?;
    }
    writeln!(out, "        </DataArray>")?;
    Ok(())
}

/// Writes the box as a legacy VTK unstructured grid with one hexahedron.
pub fn write_box_vtk(path: impl AsRef<Path>, bounds: &BoxFilter) -> Result<()> {
    let mut out = create_output(path.as_ref())?;
    writeln!(out, "# vtk DataFile Version 3.0")?;
    writeln!(out, "Filter box")?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET UNSTRUCTURED_GRID")?;

    let corners = bounds.corners();
    writeln!(out, "POINTS {} double", corners.len())?;
    for c in &corners {
        writeln!(out, "{} {} {}", c[0], c[1], c[2])?;
    }

    writeln!(out, "CELLS 1 {}", corners.len() + 1)?;
    write!(out, "{}", corners.len())?;
    for i in 0..corners.len() {
        write!(out, " {i}")?;
    }
    writeln!(out)?;
    writeln!(out, "CELL_TYPES 1")?;
    writeln!(out, "{VTK_HEXAHEDRON}")?;
    out.flush()?;
    Ok(())
}

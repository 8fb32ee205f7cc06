//! Delimited text output of chain members and chain angles.

use std::io::Write;
use std::path::Path;

use fc_core::{Chain, Particle};
use tracing::debug;

use crate::error::{IoError, Result};
use crate::create_output;

/// Column names of the chain member table.
pub const CHAIN_COLUMNS: [&str; 23] = [
    "LiggghtsId",
    "X",
    "Y",
    "Z",
    "radius",
    "chainId",
    "minorStress",
    "minorDirX",
    "minorDirY",
    "minorDirZ",
    "PrincipleStress0",
    "PrincipleStress1",
    "PrincipleStress2",
    "StressDir00",
    "StressDir10",
    "StressDir20",
    "StressDir01",
    "StressDir11",
    "StressDir21",
    "StressDir02",
    "StressDir12",
    "StressDir22",
    "linkNodes",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub with_headers: bool,
    pub delimiter: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            with_headers: true,
            delimiter: ",".to_string(),
        }
    }
}

/// Writes every particle that carries a chain id, in arena order.
pub fn write_chains_csv(
    path: impl AsRef<Path>,
    particles: &[Particle],
    options: &CsvOptions,
) -> Result<()> {
    let path = path.as_ref();
    let mut out = create_output(path)?;
    write_header(&mut out, options)?;
    let mut rows = 0;
    for particle in particles.iter().filter(|p| p.chain_id().is_some()) {
        write_row(&mut out, particle, options)?;
        rows += 1;
    }
    out.flush()?;
    debug!(path = %path.display(), rows, "wrote chain csv");
    Ok(())
}

/// Writes the members of the chains listed in `chain_ids`, chain by chain.
pub fn write_filtered_csv(
    path: impl AsRef<Path>,
    chains: &[Chain],
    chain_ids: &[usize],
    particles: &[Particle],
    options: &CsvOptions,
) -> Result<()> {
    let path = path.as_ref();
    let mut out = create_output(path)?;
    write_header(&mut out, options)?;
    for &id in chain_ids {
        let chain = chains.get(id).ok_or_else(|| {
            IoError::InvalidArgument(format!("chain {id} does not exist ({} chains)", chains.len()))
        })?;
        for &member in chain {
            let particle = particles.get(member).ok_or_else(|| {
                IoError::InvalidArgument(format!("chain {id} lists unknown particle {member}"))
            })?;
            write_row(&mut out, particle, options)?;
        }
    }
    out.flush()?;
    debug!(path = %path.display(), chains = chain_ids.len(), "wrote filtered chain csv");
    Ok(())
}

/// `chain,angle` per line, no header.
pub fn write_angles_csv(path: impl AsRef<Path>, angles: &[(usize, f64)]) -> Result<()> {
    let mut out = create_output(path.as_ref())?;
    for (chain, angle) in angles {
        writeln!(out, "{chain},{angle}")?;
    }
    out.flush()?;
    Ok(())
}

fn write_header<W: Write>(out: &mut W, options: &CsvOptions) -> Result<()> {
    if options.with_headers {
        writeln!(out, "{}", CHAIN_COLUMNS.join(options.delimiter.as_str()))?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, particle: &Particle, options: &CsvOptions) -> Result<()> {
    let minor_dir = particle.minor_dir().map_or([0.0; 3], |d| [d.x, d.y, d.z]);
    let principal = particle.real_principal_stresses();
    let dirs = particle.principal_dirs();

    let mut fields: Vec<String> = vec![
        particle.id.to_string(),
        particle.position.x.to_string(),
        particle.position.y.to_string(),
        particle.position.z.to_string(),
        particle.radius.to_string(),
        particle
            .chain_id()
            .map_or_else(|| "-1".to_string(), |id| id.to_string()),
        particle.minor_stress().unwrap_or(0.0).to_string(),
    ];
    fields.extend(minor_dir.iter().map(f64::to_string));
    fields.extend(principal.iter().map(f64::to_string));
    for k in 0..3 {
        for j in 0..3 {
            fields.push(dirs[(j, k)].to_string());
        }
    }
    fields.push(link_nodes_cell(particle));

    writeln!(out, "{}", fields.join(options.delimiter.as_str()))?;
    Ok(())
}

/// `starting` for a chain center, otherwise the quoted predecessor list
/// with discarded entries negated.
pub fn link_nodes_cell(particle: &Particle) -> String {
    if particle.link_nodes().is_empty() {
        return "starting".to_string();
    }
    let ids: Vec<String> = particle
        .link_nodes()
        .iter()
        .map(|node| node.signed().to_string())
        .collect();
    format!("\"{}\"", ids.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::find_chains;
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_4;

    fn line_of_three() -> Vec<Particle> {
        let mut particles: Vec<Particle> = (0..3)
            .map(|i| {
                let d = Vector3::x();
                let mut p = Particle::new(i, 1.0, Vector3::new(2.0 * i as f64, 0.0, 0.0))
                    .with_stress(-d * d.transpose());
                if i > 0 {
                    p.neighbors.push(i - 1);
                }
                if i < 2 {
                    p.neighbors.push(i + 1);
                }
                p.classify();
                p
            })
            .collect();
        find_chains(&mut particles, FRAC_PI_4, None).expect("search");
        particles
    }

    #[test]
    fn link_nodes_cell_marks_centers_and_predecessors() {
        let particles = line_of_three();
        assert_eq!(link_nodes_cell(&particles[0]), "starting");
        assert_eq!(link_nodes_cell(&particles[2]), "\"1\"");
    }

    #[test]
    fn row_has_one_field_per_column() {
        let particles = line_of_three();
        let options = CsvOptions {
            with_headers: true,
            delimiter: ";".to_string(),
        };
        let mut buf = Vec::new();
        write_header(&mut buf, &options).expect("header");
        write_row(&mut buf, &particles[1], &options).expect("row");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("LiggghtsId;X;Y;Z;radius;chainId"));
        assert_eq!(lines[1].split(';').count(), CHAIN_COLUMNS.len());
        assert!(lines[1].starts_with("1;2;0;0;1;0;"));
        assert!(lines[1].ends_with("\"0\""));
    }
}

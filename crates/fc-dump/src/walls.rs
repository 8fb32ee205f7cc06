use std::path::Path;

use tracing::{debug, warn};

use crate::{Fields, ParseError, read_dump, records};

/// One particle-wall (STL mesh) contact.
#[derive(Debug, Clone, PartialEq)]
pub struct WallRow {
    /// Contact point on the mesh
    pub mesh_point: [f64; 3],
    /// Particle center
    pub particle_point: [f64; 3],
    pub mesh_id: usize,
    pub triangle_id: usize,
    pub particle_id: usize,
    /// Force acting on the particle
    pub force: [f64; 3],
    pub overlap: f64,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WallDump {
    pub rows: Vec<WallRow>,
}

impl WallDump {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let raw = read_dump(path)?;
        let dump = Self::parse_str(&raw)?;
        if dump.rows.is_empty() {
            warn!(path = %path.display(), "wall dump has no contacts");
        }
        debug!(path = %path.display(), contacts = dump.rows.len(), "read wall dump");
        Ok(dump)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = raw.lines().collect();
        let rows = records(&lines)
            .map(|(line, text)| {
                let mut fields = Fields::new(text, line);
                Ok(WallRow {
                    mesh_point: fields.next_vec3("mesh point")?,
                    particle_point: fields.next_vec3("particle point")?,
                    mesh_id: fields.next_usize("mesh id")?,
                    triangle_id: fields.next_usize("triangle id")?,
                    particle_id: fields.next_usize("particle id")?,
                    force: fields.next_vec3("force")?,
                    overlap: fields.next_f64("overlap")?,
                    line,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(Self { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wall_contacts() {
        let src = "h\nh\nh\nh\nh\nh\nh\nh\nh\n\
                   0.01 0.0 0.003 0.01 0.0025 0.003 0 17 5 0 1.5 0 3e-6\n";
        let dump = WallDump::parse_str(src).expect("parse should succeed");
        assert_eq!(dump.rows.len(), 1);
        let row = &dump.rows[0];
        assert_eq!(row.particle_id, 5);
        assert_eq!(row.triangle_id, 17);
        assert_eq!(row.mesh_point, [0.01, 0.0, 0.003]);
        assert_eq!(row.force, [0.0, 1.5, 0.0]);
    }

    #[test]
    fn header_only_dump_is_empty() {
        let dump = WallDump::parse_str("h\nh\nh\nh\nh\nh\nh\nh\nh\n").expect("parse");
        assert!(dump.rows.is_empty());
    }
}

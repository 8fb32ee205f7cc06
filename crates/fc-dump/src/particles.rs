use std::path::Path;

use tracing::debug;

use crate::{BoxBounds, Fields, ParseError, parse_bounds, read_dump, records};

/// One particle record of a particle dump.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRow {
    /// LIGGGHTS id (1-based)
    pub id: usize,
    /// Particle type
    pub kind: usize,
    pub position: [f64; 3],
    pub radius: f64,
    /// Source line, for diagnostics
    pub line: usize,
}

/// Column positions of the fields the reader needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleColumns {
    pub id: usize,
    pub kind: usize,
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub radius: usize,
}

impl Default for ParticleColumns {
    /// `id type x y z`, twelve unused columns, then `radius`.
    fn default() -> Self {
        Self {
            id: 0,
            kind: 1,
            x: 2,
            y: 3,
            z: 4,
            radius: 17,
        }
    }
}

impl ParticleColumns {
    /// Locates columns from an `ITEM: ATOMS ...` header line.
    ///
    /// Returns `None` when the line is not an atoms header or lacks one of
    /// the required names, in which case the default layout applies.
    pub fn from_header(line: &str) -> Option<Self> {
        let names = line.trim().strip_prefix("ITEM: ATOMS")?;
        let names: Vec<&str> = names.split_whitespace().collect();
        let find = |name: &str| names.iter().position(|n| *n == name);
        Some(Self {
            id: find("id")?,
            kind: find("type")?,
            x: find("x")?,
            y: find("y")?,
            z: find("z")?,
            radius: find("radius")?,
        })
    }

    fn width(&self) -> usize {
        [self.id, self.kind, self.x, self.y, self.z, self.radius]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Parsed particle dump.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDump {
    pub timestep: Option<u64>,
    /// Particle count declared on header line 4
    pub declared_count: usize,
    pub bounds: Option<BoxBounds>,
    pub columns: ParticleColumns,
    pub rows: Vec<ParticleRow>,
}

impl ParticleDump {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let raw = read_dump(path)?;
        let dump = Self::parse_str(&raw)?;
        debug!(
            path = %path.display(),
            particles = dump.rows.len(),
            "read particle dump"
        );
        Ok(dump)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = raw.lines().collect();

        let timestep = lines.get(1).and_then(|l| l.trim().parse::<u64>().ok());
        let declared_count = lines
            .get(3)
            .ok_or_else(|| ParseError::new(4, "missing particle count"))
            .and_then(|l| Fields::new(l, 4).next_usize("particle count"))?;
        let bounds = parse_bounds(&lines).ok();
        let columns = lines
            .get(8)
            .and_then(|l| ParticleColumns::from_header(l))
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(declared_count);
        for (line, text) in records(&lines) {
            rows.push(parse_row(text, line, &columns)?);
        }

        Ok(Self {
            timestep,
            declared_count,
            bounds,
            columns,
            rows,
        })
    }
}

fn parse_row(
    text: &str,
    line: usize,
    columns: &ParticleColumns,
) -> Result<ParticleRow, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < columns.width() {
        return Err(ParseError::new(
            line,
            format!(
                "expected at least {} columns, found {}",
                columns.width(),
                tokens.len()
            ),
        ));
    }
    let field = |index: usize, name: &str| Fields::new(tokens[index], line).next_f64(name);
    let index = |index: usize, name: &str| Fields::new(tokens[index], line).next_usize(name);

    Ok(ParticleRow {
        id: index(columns.id, "id")?,
        kind: index(columns.kind, "type")?,
        position: [
            field(columns.x, "x")?,
            field(columns.y, "y")?,
            field(columns.z, "z")?,
        ],
        radius: field(columns.radius, "radius")?,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_LAYOUT: &str = "ITEM: TIMESTEP
4000
ITEM: NUMBER OF ATOMS
2
ITEM: BOX BOUNDS pp pp ff
0 0.1
0 0.1
0 0.0055
ITEM: ATOMS
1 1 0.01 0.02 0.003 0 0 0 0 0 0 0 0 0 0 0 0 0.0025
2 1 0.015 0.02 0.003 0 0 0 0 0 0 0 0 0 0 0 0 0.0025
";

    #[test]
    fn parses_fixed_column_layout() {
        let dump = ParticleDump::parse_str(FIXED_LAYOUT).expect("parse should succeed");
        assert_eq!(dump.timestep, Some(4000));
        assert_eq!(dump.declared_count, 2);
        assert_eq!(dump.columns, ParticleColumns::default());
        assert_eq!(dump.rows.len(), 2);
        assert_eq!(dump.rows[1].id, 2);
        assert_eq!(dump.rows[1].position, [0.015, 0.02, 0.003]);
        assert_eq!(dump.rows[1].radius, 0.0025);
        assert_eq!(dump.rows[1].line, 11);
        let bounds = dump.bounds.expect("bounds present");
        assert_eq!(bounds.upp[2], 0.0055);
    }

    #[test]
    fn locates_named_columns() {
        let src = "ITEM: TIMESTEP
0
ITEM: NUMBER OF ATOMS
1
ITEM: BOX BOUNDS
0 1
0 1
0 1
ITEM: ATOMS id type radius x y z
7 2 0.5 0.1 0.2 0.3
";
        let dump = ParticleDump::parse_str(src).expect("parse should succeed");
        assert_eq!(dump.columns.radius, 2);
        let row = &dump.rows[0];
        assert_eq!((row.id, row.kind), (7, 2));
        assert_eq!(row.radius, 0.5);
        assert_eq!(row.position, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn short_row_is_rejected_with_line() {
        let src = FIXED_LAYOUT.replace(
            "2 1 0.015 0.02 0.003 0 0 0 0 0 0 0 0 0 0 0 0 0.0025",
            "2 1 0.015",
        );
        let err = ParticleDump::parse_str(&src).expect_err("should fail");
        assert_eq!(err.line, 11);
    }

    #[test]
    fn missing_count_is_an_error() {
        let err = ParticleDump::parse_str("ITEM: TIMESTEP\n0\n").expect_err("should fail");
        assert_eq!(err.line, 4);
    }
}

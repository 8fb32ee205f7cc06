use std::path::Path;

use tracing::debug;

use crate::{BoxBounds, Fields, ParseError, parse_bounds, read_dump, records};

/// One particle-particle contact.
///
/// `force` acts on particle `id1`; `id2` receives the opposite force.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRow {
    pub x1: [f64; 3],
    pub x2: [f64; 3],
    pub id1: usize,
    pub id2: usize,
    /// Contact flagged as crossing a periodic boundary by the simulator
    pub periodic: bool,
    pub force: [f64; 3],
    pub overlap: f64,
    pub line: usize,
}

/// Parsed pair dump. Its box bounds define the periodic domain.
#[derive(Debug, Clone, PartialEq)]
pub struct PairDump {
    pub bounds: BoxBounds,
    pub rows: Vec<PairRow>,
}

impl PairDump {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let raw = read_dump(path)?;
        let dump = Self::parse_str(&raw)?;
        debug!(path = %path.display(), contacts = dump.rows.len(), "read pair dump");
        Ok(dump)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = raw.lines().collect();
        let bounds = parse_bounds(&lines)?;

        let rows = records(&lines)
            .map(|(line, text)| parse_row(text, line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { bounds, rows })
    }
}

fn parse_row(text: &str, line: usize) -> Result<PairRow, ParseError> {
    let mut fields = Fields::new(text, line);
    Ok(PairRow {
        x1: fields.next_vec3("x1")?,
        x2: fields.next_vec3("x2")?,
        id1: fields.next_usize("id1")?,
        id2: fields.next_usize("id2")?,
        periodic: fields.next_flag("periodic")?,
        force: fields.next_vec3("force")?,
        overlap: fields.next_f64("overlap")?,
        line,
    })
}

//! LIGGGHTS text dump reader for force-chain post-processing.
//!
//! Three dump kinds make up one snapshot:
//! - **particle dump** (`*.liggghts`): ids, types, positions and radii
//! - **pair dump** (`pair*.txt`): particle-particle contacts with force and overlap
//! - **wall dump** (`wall*.txt`): particle-mesh contacts
//!
//! Every dump carries a nine line `ITEM:` header; records start on line 10.
//! This crate only turns text into records. Stress accumulation and chain
//! detection live in `fc-core`.

use std::fs;
use std::path::Path;

use thiserror::Error;

mod pairs;
mod particles;
mod walls;

pub use pairs::{PairDump, PairRow};
pub use particles::{ParticleColumns, ParticleDump, ParticleRow};
pub use walls::{WallDump, WallRow};

/// Number of header lines preceding the records in every dump.
pub const HEADER_LINES: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Orthogonal simulation box, `[low, upp]` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBounds {
    pub low: [f64; 3],
    pub upp: [f64; 3],
}

pub(crate) fn read_dump(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|e| ParseError {
        line: 0,
        message: format!("failed to read {}: {e}", path.display()),
    })
}

/// Parses header lines 6-8 (`low upp` per axis).
pub(crate) fn parse_bounds(lines: &[&str]) -> Result<BoxBounds, ParseError> {
    let mut low = [0.0; 3];
    let mut upp = [0.0; 3];
    for axis in 0..3 {
        let line_no = 6 + axis;
        let raw = lines
            .get(line_no - 1)
            .ok_or_else(|| ParseError::new(line_no, "missing box bounds line"))?;
        let mut fields = Fields::new(raw, line_no);
        low[axis] = fields.next_f64("lower bound")?;
        upp[axis] = fields.next_f64("upper bound")?;
    }
    Ok(BoxBounds { low, upp })
}

/// Whitespace tokenizer that reports the line and field name on failure.
pub(crate) struct Fields<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(raw: &'a str, line: usize) -> Self {
        Self {
            tokens: raw.split_whitespace(),
            line,
        }
    }

    fn next_token(&mut self, name: &str) -> Result<&'a str, ParseError> {
        self.tokens
            .next()
            .ok_or_else(|| ParseError::new(self.line, format!("missing field `{name}`")))
    }

    pub(crate) fn next_f64(&mut self, name: &str) -> Result<f64, ParseError> {
        let token = self.next_token(name)?;
        token.parse::<f64>().map_err(|_| {
            ParseError::new(self.line, format!("invalid number `{token}` for `{name}`"))
        })
    }

    pub(crate) fn next_usize(&mut self, name: &str) -> Result<usize, ParseError> {
        let token = self.next_token(name)?;
        token.parse::<usize>().map_err(|_| {
            ParseError::new(self.line, format!("invalid index `{token}` for `{name}`"))
        })
    }

    /// Integer flag, any non-zero value is `true`.
    pub(crate) fn next_flag(&mut self, name: &str) -> Result<bool, ParseError> {
        let token = self.next_token(name)?;
        token
            .parse::<i64>()
            .map(|v| v != 0)
            .map_err(|_| ParseError::new(self.line, format!("invalid flag `{token}` for `{name}`")))
    }

    pub(crate) fn next_vec3(&mut self, name: &str) -> Result<[f64; 3], ParseError> {
        Ok([
            self.next_f64(name)?,
            self.next_f64(name)?,
            self.next_f64(name)?,
        ])
    }
}

/// Yields `(line_number, text)` for every non-blank record line.
pub(crate) fn records<'a>(lines: &'a [&'a str]) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    lines
        .iter()
        .enumerate()
        .skip(HEADER_LINES)
        .map(|(i, raw)| (i + 1, raw.trim()))
        .filter(|(_, raw)| !raw.is_empty())
}

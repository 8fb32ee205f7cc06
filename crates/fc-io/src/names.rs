//! Numbered snapshot file names.

use crate::error::{IoError, Result};

/// `prefix + n + postfix` for `n = start, start + step, ..` up to and
/// including `last`.
pub fn numeric_file_names(
    prefix: &str,
    postfix: &str,
    start: usize,
    last: usize,
    step: usize,
) -> Result<Vec<String>> {
    if step == 0 {
        return Err(IoError::InvalidArgument(
            "file name step must be positive".to_string(),
        ));
    }
    Ok((start..=last)
        .step_by(step)
        .map(|n| format!("{prefix}{n}{postfix}"))
        .collect())
}

use std::path::Path;

use crate::{Error, Result};

/// Read the seed list: one URL per line.
pub fn read_seed_list(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read seed list {}: {e}", path.display())))?;
    Ok(parse_seed_list(&raw))
}

/// Blank lines and `#` comments are skipped, surrounding whitespace trimmed.
#[must_use]
pub fn parse_seed_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

//! src/source.rs

use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads candidate tokens from a line-oriented file.
///
/// Each line is expected to look like `label<delimiter>candidate`; the
/// candidate is the second field, with surrounding spaces trimmed. Lines that
/// do not produce a usable second field are skipped without an error.
/// Only the open failure is fatal.
pub fn read_candidates(path: &Path, delimiter: char) -> anyhow::Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("cannot open candidate file {}", path.display()))?;

    let mut candidates = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.context("failed reading candidate file")?;
        if let Some(candidate) = parse_line(&line, delimiter) {
            candidates.push(candidate.to_string());
        }
    }
    Ok(candidates)
}

/// Extracts the candidate field from a single line, or `None` for a
/// malformed line. `a=b=c` yields `b`.
fn parse_line(line: &str, delimiter: char) -> Option<&str> {
    let parts: Vec<&str> = line.split(delimiter).collect();
    if parts.len() < 2 {
        return None;
    }
    let candidate = parts[1].trim_matches(' ');
    if candidate.is_empty() {
        return None;
    }
    Some(candidate)
}

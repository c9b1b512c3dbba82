//! Dataset discovery in the working directory and the operator prompt.

use std::{
    fs,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::warn;
use regex::Regex;

use crate::error::ReconcileError;

/// `*.csv` files in `dir`, sorted by name, minus the catalog, the report
/// destination, and anything whose name matches `exclude`.
pub fn discover_candidates(dir: &Path, skip: &[&Path], exclude: &Regex) -> Result<Vec<PathBuf>> {
    let skipped_names = skip
        .iter()
        .filter_map(|path| path.file_name())
        .collect::<Vec<_>>();
    let entries = fs::read_dir(dir).with_context(|| format!("Listing directory {dir:?}"))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Listing directory {dir:?}"))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let Some(name) = path.file_name() else {
            continue;
        };
        if !is_csv || skipped_names.contains(&name) || exclude.is_match(&name.to_string_lossy()) {
            continue;
        }
        candidates.push(path);
    }
    candidates.sort();
    Ok(candidates)
}

/// Lets the operator pick a dataset by its 1-based position.
///
/// A single candidate is returned without asking. Anything that is not a
/// valid position (including an empty line or end of input) falls back to the
/// first candidate.
pub fn choose_candidate<R, W>(
    candidates: &[PathBuf],
    dir: &Path,
    mut input: R,
    mut output: W,
) -> Result<PathBuf>
where
    R: BufRead,
    W: Write,
{
    let first = candidates
        .first()
        .ok_or_else(|| ReconcileError::NoCandidates {
            dir: dir.to_path_buf(),
        })?;
    if candidates.len() == 1 {
        return Ok(first.clone());
    }

    let listing = candidates
        .iter()
        .enumerate()
        .map(|(idx, path)| format!("[{}] {}", idx + 1, display_name(path)))
        .join("\n");
    writeln!(output, "Select the dataset file:\n{listing}")?;
    write!(output, "Enter the number: ")?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Reading dataset selection")?;
    let chosen = answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|idx| candidates.get(idx));
    match chosen {
        Some(path) => Ok(path.clone()),
        None => {
            warn!(
                "Invalid selection '{}', using {}",
                answer.trim(),
                display_name(first)
            );
            Ok(first.clone())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

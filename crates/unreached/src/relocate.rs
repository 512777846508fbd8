//! Moving unused candidates into a holding directory.
//!
//! This is a separate step from analysis: it only ever acts on a report that
//! was written earlier, so a reviewer can inspect the list before anything
//! moves. Files keep their project-relative layout under the holding
//! directory, which makes restoring one a plain move back.

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

use crate::reporter::Report;
use crate::types::UnreachedError;

/// Parent of the timestamped holding directories, relative to the root
pub const DEFAULT_HOLDING_DIR: &str = "backup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub relative: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Default)]
pub struct RelocationSummary {
    pub moved: Vec<Relocation>,
    /// Listed in the report but no longer on disk
    pub missing: Vec<String>,
    /// Listed paths that are absolute or climb out of the root
    pub rejected: Vec<String>,
}

pub fn load_report(path: &Path) -> Result<Report, UnreachedError> {
    let content = fs::read_to_string(path)
        .map_err(|source| UnreachedError::ReportRead { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| UnreachedError::ReportParse { path: path.to_path_buf(), source })
}

/// `<root>/backup/unused_files_<timestamp>`
pub fn default_holding_dir(root: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    root.join(DEFAULT_HOLDING_DIR).join(format!("unused_files_{stamp}"))
}

fn stays_inside_root(relative: &str) -> bool {
    let path = Path::new(relative);
    !relative.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Decide what would move where. `categories` narrows the selection; empty
/// means every unused file.
pub fn plan(
    report: &Report,
    root: &Path,
    holding: &Path,
    categories: &[String],
) -> RelocationSummary {
    let mut summary = RelocationSummary::default();

    let selected: Vec<&String> = if categories.is_empty() {
        report.all_unused.iter().collect()
    } else {
        let mut picked: Vec<&String> = categories
            .iter()
            .filter_map(|c| report.unused_by_category.get(c))
            .flatten()
            .collect();
        picked.sort();
        picked.dedup();
        picked
    };

    for relative in selected {
        if !stays_inside_root(relative) {
            summary.rejected.push(relative.clone());
            continue;
        }
        let from = root.join(relative);
        if !from.is_file() {
            summary.missing.push(relative.clone());
            continue;
        }
        summary.moved.push(Relocation {
            relative: relative.clone(),
            from,
            to: holding.join(relative),
        });
    }

    summary
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(from, to) {
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        result => result,
    }
}

/// Carry out a plan. With `dry_run` nothing on disk changes.
pub fn execute(
    summary: RelocationSummary,
    dry_run: bool,
) -> Result<RelocationSummary, UnreachedError> {
    for rejected in &summary.rejected {
        warn!(path = %rejected, "refusing to move path outside the project root");
    }
    for missing in &summary.missing {
        warn!(path = %missing, "listed file no longer exists");
    }

    if dry_run {
        return Ok(summary);
    }

    for relocation in &summary.moved {
        move_file(&relocation.from, &relocation.to).map_err(|source| UnreachedError::Move {
            from: relocation.from.clone(),
            to: relocation.to.clone(),
            source,
        })?;
        info!(file = %relocation.relative, "moved");
    }

    Ok(summary)
}

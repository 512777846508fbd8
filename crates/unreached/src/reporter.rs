use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::categorize::Categorizer;
use crate::collector::{FileSet, SkippedPath};
use crate::reachability::Reachability;
use crate::resolver::UnresolvedImport;
use crate::types::UnreachedError;

/// Paths listed per category in text output unless `show_all` is set
const TEXT_PREVIEW_LIMIT: usize = 10;

/// Counts of everything that made the result less than complete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningSummary {
    pub has_warnings: bool,
    pub total: usize,
    pub skipped_paths: usize,
    pub unresolved_imports: usize,
    pub missing_entries: usize,
}

/// Per-run anomalies handed to the report
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub skipped: Vec<SkippedPath>,
    pub unresolved: Vec<UnresolvedImport>,
    pub missing_entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub root: PathBuf,
    pub total_files: usize,
    pub used_files: usize,
    pub unused_files: usize,
    pub entry_points: Vec<String>,
    pub unused_by_category: BTreeMap<String, Vec<String>>,
    pub all_unused: Vec<String>,
    pub warnings: WarningSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_paths: Vec<SkippedPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_imports: Vec<UnresolvedImport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_entries: Vec<String>,
}

impl Report {
    /// Partition `files` by `reachability` and categorise the unused side
    pub fn build(
        root: &Path,
        files: &FileSet,
        entry_points: &[String],
        reachability: &Reachability,
        categorizer: &Categorizer,
        diagnostics: Diagnostics,
    ) -> Self {
        let mut unused_by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut all_unused = Vec::new();

        // FileSet iterates in path order, so every list below is sorted
        for path in files.paths().filter(|p| !reachability.contains(p)) {
            unused_by_category
                .entry(categorizer.categorize(path).to_string())
                .or_default()
                .push(path.to_string());
            all_unused.push(path.to_string());
        }

        let mut unresolved = diagnostics.unresolved;
        unresolved.sort_by(|a, b| (&a.importer, &a.target).cmp(&(&b.importer, &b.target)));
        unresolved.dedup();

        let warnings = WarningSummary {
            has_warnings: false,
            total: diagnostics.skipped.len() + unresolved.len() + diagnostics.missing_entries.len(),
            skipped_paths: diagnostics.skipped.len(),
            unresolved_imports: unresolved.len(),
            missing_entries: diagnostics.missing_entries.len(),
        };

        Self {
            root: root.to_path_buf(),
            total_files: files.len(),
            used_files: files.len() - all_unused.len(),
            unused_files: all_unused.len(),
            entry_points: entry_points.to_vec(),
            unused_by_category,
            all_unused,
            warnings: WarningSummary { has_warnings: warnings.total > 0, ..warnings },
            skipped_paths: diagnostics.skipped,
            unresolved_imports: unresolved,
            missing_entries: diagnostics.missing_entries,
        }
    }

    /// Drop the per-import unresolved list, keeping its count in `warnings`
    pub fn without_unresolved_details(mut self) -> Self {
        self.unresolved_imports.clear();
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Persist as JSON; the destination only ever holds a complete report
    pub fn write_to(&self, path: &Path) -> Result<(), UnreachedError> {
        let write_err = |source: std::io::Error| UnreachedError::Write {
            path: path.to_path_buf(),
            source,
        };

        let json = self.to_json().map_err(|e| write_err(e.into()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Human-readable rendering, grouped by category
pub fn report_text(report: &Report, show_all: bool) -> String {
    let mut out = String::new();

    if report.unused_files == 0 {
        let _ = writeln!(out, "No unused files found.");
    } else {
        let _ = writeln!(out, "Unused files by category:");
        for (category, files) in &report.unused_by_category {
            let _ = writeln!(out, "\n{} ({} files):", category.to_uppercase(), files.len());
            let shown = if show_all { files.len() } else { TEXT_PREVIEW_LIMIT.min(files.len()) };
            for file in &files[..shown] {
                let _ = writeln!(out, "  - {file}");
            }
            if shown < files.len() {
                let _ = writeln!(out, "  ... and {} more", files.len() - shown);
            }
        }
    }

    if !report.unresolved_imports.is_empty() {
        let _ = writeln!(out, "\nUnresolved imports ({}):", report.unresolved_imports.len());
        for import in &report.unresolved_imports {
            let _ = writeln!(out, "  {} -> {}", import.importer, import.target);
        }
    }

    if !report.skipped_paths.is_empty() {
        let _ = writeln!(out, "\nSkipped paths ({}):", report.skipped_paths.len());
        for skipped in &report.skipped_paths {
            let _ = writeln!(out, "  {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    let _ = writeln!(
        out,
        "\n{}/{} files unused ({} used, {} entry points)",
        report.unused_files,
        report.total_files,
        report.used_files,
        report.entry_points.len()
    );

    let w = &report.warnings;
    if w.has_warnings {
        let _ = writeln!(
            out,
            "{} warnings: {} skipped paths, {} unresolved imports, {} missing entry points",
            w.total, w.skipped_paths, w.unresolved_imports, w.missing_entries
        );
    } else {
        let _ = writeln!(out, "No warnings.");
    }

    out
}

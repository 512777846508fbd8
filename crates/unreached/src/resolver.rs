use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::collector::{FileSet, relative_path};
use crate::types::AnalysisConfig;

/// Outcome of mapping a raw import target to a project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "target", rename_all = "lowercase")]
pub enum Resolution {
    /// The collected file the target names
    Resolved(String),
    /// A third-party package; never probed on disk
    External,
    /// Looked local but matched no collected file
    Unresolved,
}

/// An import that looked local but could not be mapped to a collected file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedImport {
    pub importer: String,
    pub target: String,
}

/// Resolves import targets against a fixed file set.
///
/// Resolution only consults the collected [`FileSet`], never the disk, so the
/// outcome depends on nothing but the target, the importer and the set.
pub struct ModuleResolver<'a> {
    root: &'a Path,
    files: &'a FileSet,
    extensions: &'a [String],
    source_prefixes: &'a [String],
    directory_named_modules: bool,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(root: &'a Path, files: &'a FileSet, config: &'a AnalysisConfig) -> Self {
        Self {
            root,
            files,
            extensions: &config.extensions,
            source_prefixes: &config.source_prefixes,
            directory_named_modules: config.directory_named_modules,
        }
    }

    /// Resolve `target` as written in the file at relative path `importer`
    pub fn resolve(&self, importer: &str, target: &str) -> Resolution {
        let candidate = if is_relative(target) {
            let mut segments: Vec<&str> = importer.split('/').collect();
            segments.pop();
            normalize_segments(segments, target)
        } else if target.starts_with('/') {
            self.project_relative(Path::new(target))
        } else if self.source_prefixes.iter().any(|p| target.starts_with(p.as_str())) {
            normalize_segments(Vec::new(), target)
        } else {
            return Resolution::External;
        };

        // `None` means the path leaves the project root
        let Some(candidate) = candidate else {
            return Resolution::Unresolved;
        };

        self.probe(&candidate).map(Resolution::Resolved).unwrap_or(Resolution::Unresolved)
    }

    /// Map an absolute import onto the root, folding `.` and `..` lexically
    fn project_relative(&self, target: &Path) -> Option<String> {
        let mut normalized = PathBuf::new();
        for component in target.components() {
            match component {
                Component::ParentDir => {
                    normalized.pop();
                }
                Component::CurDir => {}
                other => normalized.push(other.as_os_str()),
            }
        }
        if normalized == self.root {
            return Some(String::new());
        }
        relative_path(self.root, &normalized)
    }

    /// First existing file among the fixed probe order
    fn probe(&self, candidate: &str) -> Option<String> {
        let base = if candidate.is_empty() { String::new() } else { format!("{candidate}/") };

        let mut probes = Vec::with_capacity(self.extensions.len() * 3 + 1);
        if !candidate.is_empty() {
            probes.push(candidate.to_string());
            probes.extend(self.extensions.iter().map(|ext| format!("{candidate}{ext}")));
        }
        probes.extend(self.extensions.iter().map(|ext| format!("{base}index{ext}")));
        if self.directory_named_modules {
            if let Some(name) = candidate.rsplit('/').next().filter(|n| !n.is_empty()) {
                probes.extend(self.extensions.iter().map(|ext| format!("{base}{name}{ext}")));
            }
        }

        probes.into_iter().find(|p| self.files.contains(p))
    }
}

fn is_relative(target: &str) -> bool {
    target == "." || target == ".." || target.starts_with("./") || target.starts_with("../")
}

/// Apply `target`'s segments on top of `base`, returning `None` when `..`
/// climbs above the project root
fn normalize_segments<'t>(mut segments: Vec<&'t str>, target: &'t str) -> Option<String> {
    segments.retain(|s| !s.is_empty());
    for part in target.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

use ignore::{DirEntry, WalkBuilder};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::types::AnalysisConfig;

/// A source file discovered under the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    /// `/`-separated path relative to the project root; the file's identity
    pub relative: String,
    pub absolute: PathBuf,
    /// Matched configured extension, with leading dot
    pub extension: String,
}

/// A path the walk or the scan could not read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPath {
    pub path: PathBuf,
    pub reason: String,
}

/// The collected vertex set of one run, ordered by relative path
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<ProjectFile>,
    index: FxHashMap<String, usize>,
}

impl FileSet {
    pub fn from_files(mut files: Vec<ProjectFile>) -> Self {
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        files.dedup_by(|a, b| a.relative == b.relative);
        let index = files.iter().enumerate().map(|(i, f)| (f.relative.clone(), i)).collect();
        Self { files, index }
    }

    /// Build a set from relative paths without touching the filesystem
    pub fn from_paths<I, S>(root: &Path, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files = paths
            .into_iter()
            .map(|p| {
                let relative: String = p.into();
                let extension = Path::new(&relative)
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                ProjectFile { absolute: root.join(&relative), relative, extension }
            })
            .collect();
        Self::from_files(files)
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.index.contains_key(relative)
    }

    pub fn get(&self, relative: &str) -> Option<&ProjectFile> {
        self.index.get(relative).map(|&i| &self.files[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[ProjectFile] {
        &self.files
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.relative.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Output of a walk: the files found plus whatever could not be read
#[derive(Debug, Default)]
pub struct Collected {
    pub files: FileSet,
    pub skipped: Vec<SkippedPath>,
}

/// Render a path relative to `root` with `/` separators
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

/// Pull the offending path out of a walk error, if it names one
fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}

/// A symlink cycle: nothing is left unread, so it is not a skipped path
fn is_loop(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_loop(err),
        _ => false,
    }
}

pub struct Collector {
    root: PathBuf,
    ignore_dirs: Arc<FxHashSet<String>>,
    extensions: Vec<String>,
    follow_symlinks: bool,
    respect_gitignore: bool,
}

impl Collector {
    /// `root` is expected to be canonical already
    pub fn new(root: &Path, config: &AnalysisConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            ignore_dirs: Arc::new(config.ignore_dirs.iter().cloned().collect()),
            extensions: config.extensions.clone(),
            follow_symlinks: config.follow_symlinks,
            respect_gitignore: config.respect_gitignore,
        }
    }

    fn matching_extension(&self, path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_string_lossy();
        self.extensions.iter().find(|ext| name.ends_with(ext.as_str())).map(String::as_str)
    }

    /// Walk the root once, pruning ignored directories at every depth
    pub fn collect(&self) -> Collected {
        let mut walker_builder = WalkBuilder::new(&self.root);
        walker_builder
            .standard_filters(false)
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .parents(self.respect_gitignore)
            .require_git(false)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name(|a, b| a.cmp(b));

        let ignore_dirs = Arc::clone(&self.ignore_dirs);
        let follow_symlinks = self.follow_symlinks;
        let root = self.root.clone();
        let visited_dirs: Arc<Mutex<FxHashSet<PathBuf>>> = Arc::default();
        walker_builder.filter_entry(move |entry: &DirEntry| {
            if !entry.file_type().is_some_and(|t| t.is_dir()) {
                return true;
            }
            if entry.depth() > 0 && ignore_dirs.contains(&*entry.file_name().to_string_lossy()) {
                return false;
            }
            if follow_symlinks {
                let Ok(real) = entry.path().canonicalize() else {
                    return true;
                };
                // Directories inside the root are collected under their own path only
                if entry.path_is_symlink() && real.starts_with(&root) {
                    debug!(link = %entry.path().display(), "skipping link into the root");
                    return false;
                }
                // A real directory reached through several links is walked once
                let Ok(mut seen) = visited_dirs.lock() else {
                    return true;
                };
                return seen.insert(real);
            }
            true
        });

        let mut files = Vec::new();
        let mut skipped = Vec::new();

        for result in walker_builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) if is_loop(&err) => {
                    debug!(error = %err, "not descending into symlink loop");
                    continue;
                }
                Err(err) => {
                    let path = error_path(&err).unwrap_or_else(|| self.root.clone());
                    warn!(path = %path.display(), error = %err, "skipping unreadable path");
                    skipped.push(SkippedPath { path, reason: err.to_string() });
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(extension) = self.matching_extension(path) else {
                continue;
            };

            let Some(relative) = relative_path(&self.root, path) else {
                continue;
            };

            files.push(ProjectFile {
                relative,
                absolute: path.to_path_buf(),
                extension: extension.to_string(),
            });
        }

        let files = FileSet::from_files(files);
        debug!(files = files.len(), skipped = skipped.len(), "collected source files");
        Collected { files, skipped }
    }
}

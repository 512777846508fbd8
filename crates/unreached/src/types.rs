use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::categorize::CategoryRule;

/// Source extensions analysed when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".jsx"];

/// Directory names pruned from the walk when none are configured
pub const DEFAULT_IGNORE_DIRS: &[&str] =
    &["node_modules", "android", "ios", "build", "__tests__", ".git", "backup"];

/// Prefixes marking a project-root-relative import such as `src/api/client`
pub const DEFAULT_SOURCE_PREFIXES: &[&str] = &["src/"];

/// Configuration for one analysis run.
///
/// Passed by reference into every stage; nothing reads ambient global state,
/// so several analyses over different roots can run side by side.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Project root
    pub root: PathBuf,

    /// Entry point paths, relative to the root
    pub entry: Vec<String>,

    /// Directory names skipped at every depth
    pub ignore_dirs: Vec<String>,

    /// Recognised source extensions, with leading dot
    pub extensions: Vec<String>,

    /// Import prefixes that resolve from the project root
    pub source_prefixes: Vec<String>,

    /// Ordered category rules; first match wins
    pub categories: Vec<CategoryRule>,

    /// Descend into symlinked directories (each real directory at most once)
    pub follow_symlinks: bool,

    /// Honour .gitignore files during the walk
    pub respect_gitignore: bool,

    /// Also match `export ... from` and literal dynamic `import()`
    pub extended_syntax: bool,

    /// Probe `dir/<dir name>.<ext>` after the index probes
    pub directory_named_modules: bool,

    /// Worker threads for the per-file scan; `None` uses available parallelism
    pub threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            entry: Vec::new(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| (*s).to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            source_prefixes: DEFAULT_SOURCE_PREFIXES.iter().map(|s| (*s).to_string()).collect(),
            categories: CategoryRule::defaults(),
            follow_symlinks: false,
            respect_gitignore: false,
            extended_syntax: false,
            directory_named_modules: true,
            threads: None,
        }
    }
}

impl AnalysisConfig {
    /// Apply the values present in a config file, keeping defaults elsewhere
    pub fn merge_file_config(&mut self, file: FileConfig) {
        if !file.entry.is_empty() {
            self.entry = file.entry;
        }
        if let Some(dirs) = file.ignore_dirs {
            self.ignore_dirs = dirs;
        }
        if let Some(exts) = file.extensions {
            self.extensions = exts.into_iter().map(normalize_extension).collect();
        }
        if let Some(prefixes) = file.source_prefixes {
            self.source_prefixes = prefixes;
        }
        if let Some(rules) = file.categories {
            self.categories = rules;
        }
        if let Some(v) = file.follow_symlinks {
            self.follow_symlinks = v;
        }
        if let Some(v) = file.respect_gitignore {
            self.respect_gitignore = v;
        }
        if let Some(v) = file.extended_syntax {
            self.extended_syntax = v;
        }
        if let Some(v) = file.directory_named_modules {
            self.directory_named_modules = v;
        }
    }
}

/// Ensure an extension carries its leading dot (`js` -> `.js`)
pub fn normalize_extension(ext: String) -> String {
    if ext.starts_with('.') { ext } else { format!(".{ext}") }
}

/// Error types for unreached operations
#[derive(Error, Debug)]
pub enum UnreachedError {
    #[error("No entry points configured")]
    NoEntryPoints,

    #[error("No entry files found matching: {0:?}")]
    NoEntryFiles(Vec<String>),

    #[error("Invalid project root {path}: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Project root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("Analysis aborted")]
    Aborted,

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read report {path}: {source}")]
    ReportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse report {path}: {source}")]
    ReportParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UnreachedError {
    /// Configuration problems are reported before any traversal begins
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::NoEntryPoints
                | Self::NoEntryFiles(_)
                | Self::InvalidRoot { .. }
                | Self::RootNotDirectory(_)
        )
    }
}

/// Config file structure for unreached.json / unreached.jsonc
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default)]
    pub entry: Vec<String>,

    #[serde(default)]
    pub ignore_dirs: Option<Vec<String>>,

    #[serde(default)]
    pub extensions: Option<Vec<String>>,

    #[serde(default)]
    pub source_prefixes: Option<Vec<String>>,

    #[serde(default)]
    pub categories: Option<Vec<CategoryRule>>,

    #[serde(default)]
    pub follow_symlinks: Option<bool>,

    #[serde(default)]
    pub respect_gitignore: Option<bool>,

    #[serde(default)]
    pub extended_syntax: Option<bool>,

    #[serde(default)]
    pub directory_named_modules: Option<bool>,

    /// Default report output path
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_overrides_only_present_fields() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "entry": ["index.js"], "extensions": ["js", ".mjs"], "followSymlinks": true }"#,
        )
        .unwrap();

        let mut config = AnalysisConfig::default();
        config.merge_file_config(file);

        assert_eq!(config.entry, vec!["index.js"]);
        assert_eq!(config.extensions, vec![".js", ".mjs"]);
        assert!(config.follow_symlinks);
        assert_eq!(config.source_prefixes, vec!["src/"]);
        assert!(config.ignore_dirs.iter().any(|d| d == "node_modules"));
    }

    #[test]
    fn test_configuration_errors_are_classified() {
        assert!(UnreachedError::NoEntryPoints.is_configuration_error());
        assert!(UnreachedError::RootNotDirectory(PathBuf::from("x")).is_configuration_error());
        assert!(!UnreachedError::Aborted.is_configuration_error());
    }
}

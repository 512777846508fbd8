use std::path::Path;
use tracing::debug;

use crate::collector::{FileSet, relative_path};

/// Configured entry points matched against the collected files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPoints {
    /// Collected files treated as always reachable, sorted
    pub files: Vec<String>,
    /// Configured entries that matched no collected file
    pub missing: Vec<String>,
}

fn normalize(entry: &str) -> String {
    let entry = entry.replace('\\', "/");
    let mut trimmed = entry.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.trim_end_matches('/').to_string()
}

/// Match each configured entry as written and under every source prefix
/// (`index.js` also matches `src/index.js`).
///
/// Entries naming non-source files such as `package.json` never match,
/// since only collected files are graph vertices.
pub fn match_entry_points(
    root: &Path,
    entries: &[String],
    files: &FileSet,
    source_prefixes: &[String],
) -> EntryPoints {
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for raw in entries {
        let entry = if Path::new(raw).is_absolute() {
            match relative_path(root, Path::new(raw)) {
                Some(relative) => relative,
                None => {
                    missing.push(raw.clone());
                    continue;
                }
            }
        } else {
            normalize(raw)
        };

        let candidates = std::iter::once(entry.clone())
            .chain(source_prefixes.iter().map(|prefix| format!("{prefix}{entry}")));

        let before = matched.len();
        matched.extend(candidates.filter(|c| files.contains(c)));
        if matched.len() == before {
            debug!(entry = %raw, "entry point matches no collected file");
            missing.push(raw.clone());
        }
    }

    matched.sort();
    matched.dedup();
    EntryPoints { files: matched, missing }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn prefixes() -> Vec<String> {
        vec!["src/".to_string()]
    }

    #[test]
    fn test_entry_matches_root_and_source_prefix() {
        let root = Path::new("/p");
        let files = FileSet::from_paths(root, ["index.js", "src/index.js", "App.js"]);

        let result = match_entry_points(root, &entries(&["index.js"]), &files, &prefixes());
        assert_eq!(result.files, vec!["index.js", "src/index.js"]);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_non_source_entries_are_missing() {
        let root = Path::new("/p");
        let files = FileSet::from_paths(root, ["index.js"]);

        let result = match_entry_points(
            root,
            &entries(&["./index.js", "package.json", "app.json"]),
            &files,
            &prefixes(),
        );
        assert_eq!(result.files, vec!["index.js"]);
        assert_eq!(result.missing, vec!["package.json", "app.json"]);
    }

    #[test]
    fn test_absolute_entry_inside_root() {
        let root = Path::new("/p");
        let files = FileSet::from_paths(root, ["src/application/index.js"]);

        let result = match_entry_points(
            root,
            &entries(&["/p/src/application/index.js", "/elsewhere/index.js"]),
            &files,
            &prefixes(),
        );
        assert_eq!(result.files, vec!["src/application/index.js"]);
        assert_eq!(result.missing, vec!["/elsewhere/index.js"]);
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let root = Path::new("/p");
        let files = FileSet::from_paths(root, ["src/App.js"]);

        let result =
            match_entry_points(root, &entries(&["App.js", "src/App.js"]), &files, &prefixes());
        assert_eq!(result.files, vec!["src/App.js"]);
    }
}

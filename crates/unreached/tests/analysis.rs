use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};
use unreached::{
    AbortSignal, AnalysisConfig, UnreachedError, analyze, analyze_with_signal, find_reachable_files,
    find_unused_files,
};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn config(root: &Path, entry: &[&str]) -> AnalysisConfig {
    AnalysisConfig {
        root: root.to_path_buf(),
        entry: entry.iter().map(|e| (*e).to_string()).collect(),
        ..Default::default()
    }
}

/// index.js -> App.js -> utils/helper.js, with old/deadCode.js unreferenced
fn basic_project() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "index.js", "import App from './App.js';\nApp();\n");
    write(dir.path(), "App.js", "const helper = require('./utils/helper.js');\nexport default helper;\n");
    write(dir.path(), "utils/helper.js", "module.exports = () => 42;\n");
    write(dir.path(), "old/deadCode.js", "export const unused = true;\n");
    dir
}

#[test]
fn test_basic_project_reachability() {
    let dir = basic_project();

    let reachable = find_reachable_files(&config(dir.path(), &["index.js"])).unwrap();
    assert_eq!(reachable, vec!["App.js", "index.js", "utils/helper.js"]);

    let report = find_unused_files(&config(dir.path(), &["index.js"])).unwrap();
    assert_eq!(report.total_files, 4);
    assert_eq!(report.used_files, 3);
    assert_eq!(report.unused_files, 1);
    assert_eq!(report.all_unused, vec!["old/deadCode.js"]);
    assert_eq!(report.unused_by_category["other"], vec!["old/deadCode.js"]);
    assert_eq!(report.unused_by_category.len(), 1);
}

#[test]
fn test_commented_reference_does_not_keep_file_alive() {
    let dir = basic_project();
    write(
        dir.path(),
        "App.js",
        "// import Widget from './components/exampleWidget';\nconst helper = require('./utils/helper');\n",
    );
    write(dir.path(), "components/exampleWidget.js", "export default () => null;\n");

    let report = find_unused_files(&config(dir.path(), &["index.js"])).unwrap();
    assert_eq!(report.unused_by_category["examples"], vec!["components/exampleWidget.js"]);
    assert!(!report.all_unused.contains(&"utils/helper.js".to_string()));
}

#[test]
fn test_regex_literal_does_not_hide_later_imports() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "index.js",
        "const clean = (p) => p.replace(/\\/*$/, '');\nconst live = require('./live');\n",
    );
    write(dir.path(), "live.js", "module.exports = 1;\n");

    let report = find_unused_files(&config(dir.path(), &["index.js"])).unwrap();
    assert_eq!(report.used_files, 2);
    assert!(report.all_unused.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_keeps_its_real_path() {
    let dir = tempdir().unwrap();
    write(dir.path(), "index.js", "import x from './b/x';\n");
    write(dir.path(), "b/x.js", "export default 1;\n");
    fs::create_dir_all(dir.path().join("a")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("b"), dir.path().join("a/link")).unwrap();

    let config = AnalysisConfig { follow_symlinks: true, ..config(dir.path(), &["index.js"]) };
    let report = find_unused_files(&config).unwrap();
    assert!(report.all_unused.is_empty());
    assert!(!report.warnings.has_warnings);
}

#[test]
fn test_empty_entry_list_is_configuration_error() {
    let dir = basic_project();
    let out = dir.path().join("report.json");

    let err = analyze(&config(dir.path(), &[])).unwrap_err();
    assert!(matches!(err, UnreachedError::NoEntryPoints));
    assert!(err.is_configuration_error());
    assert!(!out.exists());
}

#[test]
fn test_unmatched_entries_are_configuration_error() {
    let dir = basic_project();
    let err = analyze(&config(dir.path(), &["package.json", "main.js"])).unwrap_err();
    assert!(matches!(err, UnreachedError::NoEntryFiles(ref e) if e.len() == 2));
}

#[test]
fn test_missing_root_is_configuration_error() {
    let dir = tempdir().unwrap();
    let err = analyze(&config(&dir.path().join("nope"), &["index.js"])).unwrap_err();
    assert!(matches!(err, UnreachedError::InvalidRoot { .. }));
    assert!(err.is_configuration_error());
}

#[test]
fn test_external_package_does_not_affect_importer() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.js", "const _ = require(\"lodash\");\n");
    write(dir.path(), "b.js", "");

    let analysis = analyze(&config(dir.path(), &["a.js"])).unwrap();
    assert!(analysis.reachability.contains("a.js"));
    assert_eq!(analysis.graph.edge_count(), 0);
    assert_eq!(analysis.report.all_unused, vec!["b.js"]);
    assert_eq!(analysis.report.warnings.unresolved_imports, 0);
}

#[test]
fn test_cycle_with_entry_terminates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.js", "import b from './b';\n");
    write(dir.path(), "b.js", "import a from './a';\n");

    let analysis = analyze(&config(dir.path(), &["a.js"])).unwrap();
    assert_eq!(analysis.reachability.order(), &["a.js".to_string(), "b.js".to_string()]);
    assert_eq!(analysis.report.unused_files, 0);
}

#[test]
fn test_source_prefix_entry_and_import() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/index.js", "import Screen from 'src/screens/Home';\n");
    write(dir.path(), "src/screens/Home.jsx", "import Button from '../components/Button';\n");
    write(dir.path(), "src/components/Button/Button.js", "");
    write(dir.path(), "src/components/Unused.js", "");

    let report = find_unused_files(&config(dir.path(), &["index.js"])).unwrap();
    assert_eq!(report.entry_points, vec!["src/index.js"]);
    assert_eq!(report.all_unused, vec!["src/components/Unused.js"]);
    assert_eq!(report.unused_by_category["components"], vec!["src/components/Unused.js"]);
}

#[test]
fn test_ignored_directories_are_not_candidates() {
    let dir = basic_project();
    write(dir.path(), "node_modules/pkg/index.js", "");
    write(dir.path(), "src/__tests__/App.test.js", "import App from '../../App';\n");
    write(dir.path(), "backup/old.js", "");

    let report = find_unused_files(&config(dir.path(), &["index.js"])).unwrap();
    assert_eq!(report.total_files, 4);
    assert_eq!(report.all_unused, vec!["old/deadCode.js"]);
}

#[test]
fn test_unresolved_imports_are_warnings_not_edges() {
    let dir = basic_project();
    write(dir.path(), "index.js", "import App from './App.js';\nimport Gone from './gone';\n");

    let report = find_unused_files(&config(dir.path(), &["index.js", "package.json"])).unwrap();
    assert!(report.warnings.has_warnings);
    assert_eq!(report.warnings.unresolved_imports, 1);
    assert_eq!(report.warnings.missing_entries, 1);
    assert_eq!(report.unresolved_imports[0].target, "./gone");
    assert_eq!(report.missing_entries, vec!["package.json"]);
    assert_eq!(report.used_files, 3);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = basic_project();
    let cfg = config(dir.path(), &["index.js"]);

    let first = find_unused_files(&cfg).unwrap();
    let second = find_unused_files(&AnalysisConfig { threads: Some(1), ..cfg.clone() }).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_aborted_run_writes_nothing() {
    let dir = basic_project();
    let out = dir.path().join("report.json");
    let signal = AbortSignal::new();
    signal.abort();

    let result = analyze_with_signal(&config(dir.path(), &["index.js"]), &signal);
    assert!(matches!(result, Err(UnreachedError::Aborted)));
    assert!(!out.exists());
}

#[test]
fn test_report_persists_atomically() {
    let dir = basic_project();
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("unused_files_report.json");

    let report = find_unused_files(&config(dir.path(), &["index.js"])).unwrap();
    report.write_to(&out).unwrap();

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["unused_files"], 1);
    assert_eq!(saved["all_unused"][0], "old/deadCode.js");
    assert_eq!(saved["warnings"]["has_warnings"], false);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped_with_warning() {
    use std::os::unix::fs::PermissionsExt;

    let dir = basic_project();
    let locked = dir.path().join("locked");
    write(dir.path(), "locked/secret.js", "");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits; nothing to observe then
    let readable = fs::read_dir(&locked).is_ok();
    let report = find_unused_files(&config(dir.path(), &["index.js"]));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let report = report.unwrap();
    if !readable {
        assert_eq!(report.warnings.skipped_paths, 1);
        assert!(report.warnings.has_warnings);
        assert_eq!(report.all_unused, vec!["old/deadCode.js"]);
    }
}

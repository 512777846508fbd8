pub mod abort;
pub mod categorize;
pub mod cli;
pub mod collector;
pub mod entry;
pub mod extractor;
pub mod graph;
pub mod reachability;
pub mod relocate;
pub mod reporter;
pub mod resolver;
pub mod scan;
pub mod types;

pub use abort::AbortSignal;
pub use categorize::{CategoryRule, Categorizer};
pub use collector::FileSet;
pub use entry::EntryPoints;
pub use graph::DependencyGraph;
pub use reachability::Reachability;
pub use reporter::Report;
pub use resolver::Resolution;
pub use types::{
    AnalysisConfig, DEFAULT_EXTENSIONS, DEFAULT_IGNORE_DIRS, DEFAULT_SOURCE_PREFIXES, FileConfig,
    UnreachedError,
};

use std::path::PathBuf;
use tracing::{debug, info};

use collector::Collector;
use entry::match_entry_points;
use extractor::Extractor;
use reachability::find_reachable;
use reporter::Diagnostics;
use resolver::ModuleResolver;
use scan::scan_imports;

/// Everything one run produced, stage by stage
#[derive(Debug)]
pub struct Analysis {
    pub root: PathBuf,
    pub files: FileSet,
    pub entry_points: EntryPoints,
    pub graph: DependencyGraph,
    pub reachability: Reachability,
    pub report: Report,
}

/// Run the full pipeline: collect, scan, build the graph, walk it, report.
///
/// # Returns
/// * `Ok(Analysis)` - every intermediate result plus the report
/// * `Err(UnreachedError)` - configuration errors (no entries, bad root),
///   or an abort; per-file problems become report warnings instead
///
/// # Example
/// ```no_run
/// use unreached::{analyze, AnalysisConfig};
/// use std::path::PathBuf;
///
/// let config = AnalysisConfig {
///     root: PathBuf::from("."),
///     entry: vec!["index.js".to_string()],
///     ..Default::default()
/// };
///
/// let analysis = analyze(&config).unwrap();
/// println!("Found {} unused files", analysis.report.unused_files);
/// ```
pub fn analyze(config: &AnalysisConfig) -> Result<Analysis, UnreachedError> {
    analyze_with_signal(config, &AbortSignal::new())
}

/// [`analyze`], checking `signal` between files and between stages
pub fn analyze_with_signal(
    config: &AnalysisConfig,
    signal: &AbortSignal,
) -> Result<Analysis, UnreachedError> {
    if config.entry.is_empty() {
        return Err(UnreachedError::NoEntryPoints);
    }

    let root = config
        .root
        .canonicalize()
        .map_err(|source| UnreachedError::InvalidRoot { path: config.root.clone(), source })?;
    if !root.is_dir() {
        return Err(UnreachedError::RootNotDirectory(root));
    }

    let collected = Collector::new(&root, config).collect();
    if signal.is_aborted() {
        return Err(UnreachedError::Aborted);
    }

    let entry_points =
        match_entry_points(&root, &config.entry, &collected.files, &config.source_prefixes);
    if entry_points.files.is_empty() {
        return Err(UnreachedError::NoEntryFiles(config.entry.clone()));
    }
    debug!(entries = ?entry_points.files, "matched entry points");

    let resolver = ModuleResolver::new(&root, &collected.files, config);
    let scan = scan_imports(
        &collected.files,
        &resolver,
        Extractor::new(config.extended_syntax),
        config.threads,
        signal,
    )?;

    let graph = DependencyGraph::build(&collected.files, &scan.edges);
    let reachability = find_reachable(&graph, &entry_points.files);
    if signal.is_aborted() {
        return Err(UnreachedError::Aborted);
    }

    let mut skipped = collected.skipped;
    skipped.extend(scan.skipped.iter().cloned());
    let diagnostics = Diagnostics {
        skipped,
        unresolved: scan.unresolved(),
        missing_entries: entry_points.missing.clone(),
    };

    let report = Report::build(
        &root,
        &collected.files,
        &entry_points.files,
        &reachability,
        &Categorizer::new(config.categories.clone()),
        diagnostics,
    );
    info!(
        total = report.total_files,
        used = report.used_files,
        unused = report.unused_files,
        edges = graph.edge_count(),
        warnings = report.warnings.total,
        "analysis complete"
    );

    Ok(Analysis {
        root,
        files: collected.files,
        entry_points,
        graph,
        reachability,
        report,
    })
}

/// Find files no entry point reaches
pub fn find_unused_files(config: &AnalysisConfig) -> Result<Report, UnreachedError> {
    analyze(config).map(|analysis| analysis.report)
}

/// Find all files reachable from the entry points, sorted by path
pub fn find_reachable_files(config: &AnalysisConfig) -> Result<Vec<String>, UnreachedError> {
    analyze(config).map(|analysis| analysis.reachability.sorted())
}

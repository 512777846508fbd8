use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::fs;
use tracing::{debug, trace, warn};

use crate::abort::AbortSignal;
use crate::collector::{FileSet, ProjectFile, SkippedPath};
use crate::extractor::Extractor;
use crate::resolver::{ModuleResolver, Resolution, UnresolvedImport};
use crate::types::UnreachedError;

/// One raw import of one file and what it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    pub source: String,
    pub target: String,
    pub resolution: Resolution,
}

/// Everything the per-file scan produced, concatenated in file order
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub edges: Vec<ImportEdge>,
    pub skipped: Vec<SkippedPath>,
}

impl ScanOutput {
    /// Local-looking imports that matched no collected file
    pub fn unresolved(&self) -> Vec<UnresolvedImport> {
        self.edges
            .iter()
            .filter(|e| e.resolution == Resolution::Unresolved)
            .map(|e| UnresolvedImport { importer: e.source.clone(), target: e.target.clone() })
            .collect()
    }

    pub fn count(&self, resolution: &Resolution) -> usize {
        self.edges.iter().filter(|e| &e.resolution == resolution).count()
    }
}

enum FileScan {
    Edges(Vec<ImportEdge>),
    Skipped(SkippedPath),
    Aborted,
}

fn scan_file(
    file: &ProjectFile,
    extractor: Extractor,
    resolver: &ModuleResolver<'_>,
    signal: &AbortSignal,
) -> FileScan {
    if signal.is_aborted() {
        return FileScan::Aborted;
    }

    let bytes = match fs::read(&file.absolute) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %file.relative, error = %err, "skipping unreadable file");
            return FileScan::Skipped(SkippedPath {
                path: file.absolute.clone(),
                reason: err.to_string(),
            });
        }
    };
    let source = String::from_utf8_lossy(&bytes);

    let edges = extractor
        .extract(&source)
        .into_iter()
        .map(|(target, kind)| {
            let resolution = resolver.resolve(&file.relative, &target);
            trace!(source = %file.relative, %target, ?kind, ?resolution, "import");
            ImportEdge { source: file.relative.clone(), target, resolution }
        })
        .collect();
    FileScan::Edges(edges)
}

/// Read, extract and resolve every file on a bounded worker pool.
///
/// Workers share nothing mutable; each returns its own result and the
/// results are concatenated afterwards.
pub fn scan_imports(
    files: &FileSet,
    resolver: &ModuleResolver<'_>,
    extractor: Extractor,
    threads: Option<usize>,
    signal: &AbortSignal,
) -> Result<ScanOutput, UnreachedError> {
    let mut pool = ThreadPoolBuilder::new();
    if let Some(threads) = threads {
        pool = pool.num_threads(threads);
    }
    let pool = pool.build()?;

    let results: Vec<FileScan> = pool.install(|| {
        files
            .as_slice()
            .par_iter()
            .map(|file| scan_file(file, extractor, resolver, signal))
            .collect()
    });

    let mut output = ScanOutput::default();
    for result in results {
        match result {
            FileScan::Edges(edges) => output.edges.extend(edges),
            FileScan::Skipped(skipped) => output.skipped.push(skipped),
            FileScan::Aborted => return Err(UnreachedError::Aborted),
        }
    }

    debug!(
        edges = output.edges.len(),
        resolved = output.edges.len()
            - output.count(&Resolution::External)
            - output.count(&Resolution::Unresolved),
        skipped = output.skipped.len(),
        "scanned imports"
    );
    Ok(output)
}

mod logger;

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use unreached::cli::{AnalyzeArgs, Cli, Command, OutputFormat, RelocateArgs};
use unreached::relocate::{default_holding_dir, execute, load_report, plan};
use unreached::reporter::report_text;
use unreached::types::normalize_extension;
use unreached::{AbortSignal, AnalysisConfig, FileConfig, analyze_with_signal};

/// Exit status when the analysis itself failed (as opposed to finding files)
const EXIT_ERROR: i32 = 2;

/// Find default config file in directory
fn find_default_config(dir: &Path) -> Option<PathBuf> {
    let json_path = dir.join("unreached.json");
    if json_path.exists() {
        return Some(json_path);
    }

    let jsonc_path = dir.join("unreached.jsonc");
    if jsonc_path.exists() {
        return Some(jsonc_path);
    }

    None
}

/// Load config from file path, supporting .json and .jsonc
fn load_config_file(path: &Path) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let mut content = fs::read_to_string(path)?;
    json_strip_comments::strip(&mut content)?;
    let config: FileConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// File config first, then CLI flags on top
fn build_config(args: &AnalyzeArgs, file_config: Option<FileConfig>) -> AnalysisConfig {
    let mut config = AnalysisConfig { root: args.root.clone(), ..Default::default() };
    if let Some(file_config) = file_config {
        config.merge_file_config(file_config);
    }

    if !args.entry.is_empty() {
        config.entry = args.entry.clone();
    }
    if !args.ignore_dirs.is_empty() {
        config.ignore_dirs = args.ignore_dirs.clone();
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.iter().cloned().map(normalize_extension).collect();
    }
    if !args.source_prefixes.is_empty() {
        config.source_prefixes = args.source_prefixes.clone();
    }
    config.follow_symlinks |= args.follow_symlinks;
    config.respect_gitignore |= args.gitignore;
    config.extended_syntax |= args.extended_syntax;
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    config
}

fn run_analyze(args: AnalyzeArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let file_config = if let Some(config_path) = &args.config {
        // Use specified config file (error if not found)
        if !config_path.exists() {
            error!("Config file not found: {}", config_path.display());
            return Ok(EXIT_ERROR);
        }
        Some(load_config_file(config_path)?)
    } else {
        match find_default_config(&args.root) {
            Some(path) => match load_config_file(&path) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!("Failed to parse config file '{}': {}", path.display(), e);
                    None
                }
            },
            None => None,
        }
    };

    let output =
        args.output.clone().or_else(|| file_config.as_ref().and_then(|c| c.output.clone()));
    let config = build_config(&args, file_config);

    let signal = match args.timeout {
        Some(secs) => AbortSignal::with_timeout(Duration::from_secs(secs)),
        None => AbortSignal::new(),
    };

    let analysis = match analyze_with_signal(&config, &signal) {
        Ok(analysis) => analysis,
        Err(e) if e.is_configuration_error() => {
            error!("Configuration error: {e}");
            return Ok(EXIT_ERROR);
        }
        Err(e) => {
            error!("{e}");
            return Ok(EXIT_ERROR);
        }
    };

    let report = if args.show_unresolved {
        analysis.report
    } else {
        analysis.report.without_unresolved_details()
    };

    if let Some(path) = &output {
        report.write_to(path)?;
        info!("Report saved to {}", path.display());
    }

    match args.format {
        OutputFormat::Text => print!("{}", report_text(&report, args.all)),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    // Exit with error code if unused files found
    Ok(if report.unused_files > 0 { 1 } else { 0 })
}

fn run_relocate(args: RelocateArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let report = load_report(&args.report)?;
    let root = args.root.unwrap_or_else(|| report.root.clone());
    let holding = args.dest.unwrap_or_else(|| default_holding_dir(&root));

    let summary = execute(plan(&report, &root, &holding, &args.category), args.dry_run)?;

    let verb = if args.dry_run { "Would move" } else { "Moved" };
    for relocation in &summary.moved {
        println!("  {} -> {}", relocation.relative, relocation.to.display());
    }
    println!("{verb} {} files to {}", summary.moved.len(), holding.display());
    if !summary.missing.is_empty() || !summary.rejected.is_empty() {
        println!(
            "Skipped {} missing and {} out-of-root paths",
            summary.missing.len(),
            summary.rejected.len()
        );
    }
    Ok(0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet);

    let code = match cli.command {
        Command::Analyze(args) => run_analyze(args)?,
        Command::Relocate(args) => run_relocate(args)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unreached")]
#[command(about = "Find JavaScript files no entry point imports")]
#[command(version)]
pub struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the import graph and report unreachable files
    Analyze(AnalyzeArgs),
    /// Move files listed in a saved report into a holding directory
    Relocate(RelocateArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Path to config file (unreached.json or unreached.jsonc)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Entry point files, relative to the root
    #[arg(short, long)]
    pub entry: Vec<String>,

    /// Directory names to skip at any depth [default: node_modules, android, ios, build, __tests__, .git, backup]
    #[arg(long = "ignore-dir")]
    pub ignore_dirs: Vec<String>,

    /// Source extensions [default: .js, .jsx]
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Import prefixes resolved from the root [default: src/]
    #[arg(long = "source-prefix")]
    pub source_prefixes: Vec<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List every unused file instead of the first ten per category
    #[arg(long)]
    pub all: bool,

    /// Include each unresolved import in the output
    #[arg(long)]
    pub show_unresolved: bool,

    /// Descend into symlinked directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip files matched by .gitignore
    #[arg(long)]
    pub gitignore: bool,

    /// Also follow `export ... from` and literal `import()`
    #[arg(long)]
    pub extended_syntax: bool,

    /// Worker threads for reading files
    #[arg(long)]
    pub threads: Option<usize>,

    /// Give up after this many seconds without writing anything
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct RelocateArgs {
    /// Report written by `analyze --output`
    #[arg(long)]
    pub report: PathBuf,

    /// Project root [default: the root recorded in the report]
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Holding directory [default: <root>/backup/unused_files_<timestamp>]
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Only move files in these categories
    #[arg(long)]
    pub category: Vec<String>,

    /// Show what would move without moving
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

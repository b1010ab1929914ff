//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    backward::BackwardArgs, completions::CompletionsArgs, iso::IsoArgs, pattern::PatternArgs,
    reference::ReferenceArgs, size::SizeArgs, stratify::StratifyArgs,
};

#[derive(Parser)]
#[command(name = "backcheck")]
#[command(author, version, about = "Backward inspection sampling plans")]
#[command(long_about = "Compute acceptance-sampling plans (sample size, acceptance number, risk tier) for backward inspection of held production lots.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Zero-defect sample size for a held quantity
    Size(SizeArgs),

    /// Backward sample with a risk multiplier (ratio, manual or FMEA)
    Backward(BackwardArgs),

    /// Containers to check back from the defect occurrence pattern
    Pattern(PatternArgs),

    /// ISO 2859-1 style plan across chronological inspection intervals
    Iso(IsoArgs),

    /// Split a fixed sample budget over intervals by defect severity
    Stratify(StratifyArgs),

    /// Reference table of zero-defect sample sizes
    Reference(ReferenceArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary with colored tiers
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Tab-separated values (for piping)
    Tsv,
    /// Markdown tables
    Md,
}

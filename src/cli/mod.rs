//! Command-line parsing for the automobile sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ReportMode, YEAR_MIN};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "autostats", version, about = "Automobile Sales Statistics Dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute one report and print its four views as text tables.
    Report(ReportArgs),
    /// Compute one report and write its four views to a CSV file.
    Export(ExportArgs),
    /// Launch the interactive TUI dashboard.
    ///
    /// This uses the same report pipeline as `autostats report`, but renders
    /// the four views as charts in a terminal UI using Ratatui.
    Tui(DataArgs),
}

/// Where the dataset comes from.
#[derive(Debug, Parser, Clone)]
pub struct DataArgs {
    /// Local CSV file with the sales dataset.
    ///
    /// When omitted, the dataset is downloaded from the public URL (or
    /// `AUTO_SALES_CSV_URL` if set).
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Use a deterministic synthetic dataset (no network).
    #[arg(long)]
    pub sample: bool,

    /// Random seed for synthetic dataset generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Common options for computing a report.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Which report to compute.
    #[arg(short = 'm', long, value_enum, default_value_t = ReportMode::Yearly)]
    pub mode: ReportMode,

    /// Selected year (yearly mode; ignored for recession-period statistics).
    ///
    /// Out-of-range years are not an error; they just produce empty views.
    #[arg(short = 'y', long, default_value_t = YEAR_MIN)]
    pub year: u16,
}

/// Options for `autostats export`.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,
}

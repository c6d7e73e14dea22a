//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the sales dataset (CSV file, download, or synthetic sample)
//! - computes the selected report
//! - prints tables or launches the TUI
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, ExportArgs, ReportArgs};
use crate::domain::{DataSource, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `autostats` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `autostats` (and `autostats --sample`) to behave like
    // `autostats tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args, None),
        Command::Export(ExportArgs { report, out }) => handle_report(report, Some(out)),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_report(args: ReportArgs, export: Option<PathBuf>) -> Result<(), AppError> {
    let config = run_config_from_args(&args, export);
    let run = pipeline::run_report(&config)?;

    println!("{}", crate::report::format_run_summary(&run.ingest, &config));
    println!("{}", crate::report::format_report(&run.report));

    if let Some(path) = &config.export {
        crate::io::export::write_report_csv(path, &run.report)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

pub fn run_config_from_args(args: &ReportArgs, export: Option<PathBuf>) -> RunConfig {
    let source = if let Some(path) = &args.data.csv {
        DataSource::Csv(path.clone())
    } else if args.data.sample {
        DataSource::Sample
    } else {
        DataSource::Remote
    };

    RunConfig {
        source,
        sample_seed: args.data.seed,
        mode: args.mode,
        // The year selector always carries a value (the engine ignores it in
        // recession-period mode), mirroring the dashboard's dropdowns.
        year: Some(args.year),
        export,
    }
}

/// Rewrite argv so `autostats` defaults to `autostats tui`.
///
/// Rules:
/// - `autostats`                       -> `autostats tui`
/// - `autostats --sample ...`          -> `autostats tui --sample ...`
/// - `autostats --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["autostats"])), argv(&["autostats", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["autostats", "--sample", "--seed", "7"])),
            argv(&["autostats", "tui", "--sample", "--seed", "7"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["autostats", "report", "-y", "1990"])),
            argv(&["autostats", "report", "-y", "1990"])
        );
        assert_eq!(
            rewrite_args(argv(&["autostats", "--help"])),
            argv(&["autostats", "--help"])
        );
    }
}

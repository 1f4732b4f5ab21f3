//! Strata CLI — the command-line interface for the Strata build
//! orchestrator.
//!
//! Provides `strata build` for incremental content-hash-driven builds and
//! `strata prune` for dropping cache entries the current configuration can
//! no longer produce.

#![warn(missing_docs)]

mod build;
mod pipeline;
mod prune;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Strata — an incremental build orchestrator for Fortran and C codebases.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Strata build orchestrator")]
pub struct Cli {
    /// Suppress all output except diagnostics.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a `strata.toml` outside the current directory. The project
    /// root is taken to be the file's parent directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the configured targets.
    Build(BuildArgs),
    /// Drop cache entries no reachable transform can produce.
    Prune(PruneArgs),
}

/// Arguments for the `strata build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Target names to build. Defaults to every configured target.
    pub targets: Vec<String>,

    /// Worker thread count, overriding the configured value.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `strata prune` subcommand.
#[derive(Parser, Debug)]
pub struct PruneArgs {
    /// Report what would be removed without touching the manifest.
    #[arg(long)]
    pub dry_run: bool,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-diagnostic output.
    pub quiet: bool,
    /// Optional path to a config file outside the working directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Prune(ref args) => prune::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["strata", "build"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(args.targets.is_empty());
                assert!(args.workers.is_none());
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_targets() {
        let cli = Cli::parse_from(["strata", "build", "atmos", "ocean"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.targets, vec!["atmos", "ocean"]);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_workers() {
        let cli = Cli::parse_from(["strata", "build", "--workers", "8"]);
        match cli.command {
            Command::Build(ref args) => assert_eq!(args.workers, Some(8)),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_json_format() {
        let cli = Cli::parse_from(["strata", "build", "--format", "json"]);
        match cli.command {
            Command::Build(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_prune_default() {
        let cli = Cli::parse_from(["strata", "prune"]);
        match cli.command {
            Command::Prune(ref args) => assert!(!args.dry_run),
            _ => panic!("expected Prune command"),
        }
    }

    #[test]
    fn parse_prune_dry_run() {
        let cli = Cli::parse_from(["strata", "prune", "--dry-run"]);
        match cli.command {
            Command::Prune(ref args) => assert!(args.dry_run),
            _ => panic!("expected Prune command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["strata", "--quiet", "--config", "/proj/strata.toml", "build"]);
        assert!(cli.quiet);
        assert_eq!(cli.config.as_deref(), Some("/proj/strata.toml"));
    }
}

//! CLI command definitions and handlers

mod config;
mod detect;
mod history;
mod init;
mod validate;

use crate::models::ValidationMode;
use crate::reporters::OutputFormat;
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a minimum score override (0-100)
fn parse_score(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n > 100 {
        Err("score cannot exceed 100".to_string())
    } else {
        Ok(n)
    }
}

/// Trinity - three-layer project quality gate
///
/// Scores test health, implementation integrity and documentation
/// completeness, and fails when the project falls below its quality bar.
#[derive(Parser, Debug)]
#[command(name = "trinity")]
#[command(
    version,
    about = "Three-layer project quality gate: tests, implementation, documentation",
    long_about = "Trinity scores a project along three layers (test health, implementation \
integrity, documentation completeness), cross-checks that every source file has a test, \
and exits non-zero when the result is below the configured minimum.\n\n\
Run without a subcommand to validate the current directory in `all` mode:\n  \
trinity .",
    after_help = "\
Examples:
  trinity .                                  Validate current directory
  trinity validate . --mode pre-commit       Check staged files only
  trinity validate . --mode pre-push         Run the test suite
  trinity validate . --format json           JSON output for CI
  trinity validate . --format html -o out/   Standalone HTML report
  trinity init . --template react            Write trinity.toml from a template"
)]
pub struct Cli {
    /// Path to project (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Validation mode as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    PreCommit,
    PrePush,
    MidDev,
    All,
}

impl From<ModeArg> for ValidationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PreCommit => ValidationMode::PreCommit,
            ModeArg::PrePush => ValidationMode::PrePush,
            ModeArg::MidDev => ValidationMode::MidDev,
            ModeArg::All => ValidationMode::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Console,
    Json,
    Html,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Console => OutputFormat::Console,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Html => OutputFormat::Html,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the project and report the Trinity score
    #[command(after_help = "\
Modes:
  pre-commit   staged files only: existence, imports, tests for new files
  pre-push     run the test suite, then synchronization
  mid-dev      the three layers, no synchronization
  all          the three layers plus synchronization (default)

Exit code is 1 when the result is not valid.")]
    Validate {
        /// Check sequence to run
        #[arg(long, short = 'm', value_enum, default_value = "all")]
        mode: ModeArg,

        /// Output format (default: reporting.format from trinity.toml)
        #[arg(long, short = 'f', value_enum)]
        format: Option<FormatArg>,

        /// Output file or directory (default: stdout, or auto-named for html)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Override validation.min_trinity_score
        #[arg(long, value_parser = parse_score)]
        min_score: Option<u32>,

        /// Override validation.test_command (pre-push)
        #[arg(long)]
        test_command: Option<String>,

        /// List every issue
        #[arg(long, short = 'v')]
        verbose: bool,

        /// Hide recommendations
        #[arg(long)]
        no_recommendations: bool,

        /// Do not read or record the score history
        #[arg(long)]
        no_history: bool,
    },

    /// Write a trinity.toml for this project
    Init {
        /// Start from a named template (react, node, nextjs, python, rust, library)
        #[arg(long, short = 't')]
        template: Option<String>,

        /// Overwrite an existing trinity.toml
        #[arg(long)]
        force: bool,

        /// Skip language auto-detection
        #[arg(long)]
        no_detect: bool,
    },

    /// Inspect or change the project configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the detected language, framework and test command
    Detect,

    /// Show recorded scores for this project
    History {
        /// Number of runs to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        /// Delete the recorded history
        #[arg(long)]
        clear: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Check the configuration and list problems
    Validate,
    /// Set a value by dotted key and save trinity.toml
    Set {
        /// Config key (e.g., validation.min_trinity_score)
        key: String,
        /// Value to set (parsed as JSON when possible, else a string)
        value: String,
    },
    /// List available templates
    Templates,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Validate {
            mode,
            format,
            output,
            min_score,
            test_command,
            verbose,
            no_recommendations,
            no_history,
        }) => validate::run(
            &cli.path,
            validate::ValidateOptions {
                mode: mode.into(),
                format: format.map(Into::into),
                output,
                min_score,
                test_command,
                verbose,
                show_recommendations: !no_recommendations,
                track_history: !no_history,
            },
        ),

        Some(Commands::Init {
            template,
            force,
            no_detect,
        }) => init::run(&cli.path, template.as_deref(), force, !no_detect),

        Some(Commands::Config { action }) => config::run(&cli.path, action),

        Some(Commands::Detect) => detect::run(&cli.path),

        Some(Commands::History { limit, json, clear }) => {
            history::run(&cli.path, limit, json, clear)
        }

        Some(Commands::Version) => {
            println!("trinity {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        None => {
            check_unknown_subcommand(&cli.path)?;
            validate::run(&cli.path, validate::ValidateOptions::default())
        }
    }
}

fn check_unknown_subcommand(path: &std::path::Path) -> Result<()> {
    let path_str = path.to_string_lossy();
    let looks_like_command = !path.exists()
        && !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.starts_with('.');
    if !looks_like_command {
        return Ok(());
    }
    let known_commands = ["validate", "init", "config", "detect", "history", "version"];
    if !known_commands.contains(&path_str.as_ref()) {
        anyhow::bail!(
            "Unknown command '{}'. Run 'trinity --help' for available commands.\n\nDid you mean one of: {}?",
            path_str,
            known_commands.join(", ")
        );
    }
    Ok(())
}

//! Validate command - run a mode and report the result

use crate::cache::ScoreHistory;
use crate::config::ConfigManager;
use crate::models::{TrinityValidationResult, ValidationMode};
use crate::reporters::{
    generate_html_report, generate_json_report, print_console_report, render_console,
    report_file_name, save_report, ConsoleOptions, OutputFormat,
};
use crate::validator::Validator;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub mode: ValidationMode,
    /// `None` defers to `reporting.format`
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub min_score: Option<u32>,
    pub test_command: Option<String>,
    pub verbose: bool,
    pub show_recommendations: bool,
    pub track_history: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::All,
            format: None,
            output: None,
            min_score: None,
            test_command: None,
            verbose: false,
            show_recommendations: true,
            track_history: true,
        }
    }
}

/// Caller overrides as a partial config, deep-merged over the project file
fn overrides(opts: &ValidateOptions) -> Option<serde_json::Value> {
    let mut validation = serde_json::Map::new();
    if let Some(min) = opts.min_score {
        validation.insert("min_trinity_score".into(), json!(min));
    }
    if let Some(command) = &opts.test_command {
        validation.insert("test_command".into(), json!(command));
    }
    if validation.is_empty() {
        None
    } else {
        Some(json!({ "validation": validation }))
    }
}

fn spinner(enabled: bool, mode: ValidationMode) -> Option<ProgressBar> {
    if !enabled || !std::io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    bar.set_message(format!("Validating ({} mode)...", mode));
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

/// Produce the result for `path`; no output, no exit
pub fn validate_project(path: &Path, opts: &ValidateOptions) -> Result<(TrinityValidationResult, ConfigManager)> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let mut manager = ConfigManager::load_with_overrides(&root, overrides(opts));
    manager.auto_detect_project();

    let mut validator = Validator::from_manager(&root, &manager);
    if opts.track_history && manager.get_config().reporting.track_history {
        validator = validator.with_history(ScoreHistory::for_project(&root));
    }
    let result = validator.validate(opts.mode);
    Ok((result, manager))
}

/// Run the validate command
pub fn run(path: &Path, opts: ValidateOptions) -> Result<()> {
    let config_format = {
        let manager = ConfigManager::load(path);
        let configured = &manager.get_config().reporting.format;
        OutputFormat::from_str(configured).unwrap_or_else(|e| {
            warn!("{}; falling back to console", e);
            OutputFormat::Console
        })
    };
    let format = opts.format.unwrap_or(config_format);

    let progress = spinner(format == OutputFormat::Console && opts.output.is_none(), opts.mode);
    let outcome = validate_project(path, &opts);
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }
    let (result, manager) = outcome?;

    let reporting = &manager.get_config().reporting;
    let console_options = ConsoleOptions {
        verbose: opts.verbose || reporting.verbose,
        show_recommendations: opts.show_recommendations && reporting.show_recommendations,
        ..ConsoleOptions::default()
    };

    let content = match format {
        OutputFormat::Console if opts.output.is_none() => {
            print_console_report(Some(&result), &console_options);
            None
        }
        OutputFormat::Console => Some(render_console(
            Some(&result),
            &ConsoleOptions {
                color: false,
                ..console_options
            },
        )),
        OutputFormat::Json => Some(generate_json_report(&result)?),
        OutputFormat::Html => Some(generate_html_report(&result)),
    };

    if let Some(content) = content {
        let target = match (&opts.output, format) {
            (Some(output), _) => Some(output.clone()),
            // HTML is never dumped on a terminal
            (None, OutputFormat::Html) => Some(
                manager
                    .root()
                    .join(&reporting.output_dir)
                    .join(report_file_name(format)),
            ),
            (None, _) => None,
        };
        match target {
            Some(target) => {
                let saved = save_report(&content, &target, format)
                    .with_context(|| format!("Failed to write report to {}", target.display()))?;
                eprintln!(
                    "{} Report saved to {}",
                    style("✓").green(),
                    style(saved.display()).cyan()
                );
            }
            None => println!("{}", content),
        }
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_overrides() {
        assert!(overrides(&ValidateOptions::default()).is_none());
        let opts = ValidateOptions {
            min_score: Some(75),
            test_command: Some("make test".into()),
            ..Default::default()
        };
        assert_eq!(
            overrides(&opts),
            Some(json!({ "validation": { "min_trinity_score": 75, "test_command": "make test" } }))
        );
    }

    #[test]
    fn test_validate_project_applies_overrides() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/a.ts"), "export const a = 1;\n").unwrap();

        let opts = ValidateOptions {
            mode: ValidationMode::MidDev,
            min_score: Some(10),
            track_history: false,
            ..Default::default()
        };
        let (result, manager) = validate_project(dir.path(), &opts).unwrap();
        assert_eq!(result.metadata.min_trinity_score, 10);
        assert_eq!(manager.get_config().validation.min_trinity_score, 10);
        assert_eq!(result.metadata.mode, ValidationMode::MidDev);
    }

    #[test]
    fn test_validate_project_rejects_missing_path() {
        let dir = tempdir().unwrap();
        let opts = ValidateOptions::default();
        assert!(validate_project(&dir.path().join("nope"), &opts).is_err());
    }
}

//! Output reporters for validation results
//!
//! Supports multiple output formats:
//! - `console` - Terminal output with colors
//! - `json` - The result contract, pretty-printed
//! - `html` - Standalone HTML report
//!
//! Reporters are pure projections of a [`TrinityValidationResult`]; only
//! [`save_report`] touches the filesystem.

mod html;
mod json;
mod text;

pub use html::generate_html_report;
pub use json::{generate_json_report, parse_json_report, render_compact};
pub use text::{print_console_report, render_console, score_level, ConsoleOptions, ScoreLevel};

use crate::error::{TrinityError, TrinityResult};
use crate::models::TrinityValidationResult;
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Html,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "text" | "terminal" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: console, json, html",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Console => write!(f, "console"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// Recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Html => "html",
    }
}

/// Render a result in the specified format
pub fn render(
    result: &TrinityValidationResult,
    format: OutputFormat,
    options: &ConsoleOptions,
) -> TrinityResult<String> {
    match format {
        OutputFormat::Console => Ok(render_console(Some(result), options)),
        OutputFormat::Json => generate_json_report(result),
        OutputFormat::Html => Ok(generate_html_report(result)),
    }
}

/// Timestamped report file name: `trinity-report-20260101-120000.json`
pub fn report_file_name(format: OutputFormat) -> String {
    format!(
        "trinity-report-{}.{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        file_extension(format)
    )
}

/// Write a rendered report.
///
/// An existing directory receives a timestamped file; a path without an
/// extension gets the format's. Parent directories are created.
pub fn save_report(content: &str, path: &Path, format: OutputFormat) -> TrinityResult<PathBuf> {
    let target = if path.is_dir() {
        path.join(report_file_name(format))
    } else if path.extension().is_none() {
        path.with_extension(file_extension(format))
    } else {
        path.to_path_buf()
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| TrinityError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&target, content).map_err(|source| TrinityError::Write {
        path: target.clone(),
        source,
    })?;
    debug!("Wrote {} report to {}", format, target.display());
    Ok(target)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::*;
    use tempfile::tempdir;

    /// A failing `all` run with one issue of each severity
    pub(crate) fn test_result() -> TrinityValidationResult {
        let error = ValidationError::error(Category::Implementation, "Cannot resolve import './gone'")
            .with_file("src/app.ts")
            .with_line(3);
        let warning = ValidationError::warning(
            Category::Synchronization,
            "No test found for src/foo.ts (expected __tests__/foo.test.ts)",
        )
        .with_file("src/foo.ts");

        let mut layers = LayerResults::default();
        for (layer, score) in [
            (Layer::Test, 96),
            (Layer::Implementation, 82),
            (Layer::Documentation, 91),
        ] {
            let result = match layer {
                Layer::Test => &mut layers.test,
                Layer::Implementation => &mut layers.implementation,
                Layer::Documentation => &mut layers.documentation,
            };
            result.evaluated = true;
            result.score = score;
        }
        layers.implementation.errors.push(error.clone());

        TrinityValidationResult {
            valid: false,
            score: TrinityScore {
                test: 96,
                implementation: 82,
                documentation: 91,
                overall: Some(90),
            },
            errors: vec![error],
            warnings: vec![warning],
            metadata: ValidationMetadata {
                project_name: "shop".into(),
                mode: ValidationMode::All,
                timestamp: "2026-01-01T00:00:00+00:00".into(),
                duration_ms: 42,
                engine_version: "0.1.0".into(),
                total_files: 12,
                language: Some("javascript".into()),
                framework: Some("jest".into()),
                min_trinity_score: 90,
                grade: "B+".into(),
                trend: None,
                test_run: None,
                changed_files: None,
            },
            layers,
            synchronization: SynchronizationResult {
                synchronized: false,
                evaluated: true,
                missing_tests: vec!["src/foo.ts".into()],
                coverage: SyncCoverage {
                    test_coverage: 80,
                    documentation_coverage: 0,
                },
                ..Default::default()
            },
            recommendations: vec!["Add a test for src/foo.ts".into()],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Console);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("html").unwrap(), OutputFormat::Html);
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_save_report_paths() {
        let dir = tempdir().unwrap();

        let explicit = save_report("{}", &dir.path().join("out/report.json"), OutputFormat::Json).unwrap();
        assert_eq!(explicit, dir.path().join("out/report.json"));
        assert_eq!(std::fs::read_to_string(&explicit).unwrap(), "{}");

        let bare = save_report("<html>", &dir.path().join("summary"), OutputFormat::Html).unwrap();
        assert_eq!(bare, dir.path().join("summary.html"));

        let into_dir = save_report("text", dir.path(), OutputFormat::Console).unwrap();
        assert_eq!(into_dir.parent(), Some(dir.path()));
        let name = into_dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("trinity-report-") && name.ends_with(".txt"));
    }

    #[test]
    fn test_render_dispatch() {
        let result = test_result();
        let options = ConsoleOptions::plain();
        let json = render(&result, OutputFormat::Json, &options).unwrap();
        assert!(json.trim_start().starts_with('{'));
        let html = render(&result, OutputFormat::Html, &options).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        let text = render(&result, OutputFormat::Console, &options).unwrap();
        assert!(text.contains("shop"));
    }
}

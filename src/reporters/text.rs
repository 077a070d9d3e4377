//! Console reporter with colors and formatting

use crate::models::{
    Layer, LayerValidationResult, Severity, TrendDirection, TrinityValidationResult,
    ValidationError,
};
use console::Style;

/// Issues listed per severity before eliding the rest
const MAX_LISTED: usize = 10;

/// How a score should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// ≥95 success, ≥90 info, ≥80 warning, else error
pub fn score_level(score: u32) -> ScoreLevel {
    match score {
        s if s >= 95 => ScoreLevel::Success,
        s if s >= 90 => ScoreLevel::Info,
        s if s >= 80 => ScoreLevel::Warning,
        _ => ScoreLevel::Error,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// List every issue instead of the first few
    pub verbose: bool,
    pub show_recommendations: bool,
    pub color: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            show_recommendations: true,
            color: console::colors_enabled(),
        }
    }
}

impl ConsoleOptions {
    /// No colors; stable output for files and tests
    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }
}

struct Palette {
    bold: Style,
    dim: Style,
    success: Style,
    info: Style,
    warning: Style,
    error: Style,
}

impl Palette {
    fn new(color: bool) -> Self {
        let base = Style::new().force_styling(color);
        Self {
            bold: base.clone().bold(),
            dim: base.clone().dim(),
            success: base.clone().green(),
            info: base.clone().cyan(),
            warning: base.clone().yellow(),
            error: base.red(),
        }
    }

    fn for_score(&self, score: u32) -> &Style {
        match score_level(score) {
            ScoreLevel::Success => &self.success,
            ScoreLevel::Info => &self.info,
            ScoreLevel::Warning => &self.warning,
            ScoreLevel::Error => &self.error,
        }
    }
}

fn issue_line(issue: &ValidationError, palette: &Palette) -> String {
    let (tag, style) = match issue.severity {
        Severity::Error => ("[E]", &palette.error),
        Severity::Warning => ("[W]", &palette.warning),
    };
    let location = issue
        .location()
        .map(|l| format!("  {}", palette.dim.apply_to(l)))
        .unwrap_or_default();
    format!(
        "  {} {:<16} {}{}\n",
        style.apply_to(tag),
        palette.dim.apply_to(issue.category.to_string()),
        issue.message,
        location
    )
}

fn layer_line(layer: &LayerValidationResult, palette: &Palette) -> String {
    if !layer.evaluated {
        return format!(
            "  {:<16} {}\n",
            layer.layer.label(),
            palette.dim.apply_to("skipped")
        );
    }
    format!(
        "  {:<16} {:>3}  {}\n",
        layer.layer.label(),
        palette.for_score(layer.score).apply_to(layer.score),
        palette.dim.apply_to(format!(
            "{} files, {} errors, {} warnings",
            layer.details.total_files, layer.details.error_count, layer.details.warning_count
        ))
    )
}

fn push_issues(out: &mut String, title: &str, issues: &[ValidationError], palette: &Palette, verbose: bool) {
    if issues.is_empty() {
        return;
    }
    out.push_str(&format!("{} ({})\n", palette.bold.apply_to(title), issues.len()));
    let shown = if verbose { issues.len() } else { MAX_LISTED };
    for issue in issues.iter().take(shown) {
        out.push_str(&issue_line(issue, palette));
    }
    let remaining = issues.len().saturating_sub(shown);
    if remaining > 0 {
        out.push_str(&format!(
            "  {}\n",
            palette
                .dim
                .apply_to(format!("...and {} more (use --verbose)", remaining))
        ));
    }
    out.push('\n');
}

/// Render a result (or its absence) as terminal text
pub fn render_console(result: Option<&TrinityValidationResult>, options: &ConsoleOptions) -> String {
    let palette = Palette::new(options.color);
    let Some(result) = result else {
        return format!(
            "{}\n",
            palette.warning.apply_to("No validation result to report.")
        );
    };

    let meta = &result.metadata;
    let overall = result.overall();
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} {}\n",
        palette.bold.apply_to("Trinity Validation"),
        palette.dim.apply_to(format!("({} mode)", meta.mode))
    ));
    out.push_str(&format!(
        "{}\n",
        palette.dim.apply_to("──────────────────────────────────────")
    ));
    out.push_str(&format!(
        "Project: {}  Files: {}  Duration: {}ms\n",
        palette.bold.apply_to(&meta.project_name),
        meta.total_files,
        meta.duration_ms
    ));

    let score_style = palette.for_score(overall);
    let mut score_line = format!(
        "Score: {}  Grade: {}  (minimum {})",
        score_style.apply_to(format!("{}/100", overall)).bold(),
        score_style.apply_to(&meta.grade).bold(),
        meta.min_trinity_score
    );
    if let Some(trend) = &meta.trend {
        let (arrow, style) = match trend.direction {
            TrendDirection::Improving => ("↑", &palette.success),
            TrendDirection::Declining => ("↓", &palette.error),
            TrendDirection::Stable => ("→", &palette.dim),
        };
        score_line.push_str(&format!(
            "  {}",
            style.apply_to(format!("{} {:+} from {}", arrow, trend.delta, trend.previous))
        ));
    }
    out.push_str(&score_line);
    out.push_str("\n\n");

    out.push_str(&format!("{}\n", palette.bold.apply_to("LAYERS")));
    for layer in Layer::ALL {
        out.push_str(&layer_line(result.layers.get(layer), &palette));
    }
    out.push('\n');

    if let Some(run) = &meta.test_run {
        out.push_str(&format!(
            "{} {} passed, {} failed, {} total{}\n\n",
            palette.bold.apply_to("TEST RUN"),
            run.passed,
            run.failed,
            run.total,
            if run.timed_out { " (timed out)" } else { "" }
        ));
    }

    let sync = &result.synchronization;
    if sync.evaluated {
        out.push_str(&format!(
            "{} test coverage {}%, docs {}%{}\n\n",
            palette.bold.apply_to("SYNC"),
            sync.coverage.test_coverage,
            sync.coverage.documentation_coverage,
            if sync.synchronized {
                String::new()
            } else {
                format!(", {} untested", sync.missing_tests.len())
            }
        ));
    }

    if let Some(changed) = meta.changed_files {
        out.push_str(&format!("{} {}\n\n", palette.bold.apply_to("STAGED FILES"), changed));
    }

    push_issues(&mut out, "ERRORS", &result.errors, &palette, options.verbose);
    push_issues(&mut out, "WARNINGS", &result.warnings, &palette, options.verbose);

    if options.show_recommendations && !result.recommendations.is_empty() {
        out.push_str(&format!("{}\n", palette.bold.apply_to("RECOMMENDATIONS")));
        for rec in &result.recommendations {
            out.push_str(&format!("  • {}\n", rec));
        }
        out.push('\n');
    }

    if result.valid {
        out.push_str(&format!("{}\n", palette.success.apply_to("✓ Validation passed")));
    } else {
        out.push_str(&format!("{}\n", palette.error.apply_to("✗ Validation failed")));
    }
    out
}

/// Print the console report to stdout
pub fn print_console_report(result: Option<&TrinityValidationResult>, options: &ConsoleOptions) {
    print!("{}", render_console(result, options));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_score_levels() {
        assert_eq!(score_level(100), ScoreLevel::Success);
        assert_eq!(score_level(95), ScoreLevel::Success);
        assert_eq!(score_level(94), ScoreLevel::Info);
        assert_eq!(score_level(90), ScoreLevel::Info);
        assert_eq!(score_level(80), ScoreLevel::Warning);
        assert_eq!(score_level(79), ScoreLevel::Error);
        assert_eq!(score_level(0), ScoreLevel::Error);
    }

    #[test]
    fn test_missing_result() {
        let out = render_console(None, &ConsoleOptions::plain());
        assert_eq!(out, "No validation result to report.\n");
    }

    #[test]
    fn test_plain_render() {
        let out = render_console(Some(&test_result()), &ConsoleOptions::plain());
        assert!(!out.contains('\x1b'));
        assert!(out.contains("Score: 90/100  Grade: B+  (minimum 90)"));
        assert!(out.contains("src/app.ts:3"));
        assert!(out.contains("ERRORS (1)"));
        assert!(out.contains("WARNINGS (1)"));
        assert!(out.contains("Add a test for src/foo.ts"));
        assert!(out.contains("✗ Validation failed"));
    }

    #[test]
    fn test_recommendations_can_be_hidden() {
        let options = ConsoleOptions {
            show_recommendations: false,
            ..ConsoleOptions::plain()
        };
        let out = render_console(Some(&test_result()), &options);
        assert!(!out.contains("RECOMMENDATIONS"));
    }

    #[test]
    fn test_long_issue_lists_are_elided() {
        let mut result = test_result();
        let warning = result.warnings[0].clone();
        result.warnings = vec![warning; MAX_LISTED + 3];

        let out = render_console(Some(&result), &ConsoleOptions::plain());
        assert!(out.contains("...and 3 more"));

        let verbose = ConsoleOptions {
            verbose: true,
            ..ConsoleOptions::plain()
        };
        assert!(!render_console(Some(&result), &verbose).contains("...and"));
    }

    #[test]
    fn test_color_render() {
        let options = ConsoleOptions {
            color: true,
            ..ConsoleOptions::plain()
        };
        let out = render_console(Some(&test_result()), &options);
        assert!(out.contains('\x1b'));
    }
}

//! Pre-push gate: runs the project's test suite

use super::Validator;
use crate::models::{
    Category, Layer, LayerDetails, LayerValidationResult, TestRunSummary, ValidationError,
};
use crate::runner::run_test_command;
use tracing::{info, warn};

/// Exit status a POSIX shell uses for "command not found"
const COMMAND_NOT_FOUND: i32 = 127;

/// Percentage of passing tests; no tests means no evidence
fn pass_rate(summary: &TestRunSummary) -> u32 {
    if summary.total == 0 {
        return 0;
    }
    ((summary.passed as f64 * 100.0) / summary.total as f64).round() as u32
}

impl Validator {
    /// Configured test command, else the adapter's
    pub fn test_command(&self) -> Option<String> {
        self.config()
            .validation
            .test_command
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.adapter().and_then(|a| a.test_command(self.root())))
    }

    pub(crate) fn run_test_suite(&mut self) -> (LayerValidationResult, TestRunSummary) {
        let mut layer = LayerValidationResult::skipped(Layer::Test);
        layer.evaluated = true;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut summary = TestRunSummary::default();

        match self.test_command() {
            None => {
                errors.push(ValidationError::error(
                    Category::Test,
                    "No test command configured and none could be detected \
                     (set validation.test_command)",
                ));
            }
            Some(command) => {
                let timeout = self.config().validation.test_timeout_secs;
                info!("Running test suite: {}", command);
                let run = run_test_command(&command, self.root(), timeout);
                summary = run.summary();

                if run.timed_out {
                    errors.push(ValidationError::error(
                        Category::Synchronization,
                        format!("Test suite timed out after {}s", timeout),
                    ));
                } else if !run.completed {
                    let reason = run.error.clone().unwrap_or_else(|| "unknown error".to_string());
                    errors.push(ValidationError::error(
                        Category::Test,
                        format!("Test suite could not run: {}", reason),
                    ));
                } else if summary.total == 0 && run.exit_code == Some(COMMAND_NOT_FOUND) {
                    errors.push(ValidationError::error(
                        Category::Test,
                        format!("Test command not found: {}", command),
                    ));
                } else if summary.failed > 0 {
                    errors.push(ValidationError::error(
                        Category::Test,
                        format!("{} of {} tests failed", summary.failed, summary.total),
                    ));
                } else if summary.total == 0 && run.exit_code != Some(0) {
                    errors.push(ValidationError::error(
                        Category::Test,
                        format!(
                            "Test suite failed (exit code {})",
                            run.exit_code
                                .map(|c| c.to_string())
                                .unwrap_or_else(|| "none".to_string())
                        ),
                    ));
                } else if summary.total == 0 {
                    warnings.push(ValidationError::warning(
                        Category::Test,
                        "Test suite passed but reported no test counts",
                    ));
                }

                if !errors.is_empty() {
                    warn!("Test suite failed: {}", errors[0].message);
                }
            }
        }

        layer.score = pass_rate(&summary);
        layer.details = LayerDetails {
            total_files: 0,
            valid_files: 0,
            error_count: errors.len(),
            warning_count: warnings.len(),
        };
        for issue in errors.iter().chain(warnings.iter()) {
            self.push(issue.clone());
        }
        layer.errors = errors;
        layer.warnings = warnings;
        (layer, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate() {
        let summary = |passed, failed| TestRunSummary {
            passed,
            failed,
            total: passed + failed,
            ..Default::default()
        };
        assert_eq!(pass_rate(&summary(0, 0)), 0);
        assert_eq!(pass_rate(&summary(9, 1)), 90);
        assert_eq!(pass_rate(&summary(2, 1)), 67);
        assert_eq!(pass_rate(&summary(5, 0)), 100);
    }
}

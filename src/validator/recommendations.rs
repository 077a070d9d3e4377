//! Advisory next steps derived from a finished result

use crate::models::{Category, TrendDirection, TrinityValidationResult, ValidationMode};

/// Layer scores below this get a dedicated recommendation
const WEAK_LAYER_SCORE: u32 = 70;

fn count_matching(result: &TrinityValidationResult, category: Category, needle: &str) -> usize {
    result
        .issues_in(category)
        .filter(|issue| issue.message.contains(needle))
        .count()
}

/// Human-readable suggestions, most important first
pub fn recommendations_for(result: &TrinityValidationResult) -> Vec<String> {
    let mut recs = Vec::new();
    let layers = &result.layers;
    let sync = &result.synchronization;

    if result.metadata.mode == ValidationMode::PreCommit && result.metadata.changed_files == Some(0) {
        recs.push("No staged changes to validate; stage files with `git add` first".to_string());
        return recs;
    }

    if let Some(run) = &result.metadata.test_run {
        if run.timed_out {
            recs.push(
                "Test suite timed out; raise validation.test_timeout_secs or speed up slow tests"
                    .to_string(),
            );
        } else if run.failed > 0 {
            recs.push(format!("Fix {} failing test(s) before pushing", run.failed));
        }
    }

    if layers.test.evaluated && layers.test.files.is_empty() && result.metadata.test_run.is_none() {
        recs.push("Add tests: no test files were found".to_string());
    } else if layers.test.evaluated && layers.test.score < WEAK_LAYER_SCORE {
        recs.push(format!(
            "Improve test coverage (test score {})",
            layers.test.score
        ));
    }

    match sync.missing_tests.len() {
        0 => {}
        1 => recs.push(format!("Add a test for {}", sync.missing_tests[0])),
        n => recs.push(format!(
            "Add tests for {} untested files, starting with {}",
            n, sync.missing_tests[0]
        )),
    }
    if !sync.orphaned_tests.is_empty() {
        recs.push(format!(
            "Remove or update {} test(s) whose implementation no longer exists",
            sync.orphaned_tests.len()
        ));
    }
    if !sync.missing_docs.is_empty() {
        recs.push(format!(
            "Document {} file(s) missing API documentation",
            sync.missing_docs.len()
        ));
    }

    let unresolved = count_matching(result, Category::Implementation, "Cannot resolve import")
        + count_matching(result, Category::Test, "Cannot resolve import");
    if unresolved > 0 {
        recs.push(format!(
            "Fix {} unresolved import(s) or install missing packages",
            unresolved
        ));
    }
    let unused = count_matching(result, Category::Implementation, "possibly unused");
    if unused > 0 {
        recs.push(format!("Remove {} unused import(s)", unused));
    }

    let missing_docs = count_matching(result, Category::Documentation, "Required documentation missing");
    if missing_docs > 0 {
        recs.push("Add the required documentation files (e.g. README.md)".to_string());
    }
    let broken_links = count_matching(result, Category::Documentation, "Broken link");
    if broken_links > 0 {
        recs.push(format!("Fix {} broken documentation link(s)", broken_links));
    }

    if result
        .errors
        .iter()
        .any(|e| e.message.starts_with("Configuration error"))
    {
        recs.push("Fix trinity.toml; defaults were used for this run".to_string());
    }

    if let Some(trend) = &result.metadata.trend {
        if trend.direction == TrendDirection::Declining {
            recs.push(format!(
                "Score dropped {} point(s) since the last run ({} -> {})",
                -trend.delta,
                trend.previous,
                result.overall()
            ));
        }
    }

    if recs.is_empty() && result.valid {
        recs.push("All checks passed".to_string());
    }
    recs
}

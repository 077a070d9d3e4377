//! Score calculator
//!
//! Every function here is a pure transformation from counts to scores.

use crate::models::{ScoreTrend, TrendDirection, TrinityScore};
use serde::{Deserialize, Serialize};

/// Per unresolved import inside a test file
pub const MISSING_DEPENDENCY_PENALTY: u32 = 10;
/// Conventional test directory absent
pub const MISSING_TEST_DIRECTORY_PENALTY: u32 = 20;
/// 1-2 test files are too few to mean much
pub const TOO_FEW_TESTS_PENALTY: u32 = 10;
pub const MIN_MEANINGFUL_TESTS: usize = 3;
/// Per unresolved import inside an implementation file
pub const BROKEN_IMPORT_PENALTY: u32 = 5;
/// Per missing required utility file
pub const CRITICAL_FILE_PENALTY: u32 = 15;
pub const MISSING_REQUIRED_DOC_PENALTY: u32 = 25;
pub const MISSING_RECOMMENDED_DOC_PENALTY: u32 = 5;
pub const BROKEN_LINK_PENALTY: u32 = 5;
/// Per implementation file without a matching test
pub const MISSING_TEST_PENALTY: u32 = 2;
/// Gate score deductions, used when a mode evaluates no layer
pub const ERROR_GATE_PENALTY: u32 = 10;
pub const WARNING_GATE_PENALTY: u32 = 2;
/// Overall deltas within ±this many points are noise
pub const TREND_DEAD_ZONE: i32 = 2;

/// Point deductions per occurrence, overridable from `[scoring.penalties]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Penalties {
    pub missing_dependency: u32,
    pub missing_test_directory: u32,
    pub too_few_tests: u32,
    pub broken_import: u32,
    pub critical_file: u32,
    pub missing_required_doc: u32,
    pub missing_recommended_doc: u32,
    pub broken_link: u32,
    pub missing_test: u32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            missing_dependency: MISSING_DEPENDENCY_PENALTY,
            missing_test_directory: MISSING_TEST_DIRECTORY_PENALTY,
            too_few_tests: TOO_FEW_TESTS_PENALTY,
            broken_import: BROKEN_IMPORT_PENALTY,
            critical_file: CRITICAL_FILE_PENALTY,
            missing_required_doc: MISSING_REQUIRED_DOC_PENALTY,
            missing_recommended_doc: MISSING_RECOMMENDED_DOC_PENALTY,
            broken_link: BROKEN_LINK_PENALTY,
            missing_test: MISSING_TEST_PENALTY,
        }
    }
}

/// Relative weight of each layer in the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerWeights {
    pub test: f64,
    pub implementation: f64,
    pub documentation: f64,
}

impl Default for LayerWeights {
    fn default() -> Self {
        Self {
            test: 1.0,
            implementation: 1.0,
            documentation: 1.0,
        }
    }
}

impl LayerWeights {
    pub fn all_non_negative(&self) -> bool {
        self.test >= 0.0 && self.implementation >= 0.0 && self.documentation >= 0.0
    }

    pub fn total(&self) -> f64 {
        self.test + self.implementation + self.documentation
    }
}

/// Clamp any intermediate value into the `[0, 100]` score range
pub fn clamp_score(raw: i64) -> u32 {
    raw.clamp(0, 100) as u32
}

/// `count × penalty` without overflow, for arbitrarily large counts
fn deduction(count: usize, penalty: u32) -> i64 {
    i64::try_from(count)
        .unwrap_or(i64::MAX)
        .saturating_mul(i64::from(penalty))
}

/// Score calculator parameterized by the configured penalties
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCalculator {
    penalties: Penalties,
}

impl ScoreCalculator {
    pub fn new(penalties: Penalties) -> Self {
        Self { penalties }
    }

    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    pub fn test_score(
        &self,
        total_files: usize,
        dependency_error_count: usize,
        structure_valid: bool,
    ) -> u32 {
        let p = &self.penalties;
        let mut score: i64 = 100;
        score = score.saturating_sub(deduction(dependency_error_count, p.missing_dependency));
        if !structure_valid {
            score = score.saturating_sub(i64::from(p.missing_test_directory));
        }
        if total_files == 0 {
            return 0;
        }
        if total_files < MIN_MEANINGFUL_TESTS {
            score = score.saturating_sub(i64::from(p.too_few_tests));
        }
        clamp_score(score)
    }

    pub fn implementation_score(
        &self,
        total_files: usize,
        import_error_count: usize,
        missing_utility_count: usize,
    ) -> u32 {
        if total_files == 0 {
            return 0;
        }
        let p = &self.penalties;
        let score = 100i64
            .saturating_sub(deduction(import_error_count, p.broken_import))
            .saturating_sub(deduction(missing_utility_count, p.critical_file));
        clamp_score(score)
    }

    /// Completeness base for the documentation layer
    pub fn documentation_completeness(
        &self,
        total_files: usize,
        missing_required: usize,
        missing_recommended: usize,
    ) -> u32 {
        if total_files == 0 {
            return 0;
        }
        let p = &self.penalties;
        let score = 100i64
            .saturating_sub(deduction(missing_required, p.missing_required_doc))
            .saturating_sub(deduction(missing_recommended, p.missing_recommended_doc));
        clamp_score(score)
    }

    pub fn documentation_score(&self, completeness_score: u32, broken_link_count: usize) -> u32 {
        let score = i64::from(completeness_score)
            .saturating_sub(deduction(broken_link_count, self.penalties.broken_link));
        clamp_score(score)
    }

    /// Missing tests found by synchronization degrade the test layer
    pub fn synchronization_adjusted(&self, test_score: u32, missing_tests: usize) -> u32 {
        let score = i64::from(test_score)
            .saturating_sub(deduction(missing_tests, self.penalties.missing_test));
        clamp_score(score)
    }

    /// Overall score for runs that evaluate no layer (pre-commit)
    pub fn gate_score(&self, error_count: usize, warning_count: usize) -> u32 {
        let score = 100i64
            .saturating_sub(deduction(error_count, ERROR_GATE_PENALTY))
            .saturating_sub(deduction(warning_count, WARNING_GATE_PENALTY));
        clamp_score(score)
    }

    /// Weighted mean of all three layers
    pub fn overall_score(&self, scores: &TrinityScore, weights: &LayerWeights) -> u32 {
        Self::weighted_mean(&[
            (scores.test, weights.test),
            (scores.implementation, weights.implementation),
            (scores.documentation, weights.documentation),
        ])
    }

    /// Weighted mean over `(score, weight)` pairs, rounded to the nearest
    /// integer. Zero total weight yields 0.
    pub fn weighted_mean(parts: &[(u32, f64)]) -> u32 {
        let total_weight: f64 = parts.iter().map(|(_, w)| w.max(0.0)).sum();
        if total_weight <= 0.0 {
            return 0;
        }
        let sum: f64 = parts
            .iter()
            .map(|(s, w)| f64::from(*s) * w.max(0.0))
            .sum();
        clamp_score((sum / total_weight).round() as i64)
    }
}

/// Letter grade for a score. Display only.
pub fn grade_for_score(score: u32) -> &'static str {
    match score {
        s if s >= 98 => "A+",
        s if s >= 95 => "A",
        s if s >= 90 => "B+",
        s if s >= 85 => "B",
        s if s >= 80 => "B-",
        s if s >= 75 => "C+",
        s if s >= 70 => "C",
        s if s >= 60 => "D",
        _ => "F",
    }
}

/// Compare the current overall score against the previous run
pub fn calculate_trend(current: u32, previous: u32) -> ScoreTrend {
    let delta = current as i32 - previous as i32;
    let direction = if delta > TREND_DEAD_ZONE {
        TrendDirection::Improving
    } else if delta < -TREND_DEAD_ZONE {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };
    ScoreTrend {
        direction,
        delta,
        previous,
    }
}

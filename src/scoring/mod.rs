//! Trinity Scoring System
//!
//! Pure functions turning raw counts into layer scores, an overall score,
//! a letter grade and a trend. No I/O, no shared state.
//!
//! # Scoring Formula
//!
//! ```text
//! Test           = 100 - dep_errors × 10 - (no test dir ? 20 : 0) - (1..=2 tests ? 10 : 0)
//! Implementation = 100 - broken_imports × 5 - missing_utilities × 15
//! Documentation  = completeness - broken_links × 5
//!   completeness = 100 - missing_required × 25 - missing_recommended × 5
//!
//! Overall = Σ(weight × layer) / Σ(weight)   over the layers a mode evaluated
//! ```
//!
//! Every score is clamped to `[0, 100]`. A layer that discovered no files
//! scores 0 no matter what the penalty math says.
//!
//! # Grades
//!
//! | Score | Grade |
//! |-------|-------|
//! | ≥ 98  | A+    |
//! | ≥ 95  | A     |
//! | ≥ 90  | B+    |
//! | ≥ 85  | B     |
//! | ≥ 80  | B-    |
//! | ≥ 75  | C+    |
//! | ≥ 70  | C     |
//! | ≥ 60  | D     |
//! | else  | F     |

mod calculator;

pub use calculator::{
    calculate_trend, clamp_score, grade_for_score, LayerWeights, Penalties, ScoreCalculator,
    BROKEN_IMPORT_PENALTY, BROKEN_LINK_PENALTY, CRITICAL_FILE_PENALTY, ERROR_GATE_PENALTY,
    MIN_MEANINGFUL_TESTS, MISSING_DEPENDENCY_PENALTY, MISSING_RECOMMENDED_DOC_PENALTY,
    MISSING_REQUIRED_DOC_PENALTY, MISSING_TEST_DIRECTORY_PENALTY, MISSING_TEST_PENALTY,
    TOO_FEW_TESTS_PENALTY, TREND_DEAD_ZONE, WARNING_GATE_PENALTY,
};

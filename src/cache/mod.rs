//! Per-user cache
//!
//! Holds state that outlives a single run but does not belong in the
//! validated project: currently the score history behind trend deltas.

pub mod history;
pub mod paths;

pub use history::{HistoryEntry, ScoreHistory, MAX_HISTORY_ENTRIES};
pub use paths::{get_cache_dir, get_history_path, CACHE_DIR_ENV};

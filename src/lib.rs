//! Trinity - project quality-validation engine
//!
//! Scores a project along three independent layers (test health,
//! implementation integrity, documentation completeness) and decides
//! whether it meets a configurable quality bar.
//!
//! ```text
//! Configuration -> Validator -> {Classifier, ImportAnalyzer} -> ScoreCalculator -> Reporter
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use trinity::config::ConfigManager;
//! use trinity::models::ValidationMode;
//! use trinity::validator::Validator;
//!
//! let root = Path::new(".");
//! let manager = ConfigManager::load(root);
//! let mut validator = Validator::from_manager(root, &manager);
//! let result = validator.validate(ValidationMode::All);
//! println!("{} -> {}", result.score.overall.unwrap_or(0), result.valid);
//! ```

pub mod adapters;
pub mod cache;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod imports;
pub mod models;
pub mod reporters;
pub mod runner;
pub mod scoring;
pub mod validator;

pub use error::{TrinityError, TrinityResult};

//! Configuration module for Trinity
//!
//! This module handles:
//! - Project-level configuration (trinity.toml / .trinityrc.json)
//! - Deep-merged caller overrides
//! - Validation of thresholds, weights and patterns
//! - Named templates and language auto-detection

mod project_config;
mod templates;

pub use project_config::{
    deep_merge, merge_config, ConfigManager, ConfigValidation, DirectorySection,
    DocumentationSection, ImplementationSection, PatternSection, ProjectSection,
    ReportingSection, ScoringSection, SynchronizationSection, TrinityFullConfig,
    ValidationSection, CONFIG_FILE_NAME, DEFAULT_MIN_TRINITY_SCORE, DEFAULT_TEST_TIMEOUT_SECS,
    RC_FILE_NAME,
};
pub use templates::{template, TEMPLATES};

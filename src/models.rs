//! Core data models for Trinity
//!
//! These types form the result contract between the validator and its
//! callers (reporters, CI wrappers). Everything serializes with camelCase
//! field names so the JSON report is stable across releases.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Classification assigned to every file in a scanned project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Test,
    Implementation,
    Documentation,
    Config,
    Other,
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::Test => write!(f, "test"),
            FileType::Implementation => write!(f, "implementation"),
            FileType::Documentation => write!(f, "documentation"),
            FileType::Config => write!(f, "config"),
            FileType::Other => write!(f, "other"),
        }
    }
}

/// A classified file. `path` is project-relative and always `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub language: String,
    #[serde(default)]
    pub imports: Vec<String>,
}

impl ProjectFile {
    pub fn new(path: impl Into<String>, file_type: FileType) -> Self {
        let path = path.into();
        let language = language_for_path(&path).to_string();
        Self {
            path,
            file_type,
            language,
            imports: Vec::new(),
        }
    }
}

/// Language name derived from a file extension
pub fn language_for_path(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "ts" | "tsx" | "mts" | "cts" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "vue" => "vue",
        "svelte" => "svelte",
        "py" => "python",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "md" | "mdx" => "markdown",
        "rst" => "restructuredtext",
        "txt" => "text",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "css" | "scss" => "css",
        "html" => "html",
        _ => "unknown",
    }
}

/// Whether an issue blocks validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Which part of the engine produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Test,
    Implementation,
    Documentation,
    Synchronization,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Test => write!(f, "test"),
            Category::Implementation => write!(f, "implementation"),
            Category::Documentation => write!(f, "documentation"),
            Category::Synchronization => write!(f, "synchronization"),
        }
    }
}

/// One of the three scored quality axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Test,
    Implementation,
    Documentation,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Test, Layer::Implementation, Layer::Documentation];

    pub fn category(self) -> Category {
        match self {
            Layer::Test => Category::Test,
            Layer::Implementation => Category::Implementation,
            Layer::Documentation => Category::Documentation,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layer::Test => "Test",
            Layer::Implementation => "Implementation",
            Layer::Documentation => "Documentation",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category())
    }
}

/// A single validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub category: Category,
}

impl ValidationError {
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
            line: None,
            category,
        }
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(category, message)
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// `file:line` when both are known
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            (Some(file), None) => Some(file.clone()),
            _ => None,
        }
    }
}

/// Per-layer and overall scores, each in `[0, 100]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrinityScore {
    pub test: u32,
    pub implementation: u32,
    pub documentation: u32,
    #[serde(default)]
    pub overall: Option<u32>,
}

impl TrinityScore {
    pub fn get(&self, layer: Layer) -> u32 {
        match layer {
            Layer::Test => self.test,
            Layer::Implementation => self.implementation,
            Layer::Documentation => self.documentation,
        }
    }

    pub fn set(&mut self, layer: Layer, score: u32) {
        match layer {
            Layer::Test => self.test = score,
            Layer::Implementation => self.implementation = score,
            Layer::Documentation => self.documentation = score,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDetails {
    pub total_files: usize,
    pub valid_files: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Outcome of one layer for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerValidationResult {
    pub layer: Layer,
    pub score: u32,
    /// False when the mode skipped this layer
    pub evaluated: bool,
    pub files: Vec<String>,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub details: LayerDetails,
}

impl LayerValidationResult {
    pub fn skipped(layer: Layer) -> Self {
        Self {
            layer,
            score: 0,
            evaluated: false,
            files: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            details: LayerDetails::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerResults {
    pub test: LayerValidationResult,
    pub implementation: LayerValidationResult,
    pub documentation: LayerValidationResult,
}

impl LayerResults {
    pub fn get(&self, layer: Layer) -> &LayerValidationResult {
        match layer {
            Layer::Test => &self.test,
            Layer::Implementation => &self.implementation,
            Layer::Documentation => &self.documentation,
        }
    }
}

impl Default for LayerResults {
    fn default() -> Self {
        Self {
            test: LayerValidationResult::skipped(Layer::Test),
            implementation: LayerValidationResult::skipped(Layer::Implementation),
            documentation: LayerValidationResult::skipped(Layer::Documentation),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCoverage {
    pub test_coverage: u32,
    pub documentation_coverage: u32,
}

/// Cross-reference of implementation files against their tests and docs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizationResult {
    pub synchronized: bool,
    /// False when the mode skipped synchronization
    pub evaluated: bool,
    pub missing_tests: Vec<String>,
    pub missing_docs: Vec<String>,
    pub orphaned_tests: Vec<String>,
    pub orphaned_docs: Vec<String>,
    pub coverage: SyncCoverage,
}

/// Which check sequence a run executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    PreCommit,
    PrePush,
    MidDev,
    #[default]
    All,
}

impl ValidationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMode::PreCommit => "pre-commit",
            ValidationMode::PrePush => "pre-push",
            ValidationMode::MidDev => "mid-dev",
            ValidationMode::All => "all",
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "pre-commit" | "precommit" => Ok(ValidationMode::PreCommit),
            "pre-push" | "prepush" => Ok(ValidationMode::PrePush),
            "mid-dev" | "middev" | "dev" => Ok(ValidationMode::MidDev),
            "all" | "full" => Ok(ValidationMode::All),
            other => Err(format!(
                "Unknown mode '{}'. Valid modes: pre-commit, pre-push, mid-dev, all",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTrend {
    pub direction: TrendDirection,
    pub delta: i32,
    pub previous: u32,
}

/// Pass/fail counts parsed from an external test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunSummary {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    pub timed_out: bool,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetadata {
    pub project_name: String,
    pub mode: ValidationMode,
    pub timestamp: String,
    pub duration_ms: u64,
    pub engine_version: String,
    pub total_files: usize,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    pub min_trinity_score: u32,
    pub grade: String,
    #[serde(default)]
    pub trend: Option<ScoreTrend>,
    #[serde(default)]
    pub test_run: Option<TestRunSummary>,
    #[serde(default)]
    pub changed_files: Option<usize>,
}

/// Top-level result of one `validate()` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrinityValidationResult {
    pub valid: bool,
    pub score: TrinityScore,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub metadata: ValidationMetadata,
    pub layers: LayerResults,
    pub synchronization: SynchronizationResult,
    pub recommendations: Vec<String>,
}

impl TrinityValidationResult {
    pub fn overall(&self) -> u32 {
        self.score.overall.unwrap_or(0)
    }

    /// Issues of one category, errors first
    pub fn issues_in(&self, category: Category) -> impl Iterator<Item = &ValidationError> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |e| e.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            ValidationMode::from_str("pre-commit").unwrap(),
            ValidationMode::PreCommit
        );
        assert_eq!(
            ValidationMode::from_str("PRE_PUSH").unwrap(),
            ValidationMode::PrePush
        );
        assert_eq!(ValidationMode::from_str("full").unwrap(), ValidationMode::All);
        assert!(ValidationMode::from_str("nightly").is_err());
        assert_eq!(ValidationMode::default(), ValidationMode::All);
    }

    #[test]
    fn test_language_for_path() {
        assert_eq!(language_for_path("src/app.tsx"), "typescript");
        assert_eq!(language_for_path("lib/index.mjs"), "javascript");
        assert_eq!(language_for_path("README.md"), "markdown");
        assert_eq!(language_for_path("Makefile"), "unknown");
    }

    #[test]
    fn test_validation_error_serializes_camel_case() {
        let err = ValidationError::warning(Category::Synchronization, "missing test")
            .with_file("src/foo.ts")
            .with_line(3);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["category"], "synchronization");
        assert_eq!(json["file"], "src/foo.ts");
        assert_eq!(err.location().as_deref(), Some("src/foo.ts:3"));
    }

    #[test]
    fn test_file_type_serializes_as_type() {
        let file = ProjectFile::new("src/a.ts", FileType::Implementation);
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "implementation");
        assert_eq!(json["language"], "typescript");
    }
}

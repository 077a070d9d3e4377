//! Project-level configuration support
//!
//! Loads per-project configuration from `trinity.toml` or `.trinityrc.json`
//! in the project root.
//!
//! # Precedence
//!
//! ```text
//! built-in defaults + language presets  <  project file  <  caller overrides
//! ```
//!
//! Every tier is deep-merged key by key, so a project file that only sets
//! `validation.min_trinity_score` keeps every other default intact. Language
//! presets found by `auto_detect_project` join the defaults tier, underneath
//! anything the project file or the caller already set.
//!
//! # Configuration Format
//!
//! ```toml
//! # trinity.toml
//!
//! [project]
//! name = "storefront"
//! language = "typescript"
//!
//! [validation]
//! min_trinity_score = 85
//! test_command = "npm test -- --ci"
//!
//! [directories]
//! source = ["src"]
//! test_root = "__tests__"
//!
//! [scoring.weights]
//! test = 2.0
//! implementation = 1.0
//! documentation = 0.5
//!
//! [documentation]
//! required_files = ["README.md"]
//! ```

use crate::adapters::{self, LanguageAdapter};
use crate::error::{TrinityError, TrinityResult};
use crate::scoring::{LayerWeights, Penalties};
use globset::Glob;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::templates;

/// Preferred project config file name
pub const CONFIG_FILE_NAME: &str = "trinity.toml";
/// JSON fallback config file name
pub const RC_FILE_NAME: &str = ".trinityrc.json";

pub const DEFAULT_MIN_TRINITY_SCORE: u32 = 90;
pub const DEFAULT_TEST_TIMEOUT_SECS: u64 = 300;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Project identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Primary language (auto-detected if not specified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Test framework (auto-detected if not specified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Thresholds and run behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    /// Overall score a project must reach to be valid (0-100)
    pub min_trinity_score: u32,
    /// Files whose modification in a commit deserves a second look
    pub critical_files: Vec<String>,
    /// Test command for pre-push runs (adapter default if not specified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_command: Option<String>,
    pub test_timeout_secs: u64,
    pub check_unused_imports: bool,
    /// Report files that sit on an import cycle as warnings
    pub report_cycles: bool,
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            min_trinity_score: DEFAULT_MIN_TRINITY_SCORE,
            critical_files: strings(&[
                "package.json",
                "package-lock.json",
                "tsconfig.json",
                "Cargo.toml",
                "pyproject.toml",
                CONFIG_FILE_NAME,
            ]),
            test_command: None,
            test_timeout_secs: DEFAULT_TEST_TIMEOUT_SECS,
            check_unused_imports: true,
            report_cycles: false,
        }
    }
}

/// Glob pattern sets used by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSection {
    pub test: Vec<String>,
    pub implementation: Vec<String>,
    pub documentation: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for PatternSection {
    fn default() -> Self {
        Self {
            test: strings(&["**/*.test.*", "**/*.spec.*"]),
            implementation: strings(&[
                "**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx", "**/*.mjs", "**/*.cjs",
            ]),
            documentation: strings(&["**/*.md", "**/*.mdx", "**/*.txt", "**/*.rst"]),
            exclude: strings(&["**/*.d.ts", "**/*.min.js", "**/*.bundle.js"]),
        }
    }
}

/// Directory conventions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySection {
    pub source: Vec<String>,
    pub test: Vec<String>,
    pub documentation: Vec<String>,
    /// Directory names never descended into
    pub excluded: Vec<String>,
    /// Prefix replaced by `test_root` when deriving expected test paths
    pub source_root: String,
    pub test_root: String,
    /// Mirror of the source tree holding per-module docs
    pub api_docs: String,
    /// Where installed packages live
    pub dependency_store: String,
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self {
            source: strings(&["src", "lib", "app"]),
            test: strings(&["__tests__", "test", "tests"]),
            documentation: strings(&["docs"]),
            excluded: strings(&[
                "node_modules",
                "dist",
                "build",
                "out",
                "coverage",
                "target",
                "vendor",
                "__pycache__",
                ".git",
                ".next",
                ".venv",
            ]),
            source_root: "src".to_string(),
            test_root: "__tests__".to_string(),
            api_docs: "docs/api".to_string(),
            dependency_store: "node_modules".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    pub weights: LayerWeights,
    pub penalties: Penalties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationSection {
    /// Root-level docs whose absence is an error
    pub required_files: Vec<String>,
    /// Root-level docs whose absence is a warning
    pub recommended_files: Vec<String>,
    /// Root-level file name globs counted as documentation
    pub root_files: Vec<String>,
    /// Check relative markdown links for existence
    pub check_links: bool,
}

impl Default for DocumentationSection {
    fn default() -> Self {
        Self {
            required_files: strings(&["README.md"]),
            recommended_files: strings(&["CHANGELOG.md"]),
            root_files: strings(&["README*", "CHANGELOG*"]),
            check_links: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplementationSection {
    /// Project-relative utility files the codebase depends on
    pub required_utilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynchronizationSection {
    /// Inserted before the extension: `foo.ts` -> `foo.test.ts`
    pub test_suffix: String,
    /// Prepended to the file name: `foo.py` -> `test_foo.py`
    pub test_prefix: String,
    /// Require a `docs/api` mirror for every implementation file
    pub require_docs: bool,
    /// Implementation files that never need a test
    pub exempt_patterns: Vec<String>,
}

impl Default for SynchronizationSection {
    fn default() -> Self {
        Self {
            test_suffix: ".test".to_string(),
            test_prefix: String::new(),
            require_docs: false,
            exempt_patterns: strings(&[
                "**/*.d.ts",
                "**/types.*",
                "**/types/**",
                "**/constants.*",
                "**/constants/**",
                "**/index.*",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingSection {
    /// Default output format (console, json, html)
    pub format: String,
    pub output_dir: String,
    pub verbose: bool,
    pub show_recommendations: bool,
    /// Record overall scores per run to compute trends
    pub track_history: bool,
}

impl Default for ReportingSection {
    fn default() -> Self {
        Self {
            format: "console".to_string(),
            output_dir: ".trinity/reports".to_string(),
            verbose: false,
            show_recommendations: true,
            track_history: true,
        }
    }
}

/// Full Trinity configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrinityFullConfig {
    pub project: ProjectSection,
    pub validation: ValidationSection,
    pub patterns: PatternSection,
    pub directories: DirectorySection,
    pub scoring: ScoringSection,
    pub documentation: DocumentationSection,
    pub implementation: ImplementationSection,
    pub synchronization: SynchronizationSection,
    pub reporting: ReportingSection,
}

/// Outcome of `validate_config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl TrinityFullConfig {
    /// Range and consistency checks
    pub fn validate(&self) -> ConfigValidation {
        let mut errors = Vec::new();

        if self.validation.min_trinity_score > 100 {
            errors.push(format!(
                "validation.min_trinity_score must be between 0 and 100 (got {})",
                self.validation.min_trinity_score
            ));
        }
        if self.validation.test_timeout_secs == 0 {
            errors.push("validation.test_timeout_secs must be greater than 0".to_string());
        }

        let w = &self.scoring.weights;
        for (name, value) in [
            ("test", w.test),
            ("implementation", w.implementation),
            ("documentation", w.documentation),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!(
                    "scoring.weights.{} must be a non-negative number (got {})",
                    name, value
                ));
            }
        }
        if w.all_non_negative() && w.total() <= 0.0 {
            errors.push("scoring.weights must not all be zero".to_string());
        }

        if self.directories.source.is_empty() {
            errors.push("directories.source must list at least one directory".to_string());
        }
        if self.directories.test.is_empty() {
            errors.push("directories.test must list at least one directory".to_string());
        }

        let pattern_sets = [
            ("patterns.test", &self.patterns.test),
            ("patterns.implementation", &self.patterns.implementation),
            ("patterns.documentation", &self.patterns.documentation),
            ("patterns.exclude", &self.patterns.exclude),
            ("synchronization.exempt_patterns", &self.synchronization.exempt_patterns),
            ("documentation.root_files", &self.documentation.root_files),
        ];
        for (section, patterns) in pattern_sets {
            for pattern in patterns {
                if let Err(e) = Glob::new(pattern) {
                    errors.push(format!("{}: invalid pattern '{}': {}", section, pattern, e));
                }
            }
        }
        if self.patterns.test.is_empty() {
            errors.push("patterns.test must not be empty".to_string());
        }
        if self.patterns.implementation.is_empty() {
            errors.push("patterns.implementation must not be empty".to_string());
        }

        ConfigValidation {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Project name: configured, else the root directory name
    pub fn project_name(&self, root: &Path) -> String {
        if let Some(name) = &self.project.name {
            return name.clone();
        }
        let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        canonical
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string()
    }
}

/// Deep-merge `overlay` into `base`. Objects merge key by key; any other
/// value (arrays included) replaces the base value.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `partial` on top of `config`, returning the merged config
pub fn merge_config(config: &TrinityFullConfig, partial: Value) -> TrinityResult<TrinityFullConfig> {
    let mut merged =
        serde_json::to_value(config).map_err(|e| TrinityError::Serialize(e.to_string()))?;
    deep_merge(&mut merged, partial);
    serde_json::from_value(merged).map_err(|e| TrinityError::Config(e.to_string()))
}

/// Read a project config file into its untyped form
fn read_config_value(path: &Path) -> TrinityResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| TrinityError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
    if is_toml {
        let value: toml::Value = toml::from_str(&content).map_err(|e| TrinityError::TomlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::to_value(value).map_err(|e| TrinityError::Serialize(e.to_string()))
    } else {
        serde_json::from_str(&content).map_err(|e| TrinityError::JsonParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Owns the effective configuration for one project root.
///
/// There is no process-wide cache: callers load a manager, validate it, and
/// hand the config to a `Validator` explicitly.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    root: PathBuf,
    /// Defaults tier
    base: TrinityFullConfig,
    /// Partials applied over `base`, in order (project file, overrides, updates)
    layers: Vec<Value>,
    config: TrinityFullConfig,
    source: Option<PathBuf>,
    load_error: Option<String>,
}

impl ConfigManager {
    /// Defaults only, no file lookup
    pub fn from_config(root: impl Into<PathBuf>, config: TrinityFullConfig) -> Self {
        Self {
            root: root.into(),
            base: config.clone(),
            layers: Vec::new(),
            config,
            source: None,
            load_error: None,
        }
    }

    /// Defaults overridden by the project file, if any.
    ///
    /// Searches for configuration files in this order:
    /// 1. `trinity.toml`
    /// 2. `.trinityrc.json`
    ///
    /// The first file that exists is the only one read. A malformed file
    /// does not fail the load; it is remembered in `load_error` and the
    /// defaults stay in effect.
    pub fn load(root: &Path) -> Self {
        Self::load_with_overrides(root, None)
    }

    /// Full three-tier load: defaults, project file, then `overrides`
    pub fn load_with_overrides(root: &Path, overrides: Option<Value>) -> Self {
        let mut manager = Self::from_config(root, TrinityFullConfig::default());

        let found = [CONFIG_FILE_NAME, RC_FILE_NAME]
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file());
        if let Some(path) = found {
            match read_config_value(&path).and_then(|value| manager.update_config(value)) {
                Ok(()) => {
                    debug!("Loaded project config from {}", path.display());
                    manager.source = Some(path);
                }
                Err(e) => {
                    warn!("Failed to load {}: {}", path.display(), e);
                    manager.load_error = Some(e.to_string());
                }
            }
        }

        if manager.source.is_none() && manager.load_error.is_none() {
            debug!("No project config found, using defaults");
        }

        if let Some(overrides) = overrides {
            if let Err(e) = manager.update_config(overrides) {
                warn!("Ignoring invalid config overrides: {}", e);
                manager.load_error = Some(e.to_string());
            }
        }

        manager
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_config(&self) -> &TrinityFullConfig {
        &self.config
    }

    pub fn into_config(self) -> TrinityFullConfig {
        self.config
    }

    /// File the config was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Why the project file could not be applied, if it could not
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Deep-merge a partial config; later values win key by key
    pub fn update_config(&mut self, partial: Value) -> TrinityResult<()> {
        self.config = merge_config(&self.config, partial.clone())?;
        self.layers.push(partial);
        Ok(())
    }

    pub fn validate_config(&self) -> ConfigValidation {
        self.config.validate()
    }

    /// Seed patterns and conventions from a named preset
    pub fn apply_template(&mut self, name: &str) -> TrinityResult<()> {
        let partial =
            templates::template(name).ok_or_else(|| TrinityError::UnknownTemplate(name.into()))?;
        self.update_config(partial)?;
        info!("Applied '{}' template", name);
        Ok(())
    }

    /// Re-layer the config with `adapter`'s presets in the defaults tier
    fn with_language_defaults(&self, adapter: &dyn LanguageAdapter) -> TrinityResult<TrinityFullConfig> {
        let patterns = json!({
            "patterns": {
                "test": adapter.test_patterns(),
                "implementation": adapter.file_patterns(),
            }
        });
        let mut config = merge_config(&self.base, patterns)?;
        if let Some(name) = adapter.template(&self.root) {
            let partial =
                templates::template(name).ok_or_else(|| TrinityError::UnknownTemplate(name.into()))?;
            config = merge_config(&config, partial)?;
        }
        for layer in &self.layers {
            config = merge_config(&config, layer.clone())?;
        }
        Ok(config)
    }

    /// Fill unset project identity from the detected language adapter.
    ///
    /// The adapter's patterns and template become part of the defaults tier,
    /// so the project file and caller overrides keep precedence. Returns the
    /// detected language, if any adapter recognized the project.
    pub fn auto_detect_project(&mut self) -> Option<&'static str> {
        let adapter = match &self.config.project.language {
            Some(language) => adapters::for_language(language),
            None => adapters::detect(&self.root),
        }?;

        let language = adapter.name();
        match self.with_language_defaults(adapter.as_ref()) {
            Ok(config) => self.config = config,
            Err(e) => warn!("Could not apply {} presets: {}", language, e),
        }

        let project = &mut self.config.project;
        if project.language.is_none() {
            project.language = Some(language.to_string());
        }
        if project.framework.is_none() {
            project.framework = adapter.test_framework(&self.root);
        }
        if project.name.is_none() {
            project.name = adapter.project_name(&self.root);
        }
        if self.config.validation.test_command.is_none() {
            self.config.validation.test_command = adapter.test_command(&self.root);
        }

        debug!(
            "Auto-detected project: language={}, framework={:?}",
            language, self.config.project.framework
        );
        Some(language)
    }

    /// Persist the effective config as `trinity.toml` in the project root
    pub fn save(&self) -> TrinityResult<PathBuf> {
        let path = self.root.join(CONFIG_FILE_NAME);
        let content = self.to_toml()?;
        std::fs::write(&path, content).map_err(|source| TrinityError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn to_toml(&self) -> TrinityResult<String> {
        toml::to_string_pretty(&self.config).map_err(|e| TrinityError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests;

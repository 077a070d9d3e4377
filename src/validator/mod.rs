//! Validation orchestrator
//!
//! A `Validator` owns one project's configuration and a run-scoped
//! error/warning accumulator. Each call to [`Validator::validate`] resets
//! the accumulator and runs the check sequence of the requested mode:
//!
//! | Mode         | Layers | Synchronization | Test run | Staged files |
//! |--------------|--------|-----------------|----------|--------------|
//! | `pre-commit` |        |                 |          | yes          |
//! | `pre-push`   | test*  | yes             | yes      |              |
//! | `mid-dev`    | all    |                 |          |              |
//! | `all`        | all    | yes             |          |              |
//!
//! (*) the pre-push test layer is scored from the test run's pass rate.
//!
//! `validate` never fails and never panics: anything that escapes a mode is
//! folded into a single synchronization error and a best-effort result.

mod layers;
mod precommit;
mod prepush;
mod recommendations;
mod sync;

pub use recommendations::recommendations_for;
pub use sync::{expected_doc_path, expected_test_path, SyncAnalyzer};

use crate::adapters::{self, LanguageAdapter};
use crate::cache::{HistoryEntry, ScoreHistory};
use crate::classifier::FileClassifier;
use crate::config::{ConfigManager, TrinityFullConfig};
use crate::git::StagedFile;
use crate::imports::{ImportAnalyzer, ImportRef};
use crate::models::{
    Category, FileType, Layer, LayerResults, LayerValidationResult, ProjectFile, Severity,
    SynchronizationResult, TestRunSummary, TrinityScore, TrinityValidationResult,
    ValidationError, ValidationMetadata, ValidationMode,
};
use crate::scoring::{calculate_trend, grade_for_score, ScoreCalculator};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Classified files of one run plus their import references
pub(crate) struct ProjectScan {
    pub classifier: FileClassifier,
    pub analyzer: ImportAnalyzer,
    pub files: Vec<ProjectFile>,
    pub imports: HashMap<String, Vec<ImportRef>>,
}

impl ProjectScan {
    pub fn paths_of(&self, file_type: FileType) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.file_type == file_type)
            .map(|f| f.path.clone())
            .collect()
    }

    pub fn imports_of(&self, path: &str) -> &[ImportRef] {
        self.imports.get(path).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Whatever a mode produced before scoring
#[derive(Default)]
struct RunOutcome {
    layers: LayerResults,
    synchronization: SynchronizationResult,
    test_run: Option<TestRunSummary>,
    changed_files: Option<usize>,
    total_files: usize,
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub struct Validator {
    root: PathBuf,
    config: TrinityFullConfig,
    adapter: Option<Box<dyn LanguageAdapter>>,
    config_issue: Option<String>,
    history: Option<ScoreHistory>,
    staged: Option<Vec<StagedFile>>,
    calculator: ScoreCalculator,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl Validator {
    /// Validator over an explicit configuration. The language adapter comes
    /// from `project.language` when set, else from detection.
    pub fn new(root: impl Into<PathBuf>, config: TrinityFullConfig) -> Self {
        let root = root.into();
        let adapter = match &config.project.language {
            Some(language) => adapters::for_language(language),
            None => adapters::detect(&root),
        };
        let calculator = ScoreCalculator::new(config.scoring.penalties);
        Self {
            root,
            config,
            adapter,
            config_issue: None,
            history: None,
            staged: None,
            calculator,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Validator over a loaded configuration. A config file that failed to
    /// load or validate is reported as one synchronization error per run.
    pub fn from_manager(root: impl Into<PathBuf>, manager: &ConfigManager) -> Self {
        let mut validator = Self::new(root, manager.get_config().clone());
        let validation = manager.validate_config();
        validator.config_issue = match manager.load_error() {
            Some(e) => Some(e.to_string()),
            None if !validation.valid => Some(validation.errors.join("; ")),
            None => None,
        };
        validator
    }

    pub fn with_adapter(mut self, adapter: Box<dyn LanguageAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Compare against and append to a score history on every run
    pub fn with_history(mut self, history: ScoreHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Use this staged-file list instead of asking git
    pub fn with_staged_files(mut self, staged: Vec<StagedFile>) -> Self {
        self.staged = Some(staged);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &TrinityFullConfig {
        &self.config
    }

    pub fn adapter(&self) -> Option<&dyn LanguageAdapter> {
        self.adapter.as_deref()
    }

    pub fn history(&self) -> Option<&ScoreHistory> {
        self.history.as_ref()
    }

    pub(crate) fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub(crate) fn push(&mut self, issue: ValidationError) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    fn absorb_layer(&mut self, layer: &LayerValidationResult) {
        self.errors.extend(layer.errors.iter().cloned());
        self.warnings.extend(layer.warnings.iter().cloned());
    }

    /// Classify the tree and collect import references of code files
    pub(crate) fn scan_project(&self) -> Result<ProjectScan> {
        let classifier = FileClassifier::new(&self.root, &self.config)?;
        let analyzer = ImportAnalyzer::new(&self.root, &self.config);
        let files = classifier.scan()?;

        let imports: HashMap<String, Vec<ImportRef>> = files
            .par_iter()
            .filter(|f| {
                matches!(
                    f.file_type,
                    FileType::Test | FileType::Implementation
                )
            })
            .map(|f| (f.path.clone(), analyzer.import_refs(&f.path)))
            .collect();

        let files = files
            .into_iter()
            .map(|mut f| {
                if let Some(refs) = imports.get(&f.path) {
                    f.imports = refs.iter().map(|r| r.specifier.clone()).collect();
                }
                f
            })
            .collect();

        Ok(ProjectScan {
            classifier,
            analyzer,
            files,
            imports,
        })
    }

    /// Run one layer, turning an error or panic into a single layer error
    fn guarded_layer<F>(&self, layer: Layer, check: F) -> LayerValidationResult
    where
        F: FnOnce() -> Result<LayerValidationResult>,
    {
        let failure = match catch_unwind(AssertUnwindSafe(check)) {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => format!("{:#}", e),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };
        warn!("{} layer validation failed: {}", layer.label(), failure);
        let mut result = LayerValidationResult::skipped(layer);
        result.evaluated = true;
        result.errors.push(ValidationError::error(
            layer.category(),
            format!("{} layer validation failed: {}", layer.label(), failure),
        ));
        result.details.error_count = 1;
        result
    }

    fn run_layers(&mut self, scan: &Result<ProjectScan>, outcome: &mut RunOutcome) {
        let unavailable = |e: &anyhow::Error| anyhow::anyhow!("project scan failed: {:#}", e);

        let test = self.guarded_layer(Layer::Test, || match scan {
            Ok(scan) => self.validate_test_layer(scan),
            Err(e) => Err(unavailable(e)),
        });
        let implementation = self.guarded_layer(Layer::Implementation, || match scan {
            Ok(scan) => self.validate_implementation_layer(scan),
            Err(e) => Err(unavailable(e)),
        });
        let documentation = self.guarded_layer(Layer::Documentation, || match scan {
            Ok(scan) => self.validate_documentation_layer(scan),
            Err(e) => Err(unavailable(e)),
        });

        for layer in [&test, &implementation, &documentation] {
            self.absorb_layer(layer);
        }
        outcome.layers = LayerResults {
            test,
            implementation,
            documentation,
        };
    }

    fn run_synchronization(&mut self, scan: &Result<ProjectScan>, outcome: &mut RunOutcome) {
        let result = match scan {
            Ok(scan) => {
                let analyzer = SyncAnalyzer::new(&self.root, &self.config);
                catch_unwind(AssertUnwindSafe(|| analyzer.analyze(scan)))
                    .map_err(|payload| panic_message(payload.as_ref()))
            }
            Err(e) => Err(format!("project scan failed: {:#}", e)),
        };
        match result {
            Ok((sync, issues)) => {
                for issue in issues {
                    self.push(issue);
                }
                outcome.synchronization = sync;
            }
            Err(message) => {
                self.push(ValidationError::error(
                    Category::Synchronization,
                    format!("Synchronization analysis failed: {}", message),
                ));
                outcome.synchronization = SynchronizationResult {
                    evaluated: true,
                    ..Default::default()
                };
            }
        }
    }

    /// Missing tests found by synchronization degrade the test layer
    fn apply_sync_penalty(&self, outcome: &mut RunOutcome) {
        let missing = outcome.synchronization.missing_tests.len();
        if missing > 0 && outcome.layers.test.evaluated {
            let adjusted = self
                .calculator
                .synchronization_adjusted(outcome.layers.test.score, missing);
            outcome.layers.test.score = adjusted;
        }
    }

    fn run_mode(&mut self, mode: ValidationMode, outcome: &mut RunOutcome) -> Result<()> {
        match mode {
            ValidationMode::PreCommit => {
                let staged = match &self.staged {
                    Some(staged) => staged.clone(),
                    None => crate::git::staged_files(&self.root),
                };
                outcome.changed_files = Some(staged.len());
                outcome.total_files = staged.len();
                self.check_staged_files(&staged)?;
            }
            ValidationMode::PrePush => {
                let (layer, summary) = self.run_test_suite();
                outcome.layers.test = layer;
                outcome.test_run = Some(summary);

                let scan = self.scan_project();
                if let Ok(scan) = &scan {
                    outcome.total_files = scan.files.len();
                }
                self.run_synchronization(&scan, outcome);
                self.apply_sync_penalty(outcome);
            }
            ValidationMode::MidDev => {
                let scan = self.scan_project();
                if let Ok(scan) = &scan {
                    outcome.total_files = scan.files.len();
                }
                self.run_layers(&scan, outcome);
            }
            ValidationMode::All => {
                let scan = self.scan_project();
                if let Ok(scan) = &scan {
                    outcome.total_files = scan.files.len();
                }
                self.run_layers(&scan, outcome);
                self.run_synchronization(&scan, outcome);
                self.apply_sync_penalty(outcome);
            }
        }
        Ok(())
    }

    fn score(&self, mode: ValidationMode, layers: &LayerResults) -> TrinityScore {
        let mut score = TrinityScore::default();
        for layer in Layer::ALL {
            score.set(layer, layers.get(layer).score);
        }

        let weights = &self.config.scoring.weights;
        let evaluated: Vec<(u32, f64)> = Layer::ALL
            .iter()
            .filter(|layer| layers.get(**layer).evaluated)
            .map(|layer| {
                let weight = match layer {
                    Layer::Test => weights.test,
                    Layer::Implementation => weights.implementation,
                    Layer::Documentation => weights.documentation,
                };
                (layers.get(*layer).score, weight)
            })
            .collect();

        score.overall = Some(if mode == ValidationMode::PreCommit || evaluated.is_empty() {
            self.calculator
                .gate_score(self.errors.len(), self.warnings.len())
        } else if evaluated.len() == Layer::ALL.len() {
            self.calculator.overall_score(&score, weights)
        } else {
            ScoreCalculator::weighted_mean(&evaluated)
        });
        score
    }

    /// Run the check sequence for `mode` and return a complete result
    pub fn validate(&mut self, mode: ValidationMode) -> TrinityValidationResult {
        let started = Instant::now();
        self.errors.clear();
        self.warnings.clear();
        info!("Validating {} in {} mode", self.root.display(), mode);

        if let Some(issue) = self.config_issue.clone() {
            let message = format!("Configuration error, defaults in use: {}", issue);
            self.push(ValidationError::error(Category::Synchronization, message));
        }

        let mut outcome = RunOutcome::default();
        let run = catch_unwind(AssertUnwindSafe(|| self.run_mode(mode, &mut outcome)));
        let failure = match run {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("{:#}", e)),
            Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
        };
        if let Some(failure) = failure {
            warn!("Validation aborted: {}", failure);
            self.push(ValidationError::error(
                Category::Synchronization,
                format!("Validation aborted: {}", failure),
            ));
        }

        let score = self.score(mode, &outcome.layers);
        let overall = score.overall.unwrap_or(0);
        let min = self.config.validation.min_trinity_score;
        let valid = self.errors.is_empty() && overall >= min;

        let trend = self
            .history
            .as_ref()
            .and_then(|h| h.previous(mode))
            .map(|previous| calculate_trend(overall, previous));

        let metadata = ValidationMetadata {
            project_name: self.config.project_name(&self.root),
            mode,
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_ms: started.elapsed().as_millis() as u64,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            total_files: outcome.total_files,
            language: self
                .config
                .project
                .language
                .clone()
                .or_else(|| self.adapter.as_ref().map(|a| a.name().to_string())),
            framework: self.config.project.framework.clone().or_else(|| {
                self.adapter
                    .as_ref()
                    .and_then(|a| a.test_framework(&self.root))
            }),
            min_trinity_score: min,
            grade: grade_for_score(overall).to_string(),
            trend,
            test_run: outcome.test_run,
            changed_files: outcome.changed_files,
        };

        let mut result = TrinityValidationResult {
            valid,
            score,
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            metadata,
            layers: outcome.layers,
            synchronization: outcome.synchronization,
            recommendations: Vec::new(),
        };
        result.recommendations = recommendations_for(&result);

        if let Some(history) = self.history.as_mut() {
            history.record(HistoryEntry::from_result(&result));
            if let Err(e) = history.save() {
                warn!("Could not save score history: {}", e);
            }
        }

        debug!(
            "Validation finished: overall={} valid={} errors={} warnings={}",
            overall,
            valid,
            result.errors.len(),
            result.warnings.len()
        );
        result
    }
}

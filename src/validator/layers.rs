//! Per-layer checks: test, implementation, documentation

use super::{ProjectScan, Validator};
use crate::imports::{find_unused_imports, DependencyGraph, ImportResolution};
use crate::models::{
    Category, FileType, Layer, LayerDetails, LayerValidationResult, ValidationError,
};
use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

static MARKDOWN_LINK: OnceLock<Regex> = OnceLock::new();

/// `[text](target)` and `[text](target "title")`, images included
fn markdown_link() -> &'static Regex {
    MARKDOWN_LINK.get_or_init(|| {
        Regex::new(r#"\[[^\]\n]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).expect("valid regex")
    })
}

/// Assemble a layer result; `valid_files` are files without any error
fn layer_result(
    layer: Layer,
    score: u32,
    files: Vec<String>,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
) -> LayerValidationResult {
    let failing: HashSet<&str> = errors.iter().filter_map(|e| e.file.as_deref()).collect();
    let valid_files = files
        .iter()
        .filter(|f| !failing.contains(f.as_str()))
        .count();
    let details = LayerDetails {
        total_files: files.len(),
        valid_files,
        error_count: errors.len(),
        warning_count: warnings.len(),
    };
    LayerValidationResult {
        layer,
        score,
        evaluated: true,
        files,
        errors,
        warnings,
        details,
    }
}

/// Unresolved-import errors for `files`, one per import
fn unresolved_import_errors(
    scan: &ProjectScan,
    files: &[String],
    category: Category,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for file in files {
        for import in scan.imports_of(file) {
            if scan.analyzer.resolve(file, &import.specifier) == ImportResolution::Unresolved {
                errors.push(
                    ValidationError::error(
                        category,
                        format!("Cannot resolve import '{}'", import.specifier),
                    )
                    .with_file(file.clone())
                    .with_line(import.line),
                );
            }
        }
    }
    errors
}

/// Relative link targets in markdown that do not exist on disk
pub(crate) fn broken_links(root: &Path, doc: &str, content: &str) -> Vec<(String, usize)> {
    let base = Path::new(doc).parent().unwrap_or_else(|| Path::new(""));
    let mut broken = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        for caps in markdown_link().captures_iter(line) {
            let Some(target) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if target.starts_with('#')
                || target.starts_with("//")
                || target.contains("://")
                || target.starts_with("mailto:")
                || target.starts_with("tel:")
            {
                continue;
            }
            let path_part = target.split(['#', '?']).next().unwrap_or("");
            if path_part.is_empty() {
                continue;
            }
            let candidate = match path_part.strip_prefix('/') {
                Some(abs) => Path::new(abs).to_path_buf(),
                None => base.join(path_part),
            };
            let exists = crate::imports::normalize_path(&candidate)
                .map(|p| root.join(p).exists())
                .unwrap_or(false);
            if !exists {
                broken.push((target.to_string(), idx + 1));
            }
        }
    }
    broken
}

impl Validator {
    pub(crate) fn validate_test_layer(&self, scan: &ProjectScan) -> Result<LayerValidationResult> {
        let category = Category::Test;
        let files = scan.paths_of(FileType::Test);
        let mut warnings = Vec::new();

        let mut errors = unresolved_import_errors(scan, &files, category);
        let dependency_errors = errors.len();

        let structure_valid = scan.classifier.has_test_directory();
        if !structure_valid {
            warnings.push(ValidationError::warning(
                category,
                format!(
                    "No conventional test directory found (expected one of: {})",
                    self.config().directories.test.join(", ")
                ),
            ));
        }
        if files.is_empty() {
            errors.push(ValidationError::error(category, "No test files found"));
        }

        let score = self
            .calculator()
            .test_score(files.len(), dependency_errors, structure_valid);
        Ok(layer_result(Layer::Test, score, files, errors, warnings))
    }

    pub(crate) fn validate_implementation_layer(
        &self,
        scan: &ProjectScan,
    ) -> Result<LayerValidationResult> {
        let category = Category::Implementation;
        let config = self.config();
        let files = scan.paths_of(FileType::Implementation);
        let mut warnings = Vec::new();

        let mut errors = unresolved_import_errors(scan, &files, category);
        let import_errors = errors.len();

        let mut missing_utilities = 0;
        for utility in &config.implementation.required_utilities {
            if !self.root().join(utility).is_file() {
                missing_utilities += 1;
                errors.push(
                    ValidationError::error(category, format!("Required utility missing: {}", utility))
                        .with_file(utility.clone()),
                );
            }
        }

        if config.validation.check_unused_imports {
            for file in &files {
                let Some(content) = scan.analyzer.read_source(file) else {
                    continue;
                };
                for unused in find_unused_imports(&content) {
                    warnings.push(
                        ValidationError::warning(
                            category,
                            format!(
                                "'{}' imported from '{}' is possibly unused",
                                unused.name, unused.specifier
                            ),
                        )
                        .with_file(file.clone())
                        .with_line(unused.line),
                    );
                }
            }
        }

        if config.validation.report_cycles {
            let graph = DependencyGraph::build(&scan.analyzer, &files);
            for cycle in graph.cycles() {
                let first = cycle.first().cloned().unwrap_or_default();
                warnings.push(
                    ValidationError::warning(
                        category,
                        format!("Import cycle: {}", cycle.join(" -> ")),
                    )
                    .with_file(first),
                );
            }
        }

        if let Some(adapter) = self.adapter() {
            for requirement in adapter.check_requirements(self.root()) {
                warnings.push(ValidationError::warning(category, requirement));
            }
        }

        if files.is_empty() {
            errors.push(ValidationError::error(
                category,
                format!(
                    "No implementation files found under {}",
                    config.directories.source.join(", ")
                ),
            ));
        }

        let score =
            self.calculator()
                .implementation_score(files.len(), import_errors, missing_utilities);
        Ok(layer_result(Layer::Implementation, score, files, errors, warnings))
    }

    pub(crate) fn validate_documentation_layer(
        &self,
        scan: &ProjectScan,
    ) -> Result<LayerValidationResult> {
        let category = Category::Documentation;
        let docs = &self.config().documentation;
        let files = scan.paths_of(FileType::Documentation);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let mut missing_required = 0;
        for name in &docs.required_files {
            if !self.root().join(name).exists() {
                missing_required += 1;
                errors.push(ValidationError::error(
                    category,
                    format!("Required documentation missing: {}", name),
                ));
            }
        }
        let mut missing_recommended = 0;
        for name in &docs.recommended_files {
            if !self.root().join(name).exists() {
                missing_recommended += 1;
                warnings.push(ValidationError::warning(
                    category,
                    format!("Recommended documentation missing: {}", name),
                ));
            }
        }

        let mut broken_link_count = 0;
        if docs.check_links {
            for file in files.iter().filter(|f| f.ends_with(".md") || f.ends_with(".mdx")) {
                let Some(content) = scan.analyzer.read_source(file) else {
                    continue;
                };
                for (target, line) in broken_links(self.root(), file, &content) {
                    broken_link_count += 1;
                    warnings.push(
                        ValidationError::warning(category, format!("Broken link: {}", target))
                            .with_file(file.clone())
                            .with_line(line),
                    );
                }
            }
        }

        if files.is_empty() {
            errors.push(ValidationError::error(category, "No documentation files found"));
        }

        let calc = self.calculator();
        let completeness =
            calc.documentation_completeness(files.len(), missing_required, missing_recommended);
        let score = calc.documentation_score(completeness, broken_link_count);
        Ok(layer_result(Layer::Documentation, score, files, errors, warnings))
    }
}

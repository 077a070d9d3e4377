//! Pre-commit gate: checks only the files staged for commit

use super::{SyncAnalyzer, Validator};
use crate::classifier::FileClassifier;
use crate::git::{ChangeKind, StagedFile};
use crate::imports::{ImportAnalyzer, ImportResolution};
use crate::models::{Category, FileType, ValidationError};
use anyhow::Result;
use std::collections::HashSet;
use tracing::debug;

fn category_for(file_type: FileType) -> Category {
    match file_type {
        FileType::Test => Category::Test,
        FileType::Implementation => Category::Implementation,
        FileType::Documentation => Category::Documentation,
        FileType::Config | FileType::Other => Category::Synchronization,
    }
}

impl Validator {
    pub(crate) fn check_staged_files(&mut self, staged: &[StagedFile]) -> Result<()> {
        if staged.is_empty() {
            debug!("No staged files");
            return Ok(());
        }

        let classifier = FileClassifier::new(self.root(), self.config())?;
        let analyzer = ImportAnalyzer::new(self.root(), self.config());
        let staged_paths: HashSet<&str> = staged.iter().map(|f| f.path.as_str()).collect();
        let mut issues = Vec::new();

        {
            let config = self.config();
            let sync = SyncAnalyzer::new(self.root(), config);
            let critical: HashSet<&str> =
                config.validation.critical_files.iter().map(String::as_str).collect();

            for file in staged {
                let file_type = classifier.classify(&file.path);
                let category = category_for(file_type);

                if !self.root().join(&file.path).is_file() {
                    issues.push(
                        ValidationError::error(category, "Staged file is missing from the working tree")
                            .with_file(file.path.clone()),
                    );
                    continue;
                }

                if critical.contains(file.path.as_str()) {
                    issues.push(
                        ValidationError::warning(
                            Category::Synchronization,
                            "Critical file changed; review carefully",
                        )
                        .with_file(file.path.clone()),
                    );
                }

                if matches!(file_type, FileType::Test | FileType::Implementation) {
                    for import in analyzer.import_refs(&file.path) {
                        if analyzer.resolve(&file.path, &import.specifier)
                            == ImportResolution::Unresolved
                        {
                            issues.push(
                                ValidationError::error(
                                    category,
                                    format!("Cannot resolve import '{}'", import.specifier),
                                )
                                .with_file(file.path.clone())
                                .with_line(import.line),
                            );
                        }
                    }
                }

                if file_type == FileType::Implementation
                    && file.change == ChangeKind::Added
                    && !sync.is_exempt(&file.path)
                    && !sync.has_test(&file.path, &staged_paths)
                {
                    issues.push(
                        ValidationError::error(
                            Category::Synchronization,
                            format!(
                                "New file has no test (expected {})",
                                super::expected_test_path(&file.path, config)
                            ),
                        )
                        .with_file(file.path.clone()),
                    );
                }
            }
        }

        debug!("Pre-commit: {} staged files, {} issues", staged.len(), issues.len());
        for issue in issues {
            self.push(issue);
        }
        Ok(())
    }
}

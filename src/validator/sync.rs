//! Synchronization analysis: does every implementation file have a test
//! (and, when required, an API doc), and does every test still have an
//! implementation?

use super::ProjectScan;
use crate::classifier::compile_globset;
use crate::config::TrinityFullConfig;
use crate::imports::RESOLVE_EXTENSIONS;
use crate::models::{Category, FileType, SyncCoverage, SynchronizationResult, ValidationError};
use globset::GlobSet;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `dir/name.ext` -> (`dir/`, `name`, `.ext`); only the last extension is split off
fn split_path(path: &str) -> (&str, &str, &str) {
    let (dir, file) = match path.rfind('/') {
        Some(idx) => path.split_at(idx + 1),
        None => ("", path),
    };
    match file.rfind('.') {
        // dotfiles keep their leading dot in the stem
        Some(0) | None => (dir, file, ""),
        Some(idx) => {
            let (stem, ext) = file.split_at(idx);
            (dir, stem, ext)
        }
    }
}

fn strip_dir_prefix<'a>(path: &'a str, dir: &str) -> Option<&'a str> {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        return Some(path);
    }
    path.strip_prefix(dir)?.strip_prefix('/')
}

fn join_dir(dir: &str, rest: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", dir, rest)
    }
}

/// Test name for an implementation file name: `foo.ts` -> `foo.test.ts`
fn test_file_name(stem: &str, ext: &str, config: &TrinityFullConfig) -> String {
    let sync = &config.synchronization;
    format!("{}{}{}{}", sync.test_prefix, stem, sync.test_suffix, ext)
}

/// Where the test for `impl_path` is expected: the source-root prefix is
/// swapped for the test root (`src/a/foo.ts` -> `__tests__/a/foo.test.ts`).
/// Files outside the source root keep their full path under the test root.
pub fn expected_test_path(impl_path: &str, config: &TrinityFullConfig) -> String {
    let dirs = &config.directories;
    let relative = strip_dir_prefix(impl_path, &dirs.source_root).unwrap_or(impl_path);
    let (dir, stem, ext) = split_path(relative);
    join_dir(&dirs.test_root, &format!("{}{}", dir, test_file_name(stem, ext, config)))
}

/// Test sitting next to its implementation (`src/foo.ts` -> `src/foo.test.ts`)
pub fn colocated_test_path(impl_path: &str, config: &TrinityFullConfig) -> String {
    let (dir, stem, ext) = split_path(impl_path);
    format!("{}{}", dir, test_file_name(stem, ext, config))
}

/// Mirror of `impl_path` under the API docs directory, as markdown
pub fn expected_doc_path(impl_path: &str, config: &TrinityFullConfig) -> String {
    let dirs = &config.directories;
    let relative = strip_dir_prefix(impl_path, &dirs.source_root).unwrap_or(impl_path);
    let (dir, stem, _) = split_path(relative);
    join_dir(&dirs.api_docs, &format!("{}{}.md", dir, stem))
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 100;
    }
    ((part as f64 * 100.0) / whole as f64).round() as u32
}

/// Cross-references implementation files against tests and API docs
pub struct SyncAnalyzer<'a> {
    root: PathBuf,
    config: &'a TrinityFullConfig,
}

impl<'a> SyncAnalyzer<'a> {
    pub fn new(root: &Path, config: &'a TrinityFullConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    fn exempt_set(&self) -> Option<GlobSet> {
        match compile_globset(&self.config.synchronization.exempt_patterns) {
            Ok(set) => Some(set),
            Err(e) => {
                warn!("Ignoring synchronization exemptions: {}", e);
                None
            }
        }
    }

    fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).is_file()
    }

    /// Candidate test paths for one implementation file, in preference order
    pub fn test_candidates(&self, impl_path: &str) -> Vec<String> {
        let mut candidates = vec![
            expected_test_path(impl_path, self.config),
            colocated_test_path(impl_path, self.config),
        ];
        // `.spec` is the common alternative to `.test`
        if self.config.synchronization.test_suffix == ".test" {
            let spec = candidates
                .iter()
                .map(|c| {
                    let (dir, stem, ext) = split_path(c);
                    let stem = stem.strip_suffix(".test").unwrap_or(stem);
                    format!("{}{}.spec{}", dir, stem, ext)
                })
                .collect::<Vec<_>>();
            candidates.extend(spec);
        }
        candidates
    }

    /// Whether any candidate test for `impl_path` exists on disk or is in `also`
    pub fn has_test(&self, impl_path: &str, also: &HashSet<&str>) -> bool {
        self.test_candidates(impl_path)
            .iter()
            .any(|candidate| also.contains(candidate.as_str()) || self.exists(candidate))
    }

    pub fn is_exempt(&self, impl_path: &str) -> bool {
        self.exempt_set().is_some_and(|set| set.is_match(impl_path))
    }

    /// Implementation stem a test under the test root points back to, or
    /// `None` when the file name doesn't follow the test naming scheme
    fn implementation_for_test(&self, test_path: &str) -> Option<(String, String)> {
        let dirs = &self.config.directories;
        let sync = &self.config.synchronization;
        let relative = strip_dir_prefix(test_path, &dirs.test_root)?;
        let (dir, stem, ext) = split_path(relative);
        let stem = stem.strip_prefix(sync.test_prefix.as_str())?;
        let stem = stem
            .strip_suffix(sync.test_suffix.as_str())
            .or_else(|| stem.strip_suffix(".spec"))?;
        if stem.is_empty() {
            return None;
        }
        Some((join_dir(&dirs.source_root, &format!("{}{}", dir, stem)), ext.to_string()))
    }

    fn implementation_exists(&self, stem_path: &str, ext: &str) -> bool {
        std::iter::once(ext)
            .chain(RESOLVE_EXTENSIONS.iter().copied())
            .any(|e| self.exists(&format!("{}{}", stem_path, e)))
    }

    pub fn analyze(&self, scan: &ProjectScan) -> (SynchronizationResult, Vec<ValidationError>) {
        let implementations = scan.paths_of(FileType::Implementation);
        let tests = scan.paths_of(FileType::Test);
        let docs: HashSet<String> = scan
            .paths_of(FileType::Documentation)
            .into_iter()
            .collect();
        let require_docs = self.config.synchronization.require_docs;
        let exempt = self.exempt_set();
        let none = HashSet::new();

        let mut result = SynchronizationResult {
            evaluated: true,
            ..Default::default()
        };
        let mut issues = Vec::new();
        let mut considered = 0usize;
        let mut with_docs = 0usize;

        for impl_path in &implementations {
            if exempt.as_ref().is_some_and(|set| set.is_match(impl_path)) {
                continue;
            }
            considered += 1;

            if !self.has_test(impl_path, &none) {
                let expected = expected_test_path(impl_path, self.config);
                issues.push(
                    ValidationError::warning(
                        Category::Synchronization,
                        format!("No test found for {} (expected {})", impl_path, expected),
                    )
                    .with_file(impl_path.clone()),
                );
                result.missing_tests.push(impl_path.clone());
            }

            let doc_path = expected_doc_path(impl_path, self.config);
            if docs.contains(&doc_path) || self.exists(&doc_path) {
                with_docs += 1;
            } else if require_docs {
                issues.push(
                    ValidationError::warning(
                        Category::Synchronization,
                        format!("No API documentation for {} (expected {})", impl_path, doc_path),
                    )
                    .with_file(impl_path.clone()),
                );
                result.missing_docs.push(impl_path.clone());
            }
        }

        for test_path in &tests {
            let Some((stem_path, ext)) = self.implementation_for_test(test_path) else {
                continue;
            };
            if !self.implementation_exists(&stem_path, &ext) {
                issues.push(
                    ValidationError::warning(
                        Category::Synchronization,
                        format!("Test has no matching implementation ({}{} is gone)", stem_path, ext),
                    )
                    .with_file(test_path.clone()),
                );
                result.orphaned_tests.push(test_path.clone());
            }
        }

        if require_docs {
            let api_docs = &self.config.directories.api_docs;
            let mut doc_list: Vec<&String> = docs.iter().collect();
            doc_list.sort();
            for doc in doc_list {
                let Some(relative) = strip_dir_prefix(doc, api_docs) else {
                    continue;
                };
                let (dir, stem, _) = split_path(relative);
                if stem.eq_ignore_ascii_case("readme") || stem.eq_ignore_ascii_case("index") {
                    continue;
                }
                let stem_path = join_dir(
                    &self.config.directories.source_root,
                    &format!("{}{}", dir, stem),
                );
                if !self.implementation_exists(&stem_path, "") {
                    issues.push(
                        ValidationError::warning(
                            Category::Synchronization,
                            format!("API doc describes a file that no longer exists ({})", stem_path),
                        )
                        .with_file(doc.clone()),
                    );
                    result.orphaned_docs.push(doc.clone());
                }
            }
        }

        let tested = considered - result.missing_tests.len();
        result.coverage = SyncCoverage {
            test_coverage: percent(tested, considered),
            documentation_coverage: percent(with_docs, considered),
        };
        result.synchronized = result.missing_tests.is_empty() && result.missing_docs.is_empty();
        debug!(
            "Synchronization: {} files considered, {} missing tests, {} orphaned tests",
            considered,
            result.missing_tests.len(),
            result.orphaned_tests.len()
        );
        (result, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_test_path() {
        let config = TrinityFullConfig::default();
        assert_eq!(expected_test_path("src/foo.ts", &config), "__tests__/foo.test.ts");
        assert_eq!(
            expected_test_path("src/a/b/widget.tsx", &config),
            "__tests__/a/b/widget.test.tsx"
        );
        assert_eq!(expected_test_path("lib/x.js", &config), "__tests__/lib/x.test.js");
        assert_eq!(colocated_test_path("src/a/foo.ts", &config), "src/a/foo.test.ts");
    }

    #[test]
    fn test_expected_test_path_with_prefix() {
        let mut config = TrinityFullConfig::default();
        config.synchronization.test_prefix = "test_".to_string();
        config.synchronization.test_suffix = String::new();
        config.directories.test_root = "tests".to_string();
        assert_eq!(expected_test_path("src/pkg/io.py", &config), "tests/pkg/test_io.py");
    }

    #[test]
    fn test_expected_doc_path() {
        let config = TrinityFullConfig::default();
        assert_eq!(expected_doc_path("src/net/client.ts", &config), "docs/api/net/client.md");
    }

    #[test]
    fn test_split_path_multi_dot_names() {
        assert_eq!(split_path("src/a.config.ts"), ("src/", "a.config", ".ts"));
        assert_eq!(split_path("__tests__/a.test.ts"), ("__tests__/", "a.test", ".ts"));
        assert_eq!(split_path("Makefile"), ("", "Makefile", ""));
        assert_eq!(split_path("src/.env"), ("src/", ".env", ""));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
    }
}

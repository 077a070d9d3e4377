//! File classifier
//!
//! Walks a project tree and sorts every file into one of five buckets:
//! test, implementation, documentation, config or other. Classification is
//! path-based only; file contents are never read here.
//!
//! Priority when several rules match: test > implementation >
//! documentation > config > other.

mod patterns;

pub use patterns::{compile_globset, is_config_file};

use crate::config::TrinityFullConfig;
use crate::error::{TrinityError, TrinityResult};
use crate::models::{FileType, ProjectFile};
use globset::GlobSet;
use ignore::WalkBuilder;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project-relative, `/`-separated form of `path`
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Whether `rel` sits inside directory `dir` (which may be nested, `a/b`)
fn is_under(rel: &str, dir: &str) -> bool {
    let dir = dir.trim_matches('/');
    !dir.is_empty()
        && rel.len() > dir.len()
        && rel.starts_with(dir)
        && rel.as_bytes()[dir.len()] == b'/'
}

/// Path-based classifier compiled from one configuration
#[derive(Debug, Clone)]
pub struct FileClassifier {
    root: PathBuf,
    test: GlobSet,
    implementation: GlobSet,
    documentation: GlobSet,
    exclude: GlobSet,
    root_docs: GlobSet,
    source_dirs: Vec<String>,
    test_dirs: Vec<String>,
    doc_dirs: Vec<String>,
    excluded_dirs: HashSet<String>,
}

impl FileClassifier {
    pub fn new(root: impl Into<PathBuf>, config: &TrinityFullConfig) -> TrinityResult<Self> {
        let patterns = &config.patterns;
        let dirs = &config.directories;
        Ok(Self {
            root: root.into(),
            test: compile_globset(&patterns.test)?,
            implementation: compile_globset(&patterns.implementation)?,
            documentation: compile_globset(&patterns.documentation)?,
            exclude: compile_globset(&patterns.exclude)?,
            root_docs: compile_globset(&config.documentation.root_files)?,
            source_dirs: dirs.source.clone(),
            test_dirs: dirs.test.clone(),
            doc_dirs: dirs.documentation.clone(),
            excluded_dirs: dirs.excluded.iter().cloned().collect(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn in_source_dir(&self, rel: &str) -> bool {
        self.source_dirs.iter().any(|dir| is_under(rel, dir))
    }

    fn in_test_dir(&self, rel: &str) -> bool {
        let Some((parent, _)) = rel.rsplit_once('/') else {
            return false;
        };
        let components: Vec<&str> = parent.split('/').collect();
        self.test_dirs.iter().any(|dir| {
            if dir.contains('/') {
                is_under(rel, dir)
            } else {
                components.contains(&dir.as_str())
            }
        })
    }

    fn in_doc_dir(&self, rel: &str) -> bool {
        self.doc_dirs.iter().any(|dir| is_under(rel, dir))
    }

    pub fn is_test(&self, rel: &str) -> bool {
        self.test.is_match(rel) && (self.in_test_dir(rel) || self.in_source_dir(rel))
    }

    pub fn is_implementation(&self, rel: &str) -> bool {
        self.implementation.is_match(rel)
            && self.in_source_dir(rel)
            && !self.test.is_match(rel)
            && !self.exclude.is_match(rel)
    }

    pub fn is_documentation(&self, rel: &str) -> bool {
        if !rel.contains('/') {
            return self.root_docs.is_match(rel);
        }
        self.in_doc_dir(rel) && self.documentation.is_match(rel)
    }

    /// Classify one project-relative path
    pub fn classify(&self, rel: &str) -> FileType {
        let rel = rel.trim_start_matches("./");
        let name = rel.rsplit('/').next().unwrap_or(rel);
        if self.is_test(rel) {
            FileType::Test
        } else if self.is_implementation(rel) {
            FileType::Implementation
        } else if self.is_documentation(rel) {
            FileType::Documentation
        } else if is_config_file(name) {
            FileType::Config
        } else {
            FileType::Other
        }
    }

    /// Every file under the root, relative and sorted.
    ///
    /// Excluded directory names and dot-directories are never descended
    /// into. Unreadable entries are skipped with a warning.
    pub fn walk(&self) -> TrinityResult<Vec<String>> {
        if !self.root.is_dir() {
            return Err(TrinityError::Read {
                path: self.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let excluded = self.excluded_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .parents(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                if !is_dir {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !name.starts_with('.') && !excluded.contains(name.as_ref())
            })
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if let Some(rel) = relative_path(&self.root, entry.path()) {
                files.push(rel);
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Classify every file in the project
    pub fn scan(&self) -> TrinityResult<Vec<ProjectFile>> {
        let files: Vec<ProjectFile> = self
            .walk()?
            .into_iter()
            .map(|rel| {
                let file_type = self.classify(&rel);
                ProjectFile::new(rel, file_type)
            })
            .collect();

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for file in &files {
            *counts.entry(file.file_type.to_string()).or_default() += 1;
        }
        debug!("Classified {} files: {:?}", files.len(), counts);
        Ok(files)
    }

    fn find(&self, wanted: FileType) -> TrinityResult<Vec<String>> {
        Ok(self
            .walk()?
            .into_iter()
            .filter(|rel| self.classify(rel) == wanted)
            .collect())
    }

    pub fn find_test_files(&self) -> TrinityResult<Vec<String>> {
        self.find(FileType::Test)
    }

    pub fn find_implementation_files(&self) -> TrinityResult<Vec<String>> {
        self.find(FileType::Implementation)
    }

    pub fn find_documentation_files(&self) -> TrinityResult<Vec<String>> {
        self.find(FileType::Documentation)
    }

    /// Whether any conventional test directory exists at the root or
    /// directly under a source directory
    pub fn has_test_directory(&self) -> bool {
        self.test_dirs.iter().any(|test_dir| {
            self.root.join(test_dir).is_dir()
                || self
                    .source_dirs
                    .iter()
                    .any(|src| self.root.join(src).join(test_dir).is_dir())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn classifier(root: &Path) -> FileClassifier {
        FileClassifier::new(root, &TrinityFullConfig::default()).unwrap()
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_classify_paths() {
        let c = classifier(Path::new("/nonexistent"));
        assert_eq!(c.classify("src/foo.ts"), FileType::Implementation);
        assert_eq!(c.classify("src/deep/bar.jsx"), FileType::Implementation);
        assert_eq!(c.classify("__tests__/foo.test.ts"), FileType::Test);
        assert_eq!(c.classify("packages/a/tests/x.spec.js"), FileType::Test);
        // co-located
        assert_eq!(c.classify("src/foo.test.ts"), FileType::Test);
        assert_eq!(c.classify("src/types.d.ts"), FileType::Other);
        assert_eq!(c.classify("README.md"), FileType::Documentation);
        assert_eq!(c.classify("CHANGELOG"), FileType::Documentation);
        assert_eq!(c.classify("docs/guide/intro.md"), FileType::Documentation);
        // markdown outside docs/ and not at the root
        assert_eq!(c.classify("src/notes.md"), FileType::Other);
        assert_eq!(c.classify("package.json"), FileType::Config);
        assert_eq!(c.classify("scripts/build.js"), FileType::Other);
        // test pattern outside any test or source dir
        assert_eq!(c.classify("foo.test.js"), FileType::Other);
        // test outranks documentation
        assert!(c.is_documentation("docs/tests/guide.test.md"));
        assert_eq!(c.classify("docs/tests/guide.test.md"), FileType::Test);
        assert_eq!(c.classify("src/guide.test.md"), FileType::Test);
    }

    #[test]
    fn test_scan_skips_excluded_and_dot_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/index.ts");
        touch(root, "src/util.ts");
        touch(root, "node_modules/lodash/index.js");
        touch(root, ".cache/src/junk.ts");
        touch(root, "dist/src/bundle.js");
        touch(root, "README.md");
        touch(root, ".eslintrc");

        let c = classifier(root);
        let files = c.walk().unwrap();
        assert_eq!(files, vec![".eslintrc", "README.md", "src/index.ts", "src/util.ts"]);

        let scanned = c.scan().unwrap();
        assert_eq!(scanned[0].file_type, FileType::Config);
        assert_eq!(scanned[2].language, "typescript");
        assert_eq!(c.find_implementation_files().unwrap().len(), 2);
        assert_eq!(c.find_documentation_files().unwrap(), vec!["README.md"]);
        assert!(c.find_test_files().unwrap().is_empty());
    }

    #[test]
    fn test_has_test_directory() {
        let dir = tempdir().unwrap();
        let c = classifier(dir.path());
        assert!(!c.has_test_directory());
        std::fs::create_dir_all(dir.path().join("src/__tests__")).unwrap();
        assert!(c.has_test_directory());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let c = classifier(Path::new("/definitely/not/here"));
        assert!(c.walk().is_err());
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(
            relative_path(root, &root.join("src").join("a.ts")).as_deref(),
            Some("src/a.ts")
        );
        assert_eq!(relative_path(root, root), None);
    }
}

//! Import analyzer
//!
//! Pulls import / require references out of source text with regexes and
//! resolves each one against the filesystem. Nothing is parsed or executed,
//! so the analysis is deliberately approximate:
//!
//! - relative imports resolve through the usual extension and `index` probing
//! - absolute imports resolve against the project root
//! - package imports always resolve; a package missing from the dependency
//!   store is only flagged as not installed
//!
//! Path aliases and workspace packages fall into the package bucket.

mod graph;
mod unused;

pub use graph::DependencyGraph;
pub use unused::{find_unused_imports, UnusedImport};

use crate::config::TrinityFullConfig;
use crate::models::{language_for_path, ProjectFile};
use rayon::prelude::*;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Probe order for extension-less relative imports
pub const RESOLVE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".json"];

const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

static NAMED_FROM: OnceLock<Regex> = OnceLock::new();
static BARE: OnceLock<Regex> = OnceLock::new();
static DYNAMIC: OnceLock<Regex> = OnceLock::new();
static REQUIRE: OnceLock<Regex> = OnceLock::new();
static RE_EXPORT: OnceLock<Regex> = OnceLock::new();

fn named_from() -> &'static Regex {
    NAMED_FROM.get_or_init(|| {
        Regex::new(r#"\bimport\s+([^'";]+?)\s+from\s*['"]([^'"\n]+)['"]"#).expect("valid regex")
    })
}

fn bare() -> &'static Regex {
    BARE.get_or_init(|| Regex::new(r#"\bimport\s*['"]([^'"\n]+)['"]"#).expect("valid regex"))
}

fn dynamic() -> &'static Regex {
    DYNAMIC.get_or_init(|| {
        Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
    })
}

fn require() -> &'static Regex {
    REQUIRE.get_or_init(|| {
        Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
    })
}

fn re_export() -> &'static Regex {
    RE_EXPORT.get_or_init(|| {
        Regex::new(r#"\bexport\s+(?:type\s+)?(?:\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*['"]([^'"\n]+)['"]"#)
            .expect("valid regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import x from 'y'`, `import { a } from 'y'`
    Named,
    /// `import 'y'`
    Bare,
    /// `import('y')`
    Dynamic,
    /// `require('y')`
    Require,
    /// `export * from 'y'`
    ReExport,
}

/// One import reference found in source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub specifier: String,
    /// 1-based line of the statement
    pub line: usize,
    pub kind: ImportKind,
    /// Binding clause of a named import (`x, { a as b }`)
    pub bindings: Option<String>,
    /// Byte span of the whole statement
    pub span: (usize, usize),
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

/// Every import reference in `content`, ordered by position, one entry per
/// distinct specifier (first occurrence wins)
pub fn extract_import_refs(content: &str) -> Vec<ImportRef> {
    let mut refs: Vec<ImportRef> = Vec::new();

    for caps in named_from().captures_iter(content) {
        let (Some(whole), Some(bindings), Some(spec)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        refs.push(ImportRef {
            specifier: spec.as_str().to_string(),
            line: line_of(content, whole.start()),
            kind: ImportKind::Named,
            bindings: Some(bindings.as_str().trim().to_string()),
            span: (whole.start(), whole.end()),
        });
    }

    let simple: [(&Regex, ImportKind); 4] = [
        (bare(), ImportKind::Bare),
        (dynamic(), ImportKind::Dynamic),
        (require(), ImportKind::Require),
        (re_export(), ImportKind::ReExport),
    ];
    for (re, kind) in simple {
        for caps in re.captures_iter(content) {
            let (Some(whole), Some(spec)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            refs.push(ImportRef {
                specifier: spec.as_str().to_string(),
                line: line_of(content, whole.start()),
                kind,
                bindings: None,
                span: (whole.start(), whole.end()),
            });
        }
    }

    refs.sort_by_key(|r| r.span.0);
    let mut seen = std::collections::HashSet::new();
    refs.retain(|r| seen.insert(r.specifier.clone()));
    refs
}

/// Distinct import specifiers in `content`, in source order
pub fn extract_imports_from_str(content: &str) -> Vec<String> {
    extract_import_refs(content)
        .into_iter()
        .map(|r| r.specifier)
        .collect()
}

/// Lexically normalize `.` and `..` components. `None` when the path
/// climbs above its starting point.
pub fn normalize_path(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    Some(out)
}

/// Package name of a bare specifier: `@scope/pkg/sub` -> `@scope/pkg`
pub fn package_name(specifier: &str) -> &str {
    let mut parts = specifier.splitn(3, '/');
    let first = parts.next().unwrap_or(specifier);
    if first.starts_with('@') {
        match parts.next() {
            Some(second) => &specifier[..first.len() + 1 + second.len()],
            None => first,
        }
    } else {
        first
    }
}

pub fn is_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    NODE_BUILTINS.contains(&package_name(specifier))
}

/// Where an import specifier points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportResolution {
    /// A project file (project-relative path)
    File(String),
    /// A third-party package; `installed` when present in the dependency store
    Package { name: String, installed: bool },
    /// A runtime built-in module
    Builtin(String),
    Unresolved,
}

impl ImportResolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, ImportResolution::Unresolved)
    }
}

/// Only JS-family sources carry import statements the regexes understand
fn is_scriptable(path: &str) -> bool {
    matches!(
        language_for_path(path),
        "javascript" | "typescript" | "vue" | "svelte"
    )
}

/// Filesystem-backed import resolver for one project root
#[derive(Debug, Clone)]
pub struct ImportAnalyzer {
    root: PathBuf,
    dependency_store: PathBuf,
}

impl ImportAnalyzer {
    pub fn new(root: impl Into<PathBuf>, config: &TrinityFullConfig) -> Self {
        let root = root.into();
        let dependency_store = root.join(&config.directories.dependency_store);
        Self {
            root,
            dependency_store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File text, or `None` when unreadable or not valid UTF-8
    pub fn read_source(&self, rel: &str) -> Option<String> {
        match std::fs::read_to_string(self.root.join(rel)) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Cannot read {}: {}", rel, e);
                None
            }
        }
    }

    /// Import references of a project file; empty when unreadable
    pub fn import_refs(&self, rel: &str) -> Vec<ImportRef> {
        if !is_scriptable(rel) {
            return Vec::new();
        }
        self.read_source(rel)
            .map(|content| extract_import_refs(&content))
            .unwrap_or_default()
    }

    /// Distinct import specifiers of a project file; empty when unreadable
    pub fn extract_imports(&self, rel: &str) -> Vec<String> {
        self.import_refs(rel).into_iter().map(|r| r.specifier).collect()
    }

    /// Fill `imports` for every file, reading in parallel
    pub fn annotate(&self, files: &mut [ProjectFile]) {
        files
            .par_iter_mut()
            .for_each(|file| file.imports = self.extract_imports(&file.path));
    }

    fn probe(&self, rel: &Path) -> Option<String> {
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if self.root.join(rel).is_file() {
            return Some(rel_str);
        }
        for ext in RESOLVE_EXTENSIONS {
            let candidate = format!("{}{}", rel_str, ext);
            if self.root.join(&candidate).is_file() {
                return Some(candidate);
            }
        }
        for ext in RESOLVE_EXTENSIONS {
            let candidate = format!("{}/index{}", rel_str, ext);
            if self.root.join(&candidate).is_file() {
                return Some(candidate);
            }
        }
        // ESM TypeScript writes `./x.js` for `./x.ts`
        if let Some(stem) = rel_str.strip_suffix(".js") {
            for ext in [".ts", ".tsx"] {
                let candidate = format!("{}{}", stem, ext);
                if self.root.join(&candidate).is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Resolve `specifier` as written in project file `from`
    pub fn resolve(&self, from: &str, specifier: &str) -> ImportResolution {
        let specifier = specifier.trim();
        if specifier.is_empty() {
            return ImportResolution::Unresolved;
        }

        if specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".." {
            let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
            let Some(target) = normalize_path(&base.join(specifier)) else {
                return ImportResolution::Unresolved;
            };
            return match self.probe(&target) {
                Some(found) => ImportResolution::File(found),
                None => ImportResolution::Unresolved,
            };
        }

        if let Some(abs) = specifier.strip_prefix('/') {
            let Some(target) = normalize_path(Path::new(abs)) else {
                return ImportResolution::Unresolved;
            };
            return if self.root.join(&target).exists() {
                ImportResolution::File(target.to_string_lossy().replace('\\', "/"))
            } else {
                ImportResolution::Unresolved
            };
        }

        if is_builtin(specifier) {
            return ImportResolution::Builtin(
                specifier.trim_start_matches("node:").to_string(),
            );
        }

        let name = package_name(specifier).to_string();
        let installed = self.dependency_store.join(&name).is_dir();
        ImportResolution::Package { name, installed }
    }

    /// Whether `specifier` in `from` resolves. Packages always do.
    pub fn validate_import_path(&self, from: &str, specifier: &str) -> bool {
        self.resolve(from, specifier).is_resolved()
    }

    /// Unresolved imports of one file as `(specifier, line)` pairs
    pub fn unresolved_imports(&self, rel: &str) -> Vec<(String, usize)> {
        self.import_refs(rel)
            .into_iter()
            .filter(|r| !self.validate_import_path(rel, &r.specifier))
            .map(|r| (r.specifier, r.line))
            .collect()
    }

    /// Relative imports of one file that resolve to project files
    pub fn local_dependencies(&self, rel: &str) -> Vec<String> {
        self.import_refs(rel)
            .into_iter()
            .filter(|r| r.specifier.starts_with('.'))
            .filter_map(|r| match self.resolve(rel, &r.specifier) {
                ImportResolution::File(path) => Some(path),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_extract_all_forms_in_order() {
        let src = r#"
import React, { useState } from 'react';
import './styles.css';
export * from "./reexported";
const lazy = import('./lazy');
const fs = require("fs");
import {
  a,
  b,
} from "./multi";
"#;
        let imports = extract_imports_from_str(src);
        assert_eq!(
            imports,
            vec!["react", "./styles.css", "./reexported", "./lazy", "fs", "./multi"]
        );

        let refs = extract_import_refs(src);
        assert_eq!(refs[0].line, 2);
        assert_eq!(refs[0].kind, ImportKind::Named);
        assert_eq!(refs[0].bindings.as_deref(), Some("React, { useState }"));
        assert_eq!(refs[5].line, 7);
    }

    #[test]
    fn test_extract_dedups_specifiers() {
        let src = "import a from './x';\nconst b = require('./x');\n";
        assert_eq!(extract_imports_from_str(src), vec!["./x"]);
    }

    #[test]
    fn test_extract_tolerates_garbage() {
        assert!(extract_imports_from_str("").is_empty());
        assert!(extract_imports_from_str("import from from from ''' \"").is_empty());
        assert!(extract_imports_from_str("\u{0}\u{1}binary\u{ffff}").is_empty());
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("lodash"), "lodash");
        assert_eq!(package_name("lodash/fp"), "lodash");
        assert_eq!(package_name("@scope/pkg/deep/path"), "@scope/pkg");
        assert_eq!(package_name("@scope"), "@scope");
    }

    #[test]
    fn test_builtins() {
        assert!(is_builtin("fs"));
        assert!(is_builtin("fs/promises"));
        assert!(is_builtin("node:test"));
        assert!(!is_builtin("lodash"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("src/a/../b/./c")),
            Some(PathBuf::from("src/b/c"))
        );
        assert_eq!(normalize_path(Path::new("../outside")), None);
    }

    #[test]
    fn test_resolve_relative_with_extension_probe() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/util.ts", "export const x = 1;");
        write(root, "src/components/index.tsx", "");
        let analyzer = ImportAnalyzer::new(root, &TrinityFullConfig::default());

        assert_eq!(
            analyzer.resolve("src/app.ts", "./util"),
            ImportResolution::File("src/util.ts".to_string())
        );
        assert_eq!(
            analyzer.resolve("src/app.ts", "./components"),
            ImportResolution::File("src/components/index.tsx".to_string())
        );
        assert_eq!(
            analyzer.resolve("src/app.ts", "./util.js"),
            ImportResolution::File("src/util.ts".to_string())
        );
        assert_eq!(analyzer.resolve("src/app.ts", "./missing"), ImportResolution::Unresolved);
        assert_eq!(analyzer.resolve("src/app.ts", "../../../escape"), ImportResolution::Unresolved);
    }

    #[test]
    fn test_resolve_absolute_and_packages() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/util.ts", "");
        std::fs::create_dir_all(root.join("node_modules/@scope/pkg")).unwrap();
        let analyzer = ImportAnalyzer::new(root, &TrinityFullConfig::default());

        assert!(analyzer.validate_import_path("src/app.ts", "/src/util.ts"));
        assert!(!analyzer.validate_import_path("src/app.ts", "/src/util"));
        assert_eq!(
            analyzer.resolve("src/app.ts", "@scope/pkg/sub"),
            ImportResolution::Package {
                name: "@scope/pkg".to_string(),
                installed: true
            }
        );
        // optimistic for packages that are not installed
        assert_eq!(
            analyzer.resolve("src/app.ts", "left-pad"),
            ImportResolution::Package {
                name: "left-pad".to_string(),
                installed: false
            }
        );
        assert_eq!(
            analyzer.resolve("src/app.ts", "node:path"),
            ImportResolution::Builtin("path".to_string())
        );
    }

    #[test]
    fn test_unresolved_imports_and_annotate() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/util.ts", "export const x = 1;");
        write(
            root,
            "src/app.ts",
            "import { x } from './util';\nimport { y } from './gone';\n",
        );
        let analyzer = ImportAnalyzer::new(root, &TrinityFullConfig::default());
        assert_eq!(
            analyzer.unresolved_imports("src/app.ts"),
            vec![("./gone".to_string(), 2)]
        );
        assert_eq!(analyzer.local_dependencies("src/app.ts"), vec!["src/util.ts"]);

        let mut files = vec![
            ProjectFile::new("src/app.ts", crate::models::FileType::Implementation),
            ProjectFile::new("src/util.ts", crate::models::FileType::Implementation),
            ProjectFile::new("src/missing.ts", crate::models::FileType::Implementation),
        ];
        analyzer.annotate(&mut files);
        assert_eq!(files[0].imports, vec!["./util", "./gone"]);
        assert!(files[1].imports.is_empty());
        assert!(files[2].imports.is_empty());
    }
}

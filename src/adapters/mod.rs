//! Language adapters
//!
//! An adapter answers the language-specific questions the validator and the
//! config manager need: is this project written in my language, what do its
//! tests look like, how are they run. Adapters are chosen once per project
//! and injected; nothing else branches on language names.

mod javascript;
mod python;
mod rust;

pub use javascript::JavaScriptAdapter;
pub use python::PythonAdapter;
pub use rust::RustAdapter;

use std::path::Path;

/// Capability interface for one language ecosystem
pub trait LanguageAdapter: Send + Sync {
    /// Canonical lowercase language name
    fn name(&self) -> &'static str;

    /// Whether the project at `root` looks like it is written in this language
    fn detect(&self, root: &Path) -> bool;

    /// Glob patterns identifying test files
    fn test_patterns(&self) -> Vec<String>;

    /// Glob patterns identifying source files
    fn file_patterns(&self) -> Vec<String>;

    /// Test framework in use, if one can be read from the manifest
    fn test_framework(&self, root: &Path) -> Option<String>;

    /// Command that runs the whole test suite
    fn test_command(&self, root: &Path) -> Option<String>;

    /// Package name from the project manifest
    fn project_name(&self, root: &Path) -> Option<String>;

    /// Unmet project requirements, one message each
    fn check_requirements(&self, root: &Path) -> Vec<String>;

    /// Config template matching this project, if any
    fn template(&self, _root: &Path) -> Option<&'static str> {
        None
    }
}

/// All known adapters, in detection order
pub fn all() -> Vec<Box<dyn LanguageAdapter>> {
    vec![
        Box::new(JavaScriptAdapter),
        Box::new(PythonAdapter),
        Box::new(RustAdapter),
    ]
}

/// First adapter that recognizes the project
pub fn detect(root: &Path) -> Option<Box<dyn LanguageAdapter>> {
    all().into_iter().find(|adapter| adapter.detect(root))
}

/// Adapter by language name (aliases accepted)
pub fn for_language(language: &str) -> Option<Box<dyn LanguageAdapter>> {
    let adapter: Box<dyn LanguageAdapter> = match language.to_lowercase().as_str() {
        "javascript" | "js" | "typescript" | "ts" | "node" => Box::new(JavaScriptAdapter),
        "python" | "py" => Box::new(PythonAdapter),
        "rust" | "rs" => Box::new(RustAdapter),
        _ => return None,
    };
    Some(adapter)
}

/// Read a manifest, treating any failure as absence
pub(crate) fn read_manifest(root: &Path, name: &str) -> Option<String> {
    std::fs::read_to_string(root.join(name)).ok()
}

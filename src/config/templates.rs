//! Named configuration presets for common project shapes
//!
//! A template is a partial config merged over whatever is already in
//! effect, so it only touches the keys it names. Templates named after a
//! language take their test and source patterns from that language's adapter.

use super::deep_merge;
use crate::adapters;
use serde_json::{json, Value};

/// Template names with a one-line description
pub const TEMPLATES: &[(&str, &str)] = &[
    ("react", "React app: src/ with __tests__/, jsx/tsx sources"),
    ("node", "Node.js service or package: src/ and lib/, tests under test/"),
    ("nextjs", "Next.js app: app/, pages/, components/ and lib/ sources"),
    ("python", "Python package: test_*.py under tests/"),
    ("rust", "Rust crate: integration tests under tests/"),
    ("library", "Published library: stricter bar, docs mirrored under docs/api"),
];

/// Partial config for a template, `None` for unknown names
pub fn template(name: &str) -> Option<Value> {
    let name = name.to_lowercase();
    let mut value = match name.as_str() {
        "react" => json!({
            "project": { "framework": "jest" },
            "patterns": {
                "implementation": ["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"]
            },
            "directories": {
                "source": ["src"],
                "test": ["__tests__", "test", "tests"],
                "source_root": "src",
                "test_root": "__tests__"
            },
            "synchronization": {
                "exempt_patterns": [
                    "**/*.d.ts", "**/types.*", "**/types/**", "**/constants.*",
                    "**/index.*", "**/*.stories.*", "**/setupTests.*", "**/reportWebVitals.*"
                ]
            }
        }),
        "node" => json!({
            "directories": {
                "source": ["src", "lib"],
                "test": ["test", "tests", "__tests__"],
                "source_root": "src",
                "test_root": "test"
            }
        }),
        "nextjs" => json!({
            "patterns": {
                "implementation": ["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"]
            },
            "directories": {
                "source": ["app", "pages", "components", "lib", "src"],
                "test": ["__tests__", "test", "tests"],
                "excluded": ["node_modules", ".next", "out", "coverage", ".git", ".vercel"],
                "source_root": "src",
                "test_root": "__tests__"
            },
            "synchronization": {
                "exempt_patterns": [
                    "**/*.d.ts", "**/types.*", "**/constants.*", "**/index.*",
                    "**/layout.*", "**/page.*", "**/loading.*", "**/not-found.*"
                ]
            }
        }),
        "python" => json!({
            "patterns": {
                "exclude": ["**/*.pyi"]
            },
            "directories": {
                "source": ["src", "app", "lib"],
                "test": ["tests", "test"],
                "source_root": "src",
                "test_root": "tests",
                "dependency_store": ".venv/lib"
            },
            "validation": {
                "critical_files": ["pyproject.toml", "setup.py", "setup.cfg", "requirements.txt"]
            },
            "synchronization": {
                "test_prefix": "test_",
                "test_suffix": "",
                "exempt_patterns": ["**/__init__.py", "**/__main__.py", "**/conftest.py", "**/constants.py"]
            }
        }),
        "rust" => json!({
            "patterns": {
                "exclude": []
            },
            "directories": {
                "source": ["src"],
                "test": ["tests"],
                "source_root": "src",
                "test_root": "tests"
            },
            "validation": {
                "critical_files": ["Cargo.toml", "Cargo.lock", "build.rs"],
                "check_unused_imports": false
            },
            "synchronization": {
                "test_prefix": "",
                "test_suffix": "_test",
                "exempt_patterns": ["**/mod.rs", "**/lib.rs", "**/main.rs", "**/build.rs"]
            }
        }),
        "library" => json!({
            "validation": { "min_trinity_score": 95 },
            "documentation": {
                "required_files": ["README.md", "CHANGELOG.md"],
                "recommended_files": ["CONTRIBUTING.md"]
            },
            "synchronization": { "require_docs": true }
        }),
        _ => return None,
    };
    if let Some(adapter) = adapters::for_language(&name) {
        deep_merge(
            &mut value,
            json!({
                "patterns": {
                    "test": adapter.test_patterns(),
                    "implementation": adapter.file_patterns(),
                }
            }),
        );
    }
    Some(value)
}

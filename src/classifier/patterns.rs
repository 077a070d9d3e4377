//! Glob compilation and well-known file names

use crate::error::{TrinityError, TrinityResult};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Compile patterns into one set. `*` never crosses a `/`; use `**` for that.
pub fn compile_globset(patterns: &[String]) -> TrinityResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| TrinityError::Pattern {
                pattern: pattern.clone(),
                message: e.kind().to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| TrinityError::Pattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

const CONFIG_NAMES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "pnpm-lock.yaml",
    "pnpm-workspace.yaml",
    "yarn.lock",
    "jsconfig.json",
    "Cargo.toml",
    "Cargo.lock",
    "pyproject.toml",
    "setup.cfg",
    "setup.py",
    "tox.ini",
    "pytest.ini",
    "Makefile",
    "Dockerfile",
    "trinity.toml",
    ".trinityrc.json",
    ".gitignore",
    ".editorconfig",
    ".nvmrc",
];

/// Manifests and tool configuration, judged by file name alone
pub fn is_config_file(name: &str) -> bool {
    if CONFIG_NAMES.contains(&name) {
        return true;
    }
    // tsconfig.json, tsconfig.build.json
    if name.starts_with("tsconfig") && name.ends_with(".json") {
        return true;
    }
    if name.starts_with("requirements") && name.ends_with(".txt") {
        return true;
    }
    // .eslintrc, .prettierrc.json, .babelrc.js
    if name.starts_with('.') {
        let stem = name.split('.').nth(1).unwrap_or("");
        if stem.ends_with("rc") {
            return true;
        }
    }
    // jest.config.js, vite.config.ts
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() >= 3 && parts[parts.len() - 2] == "config"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_does_not_cross_directories() {
        let set = compile_globset(&["src/*.ts".to_string()]).unwrap();
        assert!(set.is_match("src/app.ts"));
        assert!(!set.is_match("src/deep/app.ts"));

        let set = compile_globset(&["**/*.test.*".to_string()]).unwrap();
        assert!(set.is_match("foo.test.ts"));
        assert!(set.is_match("a/b/foo.test.ts"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = compile_globset(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, TrinityError::Pattern { ref pattern, .. } if pattern == "src/["));
    }

    #[test]
    fn test_config_names() {
        assert!(is_config_file("package.json"));
        assert!(is_config_file("tsconfig.build.json"));
        assert!(is_config_file(".eslintrc"));
        assert!(is_config_file(".prettierrc.json"));
        assert!(is_config_file("jest.config.js"));
        assert!(is_config_file("requirements-dev.txt"));
        assert!(!is_config_file("index.ts"));
        assert!(!is_config_file("README.md"));
        assert!(!is_config_file(".env"));
    }
}

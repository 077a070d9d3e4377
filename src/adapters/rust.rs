//! Rust adapter (Cargo projects)

use super::{read_manifest, LanguageAdapter};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct RustAdapter;

fn cargo_toml(root: &Path) -> Option<toml::Value> {
    let content = read_manifest(root, "Cargo.toml")?;
    toml::from_str(&content).ok()
}

impl LanguageAdapter for RustAdapter {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn detect(&self, root: &Path) -> bool {
        root.join("Cargo.toml").is_file()
    }

    fn test_patterns(&self) -> Vec<String> {
        vec!["**/tests/**/*.rs".into(), "**/*_test.rs".into()]
    }

    fn file_patterns(&self) -> Vec<String> {
        vec!["**/*.rs".into()]
    }

    fn test_framework(&self, root: &Path) -> Option<String> {
        let manifest = cargo_toml(root)?;
        let dev_deps = manifest.get("dev-dependencies");
        let uses_nextest = root.join(".config/nextest.toml").exists();
        if uses_nextest {
            Some("nextest".to_string())
        } else if dev_deps.and_then(|d| d.get("rstest")).is_some() {
            Some("rstest".to_string())
        } else {
            Some("libtest".to_string())
        }
    }

    fn test_command(&self, root: &Path) -> Option<String> {
        match self.test_framework(root)?.as_str() {
            "nextest" => Some("cargo nextest run".to_string()),
            _ => Some("cargo test".to_string()),
        }
    }

    fn project_name(&self, root: &Path) -> Option<String> {
        cargo_toml(root)?
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string)
    }

    fn check_requirements(&self, root: &Path) -> Vec<String> {
        let mut missing = Vec::new();
        let Some(content) = read_manifest(root, "Cargo.toml") else {
            missing.push("Cargo.toml is missing".to_string());
            return missing;
        };
        match toml::from_str::<toml::Value>(&content) {
            Ok(manifest) => {
                let is_workspace = manifest.get("workspace").is_some();
                let has_target = root.join("src/lib.rs").exists() || root.join("src/main.rs").exists();
                if !is_workspace && !has_target {
                    missing.push("neither src/lib.rs nor src/main.rs exists".to_string());
                }
            }
            Err(e) => missing.push(format!("Cargo.toml is not valid TOML: {}", e.message())),
        }
        missing
    }

    fn template(&self, _root: &Path) -> Option<&'static str> {
        Some("rust")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cargo_project() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"gizmo\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        assert!(RustAdapter.detect(dir.path()));
        assert_eq!(RustAdapter.project_name(dir.path()).as_deref(), Some("gizmo"));
        assert_eq!(RustAdapter.test_command(dir.path()).as_deref(), Some("cargo test"));

        let missing = RustAdapter.check_requirements(dir.path());
        assert_eq!(missing.len(), 1);

        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        assert!(RustAdapter.check_requirements(dir.path()).is_empty());
    }
}

//! Python adapter (pyproject.toml / setup.py / requirements.txt projects)

use super::{read_manifest, LanguageAdapter};
use std::path::Path;

const MANIFESTS: &[&str] = &["pyproject.toml", "setup.py", "setup.cfg", "requirements.txt"];

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

fn pyproject(root: &Path) -> Option<toml::Value> {
    let content = read_manifest(root, "pyproject.toml")?;
    toml::from_str(&content).ok()
}

/// Raw text of every manifest, for cheap dependency sniffing
fn manifest_text(root: &Path) -> String {
    MANIFESTS
        .iter()
        .filter_map(|name| read_manifest(root, name))
        .collect::<Vec<_>>()
        .join("\n")
}

impl LanguageAdapter for PythonAdapter {
    fn name(&self) -> &'static str {
        "python"
    }

    fn detect(&self, root: &Path) -> bool {
        MANIFESTS.iter().any(|name| root.join(name).is_file())
    }

    fn test_patterns(&self) -> Vec<String> {
        vec!["**/test_*.py".into(), "**/*_test.py".into()]
    }

    fn file_patterns(&self) -> Vec<String> {
        vec!["**/*.py".into()]
    }

    fn test_framework(&self, root: &Path) -> Option<String> {
        let text = manifest_text(root);
        if text.contains("pytest") || root.join("pytest.ini").exists() || root.join("conftest.py").exists() {
            Some("pytest".to_string())
        } else if self.detect(root) {
            Some("unittest".to_string())
        } else {
            None
        }
    }

    fn test_command(&self, root: &Path) -> Option<String> {
        match self.test_framework(root)?.as_str() {
            "pytest" => Some("python -m pytest".to_string()),
            _ => Some("python -m unittest discover".to_string()),
        }
    }

    fn project_name(&self, root: &Path) -> Option<String> {
        let manifest = pyproject(root)?;
        manifest
            .get("project")
            .and_then(|p| p.get("name"))
            .or_else(|| {
                manifest
                    .get("tool")
                    .and_then(|t| t.get("poetry"))
                    .and_then(|p| p.get("name"))
            })
            .and_then(|n| n.as_str())
            .map(str::to_string)
    }

    fn check_requirements(&self, root: &Path) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.detect(root) {
            missing.push("no Python manifest (pyproject.toml, setup.py or requirements.txt)".to_string());
            return missing;
        }
        if let Some(content) = read_manifest(root, "pyproject.toml") {
            if let Err(e) = toml::from_str::<toml::Value>(&content) {
                missing.push(format!("pyproject.toml is not valid TOML: {}", e.message()));
            }
        }
        missing
    }

    fn template(&self, _root: &Path) -> Option<&'static str> {
        Some("python")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pyproject_name_and_framework() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"widgets\"\n\n[project.optional-dependencies]\ntest = [\"pytest>=8\"]\n",
        )
        .unwrap();
        assert!(PythonAdapter.detect(dir.path()));
        assert_eq!(PythonAdapter.project_name(dir.path()).as_deref(), Some("widgets"));
        assert_eq!(PythonAdapter.test_framework(dir.path()).as_deref(), Some("pytest"));
        assert_eq!(
            PythonAdapter.test_command(dir.path()).as_deref(),
            Some("python -m pytest")
        );
        assert!(PythonAdapter.check_requirements(dir.path()).is_empty());
    }

    #[test]
    fn test_requirements_only_falls_back_to_unittest() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "requests\n").unwrap();
        assert_eq!(PythonAdapter.test_framework(dir.path()).as_deref(), Some("unittest"));
        assert!(PythonAdapter.project_name(dir.path()).is_none());
    }

    #[test]
    fn test_broken_pyproject_is_a_requirement_miss() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), "[project\n").unwrap();
        let missing = PythonAdapter.check_requirements(dir.path());
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("pyproject.toml"));
    }
}

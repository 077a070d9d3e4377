//! JavaScript / TypeScript adapter (package.json projects)

use super::{read_manifest, LanguageAdapter};
use serde_json::Value;
use std::path::Path;

/// Frameworks in preference order; the first one declared wins
const TEST_FRAMEWORKS: &[&str] = &["vitest", "jest", "mocha", "jasmine", "ava"];

/// What `npm init` writes when no test script exists
const NPM_PLACEHOLDER_TEST: &str = "no test specified";

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScriptAdapter;

fn package_json(root: &Path) -> Option<Value> {
    let content = read_manifest(root, "package.json")?;
    serde_json::from_str(&content).ok()
}

/// Whether `name` is listed in dependencies or devDependencies
fn has_dependency(pkg: &Value, name: &str) -> bool {
    ["dependencies", "devDependencies", "peerDependencies"]
        .iter()
        .any(|section| pkg.get(section).and_then(|deps| deps.get(name)).is_some())
}

fn declared_dependency_count(pkg: &Value) -> usize {
    ["dependencies", "devDependencies"]
        .iter()
        .filter_map(|section| pkg.get(section).and_then(Value::as_object))
        .map(|deps| deps.len())
        .sum()
}

fn test_script(pkg: &Value) -> Option<&str> {
    pkg.get("scripts")
        .and_then(|s| s.get("test"))
        .and_then(Value::as_str)
        .filter(|script| !script.contains(NPM_PLACEHOLDER_TEST))
}

/// Package manager inferred from the lockfile
fn package_manager(root: &Path) -> &'static str {
    if root.join("pnpm-lock.yaml").exists() {
        "pnpm"
    } else if root.join("yarn.lock").exists() {
        "yarn"
    } else if root.join("bun.lockb").exists() {
        "bun"
    } else {
        "npm"
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn detect(&self, root: &Path) -> bool {
        root.join("package.json").is_file()
    }

    fn test_patterns(&self) -> Vec<String> {
        vec!["**/*.test.*".into(), "**/*.spec.*".into()]
    }

    fn file_patterns(&self) -> Vec<String> {
        ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
            .iter()
            .map(|ext| format!("**/*.{}", ext))
            .collect()
    }

    fn test_framework(&self, root: &Path) -> Option<String> {
        let pkg = package_json(root)?;
        if let Some(fw) = TEST_FRAMEWORKS.iter().find(|fw| has_dependency(&pkg, fw)) {
            return Some(fw.to_string());
        }
        // Fall back to whatever the test script invokes
        let script = test_script(&pkg)?;
        TEST_FRAMEWORKS
            .iter()
            .find(|fw| script.split_whitespace().any(|word| word == **fw))
            .map(|fw| fw.to_string())
    }

    fn test_command(&self, root: &Path) -> Option<String> {
        let pkg = package_json(root)?;
        if test_script(&pkg).is_some() {
            return Some(format!("{} test", package_manager(root)));
        }
        match self.test_framework(root).as_deref() {
            Some("vitest") => Some("npx vitest run".to_string()),
            Some(fw) => Some(format!("npx {}", fw)),
            None => None,
        }
    }

    fn project_name(&self, root: &Path) -> Option<String> {
        package_json(root)?
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn check_requirements(&self, root: &Path) -> Vec<String> {
        let mut missing = Vec::new();
        let Some(content) = read_manifest(root, "package.json") else {
            missing.push("package.json is missing".to_string());
            return missing;
        };
        let pkg: Value = match serde_json::from_str(&content) {
            Ok(pkg) => pkg,
            Err(e) => {
                missing.push(format!("package.json is not valid JSON: {}", e));
                return missing;
            }
        };

        if has_dependency(&pkg, "typescript") && !root.join("tsconfig.json").exists() {
            missing.push("typescript is a dependency but tsconfig.json is missing".to_string());
        }
        if declared_dependency_count(&pkg) > 0 && !root.join("node_modules").is_dir() {
            missing.push(format!(
                "dependencies are declared but node_modules is missing (run `{} install`)",
                package_manager(root)
            ));
        }
        if test_script(&pkg).is_none() {
            missing.push("package.json has no test script".to_string());
        }
        missing
    }

    fn template(&self, root: &Path) -> Option<&'static str> {
        let pkg = package_json(root)?;
        if has_dependency(&pkg, "next") {
            Some("nextjs")
        } else if has_dependency(&pkg, "react") {
            Some("react")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project(package_json: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), package_json).unwrap();
        dir
    }

    #[test]
    fn test_framework_from_dependencies() {
        let dir = project(r#"{ "devDependencies": { "vitest": "^1.0.0", "jest": "^29" } }"#);
        assert_eq!(
            JavaScriptAdapter.test_framework(dir.path()).as_deref(),
            Some("vitest")
        );
        assert_eq!(
            JavaScriptAdapter.test_command(dir.path()).as_deref(),
            Some("npx vitest run")
        );
    }

    #[test]
    fn test_framework_from_script() {
        let dir = project(r#"{ "scripts": { "test": "mocha --recursive" } }"#);
        assert_eq!(
            JavaScriptAdapter.test_framework(dir.path()).as_deref(),
            Some("mocha")
        );
    }

    #[test]
    fn test_command_uses_lockfile_manager() {
        let dir = project(r#"{ "scripts": { "test": "jest" } }"#);
        assert_eq!(JavaScriptAdapter.test_command(dir.path()).as_deref(), Some("npm test"));
        std::fs::write(dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(JavaScriptAdapter.test_command(dir.path()).as_deref(), Some("yarn test"));
    }

    #[test]
    fn test_placeholder_script_is_not_a_test_command() {
        let dir = project(
            r#"{ "scripts": { "test": "echo \"Error: no test specified\" && exit 1" } }"#,
        );
        assert!(JavaScriptAdapter.test_command(dir.path()).is_none());
        let missing = JavaScriptAdapter.check_requirements(dir.path());
        assert!(missing.iter().any(|m| m.contains("no test script")));
    }

    #[test]
    fn test_requirements_flag_missing_tsconfig() {
        let dir = project(
            r#"{ "scripts": { "test": "jest" }, "devDependencies": { "typescript": "^5" } }"#,
        );
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        let missing = JavaScriptAdapter.check_requirements(dir.path());
        assert_eq!(missing.len(), 1, "{:?}", missing);
        assert!(missing[0].contains("tsconfig.json"));
    }

    #[test]
    fn test_template_follows_framework() {
        let dir = project(r#"{ "dependencies": { "react": "^18", "next": "^14" } }"#);
        assert_eq!(JavaScriptAdapter.template(dir.path()), Some("nextjs"));
        let dir = project(r#"{ "dependencies": { "react": "^18" } }"#);
        assert_eq!(JavaScriptAdapter.template(dir.path()), Some("react"));
        let dir = project(r#"{ "name": "cli" }"#);
        assert_eq!(JavaScriptAdapter.template(dir.path()), None);
        assert_eq!(JavaScriptAdapter.project_name(dir.path()).as_deref(), Some("cli"));
    }
}

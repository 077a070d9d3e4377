//! Cache path utilities - uses ~/.cache/trinity/<project-hash>/ so nothing is
//! written into the validated project

use std::path::{Path, PathBuf};

/// Overrides the cache base directory (used by tests and CI sandboxes)
pub const CACHE_DIR_ENV: &str = "TRINITY_CACHE_DIR";

/// Get the cache directory for a project.
/// Uses ~/.cache/trinity/<project-hash>/ on Unix, %LOCALAPPDATA%/trinity/<project-hash>/ on Windows.
pub fn get_cache_dir(project_path: &Path) -> PathBuf {
    let project_hash = hash_path(project_path);

    if let Some(base) = std::env::var_os(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(base).join(&project_hash);
    }

    let base = if cfg!(windows) {
        std::env::var("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")))
    } else {
        dirs::cache_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".cache"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    };

    base.join("trinity").join(&project_hash)
}

/// Score history file for a project
pub fn get_history_path(project_path: &Path) -> PathBuf {
    get_cache_dir(project_path).join("score_history.json")
}

/// Hash a path to create a unique but deterministic directory name.
/// Uses the canonical path so `.` and an absolute path agree.
fn hash_path(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let path_str = canonical.to_string_lossy();

    let mut hasher = DefaultHasher::new();
    path_str.hash(&mut hasher);
    let hash = hasher.finish();

    let project_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(20)
        .collect::<String>();

    format!("{}-{:012x}", project_name, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_path_deterministic() {
        let path = Path::new("/tmp/test-project");
        assert_eq!(hash_path(path), hash_path(path));
        assert_ne!(hash_path(path), hash_path(Path::new("/tmp/other-project")));
    }

    #[test]
    fn test_history_path_names_project() {
        let path = Path::new("/home/user/my-project");
        let history = get_history_path(path);
        assert!(history.to_string_lossy().contains("my-project"));
        assert!(history.ends_with("score_history.json"));
    }
}

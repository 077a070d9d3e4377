//! Per-project score history, used for trend deltas between runs

use crate::error::{TrinityError, TrinityResult};
use crate::models::{ValidationMode, TrinityValidationResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Oldest entries are dropped beyond this
pub const MAX_HISTORY_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: String,
    pub mode: ValidationMode,
    pub overall: u32,
    pub test: u32,
    pub implementation: u32,
    pub documentation: u32,
    pub valid: bool,
}

impl HistoryEntry {
    pub fn from_result(result: &TrinityValidationResult) -> Self {
        Self {
            timestamp: result.metadata.timestamp.clone(),
            mode: result.metadata.mode,
            overall: result.overall(),
            test: result.score.test,
            implementation: result.score.implementation,
            documentation: result.score.documentation,
            valid: result.valid,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
}

/// Score history backed by one JSON file
#[derive(Debug, Clone)]
pub struct ScoreHistory {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl ScoreHistory {
    /// Load from `path`; a missing or corrupt file starts an empty history
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HistoryFile>(&content) {
                Ok(file) => file.entries,
                Err(e) => {
                    warn!("Ignoring corrupt score history {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(_) => {
                debug!("No score history at {}", path.display());
                Vec::new()
            }
        };
        Self { path, entries }
    }

    /// History for a project in the user cache directory
    pub fn for_project(project_root: &Path) -> Self {
        Self::load(super::get_history_path(project_root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent overall score recorded for `mode`
    pub fn previous(&self, mode: ValidationMode) -> Option<u32> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.mode == mode)
            .map(|e| e.overall)
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY_ENTRIES {
            let excess = self.entries.len() - MAX_HISTORY_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    pub fn save(&self) -> TrinityResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| TrinityError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = HistoryFile {
            entries: self.entries.clone(),
        };
        let json =
            serde_json::to_string_pretty(&file).map_err(|e| TrinityError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|source| TrinityError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

//! History command - recorded overall scores for a project

use crate::cache::ScoreHistory;
use crate::scoring::grade_for_score;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run(path: &Path, limit: usize, json: bool, clear: bool) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    let history = ScoreHistory::for_project(&root);

    if clear {
        if history.path().exists() {
            std::fs::remove_file(history.path())
                .with_context(|| format!("Failed to remove {}", history.path().display()))?;
        }
        println!("{} Score history cleared", style("✓").green());
        return Ok(());
    }

    let entries = history.entries();
    let shown = &entries[entries.len().saturating_sub(limit)..];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No runs recorded yet. Run `trinity validate` first.");
        return Ok(());
    }

    println!(
        "{}",
        style(format!(
            "{:<26} {:<11} {:>7} {:>5} {:>5} {:>5}  {}",
            "TIMESTAMP", "MODE", "OVERALL", "TEST", "IMPL", "DOCS", "VALID"
        ))
        .dim()
    );
    for entry in shown {
        let valid = if entry.valid {
            style("yes").green()
        } else {
            style("no").red()
        };
        println!(
            "{:<26} {:<11} {:>4} {:<2} {:>5} {:>5} {:>5}  {}",
            entry.timestamp.chars().take(25).collect::<String>(),
            entry.mode.as_str(),
            entry.overall,
            grade_for_score(entry.overall),
            entry.test,
            entry.implementation,
            entry.documentation,
            valid
        );
    }
    Ok(())
}

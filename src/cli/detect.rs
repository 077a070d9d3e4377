//! Detect command - show what the language adapters see

use crate::adapters;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let Some(adapter) = adapters::detect(&root) else {
        println!(
            "{} No supported project manifest found in {}",
            style("✗").red(),
            root.display()
        );
        println!("  Looked for: package.json, pyproject.toml / setup.py, Cargo.toml");
        return Ok(());
    };

    let unknown = || style("unknown").dim().to_string();
    println!("{} {}", style("Language:").bold(), style(adapter.name()).cyan());
    println!(
        "{} {}",
        style("Project:").bold(),
        adapter.project_name(&root).unwrap_or_else(unknown)
    );
    println!(
        "{} {}",
        style("Test framework:").bold(),
        adapter.test_framework(&root).unwrap_or_else(unknown)
    );
    println!(
        "{} {}",
        style("Test command:").bold(),
        adapter.test_command(&root).unwrap_or_else(unknown)
    );
    if let Some(template) = adapter.template(&root) {
        println!("{} {}", style("Template:").bold(), template);
    }

    let missing = adapter.check_requirements(&root);
    if missing.is_empty() {
        println!("{} All project requirements met", style("✓").green());
    } else {
        for requirement in missing {
            println!("{} {}", style("!").yellow(), requirement);
        }
    }
    Ok(())
}

//! Init command - write a trinity.toml for a project

use crate::config::{ConfigManager, TrinityFullConfig, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(path: &Path, template: Option<&str>, force: bool, detect: bool) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    println!("\n{} Initializing Trinity\n", style("▲").bold());

    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        println!(
            "{} Already initialized at {} (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    let mut manager = ConfigManager::from_config(&root, TrinityFullConfig::default());

    if detect {
        match manager.auto_detect_project() {
            Some(language) => {
                let config = manager.get_config();
                println!(
                    "{} Detected {} project{}",
                    style("✓").green(),
                    style(language).cyan(),
                    config
                        .project
                        .framework
                        .as_deref()
                        .map(|f| format!(" using {}", f))
                        .unwrap_or_default()
                );
            }
            None => println!(
                "{} No known project manifest found, using defaults",
                style("•").dim()
            ),
        }
    }

    if let Some(name) = template {
        manager
            .apply_template(name)
            .with_context(|| format!("Could not apply template '{}'", name))?;
        println!("{} Applied {} template", style("✓").green(), style(name).cyan());
    }

    let validation = manager.validate_config();
    if !validation.valid {
        anyhow::bail!("Generated configuration is invalid: {}", validation.errors.join("; "));
    }

    let saved = manager.save().context("Failed to write trinity.toml")?;
    println!("{} Created {}", style("✓").green(), style(saved.display()).cyan());

    println!("\n{}", style("Next steps:").bold());
    println!("  trinity validate .                    Full validation");
    println!("  trinity validate . --mode pre-commit  Use as a git pre-commit hook");
    println!("  trinity config show                   Inspect the effective settings");
    Ok(())
}

//! Config command - show, check and edit trinity.toml

use super::ConfigAction;
use crate::config::{ConfigManager, TEMPLATES};
use anyhow::{Context, Result};
use console::style;
use serde_json::{Map, Value};
use std::path::Path;

pub fn run(path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show(path),
        ConfigAction::Validate => check(path),
        ConfigAction::Set { key, value } => set(path, &key, &value),
        ConfigAction::Templates => {
            for (name, description) in TEMPLATES {
                println!("  {:<10} {}", style(name).cyan(), description);
            }
            Ok(())
        }
    }
}

fn show(path: &Path) -> Result<()> {
    let manager = ConfigManager::load(path);
    match (manager.source(), manager.load_error()) {
        (_, Some(error)) => eprintln!(
            "{} Config could not be loaded, showing defaults: {}",
            style("!").yellow(),
            error
        ),
        (Some(source), None) => eprintln!("# Loaded from {}", source.display()),
        (None, None) => eprintln!("# No trinity.toml found, showing defaults"),
    }
    print!("{}", manager.to_toml()?);
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let manager = ConfigManager::load(path);
    if let Some(error) = manager.load_error() {
        anyhow::bail!("Config could not be loaded: {}", error);
    }
    let validation = manager.validate_config();
    if validation.valid {
        println!("{} Configuration is valid", style("✓").green());
        return Ok(());
    }
    for error in &validation.errors {
        println!("  {} {}", style("✗").red(), error);
    }
    anyhow::bail!("{} configuration problem(s)", validation.errors.len())
}

/// `a.b.c` + value -> `{"a": {"b": {"c": value}}}`
fn nested_value(key: &str, value: Value) -> Result<Value> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        anyhow::bail!("Invalid config key '{}'", key);
    }
    Ok(parts.iter().rev().fold(value, |inner, part| {
        let mut map = Map::new();
        map.insert(part.trim().to_string(), inner);
        Value::Object(map)
    }))
}

/// JSON literals (numbers, booleans, arrays) when they parse, else a string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set(path: &Path, key: &str, raw: &str) -> Result<()> {
    let mut manager = ConfigManager::load(path);
    if let Some(error) = manager.load_error() {
        anyhow::bail!("Refusing to overwrite a config that could not be loaded: {}", error);
    }

    let partial = nested_value(key, parse_value(raw))?;
    manager
        .update_config(partial)
        .with_context(|| format!("Cannot set {} = {}", key, raw))?;

    let validation = manager.validate_config();
    if !validation.valid {
        anyhow::bail!("Resulting config is invalid: {}", validation.errors.join("; "));
    }

    let saved = manager.save()?;
    println!(
        "{} Set {} = {} in {}",
        style("✓").green(),
        style(key).cyan(),
        raw,
        saved.display()
    );
    Ok(())
}

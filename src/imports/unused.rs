//! "Possibly unused" import heuristic
//!
//! A binding counts as used when its name appears as a whole word anywhere
//! in the file once the import statement itself is blanked out. Comments
//! and strings count as uses, so this under-reports; results are advisory.

use super::{extract_import_refs, ImportKind};
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedImport {
    pub name: String,
    pub specifier: String,
    pub line: usize,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Local names introduced by a binding clause such as
/// `React, { useState as state, type Props }` or `* as ns`
pub fn binding_names(clause: &str) -> Vec<String> {
    let clause = clause.trim();
    let clause = clause.strip_prefix("type ").unwrap_or(clause).trim();
    let mut names = Vec::new();

    let (outside, inside) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{} {}", &clause[..open], &clause[close + 1..]),
            Some(&clause[open + 1..close]),
        ),
        _ => (clause.to_string(), None),
    };

    for part in outside.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let name = match part.strip_prefix('*') {
            Some(rest) => rest.trim().strip_prefix("as").map(str::trim).unwrap_or(""),
            None => part,
        };
        if is_identifier(name) {
            names.push(name.to_string());
        }
    }

    if let Some(inside) = inside {
        for entry in inside.split(',') {
            let entry = entry.trim();
            let entry = entry.strip_prefix("type ").unwrap_or(entry).trim();
            let local = match entry.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => entry,
            };
            if is_identifier(local) {
                names.push(local.to_string());
            }
        }
    }
    names
}

/// Named, default and namespace bindings never referenced outside their
/// own import statement
pub fn find_unused_imports(content: &str) -> Vec<UnusedImport> {
    let refs = extract_import_refs(content);
    let mut unused = Vec::new();

    for import in refs.iter().filter(|r| r.kind == ImportKind::Named) {
        let Some(clause) = &import.bindings else {
            continue;
        };
        let (start, end) = import.span;
        let mut rest = String::with_capacity(content.len());
        rest.push_str(&content[..start]);
        rest.push_str(&content[end..]);

        for name in binding_names(clause) {
            // `\b` never matches beside `$`, so identifier edges are spelled out
            let pattern = format!(r"(?:^|[^\w$]){}(?:[^\w$]|$)", regex::escape(&name));
            let Ok(word) = Regex::new(&pattern) else {
                continue;
            };
            if !word.is_match(&rest) {
                unused.push(UnusedImport {
                    name,
                    specifier: import.specifier.clone(),
                    line: import.line,
                });
            }
        }
    }
    unused
}

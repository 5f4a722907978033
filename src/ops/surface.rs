//! Cross-artifact consistency checks.
//!
//! Two static checks per package: the command surface diff between the
//! declared commands and the mobile implementation, and a coarse check
//! of the generated TypeScript bindings. Both work on raw text with
//! anchored patterns, never on a parsed AST, and both treat a missing
//! artifact as "nothing to report".

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Which function visibilities count as part of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// `pub fn` only.
    Public,
    /// `pub fn` or `pub(crate) fn`. Declared commands may use crate
    /// visibility because the plugin re-exports them through its
    /// command handler.
    PublicOrCrate,
}

fn declared_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*pub(?:\(crate\))?\s+(?:async\s+)?fn\s+([A-Za-z0-9_]+)")
            .expect("hard-coded pattern")
    })
}

fn public_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*pub\s+(?:async\s+)?fn\s+([A-Za-z0-9_]+)")
            .expect("hard-coded pattern")
    })
}

fn ts_export_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^export\s+(?:async\s+)?function\b").expect("hard-coded pattern")
    })
}

fn pattern_for(visibility: Visibility) -> &'static Regex {
    match visibility {
        Visibility::Public => public_re(),
        Visibility::PublicOrCrate => declared_re(),
    }
}

/// Extract exported function names from a Rust source artifact.
///
/// Missing or unreadable files yield the empty set.
pub fn exported_functions(path: &Path, visibility: Visibility) -> BTreeSet<String> {
    let Ok(content) = fs::read_to_string(path) else {
        return BTreeSet::new();
    };
    pattern_for(visibility)
        .captures_iter(&content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Count exported function declarations, duplicates included.
fn exported_function_count(path: &Path, visibility: Visibility) -> usize {
    let Ok(content) = fs::read_to_string(path) else {
        return 0;
    };
    pattern_for(visibility).find_iter(&content).count()
}

/// Commands declared in `commands_path` with no counterpart in
/// `mobile_path`, sorted.
pub fn missing_implementations(commands_path: &Path, mobile_path: &Path) -> Vec<String> {
    let declared = exported_functions(commands_path, Visibility::PublicOrCrate);
    let implemented = exported_functions(mobile_path, Visibility::Public);
    declared.difference(&implemented).cloned().collect()
}

/// Check the generated TypeScript bindings against the declared
/// command surface.
///
/// The export comparison is count-only: a renamed export that keeps
/// the total stable is not detected. Name-level matching across the
/// language boundary would need to undo the casing convention change
/// and is deliberately out of scope.
pub fn binding_issues(bindings_path: &Path, commands_path: &Path) -> Vec<String> {
    let Ok(content) = fs::read_to_string(bindings_path) else {
        return Vec::new();
    };

    let mut issues = Vec::new();

    let has_invoke_import = content.contains("import")
        && content.contains("invoke")
        && content.contains("@tauri-apps/api");
    if !has_invoke_import {
        issues.push("missing `invoke` import from @tauri-apps/api/core".to_string());
    }

    let ts_count = ts_export_re().find_iter(&content).count();
    let command_count = exported_function_count(commands_path, Visibility::PublicOrCrate);
    if ts_count != command_count {
        issues.push(format!(
            "function count mismatch: {ts_count} TS exports vs {command_count} Rust commands"
        ));
    }

    issues
}

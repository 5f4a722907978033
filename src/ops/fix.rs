//! Manifest reconciliation across the plugin workspace.
//!
//! For each discovered package, the sources are scanned for dependency
//! usage evidence and the manifest is brought in line: either patched
//! additively (repair corrupted lines, append missing declarations) or
//! regenerated wholesale from the canonical template. A failure on one
//! package is recorded in its outcome and never aborts the run.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::evidence::{scan_usage, UsageReport};
use crate::core::manifest::ManifestFile;
use crate::core::package::{discover_packages, Package};
use crate::core::template::render_manifest;
use crate::util::fs;

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Directory containing the plugin packages.
    pub root: PathBuf,

    /// Package directory name prefix.
    pub prefix: String,

    /// Rewrite each manifest from the template instead of patching.
    pub regenerate: bool,

    /// Compute and report changes without writing anything.
    pub dry_run: bool,
}

/// What happened to one package's manifest.
#[derive(Debug)]
pub enum FixAction {
    /// Manifest rewritten from the template.
    Regenerated,

    /// Declarations appended (and corrupted lines repaired).
    Patched { added: Vec<String>, repaired: bool },

    /// Manifest already consistent with the evidence.
    Unchanged,

    /// Package could not be processed; reason recorded.
    Skipped(String),
}

#[derive(Debug)]
pub struct FixOutcome {
    pub package: String,
    pub action: FixAction,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        matches!(
            self.action,
            FixAction::Regenerated | FixAction::Patched { .. }
        )
    }
}

#[derive(Debug, Default)]
pub struct FixSummary {
    pub outcomes: Vec<FixOutcome>,
}

impl FixSummary {
    pub fn changed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.changed()).count()
    }
}

/// Reconcile every package manifest under the configured root.
pub fn fix(options: &FixOptions) -> Result<FixSummary> {
    let packages = discover_packages(&options.root, &options.prefix)?;
    tracing::info!("reconciling {} package manifest(s)", packages.len());

    let mut summary = FixSummary::default();
    for package in &packages {
        let action = fix_package(package, options);
        summary.outcomes.push(FixOutcome {
            package: package.name().to_string(),
            action,
        });
    }

    Ok(summary)
}

fn fix_package(package: &Package, options: &FixOptions) -> FixAction {
    let manifest_path = package.manifest_path();
    if !manifest_path.exists() {
        return FixAction::Skipped("no Cargo.toml".to_string());
    }

    let usage = scan_usage(&package.src_dir());

    if options.regenerate {
        regenerate_manifest(package, options, &usage)
    } else {
        patch_manifest(package, options, &usage)
    }
}

fn regenerate_manifest(package: &Package, options: &FixOptions, usage: &UsageReport) -> FixAction {
    let rendered = match render_manifest(package.name(), &options.prefix, usage) {
        Ok(rendered) => rendered,
        Err(e) => return FixAction::Skipped(format!("{e:#}")),
    };

    let manifest_path = package.manifest_path();
    match fs::read_to_string(&manifest_path) {
        Ok(existing) if existing == rendered => return FixAction::Unchanged,
        Ok(_) => {}
        Err(e) => return FixAction::Skipped(format!("{e:#}")),
    }

    if !options.dry_run {
        if let Err(e) = fs::write_string(&manifest_path, &rendered) {
            return FixAction::Skipped(format!("{e:#}"));
        }
    }
    FixAction::Regenerated
}

fn patch_manifest(package: &Package, options: &FixOptions, usage: &UsageReport) -> FixAction {
    let mut manifest = match ManifestFile::load(&package.manifest_path()) {
        Ok(manifest) => manifest,
        Err(e) => return FixAction::Skipped(format!("{e:#}")),
    };

    let wanted: Vec<(&str, &str)> = usage
        .used_probes()
        .iter()
        .map(|probe| (probe.name, probe.spec))
        .collect();

    let added = match manifest.add_missing_dependencies(&wanted) {
        Ok(added) => added,
        Err(e) => return FixAction::Skipped(format!("{e:#}")),
    };

    if !manifest.is_dirty() {
        return FixAction::Unchanged;
    }

    if !options.dry_run {
        if let Err(e) = manifest.save_if_changed() {
            return FixAction::Skipped(format!("{e:#}"));
        }
    }

    FixAction::Patched {
        added,
        repaired: manifest.was_repaired(),
    }
}

//! Workspace audit: manifests, command surfaces, bindings, compiles.
//!
//! The audit is read-only. Every per-package finding - including probe
//! failures and unparseable manifests - lands in that package's
//! `AnalysisResult`; the run itself only fails when discovery does.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::evidence::{scan_usage, DEPENDENCY_PROBES};
use crate::core::manifest::ManifestFile;
use crate::core::package::{discover_packages, Package};
use crate::ops::probe::BuildProbe;
use crate::ops::surface::{binding_issues, missing_implementations};

/// Options for an audit run.
#[derive(Debug)]
pub struct AnalyzeOptions {
    /// Directory containing the plugin packages.
    pub root: PathBuf,

    /// Package directory name prefix.
    pub prefix: String,

    /// Compile probe, or `None` to skip probing.
    pub probe: Option<BuildProbe>,
}

/// Per-package audit findings.
#[derive(Debug, Default)]
pub struct AnalysisResult {
    pub package: String,

    /// Dependencies the sources use but the manifest does not declare.
    pub missing_deps: Vec<String>,

    /// Commands declared but absent from the mobile implementation.
    pub missing_impls: Vec<String>,

    /// TypeScript binding problems.
    pub binding_issues: Vec<String>,

    /// Manifest problems other than missing declarations.
    pub manifest_issues: Vec<String>,

    /// Probe verdict; `None` when probing was skipped.
    pub compiles: Option<bool>,

    /// Probe diagnostics when the probe failed.
    pub probe_diagnostics: String,
}

impl AnalysisResult {
    pub fn has_issues(&self) -> bool {
        !self.missing_deps.is_empty()
            || !self.missing_impls.is_empty()
            || !self.binding_issues.is_empty()
            || !self.manifest_issues.is_empty()
            || self.compiles == Some(false)
    }

    pub fn issue_count(&self) -> usize {
        self.missing_deps.len()
            + self.missing_impls.len()
            + self.binding_issues.len()
            + self.manifest_issues.len()
            + usize::from(self.compiles == Some(false))
    }
}

/// Audit every package under the configured root.
pub fn analyze(options: &AnalyzeOptions) -> Result<Vec<AnalysisResult>> {
    let packages = discover_packages(&options.root, &options.prefix)?;
    tracing::info!("analyzing {} package(s)", packages.len());

    Ok(packages
        .iter()
        .map(|package| analyze_package(package, options))
        .collect())
}

fn analyze_package(package: &Package, options: &AnalyzeOptions) -> AnalysisResult {
    tracing::debug!("analyzing {}", package.name());

    let mut result = AnalysisResult {
        package: package.name().to_string(),
        ..AnalysisResult::default()
    };

    check_dependencies(package, &mut result);
    result.missing_impls = missing_implementations(&package.commands_path(), &package.mobile_path());
    result.binding_issues = binding_issues(&package.bindings_path(), &package.commands_path());

    if let Some(probe) = &options.probe {
        let outcome = probe.run(package.root());
        if !outcome.success {
            result.probe_diagnostics = outcome.diagnostics;
        }
        result.compiles = Some(outcome.success);
    }

    result
}

/// Compare usage evidence against the manifest's declarations.
///
/// A missing manifest means there is nothing to check. An unparseable
/// manifest is reported and the check degrades to a raw substring
/// match, the best that can be done without structure.
fn check_dependencies(package: &Package, result: &mut AnalysisResult) {
    let manifest_path = package.manifest_path();
    if !manifest_path.exists() {
        return;
    }

    let usage = scan_usage(&package.src_dir());

    match ManifestFile::load(&manifest_path) {
        Ok(manifest) => {
            for probe in DEPENDENCY_PROBES {
                if usage.is_used(probe.name) && !manifest.has_dependency(probe.name) {
                    result.missing_deps.push(probe.name.to_string());
                }
            }
        }
        Err(e) => {
            result
                .manifest_issues
                .push(format!("manifest could not be parsed: {e:#}"));
            if let Ok(raw) = std::fs::read_to_string(&manifest_path) {
                for probe in DEPENDENCY_PROBES {
                    if usage.is_used(probe.name) && !raw.contains(probe.name) {
                        result.missing_deps.push(probe.name.to_string());
                    }
                }
            }
        }
    }
}

/// Render the human-readable audit report.
pub fn format_report(results: &[AnalysisResult]) -> String {
    let mut output = String::new();

    writeln!(output, "Plugin Audit Report").unwrap();
    writeln!(output, "===================").unwrap();
    writeln!(output).unwrap();

    let mut total_issues = 0;
    for result in results.iter().filter(|r| r.has_issues()) {
        total_issues += result.issue_count();
        writeln!(output, "## {}", result.package).unwrap();
        for dep in &result.missing_deps {
            writeln!(output, "  - missing dependency: {dep}").unwrap();
        }
        for name in &result.missing_impls {
            writeln!(output, "  - missing mobile implementation: {name}").unwrap();
        }
        for issue in &result.binding_issues {
            writeln!(output, "  - bindings: {issue}").unwrap();
        }
        for issue in &result.manifest_issues {
            writeln!(output, "  - manifest: {issue}").unwrap();
        }
        if result.compiles == Some(false) {
            writeln!(output, "  - compilation failed").unwrap();
            for line in result.probe_diagnostics.lines().take(5) {
                writeln!(output, "      {line}").unwrap();
            }
        }
        writeln!(output).unwrap();
    }

    writeln!(output, "No issues:").unwrap();
    let clean: Vec<_> = results.iter().filter(|r| !r.has_issues()).collect();
    if clean.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for result in &clean {
        writeln!(output, "  - {}", result.package).unwrap();
    }
    writeln!(output).unwrap();

    let with_issues = results.len() - clean.len();
    writeln!(
        output,
        "Total: {}/{} packages with issues ({} issue(s))",
        with_issues,
        results.len(),
        total_issues
    )
    .unwrap();

    output
}

//! Evidence-based dependency usage detection.
//!
//! A plugin's `Cargo.toml` should declare a dependency exactly when its
//! sources actually use it. "Use" is detected textually: each known
//! dependency carries a set of evidence tokens (plus the `name::`
//! qualified-path form), and a token appearing anywhere in the raw text
//! of a source file counts as evidence. This is a heuristic by design:
//! a token inside a comment is a false positive, and macro-generated
//! usage is a false negative. Stricter, syntax-aware detection can
//! replace `DependencyProbe::is_used` without changing callers.

use std::fs;
use std::path::Path;

/// A usage predicate for one known external dependency.
#[derive(Debug)]
pub struct DependencyProbe {
    /// Dependency name as declared in `[dependencies]`.
    pub name: &'static str,

    /// Declaration value to insert when the dependency is missing.
    pub spec: &'static str,

    /// Literal substrings whose presence counts as usage.
    tokens: &'static [&'static str],

    /// Substrings that veto a match (local shims for the real type).
    counter_tokens: &'static [&'static str],
}

/// Known dependencies, in the fixed order they are rendered into
/// generated manifests.
pub const DEPENDENCY_PROBES: &[DependencyProbe] = &[
    DependencyProbe {
        name: "serde_json",
        spec: r#""1.0""#,
        tokens: &["json!"],
        counter_tokens: &[],
    },
    DependencyProbe {
        name: "chrono",
        spec: r#"{ version = "0.4", features = ["serde"] }"#,
        tokens: &["DateTime<Utc>"],
        counter_tokens: &[],
    },
    DependencyProbe {
        name: "uuid",
        spec: r#""1""#,
        tokens: &["Uuid"],
        counter_tokens: &["type Uuid = String"],
    },
];

impl DependencyProbe {
    /// Check whether `source` shows evidence that this dependency is used.
    pub fn is_used(&self, source: &str) -> bool {
        if self.counter_tokens.iter().any(|t| source.contains(t)) {
            return false;
        }
        let qualified = format!("{}::", self.name);
        self.tokens.iter().any(|t| source.contains(t)) || source.contains(&qualified)
    }
}

/// Which known dependencies a package's sources appear to use.
#[derive(Debug, Default)]
pub struct UsageReport {
    used: Vec<&'static DependencyProbe>,
}

impl UsageReport {
    /// Whether the named dependency showed usage evidence.
    pub fn is_used(&self, name: &str) -> bool {
        self.used.iter().any(|p| p.name == name)
    }

    /// Probes that showed usage evidence, in catalog order.
    pub fn used_probes(&self) -> &[&'static DependencyProbe] {
        &self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

/// Scan a package's source directory for dependency usage evidence.
///
/// Only `*.rs` files directly under `src_dir` are read; nested modules
/// in subdirectories are not scanned. A missing directory yields an
/// empty report rather than an error.
pub fn scan_usage(src_dir: &Path) -> UsageReport {
    let Ok(entries) = fs::read_dir(src_dir) else {
        return UsageReport::default();
    };

    let mut combined = String::new();
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "rs") && p.is_file())
        .collect();
    paths.sort();

    for path in paths {
        match fs::read_to_string(&path) {
            Ok(text) => combined.push_str(&text),
            Err(e) => tracing::warn!("skipping unreadable source {}: {}", path.display(), e),
        }
    }

    let used = DEPENDENCY_PROBES
        .iter()
        .filter(|probe| probe.is_used(&combined))
        .collect();

    UsageReport { used }
}

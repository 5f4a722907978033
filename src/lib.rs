//! Maintenance and audit tool for Tauri mobile plugin workspaces.
//!
//! A workspace holds many small plugin crates with the same shape: a
//! Cargo manifest, a `src/commands.rs` command surface, a
//! `src/mobile.rs` platform implementation, generated TypeScript
//! bindings under `guest-js/`, and Swift sources for the iOS side.
//! Keeping dozens of them consistent by hand does not scale, so this
//! crate automates the recurring chores:
//!
//! - auditing every plugin for missing dependency declarations,
//!   unimplemented commands, stale bindings, and compile failures
//!   ([`ops::analyze`])
//! - reconciling manifests against usage evidence in the sources,
//!   either additively or by regenerating from the canonical template
//!   ([`ops::fix`])
//! - annotating CoreMotion callback closures in Swift sources that
//!   the compiler cannot type-infer ([`ops::swift_fix`])

pub mod core;
pub mod ops;
pub mod util;

pub use crate::core::evidence::{scan_usage, UsageReport, DEPENDENCY_PROBES};
pub use crate::core::manifest::ManifestFile;
pub use crate::core::package::{discover_packages, DiscoverError, Package};
pub use crate::ops::analyze::{analyze, format_report, AnalysisResult, AnalyzeOptions};
pub use crate::ops::fix::{fix, FixOptions, FixSummary};
pub use crate::ops::probe::BuildProbe;
pub use crate::ops::swift_fix::patch_swift_sources;

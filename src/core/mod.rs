//! Core domain types: packages, manifests, and usage evidence.

pub mod evidence;
pub mod manifest;
pub mod package;
pub mod repair;
pub mod template;

pub use evidence::{scan_usage, DependencyProbe, UsageReport, DEPENDENCY_PROBES};
pub use manifest::ManifestFile;
pub use package::{discover_packages, DiscoverError, Package};
pub use repair::repair_manifest_text;
pub use template::render_manifest;

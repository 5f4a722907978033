//! Maintenance operations over a plugin workspace.

pub mod analyze;
pub mod fix;
pub mod probe;
pub mod surface;
pub mod swift_fix;

pub use analyze::{analyze, format_report, AnalysisResult, AnalyzeOptions};
pub use fix::{fix, FixAction, FixOptions, FixOutcome, FixSummary};
pub use probe::{BuildProbe, ProbeOutcome, DEFAULT_PROBE_TIMEOUT};
pub use surface::{binding_issues, exported_functions, missing_implementations, Visibility};
pub use swift_fix::{apply_rewrites, patch_swift_sources, FileRewrite, COREMOTION_REWRITES};

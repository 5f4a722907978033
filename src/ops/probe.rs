//! Compile probing via the external build tool.
//!
//! A probe is a non-mutating `cargo check` in a package directory with
//! a hard timeout. Every failure mode - non-zero exit, timeout, the
//! tool being absent, spawn errors - is folded into the outcome; a
//! probe never aborts the surrounding run.

use std::path::Path;
use std::time::Duration;

use crate::util::process::{find_executable, ProcessBuilder};

/// Default bound on how long a single package check may take.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the compile probe.
#[derive(Debug, Clone)]
pub struct BuildProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for BuildProbe {
    fn default() -> Self {
        BuildProbe {
            program: "cargo".to_string(),
            args: vec!["check".to_string(), "--quiet".to_string()],
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Result of probing one package.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub success: bool,

    /// Captured standard error, or a synthetic message for timeouts
    /// and invocation failures.
    pub diagnostics: String,
}

impl BuildProbe {
    /// Probe with a custom command line, mainly for tests.
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        BuildProbe {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the check in `package_dir` and report the outcome.
    pub fn run(&self, package_dir: &Path) -> ProbeOutcome {
        if find_executable(&self.program).is_none() {
            return ProbeOutcome {
                success: false,
                diagnostics: format!("`{}` not found in PATH", self.program),
            };
        }

        let builder = ProcessBuilder::new(&self.program)
            .args(&self.args)
            .cwd(package_dir);

        tracing::debug!("probing {} with `{}`", package_dir.display(), builder.display_command());

        match builder.exec_timeout(self.timeout) {
            Ok(result) if result.timed_out => ProbeOutcome {
                success: false,
                diagnostics: format!(
                    "`{}` timed out after {}s",
                    builder.display_command(),
                    self.timeout.as_secs()
                ),
            },
            Ok(result) => ProbeOutcome {
                success: result.success(),
                diagnostics: result.stderr_text(),
            },
            Err(e) => ProbeOutcome {
                success: false,
                diagnostics: format!("{e:#}"),
            },
        }
    }
}

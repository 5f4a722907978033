//! Type-annotation rewrites for CoreMotion callback closures.
//!
//! Swift cannot always infer the parameter types of the trailing
//! closures passed to CoreMotion's update APIs, which surfaces as
//! "type of expression is ambiguous" build errors. Each rewrite rule
//! pairs the recognizable untyped-closure shape of one API with a
//! template that inserts the explicit parameter types. An annotated
//! closure no longer matches the shape, so applying the table again is
//! a no-op.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

/// One guarded textual rewrite.
#[derive(Debug)]
pub struct RewriteRule {
    /// API this rule annotates, for reporting.
    pub description: &'static str,
    pattern: &'static str,
    template: &'static str,
}

/// Rewrite table for the CoreMotion callback APIs.
pub const COREMOTION_REWRITES: &[RewriteRule] = &[
    RewriteRule {
        description: "startAccelerometerUpdates",
        pattern: r"(motionManager\.startAccelerometerUpdates\(to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (data: CMAccelerometerData?, error: Error?) ${5}",
    },
    RewriteRule {
        description: "startGyroUpdates",
        pattern: r"(motionManager\.startGyroUpdates\(to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (data: CMGyroData?, error: Error?) ${5}",
    },
    RewriteRule {
        description: "startMagnetometerUpdates",
        pattern: r"(motionManager\.startMagnetometerUpdates\(to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (data: CMMagnetometerData?, error: Error?) ${5}",
    },
    RewriteRule {
        description: "startDeviceMotionUpdates",
        pattern: r"(motionManager\.startDeviceMotionUpdates\(to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (data: CMDeviceMotion?, error: Error?) ${5}",
    },
    // Activity updates deliver a single optional parameter.
    RewriteRule {
        description: "startActivityUpdates",
        pattern: r"(activityManager\.startActivityUpdates\(to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+)\s*(in)",
        template: "${1}${2} (activity: CMMotionActivity?) ${4}",
    },
    RewriteRule {
        description: "startUpdates (pedometer)",
        pattern: r"(pedometer\.startUpdates\(from:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (data: CMPedometerData?, error: Error?) ${5}",
    },
    RewriteRule {
        description: "startRelativeAltitudeUpdates",
        pattern: r"(altimeter\.startRelativeAltitudeUpdates\(to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (data: CMAltitudeData?, error: Error?) ${5}",
    },
    RewriteRule {
        description: "queryActivityStarting",
        pattern: r"(activityManager\.queryActivityStarting\(from:.*?to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (activities: [CMMotionActivity]?, error: Error?) ${5}",
    },
    RewriteRule {
        description: "queryPedometerData",
        pattern: r"(pedometer\.queryPedometerData\(from:.*?to:\s*[^)]+\)\s*\{)(\s*\[[^\]]*\])?\s*(\w+),\s*(\w+)\s*(in)",
        template: "${1}${2} (data: CMPedometerData?, error: Error?) ${5}",
    },
];

/// Cap on rewrite passes; rules converge in one pass in practice.
const MAX_PASSES: usize = 10;

/// A Swift file the patcher changed.
#[derive(Debug)]
pub struct FileRewrite {
    pub path: PathBuf,
    /// Number of closure sites annotated.
    pub changes: usize,
}

/// Apply the rewrite table to `content` until a full pass changes
/// nothing. Returns the rewritten text and the total site count.
pub fn apply_rewrites(rules: &[RewriteRule], content: &str) -> Result<(String, usize)> {
    let compiled: Vec<(Regex, &RewriteRule)> = rules
        .iter()
        .map(|rule| {
            Regex::new(rule.pattern)
                .with_context(|| format!("invalid rewrite pattern for {}", rule.description))
                .map(|re| (re, rule))
        })
        .collect::<Result<_>>()?;

    let mut text = content.to_string();
    let mut total = 0;

    for _ in 0..MAX_PASSES {
        let mut changed = false;
        for (re, rule) in &compiled {
            let matches = re.find_iter(&text).count();
            if matches == 0 {
                continue;
            }
            let rewritten = re.replace_all(&text, rule.template).into_owned();
            if rewritten != text {
                tracing::debug!("annotated {} site(s) of {}", matches, rule.description);
                text = rewritten;
                total += matches;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    Ok((text, total))
}

/// Whether a path sits inside a build or package-manager directory
/// that should never be rewritten.
fn is_generated_path(path: &Path) -> bool {
    path.components().any(|c| {
        matches!(
            c.as_os_str().to_string_lossy().as_ref(),
            "build" | ".build" | "DerivedData" | ".swiftpm"
        )
    })
}

/// Whether the file plausibly uses CoreMotion at all.
fn mentions_coremotion(content: &str) -> bool {
    content.contains("CoreMotion") || content.contains("CMMotion") || content.contains("CMAltimeter")
}

/// Patch every CoreMotion-using Swift file under `root` in place.
///
/// Returns one entry per file that was actually changed.
pub fn patch_swift_sources(root: &Path) -> Result<Vec<FileRewrite>> {
    let mut rewrites = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file()
            || path.extension().is_none_or(|ext| ext != "swift")
            || is_generated_path(path)
        {
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };
        if !mentions_coremotion(&content) {
            continue;
        }

        let (rewritten, changes) = apply_rewrites(COREMOTION_REWRITES, &content)?;
        if changes > 0 && rewritten != content {
            fs::write(path, &rewritten)
                .with_context(|| format!("failed to write {}", path.display()))?;
            rewrites.push(FileRewrite {
                path: path.to_path_buf(),
                changes,
            });
        }
    }

    Ok(rewrites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNTYPED: &str = r#"import CoreMotion

class MotionService {
    func start() {
        motionManager.startAccelerometerUpdates(to: queue) { [weak self] data, error in
            guard let self else { return }
            self.handle(data, error)
        }
    }
}
"#;

    #[test]
    fn test_annotates_accelerometer_closure() {
        let (rewritten, changes) = apply_rewrites(COREMOTION_REWRITES, UNTYPED).unwrap();

        assert_eq!(changes, 1);
        assert!(rewritten.contains(
            "startAccelerometerUpdates(to: queue) { [weak self] (data: CMAccelerometerData?, error: Error?) in"
        ));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let (first, _) = apply_rewrites(COREMOTION_REWRITES, UNTYPED).unwrap();
        let (second, changes) = apply_rewrites(COREMOTION_REWRITES, &first).unwrap();

        assert_eq!(changes, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_parameter_activity_closure() {
        let source = "activityManager.startActivityUpdates(to: .main) { activity in\n    record(activity)\n}\n";
        let (rewritten, changes) = apply_rewrites(COREMOTION_REWRITES, source).unwrap();

        assert_eq!(changes, 1);
        assert!(rewritten
            .contains("startActivityUpdates(to: .main) { (activity: CMMotionActivity?) in"));
    }

    #[test]
    fn test_query_closure_with_range_arguments() {
        let source =
            "pedometer.queryPedometerData(from: start, to: end) { data, error in\n    done(data)\n}\n";
        let (rewritten, changes) = apply_rewrites(COREMOTION_REWRITES, source).unwrap();

        assert_eq!(changes, 1);
        assert!(rewritten.contains("(data: CMPedometerData?, error: Error?) in"));
    }

    #[test]
    fn test_untouched_without_closure_shape() {
        let source = "let manager = CMMotionManager()\nmotionManager.stopAccelerometerUpdates()\n";
        let (rewritten, changes) = apply_rewrites(COREMOTION_REWRITES, source).unwrap();

        assert_eq!(changes, 0);
        assert_eq!(rewritten, source);
    }

    #[test]
    fn test_patches_tree_and_skips_build_dirs() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("ios/Sources");
        let build = tmp.path().join("ios/.build");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(src.join("Motion.swift"), UNTYPED).unwrap();
        std::fs::write(build.join("Generated.swift"), UNTYPED).unwrap();
        std::fs::write(src.join("Other.swift"), "import UIKit\n").unwrap();

        let rewrites = patch_swift_sources(tmp.path()).unwrap();

        assert_eq!(rewrites.len(), 1);
        assert!(rewrites[0].path.ends_with("Motion.swift"));
        assert_eq!(rewrites[0].changes, 1);

        let patched = std::fs::read_to_string(src.join("Motion.swift")).unwrap();
        assert!(patched.contains("CMAccelerometerData?"));
        let untouched = std::fs::read_to_string(build.join("Generated.swift")).unwrap();
        assert_eq!(untouched, UNTYPED);

        // second run finds nothing left to do
        let again = patch_swift_sources(tmp.path()).unwrap();
        assert!(again.is_empty());
    }
}

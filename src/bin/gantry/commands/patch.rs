//! `gantry patch` command

use anyhow::Result;

use crate::cli::PatchArgs;
use gantry::ops::patch_swift_sources;

pub fn execute(args: PatchArgs) -> Result<()> {
    let rewrites = patch_swift_sources(&args.root)?;

    for rewrite in &rewrites {
        println!(
            "{}: annotated {} closure site(s)",
            rewrite.path.display(),
            rewrite.changes
        );
    }

    let total: usize = rewrites.iter().map(|r| r.changes).sum();
    println!(
        "\n{} file(s) patched, {} closure site(s) annotated",
        rewrites.len(),
        total
    );

    Ok(())
}

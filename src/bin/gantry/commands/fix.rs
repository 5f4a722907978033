//! `gantry fix` command

use anyhow::Result;

use crate::cli::FixArgs;
use gantry::ops::{fix, FixAction, FixOptions};

pub fn execute(args: FixArgs) -> Result<()> {
    let options = FixOptions {
        root: args.root,
        prefix: args.prefix,
        regenerate: args.regenerate,
        dry_run: args.dry_run,
    };

    let summary = fix(&options)?;

    for outcome in &summary.outcomes {
        match &outcome.action {
            FixAction::Regenerated => {
                println!("{}: regenerated manifest", outcome.package);
            }
            FixAction::Patched { added, repaired } => {
                if *repaired {
                    println!("{}: repaired corrupted manifest lines", outcome.package);
                }
                for dep in added {
                    println!("{}: added dependency {}", outcome.package, dep);
                }
                if !repaired && added.is_empty() {
                    println!("{}: reformatted manifest", outcome.package);
                }
            }
            FixAction::Unchanged => {
                println!("{}: up to date", outcome.package);
            }
            FixAction::Skipped(reason) => {
                println!("{}: skipped ({})", outcome.package, reason);
            }
        }
    }

    println!(
        "\n{} of {} packages updated",
        summary.changed_count(),
        summary.outcomes.len()
    );
    if options.dry_run {
        println!("dry run: no files were written");
    }

    Ok(())
}

//! `gantry analyze` command

use std::time::Duration;

use anyhow::Result;

use crate::cli::AnalyzeArgs;
use gantry::ops::{analyze, format_report, AnalyzeOptions, BuildProbe};

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let probe = if args.no_probe {
        None
    } else {
        Some(BuildProbe::default().with_timeout(Duration::from_secs(args.timeout)))
    };

    let options = AnalyzeOptions {
        root: args.root,
        prefix: args.prefix,
        probe,
    };

    let results = analyze(&options)?;

    // Findings are the command's output, not its failure mode
    print!("{}", format_report(&results));

    Ok(())
}

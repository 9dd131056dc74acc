//! `packwright build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use packwright::ops::bundle::{bundle, BuildOptions};

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let opts = BuildOptions {
        mode: args.mode,
        cwd: args.dir,
        verbose,
    };

    let report = bundle(&opts)?;

    for artifact in &report.artifacts {
        eprintln!(
            "    Finished `{}` -> {}",
            artifact.outfile,
            artifact.path.display()
        );
    }
    if let Some(declarations) = &report.declarations {
        eprintln!(
            "    Finished `{}` -> {}",
            declarations.outfile,
            declarations.path.display()
        );
    }
    eprintln!("     Wrote {}", report.manifest_path.display());

    Ok(())
}

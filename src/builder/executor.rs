//! Parallel target execution with progress reporting.

use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::builder::bundle::{build_target, Artifact};
use crate::builder::context::BuildContext;
use crate::builder::declarations::{generate_declarations, DeclarationBundle};
use crate::builder::engine::BundlerEngine;
use crate::core::matrix::TargetMatrix;

/// Run every target in the matrix.
///
/// Bundle targets run concurrently; declaration generation runs alongside
/// them since neither depends on the other's output. The first failure
/// aborts the run, but targets already in flight finish (their results are
/// simply discarded with the error).
pub fn execute(
    engine: &BundlerEngine,
    ctx: &BuildContext,
    matrix: &TargetMatrix,
    verbose: bool,
) -> Result<(Vec<Artifact>, Option<DeclarationBundle>)> {
    let start = Instant::now();
    let total = matrix.bundles.len() + usize::from(matrix.declarations.is_some());

    let pb = if !verbose && total > 1 {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let (declarations, artifacts) = rayon::join(
        || {
            matrix
                .declarations
                .as_ref()
                .map(|target| {
                    let result = generate_declarations(ctx, target);
                    if let (Ok(bundle), true) = (&result, verbose) {
                        eprintln!("     Bundled {} (typescript)", bundle.outfile);
                    }
                    if let Some(pb) = &pb {
                        pb.inc(1);
                    }
                    result
                })
                .transpose()
        },
        || {
            matrix
                .bundles
                .par_iter()
                .map(|target| {
                    let result = build_target(engine, ctx, target);
                    if let (Ok(artifact), true) = (&result, verbose) {
                        eprintln!(
                            "     Bundled {} ({} - {})",
                            artifact.outfile, target.format, target.env
                        );
                    }
                    if let Some(pb) = &pb {
                        pb.inc(1);
                    }
                    result
                })
                .collect::<Result<Vec<_>>>()
        },
    );

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let artifacts = artifacts?;
    let declarations = declarations?;

    let elapsed = start.elapsed();
    eprintln!(
        "    Finished {} target(s) in {:.2}s",
        artifacts.len() + usize::from(declarations.is_some()),
        elapsed.as_secs_f64()
    );

    Ok((artifacts, declarations))
}

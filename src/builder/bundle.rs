//! Per-target bundler invocation.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::builder::context::BuildContext;
use crate::builder::define;
use crate::builder::engine::BundlerEngine;
use crate::builder::errors::BuildError;
use crate::core::target::{BuildTarget, ModuleFormat, TargetKind};
use crate::util::fs::{ensure_dir, relative_path, write_string};
use crate::util::process::ProcessBuilder;

/// Extensions the bundler resolves imports against, in priority order.
const RESOLVE_EXTENSIONS: &str = ".tsx,.ts,.jsx,.mjs,.js,.cjs,.css,.json";

/// One compiled output file plus its source map.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: TargetKind,

    /// Path relative to the dist directory, `./`-prefixed
    pub outfile: String,

    /// Absolute path of the written bundle
    pub path: PathBuf,

    /// Absolute path of the adjacent source map
    pub sourcemap: PathBuf,

    /// Relative path of the ESM wrapper, when one was written
    pub esm_wrapper: Option<String>,
}

/// Build one target.
///
/// Calls are independent of each other; the only shared state is the
/// read-only engine handle.
pub fn build_target(
    engine: &BundlerEngine,
    ctx: &BuildContext,
    target: &BuildTarget,
) -> Result<Artifact> {
    let out_path = ctx.paths.dist_path(&target.outfile);
    if let Some(parent) = out_path.parent() {
        ensure_dir(parent)?;
    }

    let shim = engine.shim_for(target.format);
    let args = bundler_args(ctx, target, shim, &out_path)?;

    let output = ProcessBuilder::new(engine.esbuild())
        .args(&args)
        .cwd(ctx.paths.root())
        .exec()
        .map_err(|e| BuildError::Bundle {
            outfile: target.outfile.clone(),
            format: target.format,
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(BuildError::Bundle {
            outfile: target.outfile.clone(),
            format: target.format,
            source: anyhow!("{}", stderr.trim()),
        }
        .into());
    }

    let esm_wrapper = match &target.esm_wrapper {
        Some(wrapper) => {
            write_esm_wrapper(ctx, wrapper, &out_path)?;
            Some(wrapper.clone())
        }
        None => None,
    };

    let sourcemap = out_path.with_extension("js.map");

    Ok(Artifact {
        kind: target.kind,
        outfile: target.outfile.clone(),
        path: out_path,
        sourcemap,
        esm_wrapper,
    })
}

/// Assemble the bundler command line for one target.
fn bundler_args(
    ctx: &BuildContext,
    target: &BuildTarget,
    shim: &Path,
    out_path: &Path,
) -> Result<Vec<String>, BuildError> {
    let mut args = vec![
        ctx.entry_file.display().to_string(),
        "--bundle".to_string(),
        format!("--outfile={}", out_path.display()),
        "--charset=utf8".to_string(),
        format!("--platform={}", target.platform),
        format!("--format={}", target.format),
        format!("--target={}", target.env),
        "--sourcemap=external".to_string(),
        format!("--main-fields={}", target.main_fields.join(",")),
        format!("--resolve-extensions={RESOLVE_EXTENSIONS}"),
        format!("--inject:{}", shim.display()),
    ];

    for (expr, replacement) in define::replacements(target.platform, target.format)? {
        args.push(format!("--define:{expr}={replacement}"));
    }
    // Template components check their props in development builds only.
    args.push(format!(
        "--define:import.meta.env.DEV={}",
        target.templates.dev
    ));

    // The global-script bundle is self-contained; everything else resolves
    // declared dependencies at the consumer.
    if target.format != ModuleFormat::Iife {
        for external in &ctx.externals {
            args.push(format!("--external:{external}"));
        }
    }

    if target.minify {
        args.push("--minify".to_string());
    }

    if let Some(global_name) = &target.global_name {
        args.push(format!("--global-name={global_name}"));
    }

    Ok(args)
}

/// Write the ESM wrapper re-exporting the CommonJS artifact.
fn write_esm_wrapper(ctx: &BuildContext, wrapper: &str, cjs_path: &Path) -> Result<()> {
    let wrapper_path = ctx.paths.dist_path(wrapper);
    let wrapper_dir = wrapper_path.parent().unwrap_or(ctx.paths.dist());

    let specifier = relative_path(wrapper_dir, cjs_path);
    let mut specifier = specifier.to_string_lossy().replace('\\', "/");
    if !specifier.starts_with('.') {
        specifier = format!("./{specifier}");
    }

    let contents = format!("import mod from '{specifier}'\nexport default mod\n");
    write_string(&wrapper_path, &contents)
        .with_context(|| format!("failed to write ESM wrapper {}", wrapper_path.display()))
}

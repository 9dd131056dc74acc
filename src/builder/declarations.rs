//! Type-declaration generation and bundling.
//!
//! Runs the type checker in declaration-only mode over the whole project,
//! locates the declaration mirroring the entry file, and bundles it into a
//! single self-contained `.d.ts` next to the other artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::builder::context::BuildContext;
use crate::builder::errors::BuildError;
use crate::core::matrix::DeclarationTarget;
use crate::util::fs::{ensure_dir, relative_path, remove_dir_all_if_exists};
use crate::util::process::{find_node_tool, ProcessBuilder};

/// Typed view of a template component, good enough for consumers of the
/// generated declarations.
const TEMPLATE_SHIM: &str = r#"import type { SvelteComponentTyped } from 'svelte'

export default class extends SvelteComponentTyped<
  Record<string, unknown>,
  Record<string, unknown>,
  Record<string, unknown>
> {}
"#;

/// The bundled declaration artifact.
#[derive(Debug, Clone)]
pub struct DeclarationBundle {
    /// Path relative to the dist directory, `./`-prefixed
    pub outfile: String,

    /// Absolute path of the written file
    pub path: PathBuf,
}

/// Generate and bundle type declarations for the build's entry point.
pub fn generate_declarations(
    ctx: &BuildContext,
    target: &DeclarationTarget,
) -> Result<DeclarationBundle> {
    let root = ctx.paths.root();
    let scratch = ctx.paths.types_scratch();
    ensure_dir(&scratch)?;

    let tsc = find_node_tool(root, "tsc").ok_or_else(|| BuildError::ToolNotFound {
        tool: "tsc".to_string(),
    })?;

    // Template files are opaque to the type checker; give it synthetic
    // declarations for the duration of the run.
    let shim_files = if ctx.use_templates {
        let source_dir = ctx.entry_file.parent().unwrap_or(root);
        stage_template_shims(source_dir, &scratch)?
    } else {
        Vec::new()
    };

    let status = ProcessBuilder::new(&tsc)
        .args(["--emitDeclarationOnly", "--noEmit", "false"])
        .args(["--jsx", "preserve"])
        .arg("--project")
        .arg(ctx.paths.typescript_config())
        .arg("--outDir")
        .arg(&scratch)
        .cwd(root)
        .prepend_path(ctx.paths.node_modules_bin())
        .exec_streaming();

    cleanup_files(&shim_files);

    let status = status?;
    if !status.success() {
        return Err(BuildError::TypeCheck { status }.into());
    }

    // The checker mirrors the project layout into the scratch directory;
    // the entry's declaration sits in the mirrored directory or above it.
    let entry_dir = ctx.entry_file.parent().unwrap_or(root);
    let search_start = scratch.join(relative_path(root, entry_dir));
    let expected = declaration_file_name(&ctx.entry_file);

    let source_dts = find_declaration(&search_start, &scratch, &expected).ok_or_else(|| {
        BuildError::DeclarationNotFound {
            expected: expected.clone(),
            directory: search_start.clone(),
        }
    })?;

    let out_path = ctx.paths.dist_path(&target.outfile);
    if let Some(parent) = out_path.parent() {
        ensure_dir(parent)?;
    }

    let bundler =
        find_node_tool(root, "dts-bundle-generator").ok_or_else(|| BuildError::ToolNotFound {
            tool: "dts-bundle-generator".to_string(),
        })?;

    ProcessBuilder::new(&bundler)
        .arg("-o")
        .arg(&out_path)
        .arg(&source_dts)
        .cwd(root)
        .prepend_path(ctx.paths.node_modules_bin())
        .exec_and_check()
        .context("failed to bundle type declarations")?;

    // The per-module declarations were only needed to produce the bundle.
    if let Err(e) = remove_dir_all_if_exists(&scratch) {
        tracing::warn!("failed to clean up declaration scratch: {}", e);
    }

    Ok(DeclarationBundle {
        outfile: target.outfile.clone(),
        path: out_path,
    })
}

/// The declaration file name the entry source compiles to.
pub(crate) fn declaration_file_name(entry: &Path) -> String {
    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}.d.ts")
}

/// Search `start` and its ancestors up to `stop` for `file_name`.
pub(crate) fn find_declaration(start: &Path, stop: &Path, file_name: &str) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir == stop || !dir.pop() {
            return None;
        }
    }
}

/// Write a typed shim next to every template file under `source_dir` and
/// copy it into the scratch directory.
///
/// Returns the files written into the source tree, for cleanup.
pub(crate) fn stage_template_shims(source_dir: &Path, scratch: &Path) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::new();

    for entry in WalkDir::new(source_dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("svelte")
        {
            let shim_name = format!("{}.d.ts", entry.file_name().to_string_lossy());
            let shim = entry.path().with_file_name(&shim_name);
            std::fs::write(&shim, TEMPLATE_SHIM)
                .with_context(|| format!("failed to write shim {}", shim.display()))?;

            let scratch_copy = scratch.join(&shim_name);
            std::fs::copy(&shim, &scratch_copy).with_context(|| {
                format!("failed to copy shim to {}", scratch_copy.display())
            })?;

            staged.push(shim);
        }
    }

    Ok(staged)
}

/// Best-effort removal of staged shim files.
pub(crate) fn cleanup_files(files: &[PathBuf]) {
    for file in files {
        if let Err(e) = std::fs::remove_file(file) {
            tracing::warn!("failed to clean up {}: {}", file.display(), e);
        }
    }
}

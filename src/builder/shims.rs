//! Runtime environment shims injected into bundles.
//!
//! The substitution tables in [`crate::builder::define`] rewrite environment
//! introspection to bare identifiers; these shims define those identifiers
//! so a bundle still works standalone (for example in a browser with no
//! `process` object). The bundler tree-shakes whichever exports a bundle
//! never references.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::target::ModuleFormat;

/// Shim for CommonJS and ESM bundles.
const MODULE_SHIM: &str = r#"export var process_env =
  typeof process !== 'undefined' && process.env ? process.env : {}

export var process_platform =
  typeof process !== 'undefined' && process.platform ? process.platform : 'browser'

export var process_env_NODE_ENV = process_env.NODE_ENV || 'development'

export var import_meta_url =
  typeof __filename !== 'undefined' ? require('url').pathToFileURL(__filename) : undefined

export var import_meta_resolve = function (id, parent) {
  return new Promise(function (resolve) {
    resolve(
      parent ? require('module').createRequire(parent).resolve(id) : require.resolve(id),
    )
  })
}
"#;

/// Shim for the global-script bundle: the environment is fully baked in,
/// only the env object itself needs a value.
const SCRIPT_SHIM: &str = r#"export var process_env = {}
"#;

/// Shim files staged to disk for the duration of one build run.
#[derive(Debug)]
pub struct ShimDir {
    dir: TempDir,
    module: PathBuf,
    script: PathBuf,
}

impl ShimDir {
    /// Write the shims into a fresh temporary directory.
    pub fn stage() -> Result<Self> {
        let dir = TempDir::new().context("failed to create shim directory")?;

        let module = dir.path().join("module-shim.js");
        std::fs::write(&module, MODULE_SHIM)
            .with_context(|| format!("failed to write {}", module.display()))?;

        let script = dir.path().join("script-shim.js");
        std::fs::write(&script, SCRIPT_SHIM)
            .with_context(|| format!("failed to write {}", script.display()))?;

        Ok(ShimDir {
            dir,
            module,
            script,
        })
    }

    /// The shim injected into bundles of the given format.
    pub fn for_format(&self, format: ModuleFormat) -> &Path {
        match format {
            ModuleFormat::Iife => &self.script,
            ModuleFormat::Cjs | ModuleFormat::Esm => &self.module,
        }
    }

    /// Remove the staged shims.
    ///
    /// Failures are logged; a leftover temp directory never fails a build.
    pub fn close(self) {
        if let Err(e) = self.dir.close() {
            tracing::warn!("failed to remove shim directory: {}", e);
        }
    }
}

//! Package directory layout and entry-file discovery.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;

use crate::core::manifest::PackageManifest;
use crate::util::diagnostic::MissingEntryError;

/// Extensions tried, in order, when resolving the entry file by convention.
pub const ENTRY_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "mjs", "js", "cjs"];

/// Well-known paths inside a package being built.
#[derive(Debug, Clone)]
pub struct PackagePaths {
    root: PathBuf,
    dist: PathBuf,
    scratch: PathBuf,
}

impl PackagePaths {
    /// Create the path layout rooted at a package directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dist = root.join("dist");
        let scratch = root.join(".packwright");
        PackagePaths {
            root,
            dist,
            scratch,
        }
    }

    /// The package root (directory containing package.json).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The output directory artifacts are written to.
    pub fn dist(&self) -> &Path {
        &self.dist
    }

    /// The scratch directory for intermediate build output.
    pub fn scratch(&self) -> &Path {
        &self.scratch
    }

    /// The scratch directory declaration files are emitted into.
    pub fn types_scratch(&self) -> PathBuf {
        self.scratch.join("types")
    }

    /// The package manifest path.
    pub fn manifest_file(&self) -> PathBuf {
        self.root.join("package.json")
    }

    /// The TypeScript project configuration path.
    pub fn typescript_config(&self) -> PathBuf {
        self.root.join("tsconfig.json")
    }

    /// The packwright configuration path.
    pub fn config_file(&self) -> PathBuf {
        self.root.join("packwright.toml")
    }

    /// The package-local tool binary directory.
    pub fn node_modules_bin(&self) -> PathBuf {
        self.root.join("node_modules").join(".bin")
    }

    /// Resolve a `./`-prefixed manifest-relative output path under dist.
    pub fn dist_path(&self, outfile: &str) -> PathBuf {
        let mut path = self.dist.clone();
        path.extend(outfile.trim_start_matches("./").split('/'));
        path
    }
}

/// Resolve the entry source file for a package.
///
/// The manifest `source` field wins if present; otherwise `src/index.*` is
/// tried with each of [`ENTRY_EXTENSIONS`] in order.
pub fn resolve_entry_file(manifest: &PackageManifest, paths: &PackagePaths) -> Result<PathBuf> {
    if let Some(Value::String(source)) = manifest.get("source") {
        let path = paths.root().join(source);
        if path.is_file() {
            return Ok(path);
        }
        anyhow::bail!(
            "manifest `source` points at `{}`, which does not exist",
            path.display()
        );
    }

    for ext in ENTRY_EXTENSIONS {
        let candidate = paths.root().join("src").join(format!("index.{ext}"));
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(MissingEntryError {
        root: paths.root().to_path_buf(),
    }
    .into())
}

//! Implementation of `packwright build`.
//!
//! Orchestration order: read the manifest, compute the target matrix, run
//! the bundler and the declaration generator concurrently, then synthesize
//! the publish manifest. The publish manifest is written only after every
//! target resolved, so a failed run never leaves a manifest pointing at
//! missing artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::bundle::Artifact;
use crate::builder::context::BuildContext;
use crate::builder::declarations::DeclarationBundle;
use crate::builder::engine::BundlerEngine;
use crate::builder::executor::execute;
use crate::core::manifest::PackageManifest;
use crate::core::matrix::{compute_targets, BuildMode};
use crate::core::paths::{resolve_entry_file, PackagePaths};
use crate::core::publish::{render, synthesize, ProducedOutputs, PublishPolicy};
use crate::core::target::TargetKind;
use crate::util::config::Config;
use crate::util::fs::{ensure_dir, glob_files, relative_path, write_string};

/// Root files copied into the output directory alongside the artifacts.
const STATIC_FILE_PATTERNS: &[&str] = &["README*", "LICENSE*", "LICENCE*", "CHANGELOG*"];

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build mode override (otherwise packwright.toml, defaulting to library)
    pub mode: Option<String>,

    /// Package directory (defaults to the current directory)
    pub cwd: Option<PathBuf>,

    /// Verbose output
    pub verbose: bool,
}

/// What a successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub artifacts: Vec<Artifact>,
    pub declarations: Option<DeclarationBundle>,
    pub manifest_path: PathBuf,
}

/// Build every artifact variant for the package and write its publish
/// manifest.
pub fn bundle(opts: &BuildOptions) -> Result<BuildReport> {
    let root = match &opts.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };

    let paths = PackagePaths::new(&root);
    let manifest = PackageManifest::load(&paths.manifest_file())?;
    let config = Config::load_or_default(&paths.config_file());

    // Configuration problems abort here, before any external tool runs.
    let mode = match opts.mode.as_deref().or(config.build.mode.as_deref()) {
        Some(raw) => raw.parse::<BuildMode>()?,
        None => BuildMode::default(),
    };

    let entry_file = resolve_entry_file(&manifest, &paths)?;

    match manifest.version() {
        Some(version) => eprintln!(
            "    Building {} v{} ({}, {})",
            manifest.name(),
            version,
            mode,
            relative_path(&root, &entry_file).display()
        ),
        None => eprintln!(
            "    Building {} ({}, {})",
            manifest.name(),
            mode,
            relative_path(&root, &entry_file).display()
        ),
    }

    let ctx = BuildContext::new(manifest, paths, mode, entry_file);
    let matrix = compute_targets(&ctx.manifest, mode, ctx.use_typescript)?;

    ensure_dir(ctx.paths.dist())?;
    copy_static_files(&ctx)?;

    let engine = BundlerEngine::start(ctx.paths.root())?;
    let outcome = execute(&engine, &ctx, &matrix, opts.verbose);
    engine.shutdown();
    let (artifacts, declarations) = outcome?;

    let outputs = produced_outputs(&artifacts, declarations.as_ref());
    let policy = PublishPolicy::from_config(&config.publish);
    let publish = synthesize(&ctx.manifest, &outputs, &policy);

    let manifest_path = ctx.paths.dist().join("package.json");
    write_string(&manifest_path, &render(&publish))?;

    Ok(BuildReport {
        artifacts,
        declarations,
        manifest_path,
    })
}

/// Record which output slot each produced artifact fills.
fn produced_outputs(
    artifacts: &[Artifact],
    declarations: Option<&DeclarationBundle>,
) -> ProducedOutputs {
    let mut outputs = ProducedOutputs::default();

    for artifact in artifacts {
        let slot = Some(artifact.outfile.clone());
        match artifact.kind {
            TargetKind::NodeCjs => outputs.node = slot,
            TargetKind::BrowserDev => outputs.browser_dev = slot,
            TargetKind::BrowserModule => outputs.module = slot,
            TargetKind::BrowserEsnext => outputs.esnext = slot,
            TargetKind::Script => outputs.script = slot,
        }
    }

    if let Some(bundle) = declarations {
        outputs.types = Some(bundle.outfile.clone());
    }

    outputs
}

/// Copy README/LICENSE/CHANGELOG files into the output directory.
fn copy_static_files(ctx: &BuildContext) -> Result<()> {
    for file in glob_files(ctx.paths.root(), STATIC_FILE_PATTERNS)? {
        let Some(name) = file.file_name() else {
            continue;
        };
        let dest = ctx.paths.dist().join(name);
        std::fs::copy(&file, &dest)
            .with_context(|| format!("failed to copy {}", file.display()))?;
        tracing::debug!("copied {} to dist", name.to_string_lossy());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::PackagePaths;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn artifact(kind: TargetKind, outfile: &str) -> Artifact {
        Artifact {
            kind,
            outfile: outfile.to_string(),
            path: PathBuf::from("/dist").join(outfile.trim_start_matches("./")),
            sourcemap: PathBuf::from("/dist/map"),
            esm_wrapper: None,
        }
    }

    #[test]
    fn test_produced_outputs_mapping() {
        let artifacts = vec![
            artifact(TargetKind::NodeCjs, "./node/pkg.js"),
            artifact(TargetKind::BrowserModule, "./module/pkg.js"),
            artifact(TargetKind::Script, "./script/pkg.js"),
        ];
        let declarations = DeclarationBundle {
            outfile: "./types/pkg.d.ts".to_string(),
            path: PathBuf::from("/dist/types/pkg.d.ts"),
        };

        let outputs = produced_outputs(&artifacts, Some(&declarations));

        assert_eq!(outputs.node.as_deref(), Some("./node/pkg.js"));
        assert_eq!(outputs.module.as_deref(), Some("./module/pkg.js"));
        assert_eq!(outputs.script.as_deref(), Some("./script/pkg.js"));
        assert_eq!(outputs.types.as_deref(), Some("./types/pkg.d.ts"));
        assert!(outputs.browser_dev.is_none());
        assert!(outputs.esnext.is_none());
    }

    #[test]
    fn test_copy_static_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("README.md"), "# pkg").unwrap();
        std::fs::write(tmp.path().join("LICENSE"), "MIT").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "internal").unwrap();

        let manifest = PackageManifest::parse(
            r#"{"name": "pkg"}"#,
            &tmp.path().join("package.json"),
        )
        .unwrap();
        let paths = PackagePaths::new(tmp.path());
        ensure_dir(paths.dist()).unwrap();
        let ctx = BuildContext::new(
            manifest,
            paths,
            BuildMode::Library,
            tmp.path().join("src/index.js"),
        );

        copy_static_files(&ctx).unwrap();

        assert!(tmp.path().join("dist/README.md").exists());
        assert!(tmp.path().join("dist/LICENSE").exists());
        assert!(!tmp.path().join("dist/notes.txt").exists());
    }

    #[test]
    fn test_bundle_fails_without_manifest() {
        let tmp = TempDir::new().unwrap();
        let opts = BuildOptions {
            cwd: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let err = bundle(&opts).unwrap_err();
        assert!(err.to_string().contains("package.json"));
        assert!(!tmp.path().join("dist").join("package.json").exists());
    }

    #[test]
    fn test_bundle_rejects_unknown_mode_before_building() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("package.json"), r#"{"name": "pkg"}"#).unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/index.js"), "export {}").unwrap();

        let opts = BuildOptions {
            mode: Some("bundle".to_string()),
            cwd: Some(tmp.path().to_path_buf()),
            verbose: false,
        };

        let err = bundle(&opts).unwrap_err();
        assert!(err.to_string().contains("unrecognized build mode"));
        // nothing was built or written
        assert!(!tmp.path().join("dist").exists());
    }

    #[test]
    fn test_mode_falls_back_to_config_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("package.json"), r#"{"name": "pkg"}"#).unwrap();
        std::fs::write(
            tmp.path().join("packwright.toml"),
            "[build]\nmode = \"nonsense\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/index.js"), "export {}").unwrap();

        let opts = BuildOptions {
            cwd: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let err = bundle(&opts).unwrap_err();
        assert!(err.to_string().contains("unrecognized build mode `nonsense`"));
    }
}

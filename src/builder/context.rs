//! Assembled inputs for one build run.

use std::path::PathBuf;

use crate::core::manifest::PackageManifest;
use crate::core::matrix::BuildMode;
use crate::core::paths::PackagePaths;

/// Everything the per-target builders need, derived once up front.
#[derive(Debug)]
pub struct BuildContext {
    pub manifest: PackageManifest,
    pub paths: PackagePaths,
    pub mode: BuildMode,

    /// The resolved entry source file
    pub entry_file: PathBuf,

    /// Type declarations are generated for this build
    pub use_typescript: bool,

    /// The package uses the template preprocessor
    pub use_templates: bool,

    /// Dependencies excluded from bundles, resolved at the consumer
    pub externals: Vec<String>,
}

impl BuildContext {
    /// Derive the build context from the loaded manifest and entry file.
    pub fn new(
        manifest: PackageManifest,
        paths: PackagePaths,
        mode: BuildMode,
        entry_file: PathBuf,
    ) -> Self {
        let entry_is_typescript = matches!(
            entry_file.extension().and_then(|e| e.to_str()),
            Some("ts") | Some("tsx")
        );
        let use_typescript = entry_is_typescript && paths.typescript_config().is_file();
        let use_templates = manifest.has_dependency("svelte");
        let externals = manifest.external_dependencies();

        BuildContext {
            manifest,
            paths,
            mode,
            entry_file,
            use_typescript,
            use_templates,
            externals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn manifest(content: &str, root: &Path) -> PackageManifest {
        PackageManifest::parse(content, &root.join("package.json")).unwrap()
    }

    #[test]
    fn test_typescript_requires_config_and_ts_entry() {
        let tmp = TempDir::new().unwrap();
        let paths = PackagePaths::new(tmp.path());
        let m = manifest(r#"{"name": "pkg"}"#, tmp.path());

        // .ts entry but no tsconfig.json
        let ctx = BuildContext::new(
            m.clone(),
            paths.clone(),
            BuildMode::Library,
            tmp.path().join("src/index.ts"),
        );
        assert!(!ctx.use_typescript);

        std::fs::write(tmp.path().join("tsconfig.json"), "{}").unwrap();

        let ctx = BuildContext::new(
            m.clone(),
            paths.clone(),
            BuildMode::Library,
            tmp.path().join("src/index.ts"),
        );
        assert!(ctx.use_typescript);

        // tsconfig.json present but a plain .js entry
        let ctx = BuildContext::new(m, paths, BuildMode::Library, tmp.path().join("src/index.js"));
        assert!(!ctx.use_typescript);
    }

    #[test]
    fn test_template_detection() {
        let tmp = TempDir::new().unwrap();
        let paths = PackagePaths::new(tmp.path());

        let m = manifest(
            r#"{"name": "pkg", "devDependencies": {"svelte": "^3.0.0"}}"#,
            tmp.path(),
        );
        let ctx = BuildContext::new(m, paths, BuildMode::Library, tmp.path().join("src/index.js"));
        assert!(ctx.use_templates);
    }
}

//! Build-target matrix computation.
//!
//! Turns (manifest flags, build mode) into the fixed set of targets a run
//! produces. Output paths are derived from the platform/format slot and the
//! unscoped package name, so no two targets can collide by construction.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::core::manifest::PackageManifest;
use crate::core::target::{
    BuildTarget, ModuleFormat, Platform, TargetEnv, TargetKind, TemplateOptions,
    BROWSER_DEV_MAIN_FIELDS, BROWSER_MAIN_FIELDS, NODE_MAIN_FIELDS, SCRIPT_MAIN_FIELDS,
};
use crate::util::diagnostic::UnknownModeError;

/// What kind of package is being built.
///
/// Libraries ship an extra esnext variant for capable CDNs; applications
/// ship a self-contained global-script variant instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Library,
    Application,
}

impl FromStr for BuildMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "library" | "lib" => Ok(BuildMode::Library),
            "application" | "app" => Ok(BuildMode::Application),
            _ => Err(UnknownModeError {
                mode: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Library => f.write_str("library"),
            BuildMode::Application => f.write_str("application"),
        }
    }
}

/// The type-declaration output slot.
#[derive(Debug, Clone)]
pub struct DeclarationTarget {
    /// Output path relative to the dist directory, `./`-prefixed
    pub outfile: String,
}

/// The full set of outputs one build run produces.
#[derive(Debug, Clone)]
pub struct TargetMatrix {
    pub bundles: Vec<BuildTarget>,
    pub declarations: Option<DeclarationTarget>,
}

/// Compute the build targets for a package.
pub fn compute_targets(
    manifest: &PackageManifest,
    mode: BuildMode,
    use_typescript: bool,
) -> Result<TargetMatrix> {
    let name = manifest.unscoped_name();
    let support = manifest.platform_support();

    let mut bundles = Vec::new();

    if support.node {
        bundles.push(BuildTarget {
            kind: TargetKind::NodeCjs,
            platform: Platform::Node,
            format: ModuleFormat::Cjs,
            env: TargetEnv::Node,
            outfile: format!("./node/{name}.js"),
            minify: false,
            esm_wrapper: Some(format!("./node/{name}.mjs")),
            global_name: None,
            main_fields: NODE_MAIN_FIELDS,
            templates: TemplateOptions { dev: true },
        });
    }

    if support.browser {
        bundles.push(BuildTarget {
            kind: TargetKind::BrowserDev,
            platform: Platform::Browser,
            format: ModuleFormat::Esm,
            env: TargetEnv::Es2020,
            outfile: format!("./browser/dev/{name}.js"),
            minify: false,
            esm_wrapper: None,
            global_name: None,
            main_fields: BROWSER_DEV_MAIN_FIELDS,
            templates: TemplateOptions { dev: true },
        });

        bundles.push(BuildTarget {
            kind: TargetKind::BrowserModule,
            platform: Platform::Browser,
            format: ModuleFormat::Esm,
            env: TargetEnv::Es2015,
            outfile: format!("./module/{name}.js"),
            minify: true,
            esm_wrapper: None,
            global_name: None,
            main_fields: BROWSER_MAIN_FIELDS,
            templates: TemplateOptions { dev: false },
        });

        match mode {
            BuildMode::Library => {
                bundles.push(BuildTarget {
                    kind: TargetKind::BrowserEsnext,
                    platform: Platform::Browser,
                    format: ModuleFormat::Esm,
                    env: TargetEnv::EsNext,
                    outfile: format!("./esnext/{name}.js"),
                    minify: false,
                    esm_wrapper: None,
                    global_name: None,
                    main_fields: BROWSER_MAIN_FIELDS,
                    templates: TemplateOptions { dev: false },
                });
            }
            BuildMode::Application => {
                bundles.push(BuildTarget {
                    kind: TargetKind::Script,
                    platform: Platform::Browser,
                    format: ModuleFormat::Iife,
                    env: TargetEnv::Browser,
                    outfile: format!("./script/{name}.js"),
                    minify: true,
                    esm_wrapper: None,
                    global_name: Some(manifest.global_name()),
                    main_fields: SCRIPT_MAIN_FIELDS,
                    templates: TemplateOptions { dev: false },
                });
            }
        }
    }

    if bundles.is_empty() {
        anyhow::bail!(
            "manifest for `{}` disables every build platform; nothing to do",
            manifest.name()
        );
    }

    debug_assert!(
        {
            let mut paths: Vec<_> = bundles.iter().map(|t| t.outfile.as_str()).collect();
            paths.sort_unstable();
            paths.windows(2).all(|w| w[0] != w[1])
        },
        "target output paths must be unique"
    );

    let declarations = use_typescript.then(|| DeclarationTarget {
        outfile: format!("./types/{name}.d.ts"),
    });

    Ok(TargetMatrix {
        bundles,
        declarations,
    })
}

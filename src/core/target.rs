//! Build target model.
//!
//! A [`BuildTarget`] is one (platform, format, environment) combination the
//! entry file gets compiled into. Targets are constructed once per run by
//! the matrix builder and never mutated afterwards.

use std::fmt;

/// The platform an artifact is resolved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Node,
    Browser,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Node => "node",
            Platform::Browser => "browser",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The module format of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleFormat {
    Cjs,
    Esm,
    Iife,
}

impl ModuleFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleFormat::Cjs => "cjs",
            ModuleFormat::Esm => "esm",
            ModuleFormat::Iife => "iife",
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine versions the node build must run on (last LTS at baseline).
pub const NODE_ENGINES: &[&str] = &["node10.23"];

/// Browser versions the browser builds must run on.
pub const BROWSER_ENGINES: &[&str] = &["chrome79", "firefox78", "safari13.1", "edge79"];

/// Minimum runtime environment a bundle is compiled down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEnv {
    /// Concrete node engine versions
    Node,
    /// Concrete browser engine versions
    Browser,
    /// ES2015 syntax level
    Es2015,
    /// ES2020 syntax level
    Es2020,
    /// No down-leveling at all
    EsNext,
}

impl TargetEnv {
    /// The engine/level identifiers handed to the bundler.
    pub fn engines(&self) -> &'static [&'static str] {
        match self {
            TargetEnv::Node => NODE_ENGINES,
            TargetEnv::Browser => BROWSER_ENGINES,
            TargetEnv::Es2015 => &["es2015"],
            TargetEnv::Es2020 => &["es2020"],
            TargetEnv::EsNext => &["esnext"],
        }
    }
}

impl fmt::Display for TargetEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.engines().join(","))
    }
}

/// Which slot in the output matrix a target fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// CommonJS build consumed by node's `require`
    NodeCjs,
    /// Unminified ESM build for development servers
    BrowserDev,
    /// Production ESM build for bundlers and CDNs
    BrowserModule,
    /// Untranspiled ESM build for esnext-aware CDNs
    BrowserEsnext,
    /// Self-contained global-script build for plain `<script>` tags
    Script,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::NodeCjs => "node",
            TargetKind::BrowserDev => "browser-dev",
            TargetKind::BrowserModule => "module",
            TargetKind::BrowserEsnext => "esnext",
            TargetKind::Script => "script",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template preprocessor options for a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateOptions {
    /// Compile template components with development checks enabled
    pub dev: bool,
}

/// Manifest fields consulted when resolving a dependency's own entry point,
/// richest first.
pub const NODE_MAIN_FIELDS: &[&str] = &["esnext", "es2015", "module", "main"];
pub const BROWSER_DEV_MAIN_FIELDS: &[&str] = &["browser:module", "esnext", "es2015"];
pub const BROWSER_MAIN_FIELDS: &[&str] = &["esnext", "es2015"];
pub const SCRIPT_MAIN_FIELDS: &[&str] = &["esnext", "es2015", "module", "browser", "main"];

/// One bundling unit: constructed once by the matrix builder, consumed once
/// by the artifact builder.
#[derive(Debug, Clone)]
pub struct BuildTarget {
    pub kind: TargetKind,
    pub platform: Platform,
    pub format: ModuleFormat,
    pub env: TargetEnv,

    /// Output path relative to the dist directory, `./`-prefixed
    pub outfile: String,

    /// Minify the output
    pub minify: bool,

    /// Path of an ESM wrapper re-exporting the artifact, if one is written
    pub esm_wrapper: Option<String>,

    /// Global variable name, for the script format only
    pub global_name: Option<String>,

    /// Entry-point resolution order for dependencies
    pub main_fields: &'static [&'static str],

    /// Template preprocessor options
    pub templates: TemplateOptions,
}

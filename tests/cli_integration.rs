//! CLI integration tests for Packwright.
//!
//! These tests run the binary against throwaway package directories. The
//! bundler itself is faked with a small shell script where a run needs to
//! get past engine startup.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the packwright binary command.
fn packwright() -> Command {
    Command::cargo_bin("packwright").unwrap()
}

/// Create a temporary directory for test packages.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a minimal package: manifest plus entry file.
fn write_package(dir: &Path, manifest: &str) {
    fs::write(dir.join("package.json"), manifest).unwrap();
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/index.js"), "export default 42\n").unwrap();
}

/// Stage a fake `esbuild` on a private PATH entry.
///
/// The fake honors `--outfile=` enough for the orchestration to proceed,
/// or fails outright when `fail` is set.
#[cfg(unix)]
fn fake_esbuild(dir: &Path, fail: bool) -> std::ffi::OsString {
    let bin = dir.join("fake-bin");
    fs::create_dir_all(&bin).unwrap();

    let script = if fail {
        "#!/bin/sh\necho 'build failed: syntax error' >&2\nexit 1\n".to_string()
    } else {
        concat!(
            "#!/bin/sh\n",
            "out=\"\"\n",
            "for arg in \"$@\"; do\n",
            "  case \"$arg\" in\n",
            "    --outfile=*) out=\"${arg#--outfile=}\" ;;\n",
            "  esac\n",
            "done\n",
            "mkdir -p \"$(dirname \"$out\")\"\n",
            "echo '// bundle' > \"$out\"\n",
            "echo '{}' > \"$out.map\"\n",
            "exit 0\n"
        )
        .to_string()
    };

    write_tool(&bin, "esbuild", &script);

    let mut paths = vec![bin];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).unwrap()
}

/// Stage fake `tsc` and `dts-bundle-generator` binaries next to the fake
/// bundler. The fake checker mirrors an `index.d.ts` into its `--outDir`.
#[cfg(unix)]
fn fake_typescript_tools(dir: &Path) {
    let bin = dir.join("fake-bin");
    fs::create_dir_all(&bin).unwrap();

    write_tool(
        &bin,
        "tsc",
        concat!(
            "#!/bin/sh\n",
            "outdir=\"\"\n",
            "prev=\"\"\n",
            "for arg in \"$@\"; do\n",
            "  if [ \"$prev\" = \"--outDir\" ]; then outdir=\"$arg\"; fi\n",
            "  prev=\"$arg\"\n",
            "done\n",
            "mkdir -p \"$outdir/src\"\n",
            "echo 'declare const _default: number' > \"$outdir/src/index.d.ts\"\n",
            "exit 0\n"
        ),
    );

    write_tool(
        &bin,
        "dts-bundle-generator",
        concat!(
            "#!/bin/sh\n",
            "out=\"\"\n",
            "prev=\"\"\n",
            "for arg in \"$@\"; do\n",
            "  if [ \"$prev\" = \"-o\" ]; then out=\"$arg\"; fi\n",
            "  prev=\"$arg\"\n",
            "done\n",
            "mkdir -p \"$(dirname \"$out\")\"\n",
            "echo 'declare const _default: number; export default _default' > \"$out\"\n",
            "exit 0\n"
        ),
    );
}

#[cfg(unix)]
fn write_tool(bin: &Path, name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = bin.join(name);
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

// ============================================================================
// argument handling
// ============================================================================

#[test]
fn test_help() {
    packwright()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_completions() {
    packwright()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("packwright"));
}

// ============================================================================
// packwright build
// ============================================================================

#[test]
fn test_build_fails_without_manifest() {
    let tmp = temp_dir();

    packwright()
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json"));
}

#[test]
fn test_build_rejects_unknown_mode() {
    let tmp = temp_dir();
    write_package(tmp.path(), r#"{"name": "pkg"}"#);

    packwright()
        .args(["build", "--mode", "bundle"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized build mode `bundle`"));

    // configuration errors abort before anything is written
    assert!(!tmp.path().join("dist").exists());
}

#[test]
fn test_build_rejects_unknown_mode_from_config() {
    let tmp = temp_dir();
    write_package(tmp.path(), r#"{"name": "pkg"}"#);
    fs::write(
        tmp.path().join("packwright.toml"),
        "[build]\nmode = \"nonsense\"\n",
    )
    .unwrap();

    packwright()
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonsense"));
}

#[test]
fn test_build_fails_without_entry_file() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("package.json"), r#"{"name": "pkg"}"#).unwrap();

    packwright()
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entry file"));
}

#[cfg(unix)]
#[test]
fn test_build_node_only_library() {
    let tmp = temp_dir();
    write_package(
        tmp.path(),
        r#"{"name": "@scope/pkg", "version": "1.0.0", "browser": false, "private": true}"#,
    );
    fs::write(tmp.path().join("README.md"), "# pkg\n").unwrap();
    let path = fake_esbuild(tmp.path(), false);

    packwright()
        .arg("build")
        .current_dir(tmp.path())
        .env("PATH", &path)
        .assert()
        .success();

    // artifacts
    assert!(tmp.path().join("dist/node/pkg.js").exists());
    assert!(tmp.path().join("dist/node/pkg.js.map").exists());
    assert!(tmp.path().join("dist/node/pkg.mjs").exists());
    assert!(tmp.path().join("dist/README.md").exists());

    // publish manifest
    let manifest = fs::read_to_string(tmp.path().join("dist/package.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();

    assert_eq!(parsed["exports"]["."]["default"], "./node/pkg.js");
    assert!(parsed["exports"]["."].get("browser").is_none());
    assert!(parsed["exports"]["."].get("types").is_none());
    assert_eq!(parsed["exports"]["./"], "./");
    assert_eq!(parsed["main"], "./node/pkg.js");
    assert_eq!(parsed["sideEffects"], false);
    assert!(parsed.get("private").is_none());
}

#[cfg(unix)]
#[test]
fn test_build_application_produces_script_variant() {
    let tmp = temp_dir();
    write_package(tmp.path(), r#"{"name": "@scope/widget"}"#);
    let path = fake_esbuild(tmp.path(), false);

    packwright()
        .args(["build", "--mode", "application"])
        .current_dir(tmp.path())
        .env("PATH", &path)
        .assert()
        .success();

    assert!(tmp.path().join("dist/node/widget.js").exists());
    assert!(tmp.path().join("dist/browser/dev/widget.js").exists());
    assert!(tmp.path().join("dist/module/widget.js").exists());
    assert!(tmp.path().join("dist/script/widget.js").exists());
    // esnext is a library-mode variant
    assert!(!tmp.path().join("dist/esnext").exists());

    let manifest = fs::read_to_string(tmp.path().join("dist/package.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();

    assert_eq!(parsed["exports"]["."]["node"], "./node/widget.js");
    assert_eq!(parsed["exports"]["."]["browser"], "./module/widget.js");
    assert_eq!(parsed["exports"]["."]["default"], "./node/widget.js");
    assert_eq!(parsed["unpkg"], "./script/widget.js");
    assert_eq!(parsed["module"], "./module/widget.js");
}

#[cfg(unix)]
#[test]
fn test_build_typescript_library_bundles_declarations() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("package.json"),
        r#"{"name": "@scope/tslib", "browser": false}"#,
    )
    .unwrap();
    fs::write(tmp.path().join("tsconfig.json"), "{}").unwrap();
    fs::create_dir_all(tmp.path().join("src")).unwrap();
    fs::write(tmp.path().join("src/index.ts"), "export default 42\n").unwrap();

    fake_typescript_tools(tmp.path());
    let path = fake_esbuild(tmp.path(), false);

    packwright()
        .arg("build")
        .current_dir(tmp.path())
        .env("PATH", &path)
        .assert()
        .success();

    assert!(tmp.path().join("dist/types/tslib.d.ts").exists());
    // per-module declarations are scratch only
    assert!(!tmp.path().join(".packwright/types").exists());

    let manifest = fs::read_to_string(tmp.path().join("dist/package.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();

    assert_eq!(parsed["types"], "./types/tslib.d.ts");
    assert_eq!(parsed["exports"]["."]["types"], "./types/tslib.d.ts");
    assert_eq!(parsed["exports"]["."]["default"], "./node/tslib.js");
    assert!(parsed["exports"]["."].get("node").is_none());
}

#[cfg(unix)]
#[test]
fn test_bundler_failure_aborts_without_manifest() {
    let tmp = temp_dir();
    write_package(tmp.path(), r#"{"name": "pkg"}"#);
    let path = fake_esbuild(tmp.path(), true);

    packwright()
        .arg("build")
        .current_dir(tmp.path())
        .env("PATH", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to bundle"));

    // no partial publish
    assert!(!tmp.path().join("dist/package.json").exists());
}

// ============================================================================
// packwright clean
// ============================================================================

#[test]
fn test_clean_removes_output_directories() {
    let tmp = temp_dir();
    write_package(tmp.path(), r#"{"name": "pkg"}"#);
    fs::create_dir_all(tmp.path().join("dist/node")).unwrap();
    fs::create_dir_all(tmp.path().join(".packwright/types")).unwrap();

    packwright()
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(!tmp.path().join("dist").exists());
    assert!(!tmp.path().join(".packwright").exists());
    assert!(tmp.path().join("src").exists());
}

#[test]
fn test_clean_succeeds_when_nothing_to_remove() {
    let tmp = temp_dir();

    packwright()
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success();
}

// Build scripts signal errors by panicking; there is no caller to
// return Result to.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Build script for the pixelbooth binary crate.
//!
//! Compiles `crates/pixelbooth/tailwind.css` with `npx @tailwindcss/cli`
//! into `$OUT_DIR/assets/tailwind.css` and exposes the path as
//! `TAILWIND_CSS_PATH` for `include_str!` in `main.rs`.
//!
//! When the Tailwind CLI cannot run an empty stylesheet is written instead
//! and a cargo warning is printed, so `cargo test` and `cargo clippy`
//! work on machines that never build the web bundle.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    // Workspace root is two levels up from crates/pixelbooth/.
    let workspace_root = manifest_dir
        .parent()
        .and_then(Path::parent)
        .expect("could not find workspace root");

    build_tailwind_css(&manifest_dir, workspace_root, &out_dir);
}

fn build_tailwind_css(manifest_dir: &Path, workspace_root: &Path, out_dir: &Path) {
    let input = manifest_dir.join("tailwind.css");
    let assets_dir = out_dir.join("assets");
    let output = assets_dir.join("tailwind.css");

    fs::create_dir_all(&assets_dir)
        .unwrap_or_else(|e| panic!("failed to create {}: {e}", assets_dir.display()));

    println!("cargo:rerun-if-changed={}", input.display());

    // Tailwind scans the UI crates for class names.
    let crates_dir = workspace_root.join("crates");
    register_rs_sources(&crates_dir.join("pixelbooth"));
    register_rs_sources(&crates_dir.join("pixelbooth-io"));

    let input_lossy = input.to_string_lossy();
    let output_lossy = output.to_string_lossy();
    let mut args: Vec<&str> = vec!["@tailwindcss/cli", "-i", &input_lossy, "-o", &output_lossy];
    if env::var("PROFILE").unwrap_or_default() == "release" {
        args.push("--minify");
    }

    let failure = match Command::new("npx").args(&args).status() {
        Ok(status) if status.success() => None,
        Ok(status) => Some(format!("exited with {status}")),
        Err(e) => Some(e.to_string()),
    };
    if let Some(reason) = failure {
        println!(
            "cargo:warning=`npx @tailwindcss/cli` failed ({reason}); building without utility classes"
        );
        fs::write(&output, "")
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", output.display()));
    }

    println!("cargo:rustc-env=TAILWIND_CSS_PATH={}", output.display());
}

/// Recursively emit `cargo:rerun-if-changed` for every `.rs` file
/// under `dir`.
fn register_rs_sources(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            register_rs_sources(&path);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
}

//! Building a generated crate into a loadable library.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use crate::errors::GeneratorError;
use crate::options::EmitOptions;

/// Runs `cargo build --release` on the crate in `output_dir` and returns the
/// path of the produced library.
///
/// `CARGO` is honored so builds run from within cargo use the same toolchain.
/// The `cdylib` is preferred; the `rlib` is returned when the platform has no
/// dynamic library output.
///
/// ## Errors
///
/// Returns [`GeneratorError::ArtifactBuild`] if cargo cannot be run, the build
/// fails (carrying cargo's stderr), or no library is found afterwards.
#[instrument(skip(options), fields(crate_name = %options.crate_name))]
pub fn build_artifact(output_dir: &Path, options: &EmitOptions) -> Result<PathBuf, GeneratorError> {
    let manifest = output_dir.join("Cargo.toml");
    debug!(manifest = %manifest.display(), "building artifact");

    let output = cargo()
        .args(["build", "--release", "--manifest-path"])
        .arg(&manifest)
        .output()
        .map_err(|e| GeneratorError::ArtifactBuild(format!("failed to run cargo: {e}")))?;

    if !output.status.success() {
        return Err(GeneratorError::ArtifactBuild(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let release = output_dir.join("target").join("release");
    let artifact = library_candidates(&options.lib_name())
        .into_iter()
        .map(|name| release.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            GeneratorError::ArtifactBuild(format!("no library found in {}", release.display()))
        })?;

    info!(artifact = %artifact.display(), "built artifact");
    Ok(artifact)
}

/// A `cargo` invocation, honoring `CARGO` when set.
pub(crate) fn cargo() -> Command {
    Command::new(env::var_os("CARGO").unwrap_or_else(|| "cargo".into()))
}

/// File names a release build of `lib_name` may produce, preferred first.
fn library_candidates(lib_name: &str) -> [String; 2] {
    [
        format!("{}{lib_name}{}", env::consts::DLL_PREFIX, env::consts::DLL_SUFFIX),
        format!("lib{lib_name}.rlib"),
    ]
}

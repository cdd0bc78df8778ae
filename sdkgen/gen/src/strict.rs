//! The strict check, run before a client is declared good.
//!
//! Two stages. Every emitted `.rs` file is parsed first; parse errors and
//! every `compile_error!` invocation (including unsupported-feature markers)
//! are reported verbatim as `<file>: error: <message>`. When that pass is
//! clean the client is written to a scratch directory and type-checked with
//! `cargo check`, whose error lines become diagnostics of the same shape.

use std::path::Path;

use syn::visit::{self, Visit};
use tracing::{debug, instrument};

use crate::artifact::cargo;
use crate::output::{GeneratedClient, write_client};

struct CompileErrors<'a> {
    file: &'a str,
    diagnostics: &'a mut Vec<String>,
}

impl<'ast> Visit<'ast> for CompileErrors<'_> {
    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        if mac.path.is_ident("compile_error") {
            let message = mac
                .parse_body::<syn::LitStr>()
                .map(|lit| lit.value())
                .unwrap_or_else(|_| mac.tokens.to_string());
            self.diagnostics.push(format!("{}: error: {}", self.file, message));
        }
        visit::visit_macro(self, mac);
    }
}

/// Runs both stages, returning one line per diagnostic.
pub fn check(client: &GeneratedClient) -> Vec<String> {
    let diagnostics = syntax_check(client);
    if !diagnostics.is_empty() {
        return diagnostics;
    }
    compile_check(client)
}

/// Parses every `.rs` file of `client` and collects syntax errors and markers.
pub fn syntax_check(client: &GeneratedClient) -> Vec<String> {
    let mut diagnostics = Vec::new();

    for file in client.sources() {
        let name = file.path.display().to_string();
        match syn::parse_file(&file.contents) {
            Ok(parsed) => CompileErrors {
                file: &name,
                diagnostics: &mut diagnostics,
            }
            .visit_file(&parsed),
            Err(e) => diagnostics.push(format!("{name}: error: {e}")),
        }
    }

    diagnostics
}

/// Writes `client` to a scratch directory and runs `cargo check` on it.
///
/// Failing to set up or run cargo is itself reported as a diagnostic.
#[instrument(skip_all, fields(crate_name = %client.crate_name))]
pub fn compile_check(client: &GeneratedClient) -> Vec<String> {
    let scratch = match tempfile::Builder::new().prefix("sdkgen-check-").tempdir() {
        Ok(dir) => dir,
        Err(e) => return vec![format!("cargo: error: failed to create scratch directory: {e}")],
    };
    if let Err(e) = write_client(client, scratch.path()) {
        return vec![format!("cargo: error: {e}")];
    }

    let manifest = scratch.path().join("Cargo.toml");
    debug!(manifest = %manifest.display(), "type-checking generated client");
    let output = match cargo()
        .args(["check", "--quiet", "--message-format", "short", "--manifest-path"])
        .arg(&manifest)
        .output()
    {
        Ok(output) => output,
        Err(e) => return vec![format!("cargo: error: failed to run cargo: {e}")],
    };

    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut diagnostics = cargo_errors(&stderr, scratch.path());
    if !output.status.success() && diagnostics.is_empty() {
        let last = stderr.lines().rev().find(|line| !line.trim().is_empty()).unwrap_or("no output");
        diagnostics.push(format!("cargo: error: cargo check failed: {}", last.trim()));
    }
    diagnostics
}

/// Picks the error lines out of `cargo check --message-format short` output.
///
/// Located errors keep their `file:line:col` prefix with `root` stripped;
/// unlocated ones are attributed to `cargo`. The closing summaries are dropped.
fn cargo_errors(stderr: &str, root: &Path) -> Vec<String> {
    let root = format!("{}/", root.display());

    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("error: could not compile") && !line.starts_with("error: aborting"))
        .filter_map(|line| {
            if line.starts_with("error") {
                Some(format!("cargo: {line}"))
            } else if line.contains(": error:") || line.contains(": error[") {
                Some(line.strip_prefix(root.as_str()).unwrap_or(line).to_string())
            } else {
                None
            }
        })
        .collect()
}

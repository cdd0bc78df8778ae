//! The generated crate's `Cargo.toml`.

use sdkgen_define::SchemaModel;

use crate::options::{EmitOptions, RuntimeDependency};

/// Escapes a value for a TOML basic string.
fn toml_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Renders the manifest of the generated client crate.
///
/// The crate is its own workspace so it builds wherever it is written.
/// Artifact builds add a `cdylib` target; `ui_compat` is recorded under
/// `[package.metadata.sdkgen]`.
pub fn generate_cargo_toml(model: &SchemaModel, options: &EmitOptions) -> String {
    let runtime = match &options.runtime {
        RuntimeDependency::Version(version) => toml_string(version),
        RuntimeDependency::Path(path) => {
            format!("{{ path = {} }}", toml_string(&path.display().to_string()))
        }
    };

    let crate_type = if options.emit_binary_artifact {
        "crate-type = [\"rlib\", \"cdylib\"]\n"
    } else {
        ""
    };

    format!(
        r#"# This file was automatically generated by sdkgen. Do not edit manually.

[package]
name = {name}
version = "0.1.0"
edition = "2024"
description = {description}
publish = false

[lib]
path = "src/lib.rs"
{crate_type}
[dependencies]
chrono = {{ version = "0.4", features = ["serde"] }}
sdkgen-runtime = {runtime}
serde = {{ version = "1.0", features = ["derive"] }}
serde_json = "1.0"

[package.metadata.sdkgen]
schema = {schema}
ui-compat = {ui_compat}

[workspace]
"#,
        name = toml_string(&options.crate_name),
        description = toml_string(&format!("Generated client for the {} API", model.name)),
        schema = toml_string(&model.name),
        ui_compat = options.ui_compat,
    )
}

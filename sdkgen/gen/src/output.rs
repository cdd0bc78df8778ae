//! Output assembly and file writing for generated clients.
//!
//! This module handles the final phase of generation: assembling the pieces
//! from [`crate::codegen`] into complete files, validating and formatting
//! them, applying the marker and strict-check policy, and writing the crate.
//!
//! ## Output Structure
//!
//! ```text
//! <out>/
//! ├── Cargo.toml       # depends on sdkgen-runtime
//! ├── schema.json      # only with `debug`
//! └── src/
//!     ├── lib.rs       # module declarations, API_ROOT, SdkClient
//!     ├── prelude.rs   # re-exports for consumers
//!     └── customer.rs  # one module per entity
//! ```
//!
//! ## Guarantees
//!
//! - Every Rust file is parsed with `syn` before it is kept
//! - Output is formatted with `prettyplease`
//! - Nothing is written when emission fails, and each file is written via
//!   temp file + rename

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::quote;
use sdkgen_define::SchemaModel;
use tracing::{debug, info, instrument, warn};

use crate::artifact::build_artifact;
use crate::cargo_gen::generate_cargo_toml;
use crate::codegen::client::accessor_name;
use crate::codegen::{
    Markers, ModuleDocBuilder, UnsupportedMarker, generate_model_impl, generate_model_struct,
    generate_repository, generate_sdk_client, repository_ident,
};
use crate::errors::{GeneratorError, MappingError};
use crate::naming::{pascal_ident, snake_ident, snake_name};
use crate::options::EmitOptions;
use crate::paths::{EntityPaths, PathTable};
use crate::report::GenerationReport;
use crate::strict;

/// Notice placed at the top of every generated Rust file.
pub const GENERATED_HEADER: &str =
    "// This code was automatically generated by sdkgen. Do not edit manually.";

/// Type names the generated code already uses: prelude exports and the std
/// types entity modules refer to unqualified.
const RESERVED_TYPES: &[&str] = &[
    "String",
    "Vec",
    "Option",
    "Result",
    "Box",
    "API_ROOT",
    "SdkClient",
    "AccessToken",
    "AuthState",
    "Gateway",
    "GatewayConfig",
    "Nullable",
    "SdkError",
    "RequestError",
    "MappingError",
    "ConfigError",
];

/// Crate-root names generated code resolves paths through.
const RESERVED_MODULES: &[&str] = &["prelude", "sdkgen_runtime", "serde", "serde_json", "chrono", "std", "core"];

/// Methods `SdkClient` defines besides the repository accessors.
const CLIENT_METHODS: &[&str] = &["new", "connect", "from_env", "gateway"];

/// One file of a generated crate, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    fn is_rust(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "rs")
    }
}

/// A generated client crate held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedClient {
    pub crate_name: String,
    pub files: Vec<GeneratedFile>,
    /// Unsupported features found, whether or not they were emitted.
    pub markers: Vec<UnsupportedMarker>,
    /// Whether the markers are present in the source as `compile_error!`.
    pub markers_emitted: bool,
}

impl GeneratedClient {
    /// Looks up a file by its relative path, e.g. `"src/lib.rs"`.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    /// The Rust source files.
    pub fn sources(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(|f| f.is_rust())
    }
}

/// Assembles `lib.rs`: crate docs, module declarations, `API_ROOT` and `SdkClient`.
pub fn assemble_lib_rs(model: &SchemaModel, table: &PathTable, options: &EmitOptions) -> TokenStream {
    let intro = format!(" Generated client for the {} API.", model.name);
    let usage = format!(" use {}::prelude::*;", options.lib_name());
    let module_decls = model.entities.iter().map(|entity| {
        let module = snake_ident(&entity.name);
        quote! { pub mod #module; }
    });
    let client = generate_sdk_client(model, table);

    quote! {
        #![doc = #intro]
        //!
        //! ## Quick Start
        //!
        //! ```ignore
        #![doc = #usage]
        //!
        //! let client = SdkClient::connect("http://localhost:3000")?;
        //! ```

        pub mod prelude;

        #(#module_decls)*

        #client
    }
}

/// Assembles `prelude.rs`: every model and repository plus the runtime types
/// callers need.
pub fn assemble_prelude(model: &SchemaModel) -> TokenStream {
    let reexports = model.entities.iter().map(|entity| {
        let module = snake_ident(&entity.name);
        let name = pascal_ident(&entity.name);
        let repo = repository_ident(&entity.name);
        quote! { pub use crate::#module::{#name, #repo}; }
    });

    quote! {
        //! Convenient re-exports for working with the generated client.

        pub use crate::{API_ROOT, SdkClient};

        pub use sdkgen_runtime::{
            AccessToken, AuthState, ConfigError, Gateway, GatewayConfig, MappingError, Nullable,
            RequestError, SdkError,
        };

        #(#reexports)*
    }
}

/// Assembles one entity module: docs, model struct, `Model` impl, repository.
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGen`] if the path table is missing an
/// operation the entity declares.
pub fn assemble_entity_module(
    entity: &sdkgen_define::Entity,
    paths: &EntityPaths,
    markers: &mut Markers,
) -> Result<TokenStream, GeneratorError> {
    let docs = ModuleDocBuilder::new(entity, paths).build();
    let model_struct = generate_model_struct(entity, markers);
    let model_impl = generate_model_impl(entity, paths)?;
    let repository = generate_repository(entity, paths, markers)?;

    Ok(quote! {
        #docs

        #model_struct

        #model_impl

        #repository
    })
}

/// Parses generated tokens as a complete Rust file.
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGen`] if the tokens are not a valid file.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGen(format!("generated code is invalid: {e}")))
}

/// Formats a parsed file and prepends [`GENERATED_HEADER`].
pub fn format_code(file: &syn::File) -> String {
    format!("{GENERATED_HEADER}\n\n{}", prettyplease::unparse(file))
}

fn render(tokens: &TokenStream) -> Result<String, GeneratorError> {
    validate_code(tokens).map(|file| format_code(&file))
}

/// Tracks which schema name claimed each generated identifier.
struct Claims<'a> {
    context: &'a str,
    seen: HashMap<String, String>,
}

impl<'a> Claims<'a> {
    fn new(context: &'a str) -> Self {
        Self {
            context,
            seen: HashMap::new(),
        }
    }

    fn reserve(mut self, names: &[&str], owner: &str) -> Self {
        for name in names {
            self.seen.insert((*name).to_string(), owner.to_string());
        }
        self
    }

    fn claim(&mut self, ident: String, owner: &str) -> Result<(), MappingError> {
        match self.seen.get(&ident) {
            Some(first) => Err(MappingError::IdentifierCollision {
                context: self.context.to_string(),
                first: first.clone(),
                second: owner.to_string(),
                ident,
            }),
            None => {
                self.seen.insert(ident, owner.to_string());
                Ok(())
            }
        }
    }
}

/// Rejects schemas whose names collide once turned into Rust identifiers.
///
/// Covers entity modules, type names (models and repositories, together with
/// the names generated code already uses), `SdkClient` accessors, the fields
/// of each model and the arguments of each custom method.
///
/// ## Errors
///
/// Returns [`MappingError::IdentifierCollision`] for the first clash found.
pub fn check_identifiers(model: &SchemaModel, table: &PathTable) -> Result<(), MappingError> {
    let mut modules = Claims::new("module").reserve(RESERVED_MODULES, "a crate-root path");
    let mut types = Claims::new("type").reserve(RESERVED_TYPES, "a generated or std type");
    let mut accessors = Claims::new("SdkClient method").reserve(CLIENT_METHODS, "SdkClient");

    for entity in &model.entities {
        modules.claim(snake_name(&entity.name), &entity.name)?;
        types.claim(pascal_ident(&entity.name).to_string(), &entity.name)?;
        types.claim(repository_ident(&entity.name).to_string(), &entity.name)?;

        if let Some(paths) = table.entity(&entity.name) {
            accessors.claim(accessor_name(&paths.collection_root), &entity.name)?;
        }

        let context = format!("{} fields", entity.name);
        let mut fields = Claims::new(&context);
        for field in &entity.fields {
            fields.claim(snake_name(&field.name), &field.name)?;
        }

        for method in &entity.methods {
            let context = format!("{}.{} arguments", entity.name, method.name);
            let mut args = Claims::new(&context);
            for arg in &method.accepts {
                let ident = snake_name(&arg.name);
                if ident.starts_with("sdk_") {
                    return Err(MappingError::IdentifierCollision {
                        context: context.clone(),
                        first: "generated locals".to_string(),
                        second: arg.name.clone(),
                        ident,
                    });
                }
                args.claim(ident, &arg.name)?;
            }
        }
    }

    Ok(())
}

/// Renders a client crate from a schema and its path table.
///
/// Unsupported features are collected into the client's marker list. When
/// `include_unsupported_as_errors` is on and any exist, emission fails with
/// [`GeneratorError::UnsupportedFeatures`] unless `force` is set. The strict
/// check (syntax, markers, then `cargo check`) runs last; its failure carries
/// the produced client.
///
/// ## Errors
///
/// Returns a [`GeneratorError`] for invalid options, identifier collisions,
/// invalid generated code, unforced markers or a failed strict check.
#[instrument(skip_all, fields(schema = %model.name))]
pub fn emit(
    model: &SchemaModel,
    table: &PathTable,
    options: &EmitOptions,
) -> Result<GeneratedClient, GeneratorError> {
    options.validate()?;
    check_identifiers(model, table)?;

    let mut markers = Markers::new(options.include_unsupported_as_errors);
    let mut files = vec![
        GeneratedFile::new("Cargo.toml", generate_cargo_toml(model, options)),
        GeneratedFile::new("src/lib.rs", render(&assemble_lib_rs(model, table, options))?),
        GeneratedFile::new("src/prelude.rs", render(&assemble_prelude(model))?),
    ];

    for entity in &model.entities {
        let paths = table.entity(&entity.name).ok_or_else(|| {
            GeneratorError::CodeGen(format!("{} is missing from the path table", entity.name))
        })?;
        let tokens = assemble_entity_module(entity, paths, &mut markers)?;
        let path = format!("src/{}.rs", snake_name(&entity.name));
        debug!(entity = %entity.name, %path, "rendered entity module");
        files.push(GeneratedFile::new(path, render(&tokens)?));
    }

    if options.debug {
        let schema = serde_json::to_string_pretty(&model.source)
            .map_err(|e| GeneratorError::CodeGen(format!("failed to dump schema: {e}")))?;
        files.push(GeneratedFile::new("schema.json", schema));
    }

    let client = GeneratedClient {
        crate_name: options.crate_name.clone(),
        files,
        markers: markers.into_vec(),
        markers_emitted: options.include_unsupported_as_errors,
    };

    for marker in &client.markers {
        warn!(%marker, "unsupported schema feature");
    }

    if options.include_unsupported_as_errors && !client.markers.is_empty() && !options.force {
        return Err(GeneratorError::UnsupportedFeatures {
            markers: client.markers.clone(),
            client: Box::new(client),
        });
    }

    if options.strict_compile_check {
        let diagnostics = strict::check(&client);
        if !diagnostics.is_empty() {
            return Err(GeneratorError::StrictCheckFailed {
                diagnostics,
                client: Box::new(client),
            });
        }
        debug!("strict check passed");
    }

    Ok(client)
}

/// Builds the path table and emits the client in one step.
///
/// ## Errors
///
/// See [`PathTable::build`] and [`emit`].
pub fn generate(model: &SchemaModel, options: &EmitOptions) -> Result<GeneratedClient, GeneratorError> {
    let table = PathTable::build(model)?;
    emit(model, &table, options)
}

/// Writes content to a file atomically.
///
/// The content goes to a hidden sibling first and is renamed into place, so
/// readers never observe a partially written file.
///
/// ## Errors
///
/// Returns [`GeneratorError::WriteError`] naming the path that failed.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error(parent))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.sdkgen-tmp"));

    fs::write(&temp_path, content).map_err(write_error(&temp_path))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(path)(e));
    }
    Ok(())
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> GeneratorError {
    let path = path.display().to_string();
    move |source| GeneratorError::WriteError { path, source }
}

/// Writes every file of `client` below `output_dir`, returning the written paths.
///
/// ## Errors
///
/// Returns [`GeneratorError::WriteError`] on the first file that cannot be written.
pub fn write_client(client: &GeneratedClient, output_dir: &Path) -> Result<Vec<PathBuf>, GeneratorError> {
    client
        .files
        .iter()
        .map(|file| {
            let path = output_dir.join(&file.path);
            write_atomic(&path, &file.contents)?;
            Ok(path)
        })
        .collect()
}

/// Generates a client crate and writes it to `output_dir`.
///
/// A forced run with markers is written like any other. With
/// `emit_binary_artifact` the written crate is then built and the library
/// path recorded in the report.
///
/// ## Errors
///
/// Returns the first [`GeneratorError`]; no file is written unless emission succeeded.
#[instrument(skip_all, fields(output = %output_dir.display()))]
pub fn generate_and_write(
    model: &SchemaModel,
    output_dir: &Path,
    options: &EmitOptions,
) -> Result<GenerationReport, GeneratorError> {
    let table = PathTable::build(model)?;
    let client = emit(model, &table, options)?;
    let files = write_client(&client, output_dir)?;
    info!(files = files.len(), "wrote client crate");

    let artifact = if options.emit_binary_artifact {
        Some(build_artifact(output_dir, options)?)
    } else {
        None
    };

    Ok(GenerationReport {
        output_dir: output_dir.to_path_buf(),
        files,
        markers: client.markers,
        markers_emitted: client.markers_emitted,
        entities: model.entities.len(),
        operations: table.operation_count(),
        artifact,
    })
}

//! Code generation for sdkgen clients.
//!
//! Each submodule renders one piece of a generated client crate as a
//! `proc_macro2::TokenStream`:
//!
//! - [`model_struct`] - the data-model struct and its `Model` impl with routes
//! - [`repository`] - the repository type: standard, relation and custom methods
//! - [`client`] - `API_ROOT` and the `SdkClient` entry point
//! - [`module_docs`] - `//!` documentation for entity modules
//! - [`marker`] - unsupported-feature markers
//! - [`types`] - schema type to Rust type mapping
//!
//! See [`crate::output`] for assembly, validation and writing.

pub mod client;
pub mod marker;
pub mod model_struct;
pub mod module_docs;
pub mod repository;
pub mod types;

pub use client::generate_sdk_client;
pub use marker::{MARKER_PREFIX, Markers, UnsupportedMarker};
pub use model_struct::{generate_model_impl, generate_model_struct};
pub use module_docs::ModuleDocBuilder;
pub use repository::{generate_repository, repository_ident};

//! sdkgen code generator library.
//!
//! Turns a schema description parsed by `sdkgen-define` into a typed REST
//! client crate built on `sdkgen-runtime`. The generated crate contains:
//!
//! - One data-model struct per entity, with nullable fields kept apart from
//!   absent ones and dates normalized to local time
//! - A `Model` impl carrying the ten standard routes as `const` data
//! - A repository per entity with the standard operations, relation
//!   accessors and custom remote methods
//! - `SdkClient`, handing out repositories that share one `Gateway`
//!
//! ## Modules
//!
//! - [`paths`] - the path table: every operation's verb and template
//! - [`codegen`] - token generation for each piece of the client
//! - [`output`] - assembly, marker policy, strict check and file writing
//! - [`cargo_gen`] - the generated crate's `Cargo.toml`
//! - [`artifact`] - optional release build into a loadable library
//! - [`report`] - terminal rendering of results and failures
//! - [`options`] - typed generation options
//! - [`naming`] - case conversion, pluralization and identifier escaping
//! - [`errors`] - error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use sdkgen_define::parse_file;
//! use sdkgen_gen::options::EmitOptions;
//! use sdkgen_gen::output::generate_and_write;
//!
//! let model = parse_file(Path::new("shop.json")).unwrap();
//! let report = generate_and_write(&model, Path::new("sdk-client"), &EmitOptions::default()).unwrap();
//! println!("{}", report.render());
//! ```

pub mod artifact;
pub mod cargo_gen;
pub mod codegen;
pub mod errors;
pub mod naming;
pub mod options;
pub mod output;
pub mod paths;
pub mod report;
pub mod strict;

#[cfg(test)]
mod test_utils;

//! Schema model for `sdkgen`.
//!
//! This crate reads a backend's schema description (JSON or YAML) and turns it
//! into an immutable, validated [`SchemaModel`]. The model is consumed by the
//! `sdkgen` generator to produce typed client crates.
//!
//! ## Core Types
//!
//! - [`SchemaModel`] - the API name, REST root and entities
//! - [`Entity`] - fields, relations and custom remote methods of one record type
//! - [`FieldType`] - primitive, date, nested-entity, array or unrepresentable types
//! - [`Relation`] / [`RelationKind`] - associations between entities
//! - [`CustomMethod`] - backend-declared operations beyond standard CRUD
//!
//! ## Examples
//!
//! ```
//! use sdkgen_define::{parse, SchemaFormat, FieldType};
//!
//! let text = r#"{
//!     "models": [
//!         { "name": "Customer", "properties": [ { "name": "age", "type": "integer?" } ] }
//!     ]
//! }"#;
//!
//! let model = parse(text, SchemaFormat::Json).unwrap();
//! let age = &model.entities[0].fields[0];
//! assert_eq!(age.ty, FieldType::Integer);
//! assert!(age.nullable);
//! ```

pub mod error;
pub mod parse;
pub mod prelude;
pub mod types;

pub use error::ParseError;
pub use parse::{DEFAULT_API_ROOT, SchemaFormat, parse, parse_file};
pub use types::{
    ArgSource, AuthEffect, CustomMethod, Entity, Field, FieldType, MethodArg, MethodReturn,
    Relation, RelationKind, RestMethod, SchemaModel,
};

//! Convenience re-exports for consumers of the schema model.
//!
//! ```
//! use sdkgen_define::prelude::*;
//! ```

pub use crate::error::ParseError;
pub use crate::parse::{SchemaFormat, parse, parse_file};
pub use crate::types::{
    ArgSource, AuthEffect, CustomMethod, Entity, Field, FieldType, MethodArg, MethodReturn,
    Relation, RelationKind, RestMethod, SchemaModel,
};

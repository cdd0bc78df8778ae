use std::path::PathBuf;

use thiserror::Error;

use crate::parse::SchemaFormat;

/// Why a schema description was rejected.
///
/// Parsing is all-or-nothing: the first problem found is reported and no
/// partial model is produced.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {format} schema description: {message}")]
    Malformed { format: SchemaFormat, message: String },

    #[error("{context} has an empty name")]
    EmptyName { context: String },

    #[error("entity '{0}' is declared more than once")]
    DuplicateEntity(String),

    #[error("entity '{entity}' declares {kind} '{name}' more than once")]
    DuplicateMember {
        entity: String,
        kind: &'static str,
        name: String,
    },

    #[error("{entity}.{member} uses undeclared type '{type_name}'")]
    UndeclaredType {
        entity: String,
        member: String,
        type_name: String,
    },

    #[error("relation {entity}.{relation} targets undeclared entity '{target}'")]
    UndeclaredRelationTarget {
        entity: String,
        relation: String,
        target: String,
    },

    #[error("relation {entity}.{relation} has unknown kind '{kind}'")]
    UnknownRelationKind {
        entity: String,
        relation: String,
        kind: String,
    },

    #[error("method {entity}.{method} has unknown HTTP verb '{verb}'")]
    UnknownVerb {
        entity: String,
        method: String,
        verb: String,
    },

    #[error("argument '{arg}' of {entity}.{method} has unknown source '{source_name}'")]
    UnknownArgSource {
        entity: String,
        method: String,
        arg: String,
        source_name: String,
    },

    #[error("method {entity}.{method} has unknown auth effect '{effect}'")]
    UnknownAuthEffect {
        entity: String,
        method: String,
        effect: String,
    },
}

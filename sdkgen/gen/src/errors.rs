//! Error types for the sdkgen generator.

use sdkgen_define::ParseError;
use sdkgen_runtime::Verb;
use thiserror::Error;

use crate::codegen::UnsupportedMarker;
use crate::output::GeneratedClient;

/// A schema name or feature that cannot be turned into a valid route or identifier.
///
/// Always attributed to the offending entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{entity}: {context} '{value}' is not a legal path segment")]
    IllegalSegment {
        entity: String,
        context: &'static str,
        value: String,
    },

    #[error("REST API root '{0}' is not a legal path")]
    IllegalApiRoot(String),

    #[error("entities '{first}' and '{second}' share the collection root '{root}'")]
    DuplicateCollectionRoot {
        root: String,
        first: String,
        second: String,
    },

    #[error("{entity}.{method}: path '{path}' is illegal: {reason}")]
    IllegalMethodPath {
        entity: String,
        method: String,
        path: String,
        reason: String,
    },

    #[error("{entity}.{method}: placeholder ':{placeholder}' is not a declared path argument")]
    UndeclaredPlaceholder {
        entity: String,
        method: String,
        placeholder: String,
    },

    #[error("{entity}.{method}: path argument '{arg}' does not appear in the path")]
    UnusedPathArgument {
        entity: String,
        method: String,
        arg: String,
    },

    #[error("{entity}: operations '{first}' and '{second}' both map to {verb} {template}")]
    DuplicateRoute {
        entity: String,
        verb: Verb,
        template: String,
        first: String,
        second: String,
    },

    #[error("{entity}: more than one operation is named '{name}'")]
    DuplicateMethodName { entity: String, name: String },

    #[error("{context}: '{first}' and '{second}' both become the identifier '{ident}'")]
    IdentifierCollision {
        context: String,
        first: String,
        second: String,
        ident: String,
    },
}

/// Errors that can occur during client generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Unsupported features were found and the run was not forced.
    ///
    /// The produced client is kept for inspection but nothing is written.
    #[error("{} unsupported schema feature(s); rerun with --force to emit anyway", markers.len())]
    UnsupportedFeatures {
        markers: Vec<UnsupportedMarker>,
        client: Box<GeneratedClient>,
    },

    /// The strict check rejected the produced source.
    #[error("strict check failed with {} diagnostic(s)", diagnostics.len())]
    StrictCheckFailed {
        diagnostics: Vec<String>,
        client: Box<GeneratedClient>,
    },

    /// Generated tokens did not form a valid Rust file.
    #[error("code generation failed: {0}")]
    CodeGen(String),

    #[error("failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact build failed: {0}")]
    ArtifactBuild(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

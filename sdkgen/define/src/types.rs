//! Validated schema model types.
//!
//! These are produced by [`crate::parse`] and never mutated afterwards. Every
//! entity reference, relation target and type name inside a [`SchemaModel`]
//! has already been checked against the declared entities.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

/// HTTP methods a remote method may be bound to.
///
/// ## Examples
///
/// ```
/// use sdkgen_define::RestMethod;
/// use std::str::FromStr;
///
/// assert_eq!(RestMethod::from_str("post").unwrap(), RestMethod::Post);
/// assert_eq!(RestMethod::Delete.to_string(), "DELETE");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl RestMethod {
    /// Whether requests with this method usually carry a body.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

/// A complete, validated schema description.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaModel {
    /// Name of the described API.
    pub name: String,
    /// Mount point of the REST API on the backend (e.g. `/api`).
    pub api_root: String,
    /// Entities in declaration order.
    pub entities: Vec<Entity>,
    /// The document as it was read, kept for debug output.
    pub source: Value,
}

impl SchemaModel {
    /// Looks up an entity by its declared name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Whether the schema declares no entities. An empty schema is valid.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// A named record type exposed by the backend as a REST resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    /// Explicit plural used for the collection root, if declared.
    pub plural: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub relations: Vec<Relation>,
    pub methods: Vec<CustomMethod>,
}

/// A data field of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name as it appears on the wire.
    pub name: String,
    pub ty: FieldType,
    /// Whether the field may be `null`.
    pub nullable: bool,
    pub description: Option<String>,
}

/// The type of a field, argument or return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    /// Free-form JSON object.
    Object,
    /// Any JSON value.
    Any,
    /// Nested instance of a declared entity.
    Entity(String),
    Array(Box<FieldType>),
    /// A type the schema language knows but clients cannot represent.
    Unsupported(String),
}

impl FieldType {
    /// The name of the first unrepresentable type inside this type, if any.
    ///
    /// ```
    /// use sdkgen_define::FieldType;
    ///
    /// let ty = FieldType::Array(Box::new(FieldType::Unsupported("geopoint".into())));
    /// assert_eq!(ty.unsupported(), Some("geopoint"));
    /// assert_eq!(FieldType::String.unsupported(), None);
    /// ```
    pub fn unsupported(&self) -> Option<&str> {
        match self {
            Self::Unsupported(name) => Some(name),
            Self::Array(inner) => inner.unsupported(),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::Object => f.write_str("object"),
            Self::Any => f.write_str("any"),
            Self::Entity(name) | Self::Unsupported(name) => f.write_str(name),
            Self::Array(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Relation shapes the schema language can declare.
///
/// Only [`RelationKind::is_supported`] kinds get accessor operations; the
/// rest are carried through so the emitter can mark them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum RelationKind {
    BelongsTo,
    HasMany,
    HasOne,
    HasManyThrough,
    HasAndBelongsToMany,
    EmbedsOne,
    EmbedsMany,
    ReferencesMany,
}

impl RelationKind {
    /// Whether clients can be generated for this relation shape.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::BelongsTo | Self::HasMany | Self::HasOne)
    }
}

/// A named association from one entity to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Accessor name; used verbatim as a path segment.
    pub name: String,
    pub kind: RelationKind,
    /// Declared name of the target entity.
    pub target: String,
    pub foreign_key: String,
}

/// Where a remote method argument travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ArgSource {
    /// Substituted into a `:name` segment of the method path.
    Path,
    Query,
    Body,
}

/// Effect of a remote method on the client's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AuthEffect {
    /// The response is an access token the client stores.
    Login,
    /// On success the client clears its token.
    Logout,
}

/// An argument accepted by a remote method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodArg {
    pub name: String,
    pub ty: FieldType,
    pub source: ArgSource,
}

/// What a remote method returns.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReturn {
    pub ty: FieldType,
    /// Key of a single-key envelope wrapping the value, e.g. `count`.
    pub envelope: Option<String>,
}

/// A backend-declared custom operation beyond the standard CRUD set.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMethod {
    pub name: String,
    pub verb: RestMethod,
    /// Path relative to the entity's collection root, e.g. `/login`.
    pub path: String,
    pub accepts: Vec<MethodArg>,
    /// `None` when the method returns nothing.
    pub returns: Option<MethodReturn>,
    pub auth: Option<AuthEffect>,
    pub description: Option<String>,
}

impl CustomMethod {
    /// Arguments sent from `source`, in declaration order.
    pub fn args_from(&self, source: ArgSource) -> impl Iterator<Item = &MethodArg> {
        self.accepts.iter().filter(move |a| a.source == source)
    }
}

//! Reading schema descriptions into a validated [`SchemaModel`].
//!
//! A document is first decoded into loosely typed raw structs, then every
//! name, type and reference is checked while building the model.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use strum::Display;
use tracing::debug;

use crate::error::ParseError;
use crate::types::{
    ArgSource, AuthEffect, CustomMethod, Entity, Field, FieldType, MethodArg, MethodReturn,
    Relation, RelationKind, RestMethod, SchemaModel,
};

/// API root assumed when a document does not declare `restApiRoot`.
pub const DEFAULT_API_ROOT: &str = "/api";

/// Encoding of a schema description document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SchemaFormat {
    #[strum(serialize = "JSON")]
    Json,
    #[strum(serialize = "YAML")]
    Yaml,
}

impl SchemaFormat {
    /// Picks the format from a file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rest_api_root: Option<String>,
    #[serde(default)]
    models: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    name: String,
    #[serde(default)]
    plural: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    properties: Vec<RawProperty>,
    #[serde(default)]
    relations: Vec<RawRelation>,
    #[serde(default)]
    methods: Vec<RawMethod>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    name: String,
    #[serde(rename = "type")]
    ty: RawType,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    description: Option<String>,
}

/// `"string"`, `"integer?"`, `["Order"]` and so on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawType {
    Name(String),
    List(Vec<RawType>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRelation {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    model: String,
    #[serde(default)]
    foreign_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMethod {
    name: String,
    #[serde(default)]
    http: Option<RawHttp>,
    #[serde(default)]
    accepts: Vec<RawArg>,
    #[serde(default)]
    returns: Option<RawReturns>,
    #[serde(default)]
    auth: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHttp {
    #[serde(default)]
    verb: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArg {
    arg: String,
    #[serde(rename = "type")]
    ty: RawType,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReturns {
    #[serde(rename = "type")]
    ty: RawType,
    #[serde(default)]
    arg: Option<String>,
    #[serde(default)]
    root: bool,
}

/// Parses and validates a schema description.
///
/// ## Examples
///
/// ```
/// use sdkgen_define::{parse, SchemaFormat};
///
/// let model = parse(r#"{ "models": [ { "name": "Customer" } ] }"#, SchemaFormat::Json).unwrap();
/// assert_eq!(model.entities[0].name, "Customer");
/// assert_eq!(model.api_root, "/api");
/// ```
///
/// ## Errors
///
/// Returns a [`ParseError`] describing the first problem found.
pub fn parse(text: &str, format: SchemaFormat) -> Result<SchemaModel, ParseError> {
    let malformed = |message: String| ParseError::Malformed { format, message };

    let document: Value = match format {
        SchemaFormat::Json => serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?,
        SchemaFormat::Yaml => serde_yaml::from_str(text).map_err(|e| malformed(e.to_string()))?,
    };
    let raw: RawSchema =
        serde_json::from_value(document.clone()).map_err(|e| malformed(e.to_string()))?;

    let model = build_model(raw, document)?;
    debug!(
        schema = %model.name,
        entities = model.entities.len(),
        "parsed schema description"
    );
    Ok(model)
}

/// Reads and parses a schema description file, choosing the format by extension.
///
/// ## Errors
///
/// Returns [`ParseError::Io`] if the file cannot be read, otherwise see [`parse`].
pub fn parse_file(path: &Path) -> Result<SchemaModel, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, SchemaFormat::from_path(path))
}

fn build_model(raw: RawSchema, source: Value) -> Result<SchemaModel, ParseError> {
    let mut declared = HashSet::new();
    for entity in &raw.models {
        if entity.name.trim().is_empty() {
            return Err(ParseError::EmptyName {
                context: "an entity".to_string(),
            });
        }
        if !declared.insert(entity.name.as_str()) {
            return Err(ParseError::DuplicateEntity(entity.name.clone()));
        }
    }

    let entities = raw
        .models
        .iter()
        .map(|entity| build_entity(entity, &declared))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SchemaModel {
        name: raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Api".to_string()),
        api_root: raw
            .rest_api_root
            .unwrap_or_else(|| DEFAULT_API_ROOT.to_string()),
        entities,
        source,
    })
}

/// Rejects empty or repeated member names within one entity.
struct MemberNames<'a> {
    entity: &'a str,
    kind: &'static str,
    seen: HashSet<&'a str>,
}

impl<'a> MemberNames<'a> {
    fn new(entity: &'a str, kind: &'static str) -> Self {
        Self {
            entity,
            kind,
            seen: HashSet::new(),
        }
    }

    fn claim(&mut self, name: &'a str) -> Result<(), ParseError> {
        if name.trim().is_empty() {
            return Err(ParseError::EmptyName {
                context: format!("a {} of entity '{}'", self.kind, self.entity),
            });
        }
        if !self.seen.insert(name) {
            return Err(ParseError::DuplicateMember {
                entity: self.entity.to_string(),
                kind: self.kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

fn build_entity(raw: &RawEntity, declared: &HashSet<&str>) -> Result<Entity, ParseError> {
    let entity = raw.name.as_str();

    let mut names = MemberNames::new(entity, "field");
    let mut fields = Vec::with_capacity(raw.properties.len());
    for property in &raw.properties {
        names.claim(&property.name)?;
        let (ty, optional) = resolve_type(&property.ty, declared, entity, &property.name)?;
        fields.push(Field {
            name: property.name.clone(),
            ty,
            nullable: property.nullable || optional,
            description: property.description.clone(),
        });
    }

    let mut names = MemberNames::new(entity, "relation");
    let mut relations = Vec::with_capacity(raw.relations.len());
    for relation in &raw.relations {
        names.claim(&relation.name)?;
        relations.push(build_relation(relation, declared, entity)?);
    }

    let mut names = MemberNames::new(entity, "method");
    let mut methods = Vec::with_capacity(raw.methods.len());
    for method in &raw.methods {
        names.claim(&method.name)?;
        methods.push(build_method(method, declared, entity)?);
    }

    Ok(Entity {
        name: raw.name.clone(),
        plural: raw.plural.clone(),
        description: raw.description.clone(),
        fields,
        relations,
        methods,
    })
}

fn build_relation(
    raw: &RawRelation,
    declared: &HashSet<&str>,
    entity: &str,
) -> Result<Relation, ParseError> {
    let kind = RelationKind::from_str(&raw.kind).map_err(|_| ParseError::UnknownRelationKind {
        entity: entity.to_string(),
        relation: raw.name.clone(),
        kind: raw.kind.clone(),
    })?;

    if !declared.contains(raw.model.as_str()) {
        return Err(ParseError::UndeclaredRelationTarget {
            entity: entity.to_string(),
            relation: raw.name.clone(),
            target: raw.model.clone(),
        });
    }

    let foreign_key = match &raw.foreign_key {
        Some(key) if !key.trim().is_empty() => key.clone(),
        _ => default_foreign_key(kind, &raw.name, entity),
    };

    Ok(Relation {
        name: raw.name.clone(),
        kind,
        target: raw.model.clone(),
        foreign_key,
    })
}

/// `belongsTo customer` → `customerId`; `Customer hasMany orders` → `customerId`.
fn default_foreign_key(kind: RelationKind, relation: &str, entity: &str) -> String {
    let owner = match kind {
        RelationKind::BelongsTo => relation,
        _ => entity,
    };
    let mut chars = owner.chars();
    match chars.next() {
        Some(first) => format!("{}{}Id", first.to_ascii_lowercase(), chars.as_str()),
        None => "id".to_string(),
    }
}

fn build_method(
    raw: &RawMethod,
    declared: &HashSet<&str>,
    entity: &str,
) -> Result<CustomMethod, ParseError> {
    let http = raw.http.as_ref();

    let verb = match http.and_then(|h| h.verb.as_deref()) {
        Some(verb) => RestMethod::from_str(verb).map_err(|_| ParseError::UnknownVerb {
            entity: entity.to_string(),
            method: raw.name.clone(),
            verb: verb.to_string(),
        })?,
        None => RestMethod::Post,
    };

    let path = http
        .and_then(|h| h.path.clone())
        .unwrap_or_else(|| format!("/{}", raw.name));

    let mut names = MemberNames::new(entity, "argument");
    let mut accepts = Vec::with_capacity(raw.accepts.len());
    for arg in &raw.accepts {
        names.claim(&arg.arg)?;
        let member = format!("{}({})", raw.name, arg.arg);
        let (ty, _) = resolve_type(&arg.ty, declared, entity, &member)?;
        let source = match &arg.source {
            Some(source) => ArgSource::from_str(source).map_err(|_| ParseError::UnknownArgSource {
                entity: entity.to_string(),
                method: raw.name.clone(),
                arg: arg.arg.clone(),
                source_name: source.clone(),
            })?,
            None if verb.has_body() => ArgSource::Body,
            None => ArgSource::Query,
        };
        accepts.push(MethodArg {
            name: arg.arg.clone(),
            ty,
            source,
        });
    }

    let returns = raw
        .returns
        .as_ref()
        .map(|r| {
            let member = format!("{}(returns)", raw.name);
            let (ty, _) = resolve_type(&r.ty, declared, entity, &member)?;
            let envelope = if r.root { None } else { r.arg.clone() };
            Ok::<_, ParseError>(MethodReturn { ty, envelope })
        })
        .transpose()?;

    let auth = raw
        .auth
        .as_deref()
        .map(|effect| {
            AuthEffect::from_str(effect).map_err(|_| ParseError::UnknownAuthEffect {
                entity: entity.to_string(),
                method: raw.name.clone(),
                effect: effect.to_string(),
            })
        })
        .transpose()?;

    Ok(CustomMethod {
        name: raw.name.clone(),
        verb,
        path,
        accepts,
        returns,
        auth,
        description: raw.description.clone(),
    })
}

/// Resolves a raw type, returning whether a trailing `?` marked it nullable.
fn resolve_type(
    raw: &RawType,
    declared: &HashSet<&str>,
    entity: &str,
    member: &str,
) -> Result<(FieldType, bool), ParseError> {
    let undeclared = |type_name: String| ParseError::UndeclaredType {
        entity: entity.to_string(),
        member: member.to_string(),
        type_name,
    };

    match raw {
        RawType::Name(name) => {
            let (base, nullable) = match name.trim().strip_suffix('?') {
                Some(base) => (base.trim(), true),
                None => (name.trim(), false),
            };
            // Declared entity names win over the case-insensitive primitive names.
            if declared.contains(base) {
                return Ok((FieldType::Entity(base.to_string()), nullable));
            }
            let ty = match base.to_ascii_lowercase().as_str() {
                "string" => FieldType::String,
                "number" => FieldType::Number,
                "integer" | "int" => FieldType::Integer,
                "boolean" | "bool" => FieldType::Boolean,
                "date" => FieldType::Date,
                "object" => FieldType::Object,
                "any" => FieldType::Any,
                "array" => FieldType::Array(Box::new(FieldType::Any)),
                "geopoint" | "buffer" => FieldType::Unsupported(base.to_string()),
                _ => return Err(undeclared(name.clone())),
            };
            Ok((ty, nullable))
        }
        RawType::List(items) => match items.as_slice() {
            [] => Ok((FieldType::Array(Box::new(FieldType::Any)), false)),
            [item] => {
                let (inner, _) = resolve_type(item, declared, entity, member)?;
                Ok((FieldType::Array(Box::new(inner)), false))
            }
            _ => Err(undeclared(format!("{} element types", items.len()))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(text: &str) -> Result<SchemaModel, ParseError> {
        parse(text, SchemaFormat::Json)
    }

    const SHOP: &str = r#"{
        "name": "Shop",
        "restApiRoot": "/api",
        "models": [
            {
                "name": "Customer",
                "properties": [
                    { "name": "name", "type": "string" },
                    { "name": "age", "type": "integer?" },
                    { "name": "email", "type": "string", "nullable": true },
                    { "name": "tags", "type": ["string"] },
                    { "name": "joined", "type": "date" }
                ],
                "relations": [
                    { "name": "orders", "type": "hasMany", "model": "Order" }
                ],
                "methods": [
                    {
                        "name": "login",
                        "http": { "verb": "post", "path": "/login" },
                        "accepts": [ { "arg": "credentials", "type": "object" } ],
                        "returns": { "type": "object" },
                        "auth": "login"
                    },
                    {
                        "name": "stats",
                        "http": { "verb": "get", "path": "/:id/stats" },
                        "accepts": [
                            { "arg": "id", "type": "string", "source": "path" },
                            { "arg": "since", "type": "date" }
                        ],
                        "returns": { "type": "number", "arg": "total" }
                    }
                ]
            },
            {
                "name": "Order",
                "plural": "Orders",
                "properties": [ { "name": "total", "type": "number" } ],
                "relations": [
                    { "name": "customer", "type": "belongsTo", "model": "Customer" }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_full_document() {
        let model = json(SHOP).unwrap();
        assert_eq!(model.name, "Shop");
        assert_eq!(model.entities.len(), 2);

        let customer = model.entity("Customer").unwrap();
        assert_eq!(customer.fields.len(), 5);
        assert!(!customer.fields[0].nullable);
        assert!(customer.fields[1].nullable);
        assert_eq!(customer.fields[1].ty, FieldType::Integer);
        assert!(customer.fields[2].nullable);
        assert_eq!(
            customer.fields[3].ty,
            FieldType::Array(Box::new(FieldType::String))
        );
        assert_eq!(customer.fields[4].ty, FieldType::Date);
    }

    #[test]
    fn zero_entities_is_valid() {
        let model = json(r#"{ "models": [] }"#).unwrap();
        assert!(model.is_empty());
        let model = json("{}").unwrap();
        assert!(model.is_empty());
        assert_eq!(model.name, "Api");
    }

    #[test]
    fn duplicate_entity_is_rejected() {
        let err = json(r#"{ "models": [ { "name": "A" }, { "name": "A" } ] }"#).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateEntity(name) if name == "A"));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let err = json(
            r#"{ "models": [ { "name": "A", "properties": [
                { "name": "x", "type": "string" }, { "name": "x", "type": "number" }
            ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateMember { kind: "field", .. }));
    }

    #[test]
    fn empty_entity_name_is_rejected() {
        let err = json(r#"{ "models": [ { "name": " " } ] }"#).unwrap_err();
        assert!(matches!(err, ParseError::EmptyName { .. }));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = json(
            r#"{ "models": [ { "name": "A", "properties": [ { "name": "x", "type": "Widget" } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UndeclaredType { type_name, .. } if type_name == "Widget"));
    }

    #[test]
    fn entity_reference_must_match_case() {
        let err = json(
            r#"{ "models": [ { "name": "A", "properties": [ { "name": "b", "type": "a" } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UndeclaredType { .. }));
    }

    #[test]
    fn declared_entity_shadows_primitive_name() {
        let model = json(
            r#"{ "models": [
                { "name": "Date", "properties": [ { "name": "day", "type": "integer" } ] },
                { "name": "Booking", "properties": [
                    { "name": "on", "type": "Date" },
                    { "name": "made", "type": "date" }
                ] }
            ] }"#,
        )
        .unwrap();
        let booking = model.entity("Booking").unwrap();
        assert_eq!(booking.fields[0].ty, FieldType::Entity("Date".to_string()));
        assert_eq!(booking.fields[1].ty, FieldType::Date);
    }

    #[test]
    fn unrepresentable_types_are_carried() {
        let model = json(
            r#"{ "models": [ { "name": "Store", "properties": [ { "name": "location", "type": "geopoint" } ] } ] }"#,
        )
        .unwrap();
        assert_eq!(
            model.entities[0].fields[0].ty,
            FieldType::Unsupported("geopoint".to_string())
        );
    }

    #[test]
    fn relation_target_must_be_declared() {
        let err = json(
            r#"{ "models": [ { "name": "A", "relations": [ { "name": "bs", "type": "hasMany", "model": "B" } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UndeclaredRelationTarget { .. }));
    }

    #[test]
    fn unknown_relation_kind_is_rejected() {
        let err = json(
            r#"{ "models": [ { "name": "A", "relations": [ { "name": "self", "type": "ownsMany", "model": "A" } ] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnknownRelationKind { kind, .. } if kind == "ownsMany"));
    }

    #[test]
    fn foreign_keys_default_by_convention() {
        let model = json(SHOP).unwrap();
        let orders = &model.entity("Customer").unwrap().relations[0];
        assert_eq!(orders.foreign_key, "customerId");
        let customer = &model.entity("Order").unwrap().relations[0];
        assert_eq!(customer.kind, RelationKind::BelongsTo);
        assert_eq!(customer.foreign_key, "customerId");
    }

    #[test]
    fn methods_resolve_sources_and_returns() {
        let model = json(SHOP).unwrap();
        let customer = model.entity("Customer").unwrap();

        let login = &customer.methods[0];
        assert_eq!(login.verb, RestMethod::Post);
        assert_eq!(login.auth, Some(AuthEffect::Login));
        assert_eq!(login.accepts[0].source, ArgSource::Body);

        let stats = &customer.methods[1];
        assert_eq!(stats.verb, RestMethod::Get);
        assert_eq!(stats.accepts[0].source, ArgSource::Path);
        assert_eq!(stats.accepts[1].source, ArgSource::Query);
        let returns = stats.returns.as_ref().unwrap();
        assert_eq!(returns.envelope.as_deref(), Some("total"));
    }

    #[test]
    fn method_http_defaults() {
        let model = json(r#"{ "models": [ { "name": "A", "methods": [ { "name": "ping" } ] } ] }"#)
            .unwrap();
        let ping = &model.entities[0].methods[0];
        assert_eq!(ping.verb, RestMethod::Post);
        assert_eq!(ping.path, "/ping");
        assert!(ping.returns.is_none());
    }

    #[test]
    fn bad_method_vocabulary_is_rejected() {
        let verb = json(
            r#"{ "models": [ { "name": "A", "methods": [ { "name": "m", "http": { "verb": "fetch" } } ] } ] }"#,
        );
        assert!(matches!(verb, Err(ParseError::UnknownVerb { .. })));

        let source = json(
            r#"{ "models": [ { "name": "A", "methods": [ { "name": "m",
                "accepts": [ { "arg": "x", "type": "string", "source": "header" } ] } ] } ] }"#,
        );
        assert!(matches!(source, Err(ParseError::UnknownArgSource { .. })));

        let auth = json(
            r#"{ "models": [ { "name": "A", "methods": [ { "name": "m", "auth": "refresh" } ] } ] }"#,
        );
        assert!(matches!(auth, Err(ParseError::UnknownAuthEffect { .. })));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(json("{ nope"), Err(ParseError::Malformed { .. })));
        assert!(matches!(json("42"), Err(ParseError::Malformed { .. })));
        assert!(matches!(
            json(r#"{ "models": [ { "properties": [] } ] }"#),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn yaml_documents_parse() {
        let text = "
name: Shop
models:
  - name: Customer
    properties:
      - name: name
        type: string
      - name: age
        type: integer?
";
        let model = parse(text, SchemaFormat::Yaml).unwrap();
        assert_eq!(model.entities[0].fields.len(), 2);
        assert!(model.entities[0].fields[1].nullable);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SchemaFormat::from_path(Path::new("a.yml")), SchemaFormat::Yaml);
        assert_eq!(SchemaFormat::from_path(Path::new("a.YAML")), SchemaFormat::Yaml);
        assert_eq!(SchemaFormat::from_path(Path::new("a.json")), SchemaFormat::Json);
        assert_eq!(SchemaFormat::from_path(Path::new("schema")), SchemaFormat::Json);
    }
}

//! Path Table Builder.
//!
//! Derives, once per generation run, the verb and path template of every
//! operation of every entity:
//!
//! - the ten standard operations, by convention from the collection root
//! - relation accessors, from each supported relation's declared name
//! - custom remote methods, verbatim from their declaration
//!
//! The table is validated as it is built: every segment is legal and no two
//! operations of an entity share a name or a (verb, template) pair. The
//! emitter embeds the result as `const` data, so nothing here runs in a
//! generated client.

use std::collections::{HashMap, HashSet};

use sdkgen_define::{ArgSource, CustomMethod, Entity, Relation, RelationKind, RestMethod, SchemaModel};
use sdkgen_runtime::{StandardOperation, Verb};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::errors::MappingError;
use crate::naming::{is_legal_path_segment, is_legal_segment, pluralize, snake_name, to_pascal_case};

/// Repository members that generated operations must not shadow.
const RESERVED_METHODS: &[&str] = &["new", "gateway", "dispatcher"];

/// One accessor generated for a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationAccessor {
    /// `GET /:id/<rel>`; a list for `hasMany`, a single instance otherwise.
    Get,
    /// `POST /:id/<rel>`
    Create,
    /// `PUT /:id/<rel>` (`hasOne`)
    Update,
    /// `DELETE /:id/<rel>`, removing every related instance (`hasMany`)
    Delete,
    /// `DELETE /:id/<rel>` (`hasOne`)
    Destroy,
    /// `GET /:id/<rel>/count`
    Count,
    /// `GET /:id/<rel>/:fk`
    FindById,
    /// `PUT /:id/<rel>/:fk`
    UpdateById,
    /// `DELETE /:id/<rel>/:fk`
    DestroyById,
}

impl RelationAccessor {
    /// Accessors generated for a relation kind; empty for unsupported kinds.
    pub fn for_kind(kind: RelationKind) -> &'static [RelationAccessor] {
        use RelationAccessor::*;
        match kind {
            RelationKind::HasMany => &[Get, Create, Delete, Count, FindById, UpdateById, DestroyById],
            RelationKind::HasOne => &[Get, Create, Update, Destroy],
            RelationKind::BelongsTo => &[Get],
            _ => &[],
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Destroy => "destroy",
            Self::Count => "count",
            Self::FindById => "find_by_id",
            Self::UpdateById => "update_by_id",
            Self::DestroyById => "destroy_by_id",
        }
    }

    fn route(self, root: &str, relation: &str) -> (Verb, String) {
        let base = format!("{root}/:id/{relation}");
        match self {
            Self::Get => (Verb::Get, base),
            Self::Create => (Verb::Post, base),
            Self::Update => (Verb::Put, base),
            Self::Delete | Self::Destroy => (Verb::Delete, base),
            Self::Count => (Verb::Get, format!("{base}/count")),
            Self::FindById => (Verb::Get, format!("{base}/:fk")),
            Self::UpdateById => (Verb::Put, format!("{base}/:fk")),
            Self::DestroyById => (Verb::Delete, format!("{base}/:fk")),
        }
    }

    /// Whether the accessor addresses one related instance by `:fk`.
    pub fn takes_fk(self) -> bool {
        matches!(self, Self::FindById | Self::UpdateById | Self::DestroyById)
    }

    /// Whether the accessor sends a related instance as the body.
    pub fn takes_body(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::UpdateById)
    }
}

/// What an operation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Standard(StandardOperation),
    Relation {
        relation: String,
        accessor: RelationAccessor,
    },
    Custom {
        method: String,
    },
}

/// A resolved operation: generated method name, verb and path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Name of the generated repository method.
    pub method_name: String,
    pub verb: Verb,
    /// Template relative to the API root, e.g. `/Customers/:id/orders`.
    pub template: String,
}

/// All operations of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPaths {
    pub entity: String,
    /// `/` followed by the plural, e.g. `/Customers`.
    pub collection_root: String,
    pub operations: Vec<Operation>,
}

impl EntityPaths {
    /// The mapping for a standard operation.
    pub fn standard(&self, op: StandardOperation) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|o| o.kind == OperationKind::Standard(op))
    }

    /// Accessor operations of the named relation, in generation order.
    pub fn relation_operations<'a>(
        &'a self,
        relation: &'a str,
    ) -> impl Iterator<Item = (RelationAccessor, &'a Operation)> + 'a {
        self.operations.iter().filter_map(move |o| match &o.kind {
            OperationKind::Relation { relation: r, accessor } if r == relation => Some((*accessor, o)),
            _ => None,
        })
    }

    /// The mapping for a custom method.
    pub fn custom(&self, method: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|o| matches!(&o.kind, OperationKind::Custom { method: m } if m == method))
    }
}

/// Every entity's operations, in schema declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTable {
    pub api_root: String,
    pub entities: Vec<EntityPaths>,
}

impl PathTable {
    /// Builds and validates the table for a whole schema.
    ///
    /// ## Errors
    ///
    /// Returns a [`MappingError`] naming the first offending entity.
    pub fn build(model: &SchemaModel) -> Result<Self, MappingError> {
        if !is_legal_api_root(&model.api_root) {
            return Err(MappingError::IllegalApiRoot(model.api_root.clone()));
        }

        let mut roots: HashMap<String, &str> = HashMap::new();
        let mut entities = Vec::with_capacity(model.entities.len());

        for entity in &model.entities {
            let paths = build(entity)?;
            if let Some(first) = roots.insert(paths.collection_root.clone(), &entity.name) {
                return Err(MappingError::DuplicateCollectionRoot {
                    root: paths.collection_root,
                    first: first.to_string(),
                    second: entity.name.clone(),
                });
            }
            entities.push(paths);
        }

        let table = Self {
            api_root: model.api_root.clone(),
            entities,
        };
        debug!(
            entities = table.entities.len(),
            operations = table.operation_count(),
            "built path table"
        );
        Ok(table)
    }

    /// Looks up an entity's operations by declared name.
    pub fn entity(&self, name: &str) -> Option<&EntityPaths> {
        self.entities.iter().find(|e| e.entity == name)
    }

    /// Total number of operations across all entities.
    pub fn operation_count(&self) -> usize {
        self.entities.iter().map(|e| e.operations.len()).sum()
    }
}

fn is_legal_api_root(root: &str) -> bool {
    root.is_empty()
        || root
            .strip_prefix('/')
            .is_some_and(|rest| rest.is_empty() || rest.split('/').all(is_legal_path_segment))
}

/// The collection root of an entity: explicit plural, or the PascalCase name pluralized.
pub fn collection_root(entity: &Entity) -> Result<String, MappingError> {
    if !is_legal_segment(&entity.name) {
        return Err(MappingError::IllegalSegment {
            entity: entity.name.clone(),
            context: "entity name",
            value: entity.name.clone(),
        });
    }

    let plural = match &entity.plural {
        Some(plural) if !is_legal_segment(plural) => {
            return Err(MappingError::IllegalSegment {
                entity: entity.name.clone(),
                context: "plural",
                value: plural.clone(),
            });
        }
        Some(plural) => plural.clone(),
        None => pluralize(&to_pascal_case(&entity.name)),
    };

    Ok(format!("/{plural}"))
}

/// Builds the operations of one entity.
///
/// ## Examples
///
/// ```
/// use sdkgen_define::{parse, SchemaFormat};
/// use sdkgen_gen::paths::build;
/// use sdkgen_runtime::{StandardOperation, Verb};
///
/// let model = parse(r#"{ "models": [ { "name": "Category" } ] }"#, SchemaFormat::Json).unwrap();
/// let paths = build(&model.entities[0]).unwrap();
///
/// let count = paths.standard(StandardOperation::Count).unwrap();
/// assert_eq!(count.verb, Verb::Get);
/// assert_eq!(count.template, "/Categories/count");
/// ```
///
/// ## Errors
///
/// Returns a [`MappingError`] if a name cannot become a legal segment or two
/// operations overlap.
pub fn build(entity: &Entity) -> Result<EntityPaths, MappingError> {
    let root = collection_root(entity)?;
    let mut operations = Vec::new();

    for op in StandardOperation::iter() {
        let (verb, template) = standard_route(op, &root);
        operations.push(Operation {
            kind: OperationKind::Standard(op),
            method_name: op.method_name().to_string(),
            verb,
            template,
        });
    }

    for relation in &entity.relations {
        relation_operations(entity, relation, &root, &mut operations)?;
    }

    for method in &entity.methods {
        operations.push(custom_operation(entity, method, &root)?);
    }

    check_overlaps(&entity.name, &operations)?;

    Ok(EntityPaths {
        entity: entity.name.clone(),
        collection_root: root,
        operations,
    })
}

fn standard_route(op: StandardOperation, root: &str) -> (Verb, String) {
    match op {
        StandardOperation::Create => (Verb::Post, root.to_string()),
        StandardOperation::Upsert => (Verb::Put, root.to_string()),
        StandardOperation::Exists => (Verb::Get, format!("{root}/:id/exists")),
        StandardOperation::FindById => (Verb::Get, format!("{root}/:id")),
        StandardOperation::Find => (Verb::Get, root.to_string()),
        StandardOperation::FindOne => (Verb::Get, format!("{root}/findOne")),
        StandardOperation::UpdateAll => (Verb::Post, format!("{root}/update")),
        StandardOperation::DeleteById => (Verb::Delete, format!("{root}/:id")),
        StandardOperation::Count => (Verb::Get, format!("{root}/count")),
        StandardOperation::UpdateAttributes => (Verb::Put, format!("{root}/:id")),
    }
}

fn relation_operations(
    entity: &Entity,
    relation: &Relation,
    root: &str,
    operations: &mut Vec<Operation>,
) -> Result<(), MappingError> {
    let accessors = RelationAccessor::for_kind(relation.kind);
    if accessors.is_empty() {
        return Ok(());
    }

    if !is_legal_segment(&relation.name) {
        return Err(MappingError::IllegalSegment {
            entity: entity.name.clone(),
            context: "relation name",
            value: relation.name.clone(),
        });
    }

    let suffix = snake_name(&relation.name);
    for &accessor in accessors {
        let (verb, template) = accessor.route(root, &relation.name);
        operations.push(Operation {
            kind: OperationKind::Relation {
                relation: relation.name.clone(),
                accessor,
            },
            method_name: format!("{}_{}", accessor.prefix(), suffix),
            verb,
            template,
        });
    }
    Ok(())
}

fn custom_operation(entity: &Entity, method: &CustomMethod, root: &str) -> Result<Operation, MappingError> {
    let illegal = |reason: String| MappingError::IllegalMethodPath {
        entity: entity.name.clone(),
        method: method.name.clone(),
        path: method.path.clone(),
        reason,
    };

    let Some(rest) = method.path.strip_prefix('/') else {
        return Err(illegal("must start with '/'".to_string()));
    };

    let declared: HashSet<&str> = method
        .args_from(ArgSource::Path)
        .map(|a| a.name.as_str())
        .collect();
    let mut used = HashSet::new();

    if !rest.is_empty() {
        for segment in rest.split('/') {
            match segment.strip_prefix(':') {
                Some(placeholder) if declared.contains(placeholder) => {
                    used.insert(placeholder);
                }
                Some(placeholder) => {
                    return Err(MappingError::UndeclaredPlaceholder {
                        entity: entity.name.clone(),
                        method: method.name.clone(),
                        placeholder: placeholder.to_string(),
                    });
                }
                None if is_legal_path_segment(segment) => {}
                None => return Err(illegal(format!("segment '{segment}' is not allowed"))),
            }
        }
    }

    if let Some(unused) = declared.iter().find(|name| !used.contains(*name)) {
        return Err(MappingError::UnusedPathArgument {
            entity: entity.name.clone(),
            method: method.name.clone(),
            arg: unused.to_string(),
        });
    }

    let template = if rest.is_empty() {
        root.to_string()
    } else {
        format!("{root}{}", method.path)
    };

    Ok(Operation {
        kind: OperationKind::Custom {
            method: method.name.clone(),
        },
        method_name: snake_name(&method.name),
        verb: verb_of(method.verb),
        template,
    })
}

/// The wire verb for a schema-declared HTTP method.
pub fn verb_of(method: RestMethod) -> Verb {
    match method {
        RestMethod::Get => Verb::Get,
        RestMethod::Post => Verb::Post,
        RestMethod::Put => Verb::Put,
        RestMethod::Patch => Verb::Patch,
        RestMethod::Delete => Verb::Delete,
        RestMethod::Head => Verb::Head,
    }
}

/// Templates that differ only in placeholder names address the same route.
fn route_key(verb: Verb, template: &str) -> (Verb, String) {
    let shape = template
        .split('/')
        .map(|segment| if segment.starts_with(':') { ":" } else { segment })
        .collect::<Vec<_>>()
        .join("/");
    (verb, shape)
}

fn check_overlaps(entity: &str, operations: &[Operation]) -> Result<(), MappingError> {
    let mut names: HashSet<&str> = RESERVED_METHODS.iter().copied().collect();
    let mut routes: HashMap<(Verb, String), &str> = HashMap::new();

    for op in operations {
        if !names.insert(&op.method_name) {
            return Err(MappingError::DuplicateMethodName {
                entity: entity.to_string(),
                name: op.method_name.clone(),
            });
        }
        if let Some(first) = routes.insert(route_key(op.verb, &op.template), &op.method_name) {
            return Err(MappingError::DuplicateRoute {
                entity: entity.to_string(),
                verb: op.verb,
                template: op.template.clone(),
                first: first.to_string(),
                second: op.method_name.clone(),
            });
        }
    }
    Ok(())
}

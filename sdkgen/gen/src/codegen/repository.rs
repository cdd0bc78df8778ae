//! Repository types: the per-entity surface callers use.
//!
//! A repository wraps a `Dispatcher` for the ten standard operations and
//! calls the gateway directly for relation accessors and custom methods.
//! Every non-standard route is an associated `const`.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use sdkgen_define::{ArgSource, AuthEffect, CustomMethod, Entity, Relation, RelationKind};

use crate::codegen::marker::Markers;
use crate::codegen::model_struct::route_tokens;
use crate::codegen::types::{entity_path, owned_type, param_type};
use crate::errors::GeneratorError;
use crate::naming::{const_ident, pascal_ident, snake_ident};
use crate::paths::{EntityPaths, Operation, RelationAccessor};

/// Name of the repository type for an entity.
pub fn repository_ident(entity: &str) -> Ident {
    format_ident!("{}Repository", pascal_ident(entity))
}

/// Generates the repository struct and its impl.
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGen`] if a declared relation or method has
/// no entry in `paths`.
pub fn generate_repository(
    entity: &Entity,
    paths: &EntityPaths,
    markers: &mut Markers,
) -> Result<TokenStream, GeneratorError> {
    let model = pascal_ident(&entity.name);
    let repo = repository_ident(&entity.name);
    let doc = format!(
        " Operations on `{}` at `{}`.",
        entity.name, paths.collection_root
    );

    let mut consts = Vec::new();
    let mut methods = Vec::new();

    for relation in &entity.relations {
        if !relation.kind.is_supported() {
            methods.push(markers.flag(
                &entity.name,
                &relation.name,
                format!("relation kind {} is not supported", relation.kind),
            ));
            continue;
        }

        let accessors: Vec<_> = paths.relation_operations(&relation.name).collect();
        if accessors.is_empty() {
            return Err(GeneratorError::CodeGen(format!(
                "{}.{} has no accessor mappings",
                entity.name, relation.name
            )));
        }
        for (accessor, op) in accessors {
            consts.push(route_const(op));
            methods.push(relation_method(entity, relation, accessor, op));
        }
    }

    for method in &entity.methods {
        let op = paths.custom(&method.name).ok_or_else(|| {
            GeneratorError::CodeGen(format!("{}.{} has no mapping", entity.name, method.name))
        })?;
        match custom_method(entity, method, op) {
            Ok(tokens) => {
                consts.push(route_const(op));
                methods.push(tokens);
            }
            Err(description) => methods.push(markers.flag(&entity.name, &method.name, description)),
        }
    }

    let standard = standard_methods(&model);

    Ok(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone)]
        pub struct #repo {
            dispatcher: sdkgen_runtime::Dispatcher<#model>,
        }

        impl #repo {
            #(#consts)*

            /// Creates a repository bound to `gateway`.
            pub fn new(gateway: sdkgen_runtime::Gateway) -> Self {
                Self {
                    dispatcher: sdkgen_runtime::Dispatcher::new(gateway),
                }
            }

            /// The gateway requests are routed through.
            pub fn gateway(&self) -> &sdkgen_runtime::Gateway {
                self.dispatcher.gateway()
            }

            /// The generic dispatcher behind the standard operations.
            pub fn dispatcher(&self) -> &sdkgen_runtime::Dispatcher<#model> {
                &self.dispatcher
            }

            #standard

            #(#methods)*
        }
    })
}

fn route_const(op: &Operation) -> TokenStream {
    let name = const_ident(&op.method_name);
    let route = route_tokens(op.verb, &op.template);
    quote! {
        const #name: sdkgen_runtime::Route = #route;
    }
}

/// The ten standard operations, forwarded to the dispatcher.
fn standard_methods(model: &Ident) -> TokenStream {
    quote! {
        /// Creates a new instance.
        pub async fn create(&self, instance: &#model) -> Result<#model, sdkgen_runtime::SdkError> {
            self.dispatcher.create(instance).await
        }

        /// Creates or replaces an instance.
        pub async fn upsert(&self, instance: &#model) -> Result<#model, sdkgen_runtime::SdkError> {
            self.dispatcher.upsert(instance).await
        }

        /// Checks whether an instance with `id` exists.
        pub async fn exists(&self, id: &str) -> Result<bool, sdkgen_runtime::SdkError> {
            self.dispatcher.exists(id).await
        }

        /// Fetches the instance with `id`.
        pub async fn find_by_id(&self, id: &str) -> Result<#model, sdkgen_runtime::SdkError> {
            self.dispatcher.find_by_id(id).await
        }

        /// Fetches every instance matching `filter`.
        pub async fn find(&self, filter: &str) -> Result<Vec<#model>, sdkgen_runtime::SdkError> {
            self.dispatcher.find(filter).await
        }

        /// Fetches the first instance matching `filter`, if any.
        pub async fn find_one(&self, filter: &str) -> Result<Option<#model>, sdkgen_runtime::SdkError> {
            self.dispatcher.find_one(filter).await
        }

        /// Applies `data` to every instance matching `where_clause`.
        pub async fn update_all(&self, where_clause: &str, data: &#model) -> Result<(), sdkgen_runtime::SdkError> {
            self.dispatcher.update_all(where_clause, data).await
        }

        /// Deletes the instance with `id`.
        pub async fn delete_by_id(&self, id: &str) -> Result<(), sdkgen_runtime::SdkError> {
            self.dispatcher.delete_by_id(id).await
        }

        /// Counts instances matching `where_clause`.
        pub async fn count(&self, where_clause: &str) -> Result<u64, sdkgen_runtime::SdkError> {
            self.dispatcher.count(where_clause).await
        }

        /// Updates the attributes of the instance with `id`.
        pub async fn update_attributes(&self, id: &str, instance: &#model) -> Result<#model, sdkgen_runtime::SdkError> {
            self.dispatcher.update_attributes(id, instance).await
        }
    }
}

fn relation_method(
    entity: &Entity,
    relation: &Relation,
    accessor: RelationAccessor,
    op: &Operation,
) -> TokenStream {
    let name = snake_ident(&op.method_name);
    let route = const_ident(&op.method_name);
    let target = entity_path(&relation.target);
    let doc = format!(
        " `{} {}` ({} `{}`).",
        op.verb, op.template, relation.kind, relation.name
    );

    let fk = accessor.takes_fk().then(|| quote! { fk: &str, });
    let params = if accessor.takes_fk() {
        quote! { &[("id", id), ("fk", fk)] }
    } else {
        quote! { &[("id", id)] }
    };

    match accessor {
        RelationAccessor::Get if relation.kind == RelationKind::HasMany => quote! {
            #[doc = #doc]
            pub async fn #name(&self, id: &str, filter: &str) -> Result<Vec<#target>, sdkgen_runtime::SdkError> {
                self.gateway()
                    .invoke(&Self::#route, #params, None, &[(sdkgen_runtime::dispatcher::FILTER_PARAM, filter)])
                    .await
            }
        },
        RelationAccessor::Get | RelationAccessor::FindById => quote! {
            #[doc = #doc]
            pub async fn #name(&self, id: &str, #fk) -> Result<#target, sdkgen_runtime::SdkError> {
                self.gateway().invoke(&Self::#route, #params, None, &[]).await
            }
        },
        RelationAccessor::Create | RelationAccessor::Update | RelationAccessor::UpdateById => quote! {
            #[doc = #doc]
            pub async fn #name(&self, id: &str, #fk instance: &#target) -> Result<#target, sdkgen_runtime::SdkError> {
                let sdk_body = sdkgen_runtime::convert::to_body(instance)?;
                self.gateway().invoke(&Self::#route, #params, Some(sdk_body), &[]).await
            }
        },
        RelationAccessor::Delete | RelationAccessor::Destroy | RelationAccessor::DestroyById => quote! {
            #[doc = #doc]
            pub async fn #name(&self, id: &str, #fk) -> Result<(), sdkgen_runtime::SdkError> {
                self.gateway().invoke_unit(&Self::#route, #params, None, &[]).await
            }
        },
        RelationAccessor::Count => {
            let label = format!("{}.{}", entity.name, op.method_name);
            quote! {
                #[doc = #doc]
                pub async fn #name(&self, id: &str, where_clause: &str) -> Result<u64, sdkgen_runtime::SdkError> {
                    let sdk_envelope = self
                        .gateway()
                        .invoke_value(&Self::#route, #params, None, &[(sdkgen_runtime::dispatcher::WHERE_PARAM, where_clause)])
                        .await?;
                    Ok(sdkgen_runtime::convert::envelope_u64(sdk_envelope, "count", #label)?)
                }
            }
        }
    }
}

/// Generates a custom method, or describes why it cannot be represented.
fn custom_method(entity: &Entity, method: &CustomMethod, op: &Operation) -> Result<TokenStream, String> {
    let unrepresentable = |what: String, ty: &str| format!("{what} has type {ty}, which cannot be represented");

    let mut params = Vec::new();
    let mut encode = Vec::new();
    let mut path_pairs = Vec::new();
    let mut query_pairs = Vec::new();
    let mut body_args = Vec::new();

    for arg in &method.accepts {
        let ty = param_type(&arg.ty).ok_or_else(|| {
            unrepresentable(format!("argument '{}'", arg.name), &arg.ty.to_string())
        })?;
        let ident = snake_ident(&arg.name);
        let wire = &arg.name;
        params.push(quote! { #ident: #ty });

        match arg.source {
            ArgSource::Path | ArgSource::Query => {
                encode.push(quote! {
                    let #ident = sdkgen_runtime::convert::to_query(&#ident)?;
                });
                let pair = quote! { (#wire, #ident.as_str()) };
                if arg.source == ArgSource::Path {
                    path_pairs.push(pair);
                } else {
                    query_pairs.push(pair);
                }
            }
            ArgSource::Body => body_args.push((wire, ident)),
        }
    }

    let (build_body, body) = match body_args.as_slice() {
        [] => (TokenStream::new(), quote! { None }),
        [(_, ident)] => (
            quote! { let sdk_body = sdkgen_runtime::convert::to_body(&#ident)?; },
            quote! { Some(sdk_body) },
        ),
        many => {
            let inserts = many.iter().map(|(wire, ident)| {
                quote! { sdk_body.insert(#wire.to_string(), sdkgen_runtime::convert::to_body(&#ident)?); }
            });
            (
                quote! {
                    let mut sdk_body = serde_json::Map::new();
                    #(#inserts)*
                },
                quote! { Some(serde_json::Value::Object(sdk_body)) },
            )
        }
    };

    let name = snake_ident(&op.method_name);
    let route = const_ident(&op.method_name);
    let doc = match &method.description {
        Some(description) => format!(" {description}"),
        None => format!(" `{} {}`.", op.verb, op.template),
    };
    let path = quote! { &[#(#path_pairs),*] };
    let query = quote! { &[#(#query_pairs),*] };

    let (returns, call) = match (method.auth, &method.returns) {
        (Some(AuthEffect::Login), _) => (
            quote! { sdkgen_runtime::AccessToken },
            quote! { self.gateway().authenticate(&Self::#route, #path, #body, #query).await },
        ),
        (Some(AuthEffect::Logout), _) => (
            quote! { () },
            quote! { self.gateway().end_session(&Self::#route, #path, #body, #query).await },
        ),
        (None, None) => (
            quote! { () },
            quote! { self.gateway().invoke_unit(&Self::#route, #path, #body, #query).await },
        ),
        (None, Some(ret)) => {
            let ty = owned_type(&ret.ty)
                .ok_or_else(|| unrepresentable("the return value".to_string(), &ret.ty.to_string()))?;
            let call = match &ret.envelope {
                Some(key) => {
                    let label = format!("{}.{}", entity.name, method.name);
                    quote! {
                        let sdk_envelope = self.gateway().invoke_value(&Self::#route, #path, #body, #query).await?;
                        let sdk_value = sdkgen_runtime::convert::unwrap_envelope(sdk_envelope, #key, #label)?;
                        Ok(sdkgen_runtime::convert::from_value(sdk_value)?)
                    }
                }
                None => quote! { self.gateway().invoke(&Self::#route, #path, #body, #query).await },
            };
            (ty, call)
        }
    };

    Ok(quote! {
        #[doc = #doc]
        pub async fn #name(&self, #(#params),*) -> Result<#returns, sdkgen_runtime::SdkError> {
            #(#encode)*
            #build_body
            #call
        }
    })
}

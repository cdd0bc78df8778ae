//! The data-model struct of an entity and its `Model` impl.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use sdkgen_define::{Entity, Field, FieldType};
use sdkgen_runtime::{StandardOperation, Verb};
use strum::IntoEnumIterator;

use crate::codegen::marker::Markers;
use crate::codegen::types::field_type;
use crate::errors::GeneratorError;
use crate::naming::{pascal_ident, snake_ident, snake_name};
use crate::paths::EntityPaths;

/// `sdkgen_runtime::Verb::Get` and so on.
pub fn verb_tokens(verb: Verb) -> TokenStream {
    let variant = match verb {
        Verb::Get => quote! { Get },
        Verb::Post => quote! { Post },
        Verb::Put => quote! { Put },
        Verb::Patch => quote! { Patch },
        Verb::Delete => quote! { Delete },
        Verb::Head => quote! { Head },
    };
    quote! { sdkgen_runtime::Verb::#variant }
}

/// `sdkgen_runtime::Route::new(<verb>, "<template>")`.
pub fn route_tokens(verb: Verb, template: &str) -> TokenStream {
    let verb = verb_tokens(verb);
    quote! { sdkgen_runtime::Route::new(#verb, #template) }
}

/// Generates the model struct, with markers for unrepresentable fields
/// placed directly above it.
pub fn generate_model_struct(entity: &Entity, markers: &mut Markers) -> TokenStream {
    let name = pascal_ident(&entity.name);
    let mut omitted = TokenStream::new();
    let mut fields = Vec::with_capacity(entity.fields.len());

    for field in &entity.fields {
        match field_type(&field.ty, field.nullable) {
            Some(ty) => fields.push(generate_field(field, ty)),
            None => omitted.extend(markers.flag(
                &entity.name,
                &field.name,
                format!("field type {} cannot be represented", field.ty),
            )),
        }
    }

    let doc = match &entity.description {
        Some(description) => format!(" {description}"),
        None => format!(" A `{}` instance.", entity.name),
    };

    quote! {
        #omitted

        #[doc = #doc]
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct #name {
            #(#fields)*
        }
    }
}

fn generate_field(field: &Field, ty: TokenStream) -> TokenStream {
    let ident = snake_ident(&field.name);
    let rename = (snake_name(&field.name) != field.name).then(|| {
        let wire = &field.name;
        quote! { rename = #wire, }
    });
    let doc = field
        .description
        .as_ref()
        .map(|d| {
            let d = format!(" {d}");
            quote! { #[doc = #d] }
        });

    let codec = date_codec(&field.ty, field.nullable);
    let with = codec.map(|path| quote! { with = #path, });

    if field.nullable {
        return quote! {
            #doc
            #[serde(#rename default, #with skip_serializing_if = "sdkgen_runtime::Nullable::is_absent")]
            pub #ident: sdkgen_runtime::Nullable<#ty>,
        };
    }

    if let Some(path) = codec {
        return quote! {
            #doc
            #[serde(#rename default, with = #path)]
            pub #ident: #ty,
        };
    }

    // Nested entities are optional so self-referencing models terminate.
    if matches!(field.ty, FieldType::Entity(_)) {
        return quote! {
            #doc
            #[serde(#rename default, skip_serializing_if = "Option::is_none")]
            pub #ident: #ty,
        };
    }

    quote! {
        #doc
        #[serde(#rename default, deserialize_with = "sdkgen_runtime::convert::null_as_default")]
        pub #ident: #ty,
    }
}

/// The lenient date codec for a date or date-array field, if any.
fn date_codec(ty: &FieldType, nullable: bool) -> Option<&'static str> {
    let path = match (ty, nullable) {
        (FieldType::Date, false) => "sdkgen_runtime::convert::local_datetime",
        (FieldType::Date, true) => "sdkgen_runtime::convert::nullable_local_datetime",
        (FieldType::Array(inner), false) if **inner == FieldType::Date => "sdkgen_runtime::convert::local_datetime_vec",
        (FieldType::Array(inner), true) if **inner == FieldType::Date => {
            "sdkgen_runtime::convert::nullable_local_datetime_vec"
        }
        _ => return None,
    };
    Some(path)
}

/// Generates `impl Model`, embedding the ten standard routes as `const` data.
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGen`] if the path table lacks a standard operation.
pub fn generate_model_impl(entity: &Entity, paths: &EntityPaths) -> Result<TokenStream, GeneratorError> {
    let name = pascal_ident(&entity.name);
    let entity_name = &entity.name;

    let routes = StandardOperation::iter()
        .map(|op| {
            let operation = paths.standard(op).ok_or_else(|| {
                GeneratorError::CodeGen(format!("{entity_name} has no mapping for {op}"))
            })?;
            let field = format_ident!("{}", op.method_name());
            let route = route_tokens(operation.verb, &operation.template);
            Ok(quote! { #field: #route })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    Ok(quote! {
        impl sdkgen_runtime::Model for #name {
            const NAME: &'static str = #entity_name;
            const ROUTES: sdkgen_runtime::StandardRoutes = sdkgen_runtime::StandardRoutes {
                #(#routes),*
            };
        }
    })
}

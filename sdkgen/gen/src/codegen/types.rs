//! Mapping schema types to Rust types.
//!
//! `None` means the type cannot be represented and the caller must place an
//! unsupported-feature marker instead.

use proc_macro2::TokenStream;
use quote::quote;
use sdkgen_define::FieldType;

use crate::naming::{pascal_ident, snake_ident};

/// Path of the generated model type for an entity, e.g. `crate::order::Order`.
pub fn entity_path(entity: &str) -> TokenStream {
    let module = snake_ident(entity);
    let name = pascal_ident(entity);
    quote! { crate::#module::#name }
}

/// An owned value of `ty`, as returned from calls and held in arrays.
pub fn owned_type(ty: &FieldType) -> Option<TokenStream> {
    let tokens = match ty {
        FieldType::String => quote! { String },
        FieldType::Number => quote! { f64 },
        FieldType::Integer => quote! { i64 },
        FieldType::Boolean => quote! { bool },
        FieldType::Date => quote! { chrono::DateTime<chrono::Local> },
        FieldType::Object => quote! { serde_json::Map<String, serde_json::Value> },
        FieldType::Any => quote! { serde_json::Value },
        FieldType::Entity(name) => entity_path(name),
        FieldType::Array(inner) => {
            let inner = owned_type(inner)?;
            quote! { Vec<#inner> }
        }
        FieldType::Unsupported(_) => return None,
    };
    Some(tokens)
}

/// A model field of `ty`.
///
/// Nested entities are boxed so models may refer to themselves. A
/// non-nullable nested entity is also optional: a `Default` that built the
/// nested value would recurse forever on a self-referencing model.
pub fn field_type(ty: &FieldType, nullable: bool) -> Option<TokenStream> {
    match ty {
        FieldType::Entity(name) => {
            let path = entity_path(name);
            if nullable {
                Some(quote! { Box<#path> })
            } else {
                Some(quote! { Option<Box<#path>> })
            }
        }
        other => owned_type(other),
    }
}

/// A method parameter of `ty`: scalars by value, everything else borrowed.
pub fn param_type(ty: &FieldType) -> Option<TokenStream> {
    match ty {
        FieldType::String => Some(quote! { &str }),
        FieldType::Number | FieldType::Integer | FieldType::Boolean => owned_type(ty),
        FieldType::Array(inner) => {
            let inner = owned_type(inner)?;
            Some(quote! { &[#inner] })
        }
        other => {
            let owned = owned_type(other)?;
            Some(quote! { &#owned })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tokens: Option<TokenStream>) -> String {
        tokens.map(|t| t.to_string()).unwrap_or_default()
    }

    #[test]
    fn primitives_and_dates() {
        assert_eq!(text(owned_type(&FieldType::Integer)), "i64");
        assert!(text(owned_type(&FieldType::Date)).contains("DateTime"));
        assert_eq!(text(param_type(&FieldType::String)), "& str");
    }

    #[test]
    fn nested_entities_are_boxed_in_fields_only() {
        let ty = FieldType::Entity("OrderItem".to_string());
        assert_eq!(
            text(field_type(&ty, false)),
            "Option < Box < crate :: order_item :: OrderItem > >"
        );
        assert_eq!(text(field_type(&ty, true)), "Box < crate :: order_item :: OrderItem >");
        assert_eq!(text(owned_type(&ty)), "crate :: order_item :: OrderItem");
        let list = FieldType::Array(Box::new(ty));
        assert_eq!(text(field_type(&list, false)), "Vec < crate :: order_item :: OrderItem >");
    }

    #[test]
    fn unsupported_types_have_no_mapping() {
        let ty = FieldType::Array(Box::new(FieldType::Unsupported("buffer".into())));
        assert!(owned_type(&ty).is_none());
        assert!(param_type(&ty).is_none());
    }
}

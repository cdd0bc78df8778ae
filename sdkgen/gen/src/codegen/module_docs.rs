//! Module-level documentation for generated entity modules.

use proc_macro2::TokenStream;
use quote::quote;
use sdkgen_define::Entity;

use crate::paths::EntityPaths;

/// Builds the `//!` documentation of an entity module: an introduction, the
/// field list and a route table.
pub struct ModuleDocBuilder<'a> {
    entity: &'a Entity,
    paths: &'a EntityPaths,
}

impl<'a> ModuleDocBuilder<'a> {
    pub fn new(entity: &'a Entity, paths: &'a EntityPaths) -> Self {
        Self { entity, paths }
    }

    /// The documentation as `#![doc = ...]` attributes, one per line so the
    /// formatter renders plain `//!` comments.
    pub fn build(&self) -> TokenStream {
        let sections = [self.intro_paragraph(), self.fields_section(), self.routes_section()];
        let text = sections.join("\n\n");
        let lines = text.lines();

        quote! {
            #(#![doc = #lines])*
        }
    }

    fn intro_paragraph(&self) -> String {
        let name = &self.entity.name;
        match &self.entity.description {
            Some(description) => format!(" `{name}` entity.\n\n {description}"),
            None => format!(" `{name}` entity."),
        }
    }

    fn fields_section(&self) -> String {
        if self.entity.fields.is_empty() {
            return " ## Fields\n\n No declared fields.".to_string();
        }
        let lines: Vec<String> = self
            .entity
            .fields
            .iter()
            .map(|f| {
                let nullable = if f.nullable { ", nullable" } else { "" };
                format!(" - `{}`: {}{}", f.name, f.ty, nullable)
            })
            .collect();
        format!(" ## Fields\n\n{}", lines.join("\n"))
    }

    fn routes_section(&self) -> String {
        let rows: Vec<String> = self
            .paths
            .operations
            .iter()
            .map(|op| format!(" | `{}` | {} | `{}` |", op.method_name, op.verb, op.template))
            .collect();
        format!(
            " ## Routes\n\n | Method | Verb | Path |\n |--------|------|------|\n{}",
            rows.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::build;
    use crate::test_utils::{SHOP, format_tokens, model};

    #[test]
    fn docs_list_fields_and_routes() {
        let shop = model(SHOP);
        let customer = &shop.entities[0];
        let paths = build(customer).unwrap();
        let docs = ModuleDocBuilder::new(customer, &paths).build().to_string();

        assert!(docs.contains("A registered buyer."));
        assert!(docs.contains("`age`: integer, nullable"));
        assert!(docs.contains("| `find_one` | GET | `/Customers/findOne` |"));
        assert!(docs.contains("| `login` | POST | `/Customers/login` |"));
    }

    #[test]
    fn docs_render_as_line_comments() {
        let shop = model(SHOP);
        let customer = &shop.entities[0];
        let paths = build(customer).unwrap();
        let code = format_tokens(&ModuleDocBuilder::new(customer, &paths).build());

        assert!(!code.contains("/*!"));
        assert!(code.contains("//! ## Fields"));
        assert!(code.contains("//! | Method | Verb | Path |"));
        assert!(code.lines().all(|line| line.starts_with("//!")), "{code}");
    }
}

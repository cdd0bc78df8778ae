//! Shared fixtures for sdkgen-gen unit tests.

use proc_macro2::TokenStream;
use sdkgen_define::{Entity, SchemaFormat, SchemaModel, parse};

/// Parses a JSON schema description, panicking on failure.
pub fn model(text: &str) -> SchemaModel {
    parse(text, SchemaFormat::Json).expect("fixture schema should parse")
}

/// The first entity of a JSON schema description.
pub fn first_entity(text: &str) -> Entity {
    model(text).entities.remove(0)
}

/// Formats tokens with prettyplease so assertions read like source.
pub fn format_tokens(tokens: &TokenStream) -> String {
    let file = syn::parse2::<syn::File>(tokens.clone()).expect("generated tokens should parse");
    prettyplease::unparse(&file)
}

/// A two-entity shop used across emitter tests.
pub const SHOP: &str = r#"{
    "name": "Shop",
    "models": [
        {
            "name": "Customer",
            "description": "A registered buyer.",
            "properties": [
                { "name": "name", "type": "string" },
                { "name": "age", "type": "integer?" },
                { "name": "firstName", "type": "string" },
                { "name": "joined", "type": "date" },
                { "name": "tags", "type": ["string"] }
            ],
            "relations": [
                { "name": "orders", "type": "hasMany", "model": "Order" },
                { "name": "profile", "type": "hasOne", "model": "Order" }
            ],
            "methods": [
                {
                    "name": "login",
                    "http": { "verb": "post", "path": "/login" },
                    "accepts": [ { "arg": "credentials", "type": "object" } ],
                    "auth": "login"
                },
                {
                    "name": "logout",
                    "http": { "verb": "post", "path": "/logout" },
                    "auth": "logout"
                },
                {
                    "name": "spent",
                    "http": { "verb": "get", "path": "/:id/spent" },
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
            "properties": [
                { "name": "total", "type": "number" },
                { "name": "buyer", "type": "Customer?" }
            ],
            "relations": [
                { "name": "customer", "type": "belongsTo", "model": "Customer" }
            ]
        }
    ]
}"#;

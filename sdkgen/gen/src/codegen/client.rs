//! The `SdkClient` entry point placed in the generated `lib.rs`.

use proc_macro2::TokenStream;
use quote::quote;
use sdkgen_define::SchemaModel;

use crate::codegen::repository::repository_ident;
use crate::naming::{snake_ident, snake_name};
use crate::paths::PathTable;

/// Generates `API_ROOT` and `SdkClient`, with one repository accessor per entity.
///
/// Accessors are named after the snake-cased collection, e.g. `customers()`.
pub fn generate_sdk_client(model: &SchemaModel, table: &PathTable) -> TokenStream {
    let api_root = &table.api_root;
    let client_doc = format!(" Client for the {} API.", model.name);

    let accessors = table.entities.iter().map(|paths| {
        let module = snake_ident(&paths.entity);
        let repo = repository_ident(&paths.entity);
        let accessor = snake_ident(&accessor_name(&paths.collection_root));
        let doc = format!(" Repository for `{}`.", paths.entity);
        quote! {
            #[doc = #doc]
            pub fn #accessor(&self) -> crate::#module::#repo {
                crate::#module::#repo::new(self.gateway.clone())
            }
        }
    });

    quote! {
        /// Mount point of the REST API on the backend.
        pub const API_ROOT: &str = #api_root;

        #[doc = #client_doc]
        ///
        /// Every repository handed out shares this client's gateway, so base
        /// URL, timeout and access token are configured in one place.
        #[derive(Debug, Clone)]
        pub struct SdkClient {
            gateway: sdkgen_runtime::Gateway,
        }

        impl SdkClient {
            /// Wraps an existing gateway.
            pub fn new(gateway: sdkgen_runtime::Gateway) -> Self {
                Self { gateway }
            }

            /// Connects to `host` (e.g. `http://localhost:3000`), appending [`API_ROOT`].
            pub fn connect(host: &str) -> Result<Self, sdkgen_runtime::ConfigError> {
                let base_url = format!("{}{}", host.trim_end_matches('/'), API_ROOT);
                Ok(Self::new(sdkgen_runtime::Gateway::with_base_url(base_url)?))
            }

            /// Builds the gateway from `SDKGEN_*` environment variables.
            pub fn from_env() -> Result<Self, sdkgen_runtime::ConfigError> {
                Ok(Self::new(sdkgen_runtime::Gateway::from_env()?))
            }

            /// The shared gateway.
            pub fn gateway(&self) -> &sdkgen_runtime::Gateway {
                &self.gateway
            }

            #(#accessors)*
        }
    }
}

/// `/OrderItems` → `order_items`.
pub fn accessor_name(collection_root: &str) -> String {
    snake_name(collection_root.trim_start_matches('/'))
}

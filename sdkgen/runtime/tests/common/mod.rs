//! Hand-written model matching what the generator emits for
//! `Customer { name: string, age: integer? }`.

use sdkgen_runtime::{Model, Nullable, Route, StandardRoutes, Verb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "sdkgen_runtime::convert::null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub age: Nullable<i64>,
}

impl Model for Customer {
    const NAME: &'static str = "Customer";
    const ROUTES: StandardRoutes = StandardRoutes {
        create: Route::new(Verb::Post, "/Customers"),
        upsert: Route::new(Verb::Put, "/Customers"),
        exists: Route::new(Verb::Get, "/Customers/:id/exists"),
        find_by_id: Route::new(Verb::Get, "/Customers/:id"),
        find: Route::new(Verb::Get, "/Customers"),
        find_one: Route::new(Verb::Get, "/Customers/findOne"),
        update_all: Route::new(Verb::Post, "/Customers/update"),
        delete_by_id: Route::new(Verb::Delete, "/Customers/:id"),
        count: Route::new(Verb::Get, "/Customers/count"),
        update_attributes: Route::new(Verb::Put, "/Customers/:id"),
    };
}

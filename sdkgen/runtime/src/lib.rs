//! Runtime for clients generated by `sdkgen`.
//!
//! Generated code contains only data-model types, route tables and thin
//! repository wrappers; everything that talks to the network lives here.
//!
//! ## Components
//!
//! - [`Gateway`] - base URL, timeout, debug flag and access token, plus the
//!   serialize → send → deserialize → error-map pipeline
//! - [`Dispatcher`] - the ten standard CRUD operations, generic over [`Model`]
//! - [`Route`] / [`StandardRoutes`] - path templates embedded as `const` data
//! - [`Nullable`] - field values that keep omitted and `null` apart
//! - [`convert`] - response decoding, envelope unwrapping, local-time dates
//!
//! ## Example
//!
//! ```rust,ignore
//! use sdkgen_runtime::{Dispatcher, Gateway};
//!
//! let gateway = Gateway::with_base_url("http://localhost:3000/api")?;
//! let customers: Dispatcher<Customer> = Dispatcher::new(gateway.clone());
//!
//! let found = customers.find("{}").await?;
//! let total = customers.count("").await?;
//! ```

pub mod config;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod nullable;
pub mod route;
pub mod token;
pub mod verb;

pub use config::GatewayConfig;
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, MappingError, RequestError, SdkError};
pub use gateway::Gateway;
pub use nullable::Nullable;
pub use route::{Model, Route, StandardRoutes};
pub use token::{AccessToken, AuthState};
pub use verb::{StandardOperation, Verb};

//! The ten standard operations, implemented once for every model.

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::convert;
use crate::error::SdkError;
use crate::gateway::Gateway;
use crate::route::Model;

/// Query parameter carrying a `find`/`findOne` filter.
pub const FILTER_PARAM: &str = "filter";
/// Query parameter carrying a `count`/`updateAll` where clause.
pub const WHERE_PARAM: &str = "where";

/// Generic CRUD operations for model `M`, routed through `M::ROUTES`.
///
/// Generated repositories wrap a dispatcher and forward to it.
///
/// ## Examples
///
/// ```rust,ignore
/// let customers: Dispatcher<Customer> = Dispatcher::new(gateway);
/// let all = customers.find("{\"where\":{\"age\":{\"gt\":18}}}").await?;
/// let n = customers.count("").await?;
/// ```
pub struct Dispatcher<M: Model> {
    gateway: Gateway,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self::new(self.gateway.clone())
    }
}

impl<M: Model> fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("model", &M::NAME)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl<M: Model> Dispatcher<M> {
    /// Creates a dispatcher bound to `gateway`.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            _model: PhantomData,
        }
    }

    /// The gateway requests are routed through.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn operation(name: &str) -> String {
        format!("{}.{}", M::NAME, name)
    }

    /// Creates a new instance.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] on any request failure.
    pub async fn create(&self, instance: &M) -> Result<M, SdkError> {
        let body = convert::to_body(instance)?;
        self.gateway.invoke(&M::ROUTES.create, &[], Some(body), &[]).await
    }

    /// Creates or replaces an instance.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] on any request failure.
    pub async fn upsert(&self, instance: &M) -> Result<M, SdkError> {
        let body = convert::to_body(instance)?;
        self.gateway.invoke(&M::ROUTES.upsert, &[], Some(body), &[]).await
    }

    /// Checks whether an instance with `id` exists.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Mapping`] if the response is not `{"exists": bool}`.
    pub async fn exists(&self, id: &str) -> Result<bool, SdkError> {
        let envelope = self
            .gateway
            .invoke_value(&M::ROUTES.exists, &[("id", id)], None, &[])
            .await?;
        Ok(convert::envelope_bool(envelope, "exists", &Self::operation("exists"))?)
    }

    /// Fetches the instance with `id`.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] on any request failure, including 404.
    pub async fn find_by_id(&self, id: &str) -> Result<M, SdkError> {
        self.gateway
            .invoke(&M::ROUTES.find_by_id, &[("id", id)], None, &[])
            .await
    }

    /// Fetches every instance matching `filter`, in response order.
    ///
    /// An empty filter is not sent.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] on any request failure.
    pub async fn find(&self, filter: &str) -> Result<Vec<M>, SdkError> {
        self.gateway
            .invoke(&M::ROUTES.find, &[], None, &[(FILTER_PARAM, filter)])
            .await
    }

    /// Fetches the first instance matching `filter`.
    ///
    /// A 404 response or a `null` body yields `None`.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] on any other request failure.
    pub async fn find_one(&self, filter: &str) -> Result<Option<M>, SdkError> {
        let result = self
            .gateway
            .invoke_value(&M::ROUTES.find_one, &[], None, &[(FILTER_PARAM, filter)])
            .await;

        match result {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(convert::from_value(value)?)),
            Err(SdkError::Request(e)) if e.status_code() == 404 => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Applies the fields of `data` to every instance matching `where_clause`.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] if the backend does not confirm the update.
    pub async fn update_all(&self, where_clause: &str, data: &M) -> Result<(), SdkError> {
        let body = convert::to_body(data)?;
        self.gateway
            .invoke_unit(
                &M::ROUTES.update_all,
                &[],
                Some(body),
                &[(WHERE_PARAM, where_clause)],
            )
            .await
    }

    /// Deletes the instance with `id`.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] if the backend does not confirm the delete.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), SdkError> {
        self.gateway
            .invoke_unit(&M::ROUTES.delete_by_id, &[("id", id)], None, &[])
            .await
    }

    /// Counts instances matching `where_clause`.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Mapping`] if the response is not `{"count": n}`.
    pub async fn count(&self, where_clause: &str) -> Result<u64, SdkError> {
        let envelope = self
            .gateway
            .invoke_value(&M::ROUTES.count, &[], None, &[(WHERE_PARAM, where_clause)])
            .await?;
        Ok(convert::envelope_u64(envelope, "count", &Self::operation("count"))?)
    }

    /// Updates the attributes of the instance with `id`.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Request`] on any request failure.
    pub async fn update_attributes(&self, id: &str, instance: &M) -> Result<M, SdkError> {
        let body = convert::to_body(instance)?;
        self.gateway
            .invoke(&M::ROUTES.update_attributes, &[("id", id)], Some(body), &[])
            .await
    }
}

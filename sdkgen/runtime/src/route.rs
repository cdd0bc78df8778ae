//! Path templates resolved at call time.
//!
//! Generated code embeds every route as `const` data; nothing is looked up by
//! name at runtime. A [`Model`] carries its ten standard routes in a
//! [`StandardRoutes`] table, so an entity cannot exist without the full set.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::MappingError;
use crate::verb::{StandardOperation, Verb};

/// Everything but RFC 3986 unreserved characters is escaped inside a segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// A verb plus a path template with `:name` placeholder segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    /// HTTP verb.
    pub verb: Verb,
    /// Path template, e.g. `/Customers/:id/orders/:fk`.
    pub template: &'static str,
}

impl Route {
    /// Creates a route.
    pub const fn new(verb: Verb, template: &'static str) -> Self {
        Self { verb, template }
    }

    /// Substitutes placeholder segments with the given values.
    ///
    /// `params` pairs a placeholder name (without the colon) with its value.
    /// Substitution is by whole segment, so `:id` never touches `:idx`, and
    /// each value is percent-encoded so it stays within its segment.
    ///
    /// ```
    /// use sdkgen_runtime::{Route, Verb};
    ///
    /// let route = Route::new(Verb::Get, "/Customers/:id/orders/:fk");
    /// let path = route.resolve(&[("id", "7"), ("fk", "42")]).unwrap();
    /// assert_eq!(path, "/Customers/7/orders/42");
    ///
    /// let path = route.resolve(&[("id", "a b"), ("fk", "x/y")]).unwrap();
    /// assert_eq!(path, "/Customers/a%20b/orders/x%2Fy");
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::UnresolvedPlaceholder`] if a placeholder has no
    /// value, and [`MappingError::InvalidSegment`] if a value is empty, `.` or `..`.
    pub fn resolve(&self, params: &[(&str, &str)]) -> Result<String, MappingError> {
        let segments = self
            .template
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => self.substitute(name, params),
                None => Ok(segment.to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(segments.join("/"))
    }

    fn substitute(&self, name: &str, params: &[(&str, &str)]) -> Result<String, MappingError> {
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| MappingError::UnresolvedPlaceholder {
                template: self.template.to_string(),
                placeholder: name.to_string(),
            })?;

        // URL parsers collapse dot segments even when escaped.
        if matches!(value, "" | "." | "..") {
            return Err(MappingError::InvalidSegment {
                template: self.template.to_string(),
                placeholder: name.to_string(),
                value: value.to_string(),
            });
        }

        Ok(utf8_percent_encode(value, PATH_SEGMENT).to_string())
    }
}

/// The ten standard routes of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardRoutes {
    pub create: Route,
    pub upsert: Route,
    pub exists: Route,
    pub find_by_id: Route,
    pub find: Route,
    pub find_one: Route,
    pub update_all: Route,
    pub delete_by_id: Route,
    pub count: Route,
    pub update_attributes: Route,
}

impl StandardRoutes {
    /// Returns the route for `operation`.
    pub fn get(&self, operation: StandardOperation) -> &Route {
        match operation {
            StandardOperation::Create => &self.create,
            StandardOperation::Upsert => &self.upsert,
            StandardOperation::Exists => &self.exists,
            StandardOperation::FindById => &self.find_by_id,
            StandardOperation::Find => &self.find,
            StandardOperation::FindOne => &self.find_one,
            StandardOperation::UpdateAll => &self.update_all,
            StandardOperation::DeleteById => &self.delete_by_id,
            StandardOperation::Count => &self.count,
            StandardOperation::UpdateAttributes => &self.update_attributes,
        }
    }
}

/// A generated data-model type bound to its route table.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Entity name as declared in the schema.
    const NAME: &'static str;
    /// Standard routes, resolved at generation time.
    const ROUTES: StandardRoutes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const ROUTES: StandardRoutes = StandardRoutes {
        create: Route::new(Verb::Post, "/Widgets"),
        upsert: Route::new(Verb::Put, "/Widgets"),
        exists: Route::new(Verb::Get, "/Widgets/:id/exists"),
        find_by_id: Route::new(Verb::Get, "/Widgets/:id"),
        find: Route::new(Verb::Get, "/Widgets"),
        find_one: Route::new(Verb::Get, "/Widgets/findOne"),
        update_all: Route::new(Verb::Post, "/Widgets/update"),
        delete_by_id: Route::new(Verb::Delete, "/Widgets/:id"),
        count: Route::new(Verb::Get, "/Widgets/count"),
        update_attributes: Route::new(Verb::Put, "/Widgets/:id"),
    };

    #[test]
    fn resolve_without_placeholders() {
        assert_eq!(ROUTES.find.resolve(&[]).unwrap(), "/Widgets");
    }

    #[test]
    fn resolve_ignores_unused_params() {
        assert_eq!(
            ROUTES.exists.resolve(&[("fk", "9"), ("id", "3")]).unwrap(),
            "/Widgets/3/exists"
        );
    }

    #[test]
    fn resolve_does_not_touch_prefixed_names() {
        let route = Route::new(Verb::Get, "/Widgets/:idx/:id");
        assert_eq!(
            route.resolve(&[("id", "1"), ("idx", "2")]).unwrap(),
            "/Widgets/2/1"
        );
    }

    #[test]
    fn resolve_reports_missing_placeholder() {
        let err = ROUTES.delete_by_id.resolve(&[]).unwrap_err();
        assert_eq!(
            err,
            MappingError::UnresolvedPlaceholder {
                template: "/Widgets/:id".to_string(),
                placeholder: "id".to_string(),
            }
        );
    }

    #[test]
    fn resolve_keeps_values_inside_their_segment() {
        assert_eq!(
            ROUTES.delete_by_id.resolve(&[("id", "../Orders/9")]).unwrap(),
            "/Widgets/..%2FOrders%2F9"
        );
        assert_eq!(
            ROUTES.find_by_id.resolve(&[("id", "7?x=1#top")]).unwrap(),
            "/Widgets/7%3Fx%3D1%23top"
        );
        assert_eq!(
            ROUTES.find_by_id.resolve(&[("id", "a-b_c.d~e")]).unwrap(),
            "/Widgets/a-b_c.d~e"
        );
    }

    #[test]
    fn resolve_rejects_dot_and_empty_segments() {
        for value in ["", ".", ".."] {
            let err = ROUTES.find_by_id.resolve(&[("id", value)]).unwrap_err();
            assert!(matches!(err, MappingError::InvalidSegment { .. }), "{value:?}");
        }
    }

    #[test]
    fn table_lookup_covers_every_operation() {
        for op in StandardOperation::iter() {
            assert!(ROUTES.get(op).template.starts_with("/Widgets"));
        }
        assert_eq!(ROUTES.get(StandardOperation::Count).verb, Verb::Get);
        assert_eq!(ROUTES.get(StandardOperation::UpdateAll).verb, Verb::Post);
    }
}

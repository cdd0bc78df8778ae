//! HTTP verbs and the standard operation vocabulary shared with the generator.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// HTTP verbs a generated client can issue.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use sdkgen_runtime::Verb;
///
/// assert_eq!(Verb::from_str("DELETE").unwrap(), Verb::Delete);
/// assert_eq!(Verb::Post.to_string(), "POST");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Verb {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP PATCH
    Patch,
    /// HTTP DELETE
    Delete,
    /// HTTP HEAD
    Head,
}

impl Verb {
    /// Returns `true` for verbs whose requests carry a serialized body.
    pub fn is_mutating(self) -> bool {
        matches!(self, Verb::Post | Verb::Put | Verb::Patch)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Patch => reqwest::Method::PATCH,
            Verb::Delete => reqwest::Method::DELETE,
            Verb::Head => reqwest::Method::HEAD,
        }
    }
}

/// The ten operations every entity receives automatically.
///
/// The `Display` form is the conventional remote method name
/// (`findById`, `updateAll`, ...).
///
/// ```
/// use sdkgen_runtime::StandardOperation;
/// use strum::IntoEnumIterator;
///
/// assert_eq!(StandardOperation::iter().count(), 10);
/// assert_eq!(StandardOperation::FindOne.to_string(), "findOne");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "camelCase")]
pub enum StandardOperation {
    Create,
    Upsert,
    Exists,
    FindById,
    Find,
    FindOne,
    UpdateAll,
    DeleteById,
    Count,
    UpdateAttributes,
}

impl StandardOperation {
    /// Name of the generated Rust method for this operation.
    pub fn method_name(self) -> &'static str {
        match self {
            StandardOperation::Create => "create",
            StandardOperation::Upsert => "upsert",
            StandardOperation::Exists => "exists",
            StandardOperation::FindById => "find_by_id",
            StandardOperation::Find => "find",
            StandardOperation::FindOne => "find_one",
            StandardOperation::UpdateAll => "update_all",
            StandardOperation::DeleteById => "delete_by_id",
            StandardOperation::Count => "count",
            StandardOperation::UpdateAttributes => "update_attributes",
        }
    }
}

//! Unsupported-feature markers.
//!
//! A schema construct the emitter cannot represent is never dropped silently.
//! It becomes a `compile_error!` item carrying a greppable prefix and a
//! description, placed where the construct would have been:
//!
//! ```text
//! compile_error!("sdkgen-unsupported: Store.location: field type geopoint cannot be represented");
//! ```

use std::fmt;

use proc_macro2::TokenStream;
use quote::quote;

/// Prefix every marker message starts with.
pub const MARKER_PREFIX: &str = "sdkgen-unsupported";

/// One unsupported schema feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMarker {
    pub entity: String,
    /// Field, relation or method name.
    pub feature: String,
    pub description: String,
}

impl fmt::Display for UnsupportedMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{MARKER_PREFIX}: {}.{}: {}",
            self.entity, self.feature, self.description
        )
    }
}

impl UnsupportedMarker {
    /// The `compile_error!` item for this marker.
    pub fn to_tokens(&self) -> TokenStream {
        let message = self.to_string();
        quote! { compile_error!(#message); }
    }
}

/// Collects markers while an entity module is generated.
///
/// With `emit` off the construct is left out of the source without a
/// marker; it is still recorded so the report can list it.
#[derive(Debug)]
pub struct Markers {
    emit: bool,
    found: Vec<UnsupportedMarker>,
}

impl Markers {
    pub fn new(emit: bool) -> Self {
        Self {
            emit,
            found: Vec::new(),
        }
    }

    /// Records a marker and returns the tokens to put in place of the feature.
    pub fn flag(
        &mut self,
        entity: &str,
        feature: &str,
        description: impl Into<String>,
    ) -> TokenStream {
        let marker = UnsupportedMarker {
            entity: entity.to_string(),
            feature: feature.to_string(),
            description: description.into(),
        };
        let tokens = if self.emit {
            marker.to_tokens()
        } else {
            TokenStream::new()
        };
        self.found.push(marker);
        tokens
    }

    pub fn into_vec(self) -> Vec<UnsupportedMarker> {
        self.found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_text_is_greppable() {
        let mut markers = Markers::new(true);
        let tokens = markers.flag("Store", "location", "field type geopoint cannot be represented");
        let code = tokens.to_string();
        assert!(code.contains("compile_error"));
        assert!(code.contains("sdkgen-unsupported: Store.location: field type geopoint"));
        assert_eq!(markers.into_vec().len(), 1);
    }

    #[test]
    fn disabled_markers_are_recorded_but_not_emitted() {
        let mut markers = Markers::new(false);
        assert!(markers.flag("Store", "location", "x").is_empty());
        assert_eq!(markers.into_vec()[0].feature, "location");
    }
}

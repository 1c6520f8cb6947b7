//! Type-safe identifier wrappers around [`String`].
//!
//! Provinces, building names and countries are all keyed by text in the
//! collaborator's tables. Wrapping each in its own newtype keeps a province
//! id from being passed where a building name is expected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from anything convertible into a [`String`].
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the inner text.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier is blank once surrounding whitespace is removed.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of a province (a cell of the map).
    ProvinceId
}

define_id! {
    /// Name of a building type, shared by a template and every building built from it.
    BuildingName
}

define_id! {
    /// Name of a state (country). Owner fields and trade agreements use it.
    CountryName
}

impl CountryName {
    /// The comparison key for this name: trimmed and lowercased.
    ///
    /// Owner strings arrive from hand-edited tables, so `"Avalon "` and
    /// `"avalon"` name the same state.
    pub fn key(&self) -> String {
        self.0.trim().to_lowercase()
    }

    /// Whether two names refer to the same state.
    pub fn same_as(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

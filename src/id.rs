//! Identifier generation for captured entities
//!
//! Every page, region and token gets a globally unique opaque identifier,
//! optionally prefixed with the kind of entity it names.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Create a new unique identifier, optionally prefixed (`prefix-<uuid>`)
pub fn create_id(prefix: Option<&str>) -> String {
    let core = Uuid::new_v4().to_string();
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}-{core}"),
        _ => core,
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh identifier
            pub fn generate() -> Self {
                Self(create_id(Some($prefix)))
            }

            /// Borrow the raw identifier string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a capture page
    PageId,
    "page"
);
entity_id!(
    /// Identifier of a captured region
    RegionId,
    "region"
);
entity_id!(
    /// Identifier of a recognized token
    TokenId,
    "token"
);

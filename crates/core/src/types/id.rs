//! Opaque newtype IDs for type-safe entity references.
//!
//! Backend identifiers are opaque: some endpoints send them as JSON numbers,
//! others as strings. IDs keep whichever shape they arrived in so they
//! serialize back unchanged, and compare by their textual form so `1` and
//! `"1"` name the same entity.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// The wire representation of an opaque identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    /// Identifier sent as a JSON number.
    Number(i64),
    /// Identifier sent as a JSON string.
    Text(String),
}

impl IdValue {
    /// Parse user input, preferring the numeric form when the text is an integer.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_owned()), Self::Number)
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for IdValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for IdValue {}

impl Hash for IdValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`IdValue`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - Constructors: `parse()`, `from_number()`, `from_text()`
/// - `From<i64>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use zenbuy_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::from_number(1);
/// let bin = BinId::from_number(1);
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
/// assert_eq!(shelf, ShelfId::parse("1"));
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($crate::types::id::IdValue);

        impl $name {
            /// Parse an ID from user-supplied text.
            #[must_use]
            pub fn parse(s: &str) -> Self {
                Self($crate::types::id::IdValue::parse(s))
            }

            /// Create an ID from a numeric value.
            #[must_use]
            pub const fn from_number(id: i64) -> Self {
                Self($crate::types::id::IdValue::Number(id))
            }

            /// Create an ID from a textual value, kept verbatim.
            #[must_use]
            pub fn from_text(id: impl Into<String>) -> Self {
                Self($crate::types::id::IdValue::Text(id.into()))
            }

            /// Get the underlying wire value.
            #[must_use]
            pub const fn value(&self) -> &$crate::types::id::IdValue {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self::from_number(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::parse(id)
            }
        }
    };
}

define_id!(ProductId);
define_id!(UserId);
define_id!(OrderId);
define_id!(CouponId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_ids_compare_by_text() {
        assert_eq!(ProductId::from_number(7), ProductId::from_text("7"));
        assert_ne!(ProductId::from_number(7), ProductId::from_text("07"));
    }

    #[test]
    fn test_parse_prefers_number() {
        assert!(matches!(ProductId::parse(" 42 ").value(), IdValue::Number(42)));
        assert!(matches!(
            ProductId::parse("65ab12").value(),
            IdValue::Text(s) if s == "65ab12"
        ));
    }

    #[test]
    fn test_wire_shape_is_preserved() {
        let numeric: ProductId = serde_json::from_str("12").unwrap();
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "12");

        let text: ProductId = serde_json::from_str("\"p-12\"").unwrap();
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"p-12\"");
    }

    #[test]
    fn test_hash_matches_equality() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(UserId::from_number(3));
        assert!(set.contains(&UserId::from_text("3")));
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderId::from_number(9).to_string(), "9");
        assert_eq!(CouponId::from_text("abc").to_string(), "abc");
    }
}

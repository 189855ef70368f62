//! Newtype IDs for type-safe record references.
//!
//! Every table assigns its records a random UUID. The `define_id!` macro wraps
//! that UUID in a per-table type so a litter ID can never be passed where a
//! puppy ID is expected.

use thiserror::Error;

/// Error returned when an ID string is not a valid record identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed record id: {0:?}")]
pub struct IdError(pub String);

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`uuid::Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `generate()`, `parse()`, `as_uuid()`
/// - `Display`, `FromStr` and conversions to and from `Uuid`
///
/// # Example
///
/// ```rust
/// # use parti_poodles_core::define_id;
/// define_id!(KennelId);
///
/// let id = KennelId::generate();
/// let parsed = KennelId::parse(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// assert!(KennelId::parse("not-an-id").is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Parse an ID from its string form.
            ///
            /// # Errors
            ///
            /// Returns [`IdError`]($crate::IdError) if the input is not a UUID.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                ::uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| $crate::IdError(s.to_owned()))
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(AdminUserId);
define_id!(CustomerId);
define_id!(GalleryPhotoId);
define_id!(InquiryId);
define_id!(LitterId);
define_id!(ParentDogId);
define_id!(PuppyId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let id = PuppyId::generate();
        assert_eq!(PuppyId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = LitterId::generate();
        let padded = format!("  {id}\n");
        assert_eq!(LitterId::parse(&padded).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = CustomerId::parse("j57abc").unwrap_err();
        assert_eq!(err, IdError("j57abc".to_string()));
        assert!(CustomerId::parse("").is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = InquiryId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: InquiryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

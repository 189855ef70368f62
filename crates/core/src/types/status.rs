//! Status and category enums stored as lowercase strings.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of an enum's known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseStatusError {
    /// Which enum was being parsed (e.g. `puppy status`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Defines a string-backed enum with `Display`, `FromStr`, `as_str()` and
/// an `ALL` constant listing every variant in declaration order.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $value => Ok(Self::$variant), )+
                    _ => Err(ParseStatusError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Sale status of a puppy.
    PuppyStatus, "puppy status" {
        Available => "available",
        Reserved => "reserved",
        Sold => "sold",
    }
}

string_enum! {
    /// Workflow status of a customer inquiry.
    ///
    /// New inquiries always start as [`InquiryStatus::New`].
    InquiryStatus, "inquiry status" {
        New => "new",
        Contacted => "contacted",
        Resolved => "resolved",
        Closed => "closed",
    }
}

string_enum! {
    /// CRM stage of a customer.
    CustomerStatus, "customer status" {
        Prospective => "prospective",
        Current => "current",
        Past => "past",
    }
}

string_enum! {
    /// Whether a parent dog is still part of the breeding program.
    ParentDogStatus, "parent dog status" {
        Active => "active",
        Retired => "retired",
    }
}

string_enum! {
    /// Sex of a dog. Dams are female, sires are male.
    Gender, "gender" {
        Male => "male",
        Female => "female",
    }
}

impl Default for InquiryStatus {
    fn default() -> Self {
        Self::New
    }
}

impl Default for CustomerStatus {
    fn default() -> Self {
        Self::Prospective
    }
}

impl Default for PuppyStatus {
    fn default() -> Self {
        Self::Available
    }
}

//! Record identifiers.
//!
//! Every record carries a UUID v4 identifier. Cross-record references use
//! these ids, never display names, so renaming a provider cannot orphan
//! its bets.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier with a generated UUID.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

record_id!(
    /// Identifier of a bookmaker account.
    BookmakerId
);

record_id!(
    /// Identifier of an exchange account.
    ExchangeId
);

record_id!(
    /// Identifier of a placed bet pair.
    BetId
);

record_id!(
    /// Identifier of a promotional free bet.
    FreeBetId
);

record_id!(
    /// Identifier of a cash movement.
    TransactionId
);

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a new time-ordered identifier (UUID v7).
            pub fn generate() -> Self {
                Self(uuid::Uuid::now_v7().to_string())
            }

            /// Wrap an existing identifier string. Empty or blank strings are rejected.
            pub fn parse(s: &str) -> Result<Self, TypeError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(TypeError::InvalidId(s.to_string()));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Short representation (first 8 characters).
            pub fn short_id(&self) -> &str {
                let end = self
                    .0
                    .char_indices()
                    .nth(8)
                    .map(|(i, _)| i)
                    .unwrap_or(self.0.len());
                &self.0[..end]
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short_id())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a committee.
    CommitteeId
);

string_id!(
    /// Identifier of a member. Also used as the canonical key of a half-share pair.
    MemberId
);

string_id!(
    /// Identifier of a recorded payment.
    PaymentId
);

string_id!(
    /// Identifier of a recorded draw.
    DrawId
);

/// Who pays into and wins from a committee slot: the id of a FULL member, or
/// the canonical pair id of two paired HALF members.
pub type PayerId = MemberId;

impl MemberId {
    /// Canonical, order-independent key for a pairing of two members: the
    /// lexicographically smaller id.
    pub fn canonical_pair(a: &MemberId, b: &MemberId) -> MemberId {
        if a <= b {
            a.clone()
        } else {
            b.clone()
        }
    }
}

//! Identifier types
//!
//! Curriculum and record ids come from collaborators and are opaque strings.
//! Session and confirmation tokens are minted here from UUIDv7 values.
//! Generated record ids use the format `{8-char-hex}-{kind}-{slug}`,
//! e.g. `3f9a0c2e-lesson-fractions`.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Get the id as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Curriculum unit identifier
    UnitId
);
string_id!(
    /// Curriculum topic identifier
    TopicId
);
string_id!(
    /// Identifier of a durable lesson record created on commit
    RecordId
);
string_id!(
    /// Opaque handle addressing one draft session
    SessionToken
);
string_id!(
    /// Single-use value that authorizes committing one draft revision
    ConfirmationToken
);

impl SessionToken {
    /// Mint a fresh session token
    pub fn generate() -> Self {
        Self(format!("draft-{}", uuid::Uuid::now_v7()))
    }
}

impl ConfirmationToken {
    /// Mint a fresh confirmation token
    pub fn generate() -> Self {
        Self(format!("confirm-{}", uuid::Uuid::now_v7().simple()))
    }
}

/// Generate a record id from a kind and a title
pub fn generate_id(kind: &str, title: &str) -> String {
    let uuid = uuid::Uuid::now_v7().simple().to_string();
    // Trailing hex digits of a v7 UUID are random; the leading ones are the timestamp
    let hex_suffix = &uuid[uuid.len() - 8..];
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{}-{}", hex_suffix, kind)
    } else {
        format!("{}-{}-{}", hex_suffix, kind, slug)
    }
}

/// Slugify a title for use in ids
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        // Strip apostrophes entirely, replace other non-alphanumeric with hyphens
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' || c == '\u{2018}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(40)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

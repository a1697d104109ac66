use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An account handle, the crawl's primary key. Case-normalized at
/// construction so that "Alice" and "alice" are the same identity
/// everywhere (visited set, frontier, sink).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(handle: &str) -> Self {
        Self(handle.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pagination state for an account's neighbor listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Start listing from the beginning.
    Start,
    /// Opaque continuation token from the directory service.
    Next(String),
    /// No more pages exist for this account.
    Exhausted,
}

impl Cursor {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Cursor::Exhausted)
    }

    /// The wire token to send with a listing request, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Cursor::Next(token) => Some(token),
            Cursor::Start | Cursor::Exhausted => None,
        }
    }
}

/// Profile attributes resolved for one account. `based_in` is the
/// target-attribute classification; `None` means the provider returned a
/// profile without the field, which is a real outcome (not every account
/// has a resolved location), distinct from the lookup failing outright.
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub based_in: Option<String>,
    /// Raw provider payload, persisted verbatim on acceptance.
    pub info: Value,
}

impl ProfileRecord {
    pub fn from_info(info: Value) -> Self {
        let based_in = info
            .pointer("/about_profile/account_based_in")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self { based_in, info }
    }

    pub fn matches_region(&self, region: &str) -> bool {
        self.based_in.as_deref() == Some(region)
    }
}

/// One line of the result sink. The `username`/`info` key names are frozen:
/// the offline report renderer consumes exactly this schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedRecord {
    pub username: AccountId,
    pub info: Value,
}

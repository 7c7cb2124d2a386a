use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Platform user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Platform chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a ban applies to: a numeric platform identity or an `@handle`.
///
/// Handles keep the leading `@` and their original casing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BanTarget {
    Numeric(UserId),
    Handle(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("not a numeric id or @username: {0}")]
pub struct InvalidTarget(pub String);

impl FromStr for BanTarget {
    type Err = InvalidTarget;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        if raw.starts_with('@') {
            return Ok(Self::Handle(raw.to_string()));
        }
        raw.parse::<i64>()
            .map(|id| Self::Numeric(UserId(id)))
            .map_err(|_| InvalidTarget(raw.to_string()))
    }
}

impl fmt::Display for BanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Handle(h) => f.write_str(h),
        }
    }
}

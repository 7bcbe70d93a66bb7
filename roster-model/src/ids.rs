use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Canonical user identifier.
///
/// The remote API hands out ids as JSON numbers in list responses and as
/// strings in create responses, and route parameters always arrive as text.
/// Every representation is folded into one trimmed string at the boundary so
/// `UserId::from(7)` and `"7".parse::<UserId>()` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        UserId(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(UserId::new(s))
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        UserId::new(value)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        UserId(value.to_string())
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId(value.to_string())
    }
}

impl From<u32> for UserId {
    fn from(value: u32) -> Self {
        UserId(value.to_string())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct UserIdVisitor;

impl<'de> Visitor<'de> for UserIdVisitor {
    type Value = UserId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a user id as a string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<UserId, E> {
        Ok(UserId::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<UserId, E> {
        Ok(UserId::new(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<UserId, E> {
        Ok(UserId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<UserId, E> {
        Ok(UserId::from(v))
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UserIdVisitor)
    }
}

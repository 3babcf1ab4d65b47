use core::fmt::Debug;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{GoError, GoResult};

const PREFIX: &str = "GO:";

/// The unique identifier of a [`crate::Term`]
///
/// Internally the numerical part of `GO:0008150` is stored as `u32`. It is
/// formatted back to the canonical 7-digit form when displayed or serialized.
///
/// # Examples
///
/// ```
/// use genescape::GoTermId;
///
/// let id = GoTermId::try_from("GO:0008150").unwrap();
/// assert_eq!(id.as_u32(), 8150);
/// assert_eq!(id.to_string(), "GO:0008150");
///
/// assert!(GoTermId::try_from("HP:0000001").is_err());
/// assert!(GoTermId::try_from("ACAA1").is_err());
/// ```
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GoTermId {
    inner: u32,
}

impl GoTermId {
    /// Returns the numerical part of the id
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for GoTermId {
    type Error = GoError;
    fn try_from(s: &str) -> GoResult<Self> {
        let s = s.trim();
        let digits = match s.get(..PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(PREFIX) => &s[PREFIX.len()..],
            _ => return Err(GoError::InvalidTermId(s.to_string())),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GoError::InvalidTermId(s.to_string()));
        }
        Ok(GoTermId {
            inner: digits.parse::<u32>()?,
        })
    }
}

impl FromStr for GoTermId {
    type Err = GoError;
    fn from_str(s: &str) -> GoResult<Self> {
        GoTermId::try_from(s)
    }
}

impl From<u32> for GoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for GoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GoTermId({self})")
    }
}

impl Display for GoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PREFIX}{:07}", self.inner)
    }
}

impl PartialEq<str> for GoTermId {
    fn eq(&self, other: &str) -> bool {
        GoTermId::try_from(other).is_ok_and(|other| *self == other)
    }
}

impl PartialEq<&str> for GoTermId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for GoTermId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GoTermId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        GoTermId::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

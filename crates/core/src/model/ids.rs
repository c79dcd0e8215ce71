use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for constructing a `DomainId`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainIdError {
    #[error("domain id cannot be empty")]
    Empty,
}

/// Identifier of a knowledge domain, e.g. `"ml-fundamentals"`.
///
/// Domain ids come from the reference-data provider and key the per-domain
/// progress map. Always non-empty and trimmed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainId(String);

impl DomainId {
    /// Creates a new `DomainId`.
    ///
    /// # Errors
    ///
    /// Returns `DomainIdError::Empty` if the id is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainIdError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainId({})", self.0)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DomainId {
    type Err = DomainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DomainId {
    type Error = DomainIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DomainId> for String {
    fn from(id: DomainId) -> Self {
        id.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

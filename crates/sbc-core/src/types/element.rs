//! Configuration element addressing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use url::form_urlencoded::byte_serialize;

use crate::error::{Error, InvalidInputError};

/// A configuration element type such as `session-group` or `local-policy`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementType(String);

impl ElementType {
    /// Create a new element type, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if let Some(reason) = identifier_problem(&s) {
            return Err(InvalidInputError::ElementType { value: s, reason }.into());
        }
        Ok(Self(s))
    }

    /// Returns the element type string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ElementType {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ElementType> for String {
    fn from(element_type: ElementType) -> Self {
        element_type.0
    }
}

/// The key attributes identifying configuration element instances.
///
/// Pairs keep their insertion order and render as the `&name=value` query
/// fragment the device expects after `elementType`.
///
/// # Example
///
/// ```
/// use sbc_core::KeyAttributes;
///
/// let keys = KeyAttributes::from_pairs([("name", "A1"), ("group-name", "G1")]).unwrap();
/// assert_eq!(keys.to_query_fragment(), "&name=A1&group-name=G1");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyAttributes {
    pairs: Vec<(String, String)>,
}

impl KeyAttributes {
    /// Create an empty set of key attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build key attributes from (name, value) pairs.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut keys = Self::new();
        for (name, value) in pairs {
            keys.push(name, value)?;
        }
        Ok(keys)
    }

    /// Append a (name, value) pair.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), Error> {
        let name = name.into();
        let value = value.into();

        if let Some(reason) = identifier_problem(&name) {
            return Err(InvalidInputError::KeyAttribute { name, reason }.into());
        }
        if value.is_empty() {
            return Err(InvalidInputError::KeyAttribute {
                name,
                reason: "value cannot be empty".to_string(),
            }
            .into());
        }

        self.pairs.push((name, value));
        Ok(())
    }

    /// Append a pair, builder style.
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, Error> {
        self.push(name, value)?;
        Ok(self)
    }

    /// Returns the pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns true if no pairs were added.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render the pairs as `&name=value...`, values form-urlencoded.
    pub fn to_query_fragment(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| {
                let encoded: String = byte_serialize(value.as_bytes()).collect();
                format!("&{}={}", name, encoded)
            })
            .collect()
    }
}

impl fmt::Display for KeyAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_fragment())
    }
}

/// Configuration element instances as returned by the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigElements {
    /// HTTP status of the query.
    pub status: u16,
    /// The raw XML payload.
    pub body: String,
}

fn identifier_problem(s: &str) -> Option<String> {
    if s.is_empty() {
        return Some("cannot be empty".to_string());
    }
    s.chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map(|c| format!("invalid character '{}'", c))
}

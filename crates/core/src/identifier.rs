//! Validated SQL identifiers and `namespace.table` names.
//!
//! Every table and column name that ends up inside generated SQL passes
//! through [`Identifier`], so the statement builders in [`crate::sql`] can
//! splice names into query text without further escaping concerns.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// PostgreSQL truncates identifiers longer than `NAMEDATALEN - 1` bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid regex"));

/// A lowercase, unquoted-safe SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: &str) -> Result<Self, CoreError> {
        if name.len() > MAX_IDENTIFIER_LENGTH || !IDENTIFIER_RE.is_match(name) {
            return Err(CoreError::InvalidIdentifier(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

/// A schema-qualified table name such as `ecommerce.orders`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    namespace: Identifier,
    table: Identifier,
}

impl QualifiedName {
    pub fn new(namespace: Identifier, table: Identifier) -> Self {
        Self { namespace, table }
    }

    /// Parse `namespace.table`. Exactly one dot is accepted.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let (namespace, table) = s
            .split_once('.')
            .ok_or_else(|| CoreError::InvalidQualifiedName(s.to_string()))?;
        if table.contains('.') {
            return Err(CoreError::InvalidQualifiedName(s.to_string()));
        }
        Ok(Self {
            namespace: Identifier::new(namespace)?,
            table: Identifier::new(table)?,
        })
    }

    pub fn namespace(&self) -> &Identifier {
        &self.namespace
    }

    pub fn table(&self) -> &Identifier {
        &self.table
    }

    /// Render as `"namespace"."table"`.
    pub fn quoted(&self) -> String {
        format!("{}.{}", self.namespace.quoted(), self.table.quoted())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.width().is_some() {
            f.pad(&format!("{}.{}", self.namespace.0, self.table.0))
        } else {
            write!(f, "{}.{}", self.namespace.0, self.table.0)
        }
    }
}

impl FromStr for QualifiedName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.to_string()
    }
}

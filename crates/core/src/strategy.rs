//! Remediation strategies for known data-quality defects.
//!
//! A strategy is attached to a [`TableLoadSpec`](crate::descriptor::TableLoadSpec)
//! as configuration data. The loader never inspects the destination table's
//! name to decide how to treat its rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifier::{Identifier, QualifiedName};

/// How rows that may violate destination constraints are reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemediationStrategy {
    /// Rows are copied straight into the destination; any violation is fatal.
    #[default]
    None,
    /// Keep the first row (in file order) for every distinct `key` value.
    DeduplicateByKey { key: Identifier },
    /// Drop rows whose non-null foreign key has no match in the referenced table.
    FilterByForeignKey(ForeignKeyFilter),
}

/// Parameters of [`RemediationStrategy::FilterByForeignKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyFilter {
    /// Column of the loaded table holding the reference.
    pub column: Identifier,
    /// Table whose key set is checked.
    pub references: QualifiedName,
    /// Key column of `references`.
    pub referenced_column: Identifier,
}

impl RemediationStrategy {
    pub fn deduplicate_by_key(key: &str) -> Result<Self, CoreError> {
        Ok(Self::DeduplicateByKey {
            key: Identifier::new(key)?,
        })
    }

    /// Filter on `column`, checked against the same-named column of `references`.
    pub fn filter_by_foreign_key(column: &str, references: &str) -> Result<Self, CoreError> {
        let column = Identifier::new(column)?;
        Ok(Self::FilterByForeignKey(ForeignKeyFilter {
            referenced_column: column.clone(),
            column,
            references: QualifiedName::parse(references)?,
        }))
    }

    /// Filter on `column`, checked against `references.referenced_column`.
    pub fn filter_by_foreign_key_to(
        column: &str,
        references: &str,
        referenced_column: &str,
    ) -> Result<Self, CoreError> {
        Ok(Self::FilterByForeignKey(ForeignKeyFilter {
            column: Identifier::new(column)?,
            references: QualifiedName::parse(references)?,
            referenced_column: Identifier::new(referenced_column)?,
        }))
    }

    /// Whether rows must land in a constraint-free staging table first.
    pub fn requires_staging(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Short machine-readable name, used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DeduplicateByKey { .. } => "deduplicate_by_key",
            Self::FilterByForeignKey(_) => "filter_by_foreign_key",
        }
    }

    /// The table this strategy reads from, other than its own staging table.
    pub fn referenced_table(&self) -> Option<&QualifiedName> {
        match self {
            Self::FilterByForeignKey(filter) => Some(&filter.references),
            Self::None | Self::DeduplicateByKey { .. } => None,
        }
    }
}

impl fmt::Display for RemediationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("direct load"),
            Self::DeduplicateByKey { key } => write!(f, "deduplicate by {key}"),
            Self::FilterByForeignKey(filter) => write!(
                f,
                "filter {} against {}({})",
                filter.column, filter.references, filter.referenced_column
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_none_skips_staging() {
        assert!(!RemediationStrategy::None.requires_staging());
        assert!(RemediationStrategy::deduplicate_by_key("review_id")
            .unwrap()
            .requires_staging());
        assert!(
            RemediationStrategy::filter_by_foreign_key("seller_id", "ecommerce.sellers")
                .unwrap()
                .requires_staging()
        );
    }

    #[test]
    fn filter_defaults_referenced_column_to_local_column() {
        let strategy =
            RemediationStrategy::filter_by_foreign_key("seller_id", "ecommerce.sellers").unwrap();
        let RemediationStrategy::FilterByForeignKey(filter) = &strategy else {
            panic!("expected FilterByForeignKey, got {strategy:?}");
        };
        assert_eq!(filter.referenced_column.as_str(), "seller_id");
        assert_eq!(
            strategy.referenced_table().map(ToString::to_string),
            Some("ecommerce.sellers".to_string())
        );
    }

    #[test]
    fn invalid_names_are_rejected() {
        assert!(RemediationStrategy::deduplicate_by_key("Review Id").is_err());
        assert!(RemediationStrategy::filter_by_foreign_key("seller_id", "sellers").is_err());
        assert!(
            RemediationStrategy::filter_by_foreign_key_to("seller_id", "ecommerce.sellers", "")
                .is_err()
        );
    }

    #[test]
    fn labels_and_display() {
        let dedup = RemediationStrategy::deduplicate_by_key("review_id").unwrap();
        assert_eq!(dedup.label(), "deduplicate_by_key");
        assert_eq!(dedup.to_string(), "deduplicate by review_id");

        let filter = RemediationStrategy::filter_by_foreign_key_to(
            "seller_ref",
            "ecommerce.sellers",
            "seller_id",
        )
        .unwrap();
        assert_eq!(filter.label(), "filter_by_foreign_key");
        assert_eq!(
            filter.to_string(),
            "filter seller_ref against ecommerce.sellers(seller_id)"
        );
        assert_eq!(RemediationStrategy::default().label(), "none");
    }

    #[test]
    fn serde_uses_kind_tag() {
        let dedup = RemediationStrategy::deduplicate_by_key("review_id").unwrap();
        let json = serde_json::to_value(&dedup).unwrap();
        assert_eq!(json["kind"], "deduplicate_by_key");
        assert_eq!(json["key"], "review_id");

        let parsed: RemediationStrategy = serde_json::from_value(serde_json::json!({
            "kind": "filter_by_foreign_key",
            "column": "seller_id",
            "references": "ecommerce.sellers",
            "referenced_column": "seller_id",
        }))
        .unwrap();
        assert_eq!(
            parsed,
            RemediationStrategy::filter_by_foreign_key("seller_id", "ecommerce.sellers").unwrap()
        );
    }
}

use crate::identifier::QualifiedName;

/// Configuration errors raised while building identifiers, specs and
/// dataset descriptors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid qualified table name {0:?} (expected `namespace.table`)")]
    InvalidQualifiedName(String),

    #[error("Explicit column list for {0} is empty")]
    EmptyColumnList(QualifiedName),

    #[error("Table {0} is loaded by more than one spec")]
    DuplicateDestination(QualifiedName),

    #[error("Table {table} is outside dataset namespace {namespace}")]
    ForeignNamespace {
        table: QualifiedName,
        namespace: String,
    },

    #[error("Table {table} filters on {referenced}, which is loaded later in the same dataset")]
    DependencyOrder {
        table: QualifiedName,
        referenced: QualifiedName,
    },
}

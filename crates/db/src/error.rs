use std::path::{Path, PathBuf};

use stageload_core::descriptor::{DatasetDescriptor, TableLoadSpec};
use stageload_core::error::CoreError;
use stageload_core::identifier::QualifiedName;

/// Errors raised while loading a single table.
///
/// Only [`LoadError::MissingSourceFile`] is recoverable; the loader folds it
/// into a skipped outcome. Everything else aborts the dataset run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Source file not found: {}", .0.display())]
    MissingSourceFile(PathBuf),

    /// The file does not match the declared columns or holds unparseable values.
    #[error("Malformed input in {}: {message}", .file.display())]
    MalformedInput { file: PathBuf, message: String },

    /// A constraint fired outside of a declared remediation path.
    #[error("Constraint violation on {table}{}: {message}", constraint_suffix(.constraint))]
    ConstraintViolation {
        table: QualifiedName,
        constraint: Option<String>,
        message: String,
    },

    #[error("Connection failure: {0}")]
    ConnectionFailure(#[source] sqlx::Error),

    #[error("Schema script for {namespace} failed: {source}")]
    Schema {
        namespace: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Destination table {0} does not exist")]
    MissingTable(QualifiedName),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] CoreError),
}

fn constraint_suffix(constraint: &Option<String>) -> String {
    constraint
        .as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

impl LoadError {
    /// Classify a sqlx error raised while loading `table` from `file`.
    ///
    /// - SQLSTATE class `22` (data exception) maps to [`LoadError::MalformedInput`].
    /// - SQLSTATE class `23` (integrity violation) maps to [`LoadError::ConstraintViolation`].
    /// - SQLSTATE class `08` and transport errors map to [`LoadError::ConnectionFailure`].
    /// - Everything else maps to [`LoadError::Database`].
    pub fn classify(err: sqlx::Error, table: &QualifiedName, file: &Path) -> Self {
        if is_transport_error(&err) {
            return Self::ConnectionFailure(err);
        }

        let (code, constraint, message) = match &err {
            sqlx::Error::Database(db_err) => (
                db_err.code().map(|c| c.into_owned()),
                db_err.constraint().map(str::to_string),
                db_err.message().to_string(),
            ),
            _ => return Self::Database(err),
        };

        match code.as_deref() {
            Some(c) if c.starts_with("22") => Self::MalformedInput {
                file: file.to_path_buf(),
                message,
            },
            Some(c) if c.starts_with("23") => Self::ConstraintViolation {
                table: table.clone(),
                constraint,
                message,
            },
            Some(c) if c.starts_with("08") => Self::ConnectionFailure(err),
            _ => Self::Database(err),
        }
    }

    /// Classify a sqlx error that is unrelated to file contents.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if is_transport_error(&err) {
            Self::ConnectionFailure(err)
        } else {
            Self::Database(err)
        }
    }

    /// Whether the run may continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingSourceFile(_))
    }
}

fn is_transport_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// The fatal error of a dataset run, naming the spec that failed.
#[derive(Debug, thiserror::Error)]
#[error("Dataset {dataset} failed at {location}: {source}")]
pub struct DatasetError {
    pub dataset: String,
    /// `file -> table` of the failing spec, or the run phase when no spec was active.
    pub location: String,
    pub file: Option<String>,
    pub table: Option<QualifiedName>,
    pub source: LoadError,
}

impl DatasetError {
    pub fn at_spec(descriptor: &DatasetDescriptor, spec: &TableLoadSpec, source: LoadError) -> Self {
        Self {
            dataset: descriptor.name().to_string(),
            location: format!("{} -> {}", spec.source_file(), spec.destination()),
            file: Some(spec.source_file().to_string()),
            table: Some(spec.destination().clone()),
            source,
        }
    }

    /// A failure outside any spec: connecting, applying the schema, closing.
    pub fn at_phase(descriptor: &DatasetDescriptor, phase: &str, source: LoadError) -> Self {
        Self {
            dataset: descriptor.name().to_string(),
            location: phase.to_string(),
            file: None,
            table: None,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> QualifiedName {
        QualifiedName::parse("ecommerce.orders").unwrap()
    }

    #[test]
    fn transport_errors_are_connection_failures() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        let classified = LoadError::classify(err, &table(), Path::new("orders.csv"));
        assert!(matches!(classified, LoadError::ConnectionFailure(_)));
    }

    #[test]
    fn other_errors_are_database_errors() {
        let classified =
            LoadError::classify(sqlx::Error::RowNotFound, &table(), Path::new("orders.csv"));
        assert!(matches!(classified, LoadError::Database(_)));
    }

    #[test]
    fn only_missing_file_is_recoverable() {
        assert!(LoadError::MissingSourceFile("x.csv".into()).is_recoverable());
        assert!(!LoadError::MalformedInput {
            file: "x.csv".into(),
            message: "bad".into()
        }
        .is_recoverable());
        assert!(!LoadError::ConnectionFailure(sqlx::Error::PoolClosed).is_recoverable());
    }

    #[test]
    fn constraint_message_names_constraint() {
        let err = LoadError::ConstraintViolation {
            table: table(),
            constraint: Some("orders_pkey".into()),
            message: "duplicate key".into(),
        };
        assert_eq!(
            err.to_string(),
            "Constraint violation on ecommerce.orders (orders_pkey): duplicate key"
        );
    }

    #[test]
    fn dataset_error_names_failing_spec() {
        let spec = TableLoadSpec::new("orders.csv", "ecommerce.orders").unwrap();
        let descriptor =
            DatasetDescriptor::new("ecommerce", "ecommerce", "olist-ecommerce", vec![spec.clone()])
                .unwrap();
        let err = DatasetError::at_spec(
            &descriptor,
            &spec,
            LoadError::MalformedInput {
                file: "orders.csv".into(),
                message: "extra data after last expected column".into(),
            },
        );
        assert_eq!(err.table, Some(table()));
        assert_eq!(
            err.to_string(),
            "Dataset ecommerce failed at orders.csv -> ecommerce.orders: \
             Malformed input in orders.csv: extra data after last expected column"
        );
    }
}

//! Promotion of staged rows into the destination table.
//!
//! One set-oriented `INSERT ... SELECT ... ON CONFLICT (key) DO NOTHING` per
//! strategy, so a re-run against an already loaded destination promotes
//! nothing and raises no duplicate-key error.

use std::path::Path;

use sqlx::postgres::PgConnection;
use stageload_core::descriptor::TableLoadSpec;
use stageload_core::identifier::{Identifier, QualifiedName};
use stageload_core::sql;
use stageload_core::strategy::RemediationStrategy;
use stageload_core::types::RowCount;

use crate::error::LoadError;

/// Destination columns in ordinal order.
const COLUMNS_QUERY: &str = "SELECT column_name::text \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

/// Primary-key constraint name and columns in key order.
const PRIMARY_KEY_QUERY: &str = "SELECT tc.constraint_name::text, kcu.column_name::text \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON kcu.constraint_schema = tc.constraint_schema \
      AND kcu.constraint_name = tc.constraint_name \
      AND kcu.table_name = tc.table_name \
     WHERE tc.table_schema = $1 AND tc.table_name = $2 \
       AND tc.constraint_type = 'PRIMARY KEY' \
     ORDER BY kcu.ordinal_position";

/// A destination's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    pub constraint: String,
    pub columns: Vec<Identifier>,
}

/// Move the surviving rows of `staging` into the spec's destination.
///
/// Returns the number of rows promoted, measured as the growth of the
/// destination within the current unit of work.
pub async fn promote(
    conn: &mut PgConnection,
    spec: &TableLoadSpec,
    staging: &Identifier,
    rows_landed: RowCount,
    path: &Path,
) -> Result<RowCount, LoadError> {
    let destination = spec.destination();
    let columns = destination_columns(conn, destination).await?;
    let key = primary_key(conn, destination).await?;
    let key_columns = key.as_ref().map(|pk| pk.columns.as_slice()).unwrap_or_default();

    let Some(statement) =
        sql::promote(spec.strategy(), destination, staging, &columns, key_columns)
    else {
        return Ok(rows_landed);
    };

    // Repeated keys in the file are only absorbed by deduplication.
    if let (RemediationStrategy::FilterByForeignKey(_), Some(pk)) = (spec.strategy(), &key) {
        reject_repeated_keys(conn, destination, staging, pk).await?;
    }

    let before = count_rows(conn, destination).await?;
    sqlx::query(&statement)
        .execute(&mut *conn)
        .await
        .map_err(|e| LoadError::classify(e, destination, path))?;
    let after = count_rows(conn, destination).await?;

    let promoted = after.saturating_sub(before);
    let removed = rows_landed.saturating_sub(promoted);

    if removed > 0 {
        let reason = match spec.strategy() {
            RemediationStrategy::FilterByForeignKey(_) => "unmatched references",
            _ => "duplicates",
        };
        tracing::info!(
            table = %destination,
            strategy = spec.strategy().label(),
            promoted,
            removed,
            "  → Inserted {promoted} rows ({removed} {reason} removed)"
        );
    } else {
        tracing::info!(table = %destination, promoted, "  → Inserted {promoted} rows");
    }

    Ok(promoted)
}

/// The destination's column names in ordinal order.
pub async fn destination_columns(
    conn: &mut PgConnection,
    table: &QualifiedName,
) -> Result<Vec<Identifier>, LoadError> {
    let names: Vec<String> = sqlx::query_scalar(COLUMNS_QUERY)
        .bind(table.namespace().as_str())
        .bind(table.table().as_str())
        .fetch_all(&mut *conn)
        .await
        .map_err(LoadError::from_sqlx)?;

    if names.is_empty() {
        return Err(LoadError::MissingTable(table.clone()));
    }

    names
        .iter()
        .map(|name| Identifier::new(name).map_err(LoadError::from))
        .collect()
}

/// The destination's primary key, or `None` when it has none.
pub async fn primary_key(
    conn: &mut PgConnection,
    table: &QualifiedName,
) -> Result<Option<PrimaryKey>, LoadError> {
    let rows: Vec<(String, String)> = sqlx::query_as(PRIMARY_KEY_QUERY)
        .bind(table.namespace().as_str())
        .bind(table.table().as_str())
        .fetch_all(&mut *conn)
        .await
        .map_err(LoadError::from_sqlx)?;

    let Some((constraint, _)) = rows.first() else {
        return Ok(None);
    };
    let constraint = constraint.clone();
    let columns = rows
        .iter()
        .map(|(_, name)| Identifier::new(name).map_err(LoadError::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(PrimaryKey { constraint, columns }))
}

/// Fail when `staging` holds a primary-key value more than once.
async fn reject_repeated_keys(
    conn: &mut PgConnection,
    table: &QualifiedName,
    staging: &Identifier,
    pk: &PrimaryKey,
) -> Result<(), LoadError> {
    let repeated: i64 = sqlx::query_scalar(&sql::repeated_keys(staging, &pk.columns))
        .fetch_one(&mut *conn)
        .await
        .map_err(LoadError::from_sqlx)?;

    if repeated > 0 {
        return Err(LoadError::ConstraintViolation {
            table: table.clone(),
            constraint: Some(pk.constraint.clone()),
            message: format!("{repeated} primary key value(s) repeated in the source file"),
        });
    }
    Ok(())
}

/// `COUNT(*)` of a table.
pub async fn count_rows(
    conn: &mut PgConnection,
    table: &QualifiedName,
) -> Result<RowCount, LoadError> {
    let count: i64 = sqlx::query_scalar(&sql::count_rows(&table.quoted()))
        .fetch_one(&mut *conn)
        .await
        .map_err(LoadError::from_sqlx)?;
    Ok(RowCount::try_from(count).unwrap_or_default())
}

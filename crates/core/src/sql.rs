//! SQL text for landing and promotion.
//!
//! Pure string builders; `stageload-db` executes them. All names come in as
//! [`Identifier`]/[`QualifiedName`] and are emitted double-quoted.

use crate::error::CoreError;
use crate::identifier::{Identifier, QualifiedName, MAX_IDENTIFIER_LENGTH};
use crate::strategy::RemediationStrategy;

/// Column added to every staging table to record file order.
pub const LANDING_SEQ_COLUMN: &str = "_landing_seq";

/// Suffix appended to the destination's table name for its staging table.
pub const STAGING_SUFFIX: &str = "_staging";

/// `COPY` options matching the Olist exports: comma separated, double-quote
/// quoted, one header row.
const COPY_OPTIONS: &str = "FORMAT csv, HEADER true, DELIMITER ',', QUOTE '\"'";

/// Name of the temporary staging table for `destination`.
///
/// Temporary tables live in the session's own schema, so only the table
/// part of the destination is used.
pub fn staging_table_name(destination: &QualifiedName) -> Result<Identifier, CoreError> {
    let base = destination.table().as_str();
    let max_base = MAX_IDENTIFIER_LENGTH - STAGING_SUFFIX.len();
    let base = &base[..base.len().min(max_base)];
    Identifier::new(&format!("{base}{STAGING_SUFFIX}"))
}

/// Create a constraint-free copy of `destination` that is dropped when the
/// current transaction ends, whether it commits or rolls back.
pub fn create_staging_table(destination: &QualifiedName, staging: &Identifier) -> String {
    format!(
        "CREATE TEMP TABLE {} (LIKE {} INCLUDING DEFAULTS) ON COMMIT DROP",
        staging.quoted(),
        destination.quoted()
    )
}

/// Add the landing-order column to a staging table.
pub fn add_landing_sequence(staging: &Identifier) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN \"{LANDING_SEQ_COLUMN}\" BIGINT GENERATED ALWAYS AS IDENTITY",
        staging.quoted()
    )
}

/// `COPY ... FROM STDIN` into `target` (already quoted) for `columns`.
pub fn copy_from_stdin(target: &str, columns: &[Identifier]) -> String {
    format!(
        "COPY {target} ({}) FROM STDIN WITH ({COPY_OPTIONS})",
        column_list(columns, None)
    )
}

/// `SELECT COUNT(*)` over a quoted table reference.
pub fn count_rows(target: &str) -> String {
    format!("SELECT COUNT(*) FROM {target}")
}

/// The single set-oriented statement that moves surviving staged rows into
/// `destination`, or `None` for [`RemediationStrategy::None`], which never
/// stages.
///
/// `columns` is the destination's full column list and `primary_key` its
/// primary-key columns (empty when it has none). Survivors are inserted in
/// landing order. A deduplicated row whose key already exists is skipped,
/// and so is a filtered row whose primary key already exists. Any other
/// conflict is raised.
pub fn promote(
    strategy: &RemediationStrategy,
    destination: &QualifiedName,
    staging: &Identifier,
    columns: &[Identifier],
    primary_key: &[Identifier],
) -> Option<String> {
    let insert_cols = column_list(columns, None);
    let seq = format!("\"{LANDING_SEQ_COLUMN}\"");

    match strategy {
        RemediationStrategy::None => None,
        RemediationStrategy::DeduplicateByKey { key } => Some(format!(
            "INSERT INTO {dest} ({insert_cols}) \
             SELECT {insert_cols} FROM ( \
                 SELECT DISTINCT ON ({key}) * FROM {staging} \
                 ORDER BY {key}, {seq} \
             ) AS survivors \
             ORDER BY {seq} \
             ON CONFLICT ({key}) DO NOTHING",
            dest = destination.quoted(),
            key = key.quoted(),
            staging = staging.quoted(),
        )),
        RemediationStrategy::FilterByForeignKey(filter) => Some(format!(
            "INSERT INTO {dest} ({insert_cols}) \
             SELECT {select_cols} FROM {staging} AS staged \
             WHERE staged.{fk} IS NULL \
                OR EXISTS ( \
                    SELECT 1 FROM {referenced} AS referenced \
                    WHERE referenced.{referenced_col} = staged.{fk} \
                ) \
             ORDER BY staged.{seq}{on_conflict}",
            dest = destination.quoted(),
            on_conflict = skip_existing(primary_key),
            select_cols = column_list(columns, Some("staged")),
            staging = staging.quoted(),
            fk = filter.column.quoted(),
            referenced = filter.references.quoted(),
            referenced_col = filter.referenced_column.quoted(),
        )),
    }
}

/// Number of distinct `key` values that occur more than once in `staging`.
pub fn repeated_keys(staging: &Identifier, key: &[Identifier]) -> String {
    format!(
        "SELECT COUNT(*) FROM ( \
             SELECT 1 FROM {} GROUP BY {} HAVING COUNT(*) > 1 \
         ) AS repeated",
        staging.quoted(),
        column_list(key, None)
    )
}

fn skip_existing(primary_key: &[Identifier]) -> String {
    if primary_key.is_empty() {
        String::new()
    } else {
        format!(" ON CONFLICT ({}) DO NOTHING", column_list(primary_key, None))
    }
}

fn column_list(columns: &[Identifier], alias: Option<&str>) -> String {
    columns
        .iter()
        .map(|c| match alias {
            Some(alias) => format!("{alias}.{}", c.quoted()),
            None => c.quoted(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

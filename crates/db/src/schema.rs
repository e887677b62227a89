//! Applies namespace DDL scripts.

use stageload_core::identifier::Identifier;

use crate::error::LoadError;
use crate::scope::ConnectionScope;

/// Run a DDL script that (re)creates `namespace` and its tables.
///
/// The script is sent as one simple-query batch, so it may hold any number
/// of statements. Without explicit `BEGIN`/`COMMIT` inside it, PostgreSQL
/// runs the batch atomically.
pub async fn apply_schema(
    scope: &mut ConnectionScope,
    namespace: &Identifier,
    script: &str,
) -> Result<(), LoadError> {
    tracing::info!(namespace = %namespace, "Creating {namespace} schema...");

    sqlx::raw_sql(script)
        .execute(scope.connection())
        .await
        .map_err(|source| LoadError::Schema {
            namespace: namespace.to_string(),
            source,
        })?;

    tracing::debug!(namespace = %namespace, "Schema script applied");
    Ok(())
}

//! Bulk transfer of one source file into its landing area.
//!
//! Rows are streamed to the server with `COPY ... FROM STDIN`. The landing
//! area is either the destination itself, with its constraints live, or a
//! temporary staging table shaped like the destination but without any
//! key or uniqueness constraint.

use std::path::Path;

use sqlx::postgres::PgConnection;
use stageload_core::descriptor::TableLoadSpec;
use stageload_core::identifier::Identifier;
use stageload_core::sql;
use stageload_core::types::RowCount;
use tokio::io::AsyncReadExt;

use crate::error::LoadError;
use crate::resolver;

/// Size of each chunk sent over the `COPY` sub-protocol.
const COPY_CHUNK_BYTES: usize = 64 * 1024;

/// Where the rows of a file ended up.
#[derive(Debug)]
pub struct Landed {
    /// Staging table holding the rows, or `None` when they went straight
    /// into the destination.
    pub staging: Option<Identifier>,
    /// Rows reported by `COPY` (header excluded).
    pub rows: RowCount,
}

/// Land `path` for `spec` inside the caller's unit of work.
///
/// Staging is used iff the spec's strategy requires it. A staging table is
/// created `ON COMMIT DROP`, so it disappears with the unit of work whether
/// that commits or rolls back.
pub async fn land(
    conn: &mut PgConnection,
    spec: &TableLoadSpec,
    path: &Path,
) -> Result<Landed, LoadError> {
    let destination = spec.destination();
    let classify = |e: sqlx::Error| LoadError::classify(e, destination, path);

    let columns = match spec.columns() {
        Some(columns) => columns.to_vec(),
        None => header_columns(path).await?,
    };

    let known = resolver::destination_columns(conn, destination).await?;
    if let Some(unknown) = columns.iter().find(|c| !known.contains(c)) {
        return Err(LoadError::MalformedInput {
            file: path.to_path_buf(),
            message: format!("column {unknown} does not exist in {destination}"),
        });
    }

    let staging = if spec.strategy().requires_staging() {
        let staging = sql::staging_table_name(destination)?;
        sqlx::query(&sql::create_staging_table(destination, &staging))
            .execute(&mut *conn)
            .await
            .map_err(classify)?;
        sqlx::query(&sql::add_landing_sequence(&staging))
            .execute(&mut *conn)
            .await
            .map_err(classify)?;
        tracing::debug!(staging = %staging, table = %destination, "Staging table created");
        Some(staging)
    } else {
        None
    };

    let target = match &staging {
        Some(staging) => staging.quoted(),
        None => destination.quoted(),
    };
    let statement = sql::copy_from_stdin(&target, &columns);
    let rows = copy_file(conn, &statement, path).await.map_err(|e| match e {
        CopyError::Sql(e) => classify(e),
        CopyError::Io(e) => LoadError::Io(e),
    })?;

    tracing::debug!(table = %destination, rows, staged = staging.is_some(), "File landed");
    Ok(Landed { staging, rows })
}

/// Read the header row of a CSV file as a column list.
///
/// An empty file, an unreadable header, or a header naming something that
/// is not a plain SQL identifier is malformed input.
pub async fn header_columns(path: &Path) -> Result<Vec<Identifier>, LoadError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_header(&path))
        .await
        .map_err(std::io::Error::from)?
}

fn read_header(path: &Path) -> Result<Vec<Identifier>, LoadError> {
    let malformed = |message: String| LoadError::MalformedInput {
        file: path.to_path_buf(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| malformed(e.to_string()))?;
    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?;

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(malformed("missing header row".into()));
    }

    headers
        .iter()
        .map(|h| {
            let name = h.trim_start_matches('\u{feff}').trim();
            Identifier::new(name).map_err(|_| malformed(format!("invalid column name {name:?}")))
        })
        .collect()
}

enum CopyError {
    Sql(sqlx::Error),
    Io(std::io::Error),
}

/// Stream `path` through `statement` and return the row count `COPY` reports.
async fn copy_file(
    conn: &mut PgConnection,
    statement: &str,
    path: &Path,
) -> Result<RowCount, CopyError> {
    let mut file = tokio::fs::File::open(path).await.map_err(CopyError::Io)?;
    let mut copy = conn.copy_in_raw(statement).await.map_err(CopyError::Sql)?;
    let mut buf = vec![0u8; COPY_CHUNK_BYTES];

    loop {
        let n = match file.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                // Leave the connection usable; the unit of work rolls back anyway.
                if let Err(abort_err) = copy.abort(e.to_string()).await {
                    tracing::warn!(error = %abort_err, "COPY abort failed");
                }
                return Err(CopyError::Io(e));
            }
        };
        copy.send(&buf[..n]).await.map_err(CopyError::Sql)?;
    }

    copy.finish().await.map_err(CopyError::Sql)
}

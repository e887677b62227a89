//! Scoped ownership of the single PostgreSQL connection of a dataset run.
//!
//! A [`ConnectionScope`] opens exactly one connection (no pool) and hands out
//! units of work as `sqlx` transactions. A transaction that is dropped
//! without [`Transaction::commit`] is rolled back, so every early return or
//! `?` inside a unit of work discards its partial work. Dropping the scope
//! closes the socket; [`ConnectionScope::close`] does so gracefully.

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, Transaction};

use crate::config::ConnectionParams;
use crate::error::LoadError;

/// The connection of one dataset run.
pub struct ConnectionScope {
    conn: PgConnection,
}

impl ConnectionScope {
    /// Connect using caller-supplied parameters.
    pub async fn open(params: &ConnectionParams) -> Result<Self, LoadError> {
        tracing::debug!(server = %params, "Opening connection scope");
        Self::connect_with(&params.connect_options()).await
    }

    /// Connect using fully built `sqlx` options.
    pub async fn connect_with(options: &PgConnectOptions) -> Result<Self, LoadError> {
        let conn = PgConnection::connect_with(options)
            .await
            .map_err(LoadError::ConnectionFailure)?;
        Ok(Self { conn })
    }

    /// Start a unit of work. It rolls back unless committed.
    pub async fn unit_of_work(&mut self) -> Result<Transaction<'_, Postgres>, LoadError> {
        self.conn.begin().await.map_err(LoadError::from_sqlx)
    }

    /// Direct access for statements that manage their own transaction
    /// boundaries, such as multi-statement DDL scripts.
    pub(crate) fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Terminate the session gracefully.
    pub async fn close(self) -> Result<(), LoadError> {
        self.conn.close().await.map_err(LoadError::ConnectionFailure)?;
        tracing::debug!("Connection scope closed");
        Ok(())
    }
}

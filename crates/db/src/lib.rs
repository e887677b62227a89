//! `stageload-db` -- executes dataset loads against PostgreSQL.
//!
//! Leaf-first: [`scope`] owns the connection, [`schema`] applies DDL,
//! [`landing`] bulk-copies files, [`resolver`] promotes staged rows and
//! [`loader`] walks a dataset descriptor in order.

pub mod config;
pub mod error;
pub mod landing;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod scope;

pub use config::ConnectionParams;
pub use error::{DatasetError, LoadError};
pub use loader::{load_dataset, run_dataset, run_independent, run_with_schema};
pub use scope::ConnectionScope;

//! `stageload-core` -- pure types and SQL text builders for the staged
//! bulk loader.
//!
//! Nothing in this crate touches the database, the filesystem or an async
//! runtime. The `stageload-db` crate executes what is described here.

pub mod descriptor;
pub mod error;
pub mod identifier;
pub mod outcome;
pub mod sql;
pub mod strategy;
pub mod types;

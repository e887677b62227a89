//! `stageload-cli` library crate.
//!
//! Re-exports the argument, dataset and report modules for integration
//! testing. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod datasets;
pub mod report;

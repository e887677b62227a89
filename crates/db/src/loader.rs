//! Dependency-ordered loading of a dataset.
//!
//! Specs run strictly in descriptor order, one unit of work each. A spec
//! whose source file is missing is skipped; any other error aborts the
//! remaining specs. Every spec that reached `Done` before the failure stays
//! committed, and the failing spec's unit of work (staging table included)
//! is rolled back.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use stageload_core::descriptor::{DatasetDescriptor, TableLoadSpec};
use stageload_core::outcome::{DatasetReport, LoadOutcome, LoadState};

use crate::config::ConnectionParams;
use crate::error::{DatasetError, LoadError};
use crate::landing;
use crate::resolver;
use crate::schema;
use crate::scope::ConnectionScope;

/// Open a connection scope, load `descriptor` from `data_root`, close the scope.
pub async fn run_dataset(
    descriptor: &DatasetDescriptor,
    data_root: &Path,
    params: &ConnectionParams,
) -> Result<DatasetReport, DatasetError> {
    let mut scope = ConnectionScope::open(params)
        .await
        .map_err(|e| DatasetError::at_phase(descriptor, "connect", e))?;

    let report = load_dataset(&mut scope, descriptor, data_root).await?;

    scope
        .close()
        .await
        .map_err(|e| DatasetError::at_phase(descriptor, "close", e))?;
    Ok(report)
}

/// Like [`run_dataset`], but first applies the namespace's DDL script on the
/// same connection.
pub async fn run_with_schema(
    descriptor: &DatasetDescriptor,
    schema_script: &str,
    data_root: &Path,
    params: &ConnectionParams,
) -> Result<DatasetReport, DatasetError> {
    let mut scope = ConnectionScope::open(params)
        .await
        .map_err(|e| DatasetError::at_phase(descriptor, "connect", e))?;

    schema::apply_schema(&mut scope, descriptor.namespace(), schema_script)
        .await
        .map_err(|e| DatasetError::at_phase(descriptor, "schema", e))?;

    let report = load_dataset(&mut scope, descriptor, data_root).await?;

    scope
        .close()
        .await
        .map_err(|e| DatasetError::at_phase(descriptor, "close", e))?;
    Ok(report)
}

/// Run datasets that do not reference each other concurrently, each on its
/// own connection. Results come back in input order.
///
/// Datasets with cross references (a foreign-key filter pointing into
/// another dataset's namespace) must go through [`run_dataset`] one after
/// the other instead.
pub async fn run_independent(
    datasets: &[&DatasetDescriptor],
    data_root: &Path,
    params: &ConnectionParams,
) -> Vec<Result<DatasetReport, DatasetError>> {
    join_all(
        datasets
            .iter()
            .map(|descriptor| run_dataset(descriptor, data_root, params)),
    )
    .await
}

/// Load every spec of `descriptor` in order over an open scope.
pub async fn load_dataset(
    scope: &mut ConnectionScope,
    descriptor: &DatasetDescriptor,
    data_root: &Path,
) -> Result<DatasetReport, DatasetError> {
    let started_at = Utc::now();
    let dataset_dir = data_root.join(descriptor.directory());
    let mut outcomes = Vec::with_capacity(descriptor.specs().len());

    tracing::info!(
        dataset = descriptor.name(),
        dir = %dataset_dir.display(),
        tables = descriptor.specs().len(),
        "Loading {} data...",
        descriptor.namespace()
    );

    for spec in descriptor.specs() {
        tracing::debug!(table = %spec.destination(), state = %LoadState::Pending);
        match load_table(scope, spec, &dataset_dir).await {
            Ok(outcome) => {
                tracing::debug!(table = %spec.destination(), state = %outcome.state());
                outcomes.push(outcome);
            }
            Err(e) => {
                tracing::error!(
                    table = %spec.destination(),
                    file = spec.source_file(),
                    state = %LoadState::Failed,
                    error = %e,
                    "Table load failed, aborting dataset"
                );
                return Err(DatasetError::at_spec(descriptor, spec, e));
            }
        }
    }

    let report = DatasetReport::new(descriptor, outcomes, started_at, Utc::now());
    let loaded: Vec<String> = report.loaded_tables().iter().map(|t| t.to_string()).collect();
    tracing::info!(
        dataset = descriptor.name(),
        promoted = report.total_promoted(),
        rejected = report.total_rejected(),
        skipped = report.skipped_count(),
        "Schema \"{}\" created successfully. Tables loaded: [{}]",
        descriptor.namespace(),
        loaded.join(", ")
    );
    Ok(report)
}

/// Load one spec in its own unit of work.
///
/// A missing source file yields a skipped outcome instead of an error.
pub async fn load_table(
    scope: &mut ConnectionScope,
    spec: &TableLoadSpec,
    dataset_dir: &Path,
) -> Result<LoadOutcome, LoadError> {
    let path = match resolve_source(dataset_dir, spec).await {
        Ok(path) => path,
        Err(e) if e.is_recoverable() => {
            tracing::warn!(
                table = %spec.destination(),
                "Warning: {} not found, skipping...",
                spec.source_file()
            );
            return Ok(LoadOutcome::skipped(spec));
        }
        Err(e) => return Err(e),
    };

    tracing::info!(
        strategy = %spec.strategy(),
        "Loading {} -> {}",
        spec.source_file(),
        spec.destination()
    );
    let started = Instant::now();

    let mut tx = scope.unit_of_work().await?;

    tracing::debug!(table = %spec.destination(), state = %LoadState::Landing);
    let landed = landing::land(&mut tx, spec, &path).await?;

    let promoted = match &landed.staging {
        Some(staging) => {
            tracing::debug!(table = %spec.destination(), state = %LoadState::Resolving);
            resolver::promote(&mut tx, spec, staging, landed.rows, &path).await?
        }
        None => {
            tracing::info!(table = %spec.destination(), "  → Inserted {} rows", landed.rows);
            landed.rows
        }
    };

    tx.commit().await.map_err(LoadError::from_sqlx)?;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(LoadOutcome::loaded(spec, landed.rows, promoted, elapsed_ms))
}

/// `dataset_dir / source_file`, or [`LoadError::MissingSourceFile`].
async fn resolve_source(dataset_dir: &Path, spec: &TableLoadSpec) -> Result<PathBuf, LoadError> {
    let path = dataset_dir.join(spec.source_file());
    if tokio::fs::try_exists(&path).await? {
        Ok(path)
    } else {
        Err(LoadError::MissingSourceFile(path))
    }
}

//! Per-table load outcomes and per-dataset reports.

use serde::Serialize;

use crate::descriptor::{DatasetDescriptor, TableLoadSpec};
use crate::identifier::QualifiedName;
use crate::types::{RowCount, Timestamp};

// ---------------------------------------------------------------------------
// LoadState
// ---------------------------------------------------------------------------

/// Lifecycle of one table load within a dataset run.
///
/// `Pending -> Landing -> (Resolving) -> Done | Skipped | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Pending,
    Landing,
    Resolving,
    Done,
    Skipped,
    Failed,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Landing => "landing",
            Self::Resolving => "resolving",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LoadOutcome
// ---------------------------------------------------------------------------

/// What happened to one [`TableLoadSpec`] during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    pub source_file: String,
    pub destination: QualifiedName,
    pub strategy: &'static str,
    pub rows_landed: RowCount,
    pub rows_promoted: RowCount,
    /// Rows dropped by remediation (`rows_landed - rows_promoted`).
    pub rows_rejected: RowCount,
    /// The source file did not exist.
    pub skipped: bool,
    pub elapsed_ms: u64,
}

impl LoadOutcome {
    pub fn skipped(spec: &TableLoadSpec) -> Self {
        Self {
            source_file: spec.source_file().to_string(),
            destination: spec.destination().clone(),
            strategy: spec.strategy().label(),
            rows_landed: 0,
            rows_promoted: 0,
            rows_rejected: 0,
            skipped: true,
            elapsed_ms: 0,
        }
    }

    pub fn loaded(
        spec: &TableLoadSpec,
        rows_landed: RowCount,
        rows_promoted: RowCount,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            source_file: spec.source_file().to_string(),
            destination: spec.destination().clone(),
            strategy: spec.strategy().label(),
            rows_landed,
            rows_promoted,
            rows_rejected: rows_landed.saturating_sub(rows_promoted),
            skipped: false,
            elapsed_ms,
        }
    }

    pub fn state(&self) -> LoadState {
        if self.skipped {
            LoadState::Skipped
        } else {
            LoadState::Done
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetReport
// ---------------------------------------------------------------------------

/// All outcomes of one dataset run, in descriptor order.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub namespace: String,
    pub outcomes: Vec<LoadOutcome>,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl DatasetReport {
    pub fn new(
        descriptor: &DatasetDescriptor,
        outcomes: Vec<LoadOutcome>,
        started_at: Timestamp,
        finished_at: Timestamp,
    ) -> Self {
        Self {
            dataset: descriptor.name().to_string(),
            namespace: descriptor.namespace().to_string(),
            outcomes,
            started_at,
            finished_at,
        }
    }

    pub fn total_landed(&self) -> RowCount {
        self.outcomes.iter().map(|o| o.rows_landed).sum()
    }

    pub fn total_promoted(&self) -> RowCount {
        self.outcomes.iter().map(|o| o.rows_promoted).sum()
    }

    pub fn total_rejected(&self) -> RowCount {
        self.outcomes.iter().map(|o| o.rows_rejected).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped).count()
    }

    /// Tables that were actually loaded (not skipped), in order.
    pub fn loaded_tables(&self) -> Vec<&QualifiedName> {
        self.outcomes
            .iter()
            .filter(|o| !o.skipped)
            .map(|o| &o.destination)
            .collect()
    }

    /// Look up the outcome for a destination table.
    pub fn outcome_for(&self, table: &str) -> Option<&LoadOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.destination.to_string() == table)
    }
}

//! Dataset descriptors: the ordered list of files a dataset run loads.
//!
//! A [`DatasetDescriptor`] is built once from static configuration and is
//! read-only afterwards. The order of its specs is the dependency order:
//! a table that is the target of a foreign-key filter must be loaded
//! before the table that filters on it.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::identifier::{Identifier, QualifiedName};
use crate::strategy::RemediationStrategy;

// ---------------------------------------------------------------------------
// TableLoadSpec
// ---------------------------------------------------------------------------

/// How one source file is loaded into one destination table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoadSpec {
    source_file: String,
    destination: QualifiedName,
    columns: Option<Vec<Identifier>>,
    strategy: RemediationStrategy,
}

impl TableLoadSpec {
    /// A direct-load spec for `source_file` into `destination` (`namespace.table`).
    pub fn new(source_file: impl Into<String>, destination: &str) -> Result<Self, CoreError> {
        Ok(Self {
            source_file: source_file.into(),
            destination: QualifiedName::parse(destination)?,
            columns: None,
            strategy: RemediationStrategy::None,
        })
    }

    /// Load the file's fields into these columns, in order, instead of the
    /// names in its header row.
    pub fn with_columns(mut self, columns: &[&str]) -> Result<Self, CoreError> {
        if columns.is_empty() {
            return Err(CoreError::EmptyColumnList(self.destination));
        }
        let columns = columns
            .iter()
            .map(|c| Identifier::new(c))
            .collect::<Result<Vec<_>, _>>()?;
        self.columns = Some(columns);
        Ok(self)
    }

    pub fn with_strategy(mut self, strategy: RemediationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn destination(&self) -> &QualifiedName {
        &self.destination
    }

    pub fn columns(&self) -> Option<&[Identifier]> {
        self.columns.as_deref()
    }

    pub fn strategy(&self) -> &RemediationStrategy {
        &self.strategy
    }
}

// ---------------------------------------------------------------------------
// DatasetDescriptor
// ---------------------------------------------------------------------------

/// An ordered, validated set of [`TableLoadSpec`]s for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetDescriptor {
    name: String,
    namespace: Identifier,
    directory: String,
    specs: Vec<TableLoadSpec>,
}

impl DatasetDescriptor {
    /// Build a descriptor, checking that:
    ///
    /// - every destination lives in `namespace`,
    /// - no destination is loaded twice,
    /// - foreign-key filters against tables of this dataset point backwards.
    pub fn new(
        name: impl Into<String>,
        namespace: &str,
        directory: impl Into<String>,
        specs: Vec<TableLoadSpec>,
    ) -> Result<Self, CoreError> {
        let namespace = Identifier::new(namespace)?;
        let mut positions: HashMap<&QualifiedName, usize> = HashMap::new();

        for (idx, spec) in specs.iter().enumerate() {
            if spec.destination.namespace() != &namespace {
                return Err(CoreError::ForeignNamespace {
                    table: spec.destination.clone(),
                    namespace: namespace.to_string(),
                });
            }
            if positions.insert(&spec.destination, idx).is_some() {
                return Err(CoreError::DuplicateDestination(spec.destination.clone()));
            }
        }

        for (idx, spec) in specs.iter().enumerate() {
            let Some(referenced) = spec.strategy.referenced_table() else {
                continue;
            };
            if let Some(&referenced_idx) = positions.get(referenced) {
                if referenced_idx >= idx {
                    return Err(CoreError::DependencyOrder {
                        table: spec.destination.clone(),
                        referenced: referenced.clone(),
                    });
                }
            }
        }

        Ok(Self {
            name: name.into(),
            namespace,
            directory: directory.into(),
            specs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Identifier {
        &self.namespace
    }

    /// Subdirectory of the data root holding this dataset's files.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn specs(&self) -> &[TableLoadSpec] {
        &self.specs
    }

    /// Destination tables in load order.
    pub fn tables(&self) -> impl Iterator<Item = &QualifiedName> {
        self.specs.iter().map(TableLoadSpec::destination)
    }
}

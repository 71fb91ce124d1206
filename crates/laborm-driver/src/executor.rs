//! Sequences a schema diff into driver calls.
//!
//! Order of application:
//! 1. Create new models (declared order)
//! 2. Drop removed models
//! 3. Per changed model: add, then update, then remove columns
//! 4. Store the declared schema as the new snapshot
//!
//! The snapshot is written last, so a failed run leaves the previous
//! snapshot in place. Structural changes already issued are not rolled back.

use std::fmt;
use std::future::Future;

use laborm_core::migration::{DiffEngine, MigrationError, SchemaDiff};
use laborm_core::types::SchemaDocument;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::DriverError;
use crate::traits::SchemaDriver;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// What a migration run is going to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "diff", rename_all = "snake_case")]
pub enum MigrationPlan {
    /// Nothing is stored yet: create every declared model.
    Bootstrap(SchemaDiff),
    /// Reconcile the stored schema with the declared one.
    Diff(SchemaDiff),
}

impl MigrationPlan {
    pub fn diff(&self) -> &SchemaDiff {
        match self {
            Self::Bootstrap(diff) | Self::Diff(diff) => diff,
        }
    }

    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap(_))
    }

    /// True when the store already matches the declared schema.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Diff(diff) if diff.is_empty())
    }
}

impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diff())
    }
}

// ---------------------------------------------------------------------------
// Operations and report
// ---------------------------------------------------------------------------

/// A single driver call issued by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    LoadSchema,
    CreateTable { table: String },
    DropTable { table: String },
    AddColumn { table: String, column: String },
    UpdateColumn { table: String, column: String },
    DropColumn { table: String, column: String },
    StoreSchema,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadSchema => write!(f, "load schema snapshot"),
            Self::CreateTable { table } => write!(f, "create table {table}"),
            Self::DropTable { table } => write!(f, "drop table {table}"),
            Self::AddColumn { table, column } => write!(f, "add column {table}.{column}"),
            Self::UpdateColumn { table, column } => write!(f, "update column {table}.{column}"),
            Self::DropColumn { table, column } => write!(f, "drop column {table}.{column}"),
            Self::StoreSchema => write!(f, "store schema snapshot"),
        }
    }
}

/// The operations a successful run performed, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub operations: Vec<Operation>,
}

impl ApplyReport {
    /// Number of structural changes, excluding the snapshot write.
    pub fn structural_changes(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| !matches!(op, Operation::StoreSchema | Operation::LoadSchema))
            .count()
    }
}

/// The structural operations `diff` translates to, in application order.
///
/// The snapshot write that ends every run is not included.
pub fn planned_operations(diff: &SchemaDiff) -> Vec<Operation> {
    let mut ops: Vec<Operation> = diff
        .models_to_add
        .iter()
        .map(|m| Operation::CreateTable {
            table: m.name().to_string(),
        })
        .collect();
    ops.extend(diff.models_to_drop.iter().map(|m| Operation::DropTable {
        table: m.name().to_string(),
    }));
    for model_diff in &diff.model_diffs {
        let table = model_diff.model.name();
        for column in &model_diff.columns_to_add {
            ops.push(Operation::AddColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            });
        }
        for column in &model_diff.columns_to_update {
            ops.push(Operation::UpdateColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            });
        }
        for column in &model_diff.columns_to_remove {
            ops.push(Operation::DropColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            });
        }
    }
    ops
}

/// Whether a run applies its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrateMode {
    #[default]
    Apply,
    /// Compute and return the plan without issuing any mutation.
    NoAction,
}

/// Result of [`migrate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub plan: MigrationPlan,
    /// `None` in [`MigrateMode::NoAction`].
    pub report: Option<ApplyReport>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a migration run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MigrateError {
    /// The differ rejected the change set. No driver mutation was issued.
    Unsafe(MigrationError),
    /// A driver call failed after `completed` operations succeeded.
    Driver {
        operation: Operation,
        completed: Vec<Operation>,
        source: DriverError,
    },
}

impl fmt::Display for MigrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsafe(e) => write!(f, "unsafe migration: {e}"),
            Self::Driver {
                operation,
                completed,
                source,
            } => write!(
                f,
                "failed to {operation} after {} completed operation(s): {source}",
                completed.len()
            ),
        }
    }
}

impl std::error::Error for MigrateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unsafe(e) => Some(e),
            Self::Driver { source, .. } => Some(source),
        }
    }
}

impl From<MigrationError> for MigrateError {
    fn from(e: MigrationError) -> Self {
        Self::Unsafe(e)
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Tracks completed operations so a failure can report progress.
#[derive(Default)]
struct Progress {
    completed: Vec<Operation>,
}

impl Progress {
    async fn step<F>(&mut self, operation: Operation, call: F) -> Result<(), MigrateError>
    where
        F: Future<Output = Result<(), DriverError>>,
    {
        debug!(%operation, "issuing driver call");
        match call.await {
            Ok(()) => {
                info!(%operation, "done");
                self.completed.push(operation);
                Ok(())
            }
            Err(source) => Err(MigrateError::Driver {
                operation,
                completed: std::mem::take(&mut self.completed),
                source,
            }),
        }
    }

    fn finish(self) -> ApplyReport {
        ApplyReport {
            operations: self.completed,
        }
    }
}

/// Loads the stored schema and decides what to do.
///
/// Returns [`MigrateError::Unsafe`] before any mutation if the differ rejects
/// the change set.
pub async fn plan<D: SchemaDriver>(
    driver: &D,
    declared: &SchemaDocument,
) -> Result<MigrationPlan, MigrateError> {
    let physical = driver
        .load_schema()
        .await
        .map_err(|source| MigrateError::Driver {
            operation: Operation::LoadSchema,
            completed: Vec::new(),
            source,
        })?;

    match physical {
        None => {
            debug!("no stored schema, planning bootstrap");
            Ok(MigrationPlan::Bootstrap(DiffEngine::create_all(declared)))
        }
        Some(physical) => Ok(MigrationPlan::Diff(DiffEngine::diff(declared, &physical)?)),
    }
}

/// Creates every declared model in declared order, then stores the snapshot.
pub async fn bootstrap<D: SchemaDriver>(
    driver: &D,
    declared: &SchemaDocument,
) -> Result<ApplyReport, MigrateError> {
    apply(driver, &DiffEngine::create_all(declared), declared).await
}

/// Applies `diff`, then stores `declared` as the new snapshot.
pub async fn apply<D: SchemaDriver>(
    driver: &D,
    diff: &SchemaDiff,
    declared: &SchemaDocument,
) -> Result<ApplyReport, MigrateError> {
    let mut progress = Progress::default();

    for model in &diff.models_to_add {
        let operation = Operation::CreateTable {
            table: model.name().to_string(),
        };
        progress
            .step(operation, driver.create_table(declared, model))
            .await?;
    }

    for model in &diff.models_to_drop {
        let operation = Operation::DropTable {
            table: model.name().to_string(),
        };
        progress
            .step(operation, driver.drop_table(declared, model))
            .await?;
    }

    for model_diff in &diff.model_diffs {
        let table = model_diff.model.name();
        for column in &model_diff.columns_to_add {
            let operation = Operation::AddColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            };
            progress
                .step(operation, driver.add_column(declared, column))
                .await?;
        }
        for column in &model_diff.columns_to_update {
            let operation = Operation::UpdateColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            };
            progress
                .step(operation, driver.update_column(declared, column))
                .await?;
        }
        for column in &model_diff.columns_to_remove {
            let operation = Operation::DropColumn {
                table: table.to_string(),
                column: column.name().to_string(),
            };
            progress
                .step(operation, driver.drop_column(declared, column))
                .await?;
        }
    }

    progress
        .step(Operation::StoreSchema, driver.store_schema(declared))
        .await?;
    Ok(progress.finish())
}

/// Runs a previously computed plan.
pub async fn execute<D: SchemaDriver>(
    driver: &D,
    plan: &MigrationPlan,
    declared: &SchemaDocument,
) -> Result<ApplyReport, MigrateError> {
    match plan {
        MigrationPlan::Bootstrap(_) => bootstrap(driver, declared).await,
        MigrationPlan::Diff(diff) => apply(driver, diff, declared).await,
    }
}

/// Plans and, unless `mode` is [`MigrateMode::NoAction`], applies a migration.
pub async fn migrate<D: SchemaDriver>(
    driver: &D,
    declared: &SchemaDocument,
    mode: MigrateMode,
) -> Result<MigrationOutcome, MigrateError> {
    let plan = plan(driver, declared).await?;
    info!(
        bootstrap = plan.is_bootstrap(),
        changes = plan.diff().len(),
        safety = %plan.diff().overall_safety(),
        "migration planned"
    );

    let report = match mode {
        MigrateMode::NoAction => None,
        MigrateMode::Apply => Some(execute(driver, &plan, declared).await?),
    };
    Ok(MigrationOutcome { plan, report })
}

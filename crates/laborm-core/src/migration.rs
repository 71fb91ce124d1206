use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ColumnDefinition, ModelDefinition, SchemaDocument, SourceLocation};

// ---------------------------------------------------------------------------
// MigrationSafety
// ---------------------------------------------------------------------------

/// Classification of how safe a set of changes is to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MigrationSafety {
    /// Only additions. Can be applied automatically.
    Safe,
    /// Column updates, which rewrite existing data.
    RequiresConfirmation,
    /// Drops a table or a column, losing data.
    Destructive,
}

impl fmt::Display for MigrationSafety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::RequiresConfirmation => write!(f, "requires_confirmation"),
            Self::Destructive => write!(f, "destructive"),
        }
    }
}

// ---------------------------------------------------------------------------
// ModelDiff / SchemaDiff
// ---------------------------------------------------------------------------

/// Column-level changes for a model present in both schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDiff {
    /// The declared version of the model.
    pub model: ModelDefinition,
    /// Declared columns missing from the physical model.
    pub columns_to_add: Vec<ColumnDefinition>,
    /// Physical columns missing from the declared model.
    pub columns_to_remove: Vec<ColumnDefinition>,
    /// Declared columns whose attributes changed.
    pub columns_to_update: Vec<ColumnDefinition>,
}

impl ModelDiff {
    pub fn new(model: ModelDefinition) -> Self {
        Self {
            model,
            columns_to_add: Vec::new(),
            columns_to_remove: Vec::new(),
            columns_to_update: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns_to_add.is_empty()
            && self.columns_to_remove.is_empty()
            && self.columns_to_update.is_empty()
    }

    /// Number of column operations.
    pub fn len(&self) -> usize {
        self.columns_to_add.len() + self.columns_to_remove.len() + self.columns_to_update.len()
    }
}

/// The structural changes needed to turn the physical schema into the declared one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    pub models_to_add: Vec<ModelDefinition>,
    pub models_to_drop: Vec<ModelDefinition>,
    pub model_diffs: Vec<ModelDiff>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.models_to_add.is_empty()
            && self.models_to_drop.is_empty()
            && self.model_diffs.iter().all(ModelDiff::is_empty)
    }

    /// Total number of driver operations the diff translates to.
    pub fn len(&self) -> usize {
        self.models_to_add.len()
            + self.models_to_drop.len()
            + self.model_diffs.iter().map(ModelDiff::len).sum::<usize>()
    }

    /// The most dangerous classification among all changes.
    pub fn overall_safety(&self) -> MigrationSafety {
        let drops_columns = self
            .model_diffs
            .iter()
            .any(|d| !d.columns_to_remove.is_empty());
        let updates_columns = self
            .model_diffs
            .iter()
            .any(|d| !d.columns_to_update.is_empty());

        if !self.models_to_drop.is_empty() || drops_columns {
            MigrationSafety::Destructive
        } else if updates_columns {
            MigrationSafety::RequiresConfirmation
        } else {
            MigrationSafety::Safe
        }
    }

    pub fn has_destructive_changes(&self) -> bool {
        self.overall_safety() == MigrationSafety::Destructive
    }
}

impl fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for model in &self.models_to_add {
            writeln!(f, "ADD TABLE {}", model.name())?;
        }
        for model in &self.models_to_drop {
            writeln!(f, "DROP TABLE {}", model.name())?;
        }
        for diff in self.model_diffs.iter().filter(|d| !d.is_empty()) {
            writeln!(f, "UPDATE TABLE {}", diff.model.name())?;
            for column in &diff.columns_to_add {
                writeln!(f, "  ADD COLUMN {}", column.name())?;
            }
            for column in &diff.columns_to_update {
                writeln!(f, "  UPDATE COLUMN {}", column.name())?;
            }
            for column in &diff.columns_to_remove {
                writeln!(f, "  DROP COLUMN {}", column.name())?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DiffEngine
// ---------------------------------------------------------------------------

/// Computes schema diffs. All functions are pure.
pub struct DiffEngine;

impl DiffEngine {
    /// Compares the declared schema against the physical one.
    ///
    /// Fails without returning a partial diff if any change would be unsafe
    /// to replay: a new column with neither a default nor a relation, or a
    /// column whose relation descriptor changed.
    pub fn diff(
        declared: &SchemaDocument,
        physical: &SchemaDocument,
    ) -> Result<SchemaDiff, MigrationError> {
        let mut result = SchemaDiff::default();

        for model in &physical.models {
            if declared.model(model.name()).is_none() {
                debug!(model = model.name(), "model queued for drop");
                result.models_to_drop.push(model.clone());
            }
        }

        for model in &declared.models {
            match physical.model(model.name()) {
                None => {
                    debug!(model = model.name(), "model queued for creation");
                    result.models_to_add.push(model.clone());
                }
                Some(existing) => {
                    let diff = Self::diff_model(model, existing)?;
                    if !diff.is_empty() {
                        result.model_diffs.push(diff);
                    }
                }
            }
        }

        Ok(result)
    }

    /// A diff that creates every declared model, used when nothing is stored yet.
    pub fn create_all(declared: &SchemaDocument) -> SchemaDiff {
        SchemaDiff {
            models_to_add: declared.models.clone(),
            ..SchemaDiff::default()
        }
    }

    fn diff_model(
        declared: &ModelDefinition,
        physical: &ModelDefinition,
    ) -> Result<ModelDiff, MigrationError> {
        let mut diff = ModelDiff::new(declared.clone());

        for column in &declared.columns {
            match physical.column(column.name()) {
                None => {
                    Self::check_addition(declared, column)?;
                    diff.columns_to_add.push(column.clone());
                }
                Some(existing) => {
                    Self::check_relationship(declared, column, existing)?;
                    if column.attributes_differ(existing) {
                        diff.columns_to_update.push(column.clone());
                    }
                }
            }
        }

        for column in &physical.columns {
            if declared.column(column.name()).is_none() {
                diff.columns_to_remove.push(column.clone());
            }
        }

        Ok(diff)
    }

    fn check_addition(
        model: &ModelDefinition,
        column: &ColumnDefinition,
    ) -> Result<(), MigrationError> {
        if column.default_value.is_none() && column.relationship.is_none() {
            return Err(MigrationError::NewColumnWithoutDefault {
                model: model.name().to_string(),
                column: column.name().to_string(),
                location: column.name.location.clone(),
            });
        }
        Ok(())
    }

    fn check_relationship(
        model: &ModelDefinition,
        declared: &ColumnDefinition,
        physical: &ColumnDefinition,
    ) -> Result<(), MigrationError> {
        let detail = match (&physical.relationship, &declared.relationship) {
            (None, None) => None,
            (Some(old), Some(new)) => old.shape_difference(new),
            (Some(old), None) => Some(format!("{} relation was removed", old.variant_name())),
            (None, Some(new)) => Some(format!("column became a {} relation", new.variant_name())),
        };
        match detail {
            None => Ok(()),
            Some(detail) => Err(MigrationError::RelationshipChanged {
                model: model.name().to_string(),
                column: declared.name().to_string(),
                detail,
                location: declared.name.location.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MigrationError
// ---------------------------------------------------------------------------

/// Unsafe changes detected while diffing, before any driver call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MigrationError {
    /// A column was added with neither a default value nor a relation.
    NewColumnWithoutDefault {
        model: String,
        column: String,
        location: SourceLocation,
    },
    /// A column's relation descriptor differs from the stored one.
    RelationshipChanged {
        model: String,
        column: String,
        detail: String,
        location: SourceLocation,
    },
}

impl MigrationError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::NewColumnWithoutDefault { location, .. }
            | Self::RelationshipChanged { location, .. } => location,
        }
    }
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewColumnWithoutDefault { model, column, .. } => write!(
                f,
                "new column '{model}.{column}' must declare a default value"
            ),
            Self::RelationshipChanged {
                model,
                column,
                detail,
                ..
            } => write!(
                f,
                "relation of column '{model}.{column}' cannot change ({detail}); remove it and add a column with a new name"
            ),
        }
    }
}

impl std::error::Error for MigrationError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

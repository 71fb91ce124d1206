//! Naming conventions shared by every driver.

use laborm_core::types::{ColumnDefinition, ColumnType, Relationship, SchemaDocument};

use crate::error::DriverError;

/// Key under which the schema snapshot is stored.
pub const SNAPSHOT_KEY: &str = "schema";

/// Suffix of the temporary column used while updating a column.
pub const TEMP_COLUMN_SUFFIX: &str = "_tmp_migration";

/// Name of the surrogate key column of every relation table.
pub const RELATION_ID_COLUMN: &str = "LabrelationId";

/// Name of the relation table owned by `owner.local_field` pointing at `target`.
pub fn relation_table_name(owner: &str, local_field: &str, target: &str) -> String {
    format!("Lab{owner}F{local_field}To{target}Relation")
}

pub fn temp_column_name(column: &str) -> String {
    format!("{column}{TEMP_COLUMN_SUFFIX}")
}

/// A relation table, resolved against the declared schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTable {
    pub name: String,
    pub local_column: String,
    pub remote_column: String,
    /// Type of both link columns, taken from the referenced remote field.
    pub column_type: ColumnType,
}

/// Returns the relation table name owned by `column`, if it is a field relation.
///
/// Only the column's own descriptor is needed, so this works for columns of
/// models that are no longer declared.
pub fn owned_relation_table(column: &ColumnDefinition) -> Option<String> {
    match &column.relationship {
        Some(Relationship::Field {
            target_model,
            local_field,
            ..
        }) => Some(relation_table_name(
            &column.owner_model_name,
            &local_field.text,
            &target_model.text,
        )),
        _ => None,
    }
}

/// Resolves the full relation table layout for a field relation column.
///
/// Returns `Ok(None)` for scalar and array columns.
pub fn resolve_relation_table(
    schema: &SchemaDocument,
    column: &ColumnDefinition,
) -> Result<Option<RelationTable>, DriverError> {
    let Some(Relationship::Field {
        target_model,
        local_field,
        remote_field,
    }) = &column.relationship
    else {
        return Ok(None);
    };

    let missing = |reference: String| DriverError::MissingReference {
        model: column.owner_model_name.clone(),
        column: column.name().to_string(),
        reference,
    };

    let target = schema
        .model(&target_model.text)
        .ok_or_else(|| missing(target_model.text.clone()))?;
    let remote = target
        .column(&remote_field.text)
        .filter(|c| c.column_type.is_scalar())
        .ok_or_else(|| missing(format!("{}.{}", target.name(), remote_field.text)))?;

    Ok(Some(RelationTable {
        name: relation_table_name(
            &column.owner_model_name,
            &local_field.text,
            &target_model.text,
        ),
        local_column: local_field.text.clone(),
        remote_column: remote_field.text.clone(),
        column_type: remote.column_type,
    }))
}

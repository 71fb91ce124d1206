use std::future::Future;

use laborm_core::types::{ColumnDefinition, ModelDefinition, SchemaDocument};

use crate::error::DriverError;

/// Storage-agnostic capability set needed to migrate a store.
///
/// Implementations handle:
/// - Persisting and loading the JSON snapshot of the last applied schema
/// - Translating table and column changes into the engine's native DDL
///
/// Every mutating call receives the full declared schema so relation
/// columns can resolve the model they point at.
///
/// Uses RPITIT (return position impl Trait in trait) for async methods,
/// avoiding the `async-trait` crate.
pub trait SchemaDriver: Send + Sync {
    /// Load the last stored schema snapshot.
    ///
    /// Returns `None` if nothing was ever stored, which triggers a bootstrap.
    fn load_schema(
        &self,
    ) -> impl Future<Output = Result<Option<SchemaDocument>, DriverError>> + Send;

    /// Store (upsert) the schema snapshot.
    fn store_schema(
        &self,
        schema: &SchemaDocument,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Create a table for `model`, plus one relation table per field relation.
    fn create_table(
        &self,
        schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Add a column to its owner's table. Relation columns create their
    /// relation table instead, or nothing for array relations.
    fn add_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Replace a column's definition, keeping its data.
    fn update_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Drop a column, or the relation table it owns.
    fn drop_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Drop a table together with the relation tables it owns.
    fn drop_table(
        &self,
        schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;
}

//! In-memory driver.
//!
//! Keeps a catalog of tables and a key/value store behind a mutex, and
//! journals every call it receives. Used by `--engine memory` dry runs and
//! as the reference driver in tests.

use std::collections::BTreeMap;
use std::fmt;

use laborm_core::engine::EngineDescriptor;
use laborm_core::types::{ColumnDefinition, ModelDefinition, Relationship, SchemaDocument};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::error::DriverError;
use crate::naming::{owned_relation_table, resolve_relation_table, RelationTable, SNAPSHOT_KEY};
use crate::registry::ConnectOptions;
use crate::traits::SchemaDriver;

/// The `memory` engine accepts no options.
pub const MEMORY: EngineDescriptor = EngineDescriptor {
    name: "memory",
    options: &[],
};

/// One call received by a [`MemoryDriver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DriverCall {
    LoadSchema,
    StoreSchema,
    CreateTable { table: String },
    DropTable { table: String },
    AddColumn { table: String, column: String },
    UpdateColumn { table: String, column: String },
    DropColumn { table: String, column: String },
}

impl DriverCall {
    fn column(kind: fn(String, String) -> Self, column: &ColumnDefinition) -> Self {
        kind(column.owner_model_name.clone(), column.name().to_string())
    }
}

impl fmt::Display for DriverCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadSchema => write!(f, "load schema"),
            Self::StoreSchema => write!(f, "store schema"),
            Self::CreateTable { table } => write!(f, "create table {table}"),
            Self::DropTable { table } => write!(f, "drop table {table}"),
            Self::AddColumn { table, column } => write!(f, "add column {table}.{column}"),
            Self::UpdateColumn { table, column } => write!(f, "update column {table}.{column}"),
            Self::DropColumn { table, column } => write!(f, "drop column {table}.{column}"),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, Vec<ColumnDefinition>>,
    relation_tables: BTreeMap<String, RelationTable>,
    kv: BTreeMap<String, String>,
    journal: Vec<DriverCall>,
    fail_on: Option<DriverCall>,
}

impl State {
    /// Journals `call`, failing if it was armed with [`MemoryDriver::fail_on`].
    fn record(&mut self, call: DriverCall) -> Result<(), DriverError> {
        debug!(%call, "memory driver call");
        let armed = self.fail_on.as_ref() == Some(&call);
        self.journal.push(call.clone());
        if armed {
            return Err(DriverError::Internal {
                message: format!("injected failure on {call}"),
            });
        }
        Ok(())
    }

    fn table_key(&self, table: &str) -> Option<String> {
        self.tables
            .keys()
            .find(|k| k.eq_ignore_ascii_case(table))
            .cloned()
    }

    fn table_mut(&mut self, table: &str) -> Result<&mut Vec<ColumnDefinition>, DriverError> {
        let key = self
            .table_key(table)
            .ok_or_else(|| DriverError::TableNotFound {
                table: table.to_string(),
            })?;
        self.tables
            .get_mut(&key)
            .ok_or_else(|| DriverError::TableNotFound { table: key })
    }

    /// Relation table names, like table names, compare case-insensitively.
    fn relation_key(&self, name: &str) -> Option<String> {
        self.relation_tables
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn create_relation_table(&mut self, table: RelationTable) -> Result<(), DriverError> {
        if self.relation_key(&table.name).is_some() {
            return Err(DriverError::TableExists { table: table.name });
        }
        self.relation_tables.insert(table.name.clone(), table);
        Ok(())
    }

    fn drop_relation_table(&mut self, name: &str) -> Result<(), DriverError> {
        let key = self
            .relation_key(name)
            .ok_or_else(|| DriverError::TableNotFound {
                table: name.to_string(),
            })?;
        self.relation_tables.remove(&key);
        Ok(())
    }
}

/// A driver whose store lives in process memory.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    state: Mutex<State>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry entry point. The folder is ignored.
    pub fn connect(_options: &ConnectOptions<'_>) -> Result<Self, DriverError> {
        Ok(Self::new())
    }

    /// A driver whose store already holds `schema` as its snapshot.
    ///
    /// Tables are not created; seed them with the trait methods if needed.
    pub fn with_snapshot(schema: &SchemaDocument) -> Result<Self, DriverError> {
        let driver = Self::new();
        driver
            .state
            .lock()
            .kv
            .insert(SNAPSHOT_KEY.to_string(), schema.to_json()?);
        Ok(driver)
    }

    /// Makes the next matching call fail with an internal error.
    pub fn fail_on(&self, call: DriverCall) {
        self.state.lock().fail_on = Some(call);
    }

    /// Every call received so far, in order.
    pub fn journal(&self) -> Vec<DriverCall> {
        self.state.lock().journal.clone()
    }

    /// Calls that changed the store, excluding snapshot reads.
    pub fn mutations(&self) -> Vec<DriverCall> {
        self.journal()
            .into_iter()
            .filter(|c| *c != DriverCall::LoadSchema)
            .collect()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    /// Names of the model tables.
    pub fn tables(&self) -> Vec<String> {
        self.state.lock().tables.keys().cloned().collect()
    }

    /// Names of the relation tables.
    pub fn relation_tables(&self) -> Vec<String> {
        self.state.lock().relation_tables.keys().cloned().collect()
    }

    /// Column definitions of `table`, in physical order.
    pub fn table_columns(&self, table: &str) -> Option<Vec<ColumnDefinition>> {
        let state = self.state.lock();
        let key = state.table_key(table)?;
        state.tables.get(&key).cloned()
    }

    /// The raw snapshot JSON, if one was stored.
    pub fn snapshot_json(&self) -> Option<String> {
        self.state.lock().kv.get(SNAPSHOT_KEY).cloned()
    }
}

impl SchemaDriver for MemoryDriver {
    async fn load_schema(&self) -> Result<Option<SchemaDocument>, DriverError> {
        let mut state = self.state.lock();
        state.record(DriverCall::LoadSchema)?;
        match state.kv.get(SNAPSHOT_KEY) {
            Some(json) => Ok(Some(SchemaDocument::from_json(json)?)),
            None => Ok(None),
        }
    }

    async fn store_schema(&self, schema: &SchemaDocument) -> Result<(), DriverError> {
        let json = schema.to_json()?;
        let mut state = self.state.lock();
        state.record(DriverCall::StoreSchema)?;
        state.kv.insert(SNAPSHOT_KEY.to_string(), json);
        Ok(())
    }

    async fn create_table(
        &self,
        schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> Result<(), DriverError> {
        let mut relations = Vec::new();
        for column in model.owned_relations() {
            relations.extend(resolve_relation_table(schema, column)?);
        }

        let mut state = self.state.lock();
        state.record(DriverCall::CreateTable {
            table: model.name().to_string(),
        })?;
        if state.table_key(model.name()).is_some() {
            return Err(DriverError::TableExists {
                table: model.name().to_string(),
            });
        }
        state.tables.insert(
            model.name().to_string(),
            model.stored_columns().cloned().collect(),
        );
        for relation in relations {
            state.create_relation_table(relation)?;
        }
        Ok(())
    }

    async fn add_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        let relation = resolve_relation_table(schema, column)?;

        let mut state = self.state.lock();
        state.record(DriverCall::column(
            |table, column| DriverCall::AddColumn { table, column },
            column,
        ))?;
        if let Some(relation) = relation {
            return state.create_relation_table(relation);
        }
        if matches!(column.relationship, Some(Relationship::Array { .. })) {
            return Ok(());
        }

        let columns = state.table_mut(&column.owner_model_name)?;
        if columns.iter().any(|c| c.is_named(column.name())) {
            return Err(DriverError::ColumnExists {
                table: column.owner_model_name.clone(),
                column: column.name().to_string(),
            });
        }
        columns.push(column.clone());
        Ok(())
    }

    async fn update_column(
        &self,
        _schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.record(DriverCall::column(
            |table, column| DriverCall::UpdateColumn { table, column },
            column,
        ))?;
        if column.relationship.is_some() {
            return Ok(());
        }

        let columns = state.table_mut(&column.owner_model_name)?;
        let existing = columns
            .iter_mut()
            .find(|c| c.is_named(column.name()))
            .ok_or_else(|| DriverError::ColumnNotFound {
                table: column.owner_model_name.clone(),
                column: column.name().to_string(),
            })?;
        *existing = column.clone();
        Ok(())
    }

    async fn drop_column(
        &self,
        _schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.record(DriverCall::column(
            |table, column| DriverCall::DropColumn { table, column },
            column,
        ))?;
        if let Some(name) = owned_relation_table(column) {
            return state.drop_relation_table(&name);
        }
        if column.relationship.is_some() {
            return Ok(());
        }

        let columns = state.table_mut(&column.owner_model_name)?;
        let before = columns.len();
        columns.retain(|c| !c.is_named(column.name()));
        if columns.len() == before {
            return Err(DriverError::ColumnNotFound {
                table: column.owner_model_name.clone(),
                column: column.name().to_string(),
            });
        }
        Ok(())
    }

    async fn drop_table(
        &self,
        _schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.record(DriverCall::DropTable {
            table: model.name().to_string(),
        })?;
        let key = state
            .table_key(model.name())
            .ok_or_else(|| DriverError::TableNotFound {
                table: model.name().to_string(),
            })?;
        state.tables.remove(&key);
        for column in model.owned_relations() {
            if let Some(key) = owned_relation_table(column).and_then(|n| state.relation_key(&n)) {
                state.relation_tables.remove(&key);
            }
        }
        Ok(())
    }
}

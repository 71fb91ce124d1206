//! SQLite implementation of `SchemaDriver`.
//!
//! This is the I/O boundary: all database communication happens here.
//! Statement text comes from `codegen`.

use std::path::Path;

use laborm_core::engine::{EngineDescriptor, OptionSpec};
use laborm_core::types::{ColumnDefinition, ModelDefinition, Relationship, SchemaDocument, TokenKind};
use laborm_driver::naming::{
    owned_relation_table, resolve_relation_table, temp_column_name, SNAPSHOT_KEY,
};
use laborm_driver::{ConnectOptions, DriverError, SchemaDriver};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::codegen;

/// The `sqlite3` engine requires a `file` option, relative to the run folder.
pub const SQLITE3: EngineDescriptor = EngineDescriptor {
    name: "sqlite3",
    options: &[OptionSpec::required("file", TokenKind::String)],
};

/// SQLite driver.
///
/// Wraps a single `rusqlite::Connection`. Calls are serialized through a mutex.
pub struct SqliteDriver {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDriver").finish_non_exhaustive()
    }
}

impl SqliteDriver {
    /// Open (or create) a database file and make sure the snapshot table exists.
    pub fn open(path: &Path) -> Result<Self, DriverError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DriverError::ConnectionError {
                message: format!("cannot create '{}': {e}", parent.display()),
            })?;
        }
        let conn = Connection::open(path).map_err(|e| DriverError::ConnectionError {
            message: format!("cannot open '{}': {e}", path.display()),
        })?;
        info!(path = %path.display(), "opened sqlite database");
        Self::init(conn)
    }

    /// Open a private in-memory database, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, DriverError> {
        let conn = Connection::open_in_memory().map_err(|e| DriverError::ConnectionError {
            message: e.to_string(),
        })?;
        Self::init(conn)
    }

    /// Registry entry point: resolves the `file` option against the folder.
    pub fn connect(options: &ConnectOptions<'_>) -> Result<Self, DriverError> {
        let file = options
            .option_text("file")
            .ok_or_else(|| DriverError::ConnectionError {
                message: "engine option 'file' is required".to_string(),
            })?;
        Self::open(&options.folder.join(file))
    }

    fn init(conn: Connection) -> Result<Self, DriverError> {
        let driver = Self {
            conn: Mutex::new(conn),
        };
        driver.execute(&codegen::create_key_value_table_sql())?;
        Ok(driver)
    }

    fn execute(&self, sql: &str) -> Result<(), DriverError> {
        debug!(sql, "executing");
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| DriverError::QueryError {
                statement: sql.to_string(),
                message: e.to_string(),
            })
    }

    fn table_exists(&self, table: &str) -> Result<bool, DriverError> {
        let sql = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE";
        let count: i64 = self
            .conn
            .lock()
            .query_row(sql, params![table], |row| row.get(0))
            .map_err(|e| DriverError::QueryError {
                statement: sql.to_string(),
                message: e.to_string(),
            })?;
        Ok(count > 0)
    }

    /// Names of all user tables, including relation and snapshot tables.
    pub fn table_names(&self) -> Result<Vec<String>, DriverError> {
        let sql = "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
        let conn = self.conn.lock();
        let query_error = |e: rusqlite::Error| DriverError::QueryError {
            statement: sql.to_string(),
            message: e.to_string(),
        };
        let mut stmt = conn.prepare(sql).map_err(query_error)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;
        Ok(names)
    }

    /// Column names of `table`, in physical order.
    pub fn column_names(&self, table: &str) -> Result<Vec<String>, DriverError> {
        let sql = format!("PRAGMA table_info({})", codegen::quote_ident(table));
        let conn = self.conn.lock();
        let query_error = |e: rusqlite::Error| DriverError::QueryError {
            statement: sql.clone(),
            message: e.to_string(),
        };
        let mut stmt = conn.prepare(&sql).map_err(query_error)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(query_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;
        Ok(names)
    }

    fn reject_primary_key(operation: &str, column: &ColumnDefinition) -> Result<(), DriverError> {
        if column.primary_key {
            return Err(DriverError::Unsupported {
                operation: format!("{operation} {}.{}", column.owner_model_name, column.name()),
                reason: "sqlite cannot alter a primary key column in place".to_string(),
            });
        }
        Ok(())
    }
}

impl SchemaDriver for SqliteDriver {
    async fn load_schema(&self) -> Result<Option<SchemaDocument>, DriverError> {
        let sql = codegen::select_key_value_sql();
        let json: Option<String> = self
            .conn
            .lock()
            .query_row(&sql, params![SNAPSHOT_KEY], |row| row.get(0))
            .optional()
            .map_err(|e| DriverError::QueryError {
                statement: sql.clone(),
                message: e.to_string(),
            })?;

        match json {
            Some(json) => Ok(Some(SchemaDocument::from_json(&json)?)),
            None => Ok(None),
        }
    }

    async fn store_schema(&self, schema: &SchemaDocument) -> Result<(), DriverError> {
        let json = schema.to_json()?;
        let sql = codegen::upsert_key_value_sql();
        self.conn
            .lock()
            .execute(&sql, params![SNAPSHOT_KEY, json])
            .map_err(|e| DriverError::QueryError {
                statement: sql.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn create_table(
        &self,
        schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> Result<(), DriverError> {
        if self.table_exists(model.name())? {
            return Err(DriverError::TableExists {
                table: model.name().to_string(),
            });
        }
        self.execute(&codegen::create_table_sql(model))?;
        for column in model.owned_relations() {
            if let Some(relation) = resolve_relation_table(schema, column)? {
                self.execute(&codegen::create_relation_table_sql(&relation))?;
            }
        }
        Ok(())
    }

    async fn add_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        if let Some(relation) = resolve_relation_table(schema, column)? {
            return self.execute(&codegen::create_relation_table_sql(&relation));
        }
        if matches!(column.relationship, Some(Relationship::Array { .. })) {
            return Ok(());
        }
        Self::reject_primary_key("add column", column)?;
        self.execute(&codegen::add_column_sql(
            &column.owner_model_name,
            column,
            false,
        ))
    }

    async fn update_column(
        &self,
        _schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        if column.relationship.is_some() {
            return Ok(());
        }
        Self::reject_primary_key("update column", column)?;
        let temp = temp_column_name(column.name());
        for sql in codegen::update_column_sql(&column.owner_model_name, column, &temp) {
            self.execute(&sql)?;
        }
        Ok(())
    }

    async fn drop_column(
        &self,
        _schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        if let Some(table) = owned_relation_table(column) {
            return self.execute(&codegen::drop_table_if_exists_sql(&table));
        }
        if column.relationship.is_some() {
            return Ok(());
        }
        self.execute(&codegen::drop_column_sql(
            &column.owner_model_name,
            column.name(),
        ))
    }

    async fn drop_table(
        &self,
        _schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> Result<(), DriverError> {
        if !self.table_exists(model.name())? {
            return Err(DriverError::TableNotFound {
                table: model.name().to_string(),
            });
        }
        self.execute(&codegen::drop_table_sql(model.name()))?;
        for column in model.owned_relations() {
            if let Some(table) = owned_relation_table(column) {
                self.execute(&codegen::drop_table_if_exists_sql(&table))?;
            }
        }
        Ok(())
    }
}

use laborm_core::types::{ColumnDefinition, ModelDefinition, SchemaDocument};
use laborm_driver::{
    ConnectOptions, DriverError, EngineEntry, EngineRegistry, MemoryDriver, SchemaDriver, MEMORY,
};
use laborm_sqlite::{SqliteDriver, SQLITE3};

/// Any driver the binary can open, selected by the schema's `@engine` block.
#[derive(Debug)]
pub enum AnyDriver {
    Memory(MemoryDriver),
    Sqlite3(SqliteDriver),
}

fn connect_memory(options: &ConnectOptions<'_>) -> Result<AnyDriver, DriverError> {
    MemoryDriver::connect(options).map(AnyDriver::Memory)
}

fn connect_sqlite3(options: &ConnectOptions<'_>) -> Result<AnyDriver, DriverError> {
    SqliteDriver::connect(options).map(AnyDriver::Sqlite3)
}

static ENGINES: [EngineEntry<AnyDriver>; 2] = [
    EngineEntry {
        descriptor: MEMORY,
        connect: connect_memory,
    },
    EngineEntry {
        descriptor: SQLITE3,
        connect: connect_sqlite3,
    },
];

/// Engines known to the `laborm` binary.
pub static REGISTRY: EngineRegistry<AnyDriver> = EngineRegistry::new(&ENGINES);

impl SchemaDriver for AnyDriver {
    async fn load_schema(&self) -> Result<Option<SchemaDocument>, DriverError> {
        match self {
            Self::Memory(d) => d.load_schema().await,
            Self::Sqlite3(d) => d.load_schema().await,
        }
    }

    async fn store_schema(&self, schema: &SchemaDocument) -> Result<(), DriverError> {
        match self {
            Self::Memory(d) => d.store_schema(schema).await,
            Self::Sqlite3(d) => d.store_schema(schema).await,
        }
    }

    async fn create_table(
        &self,
        schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> Result<(), DriverError> {
        match self {
            Self::Memory(d) => d.create_table(schema, model).await,
            Self::Sqlite3(d) => d.create_table(schema, model).await,
        }
    }

    async fn add_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        match self {
            Self::Memory(d) => d.add_column(schema, column).await,
            Self::Sqlite3(d) => d.add_column(schema, column).await,
        }
    }

    async fn update_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        match self {
            Self::Memory(d) => d.update_column(schema, column).await,
            Self::Sqlite3(d) => d.update_column(schema, column).await,
        }
    }

    async fn drop_column(
        &self,
        schema: &SchemaDocument,
        column: &ColumnDefinition,
    ) -> Result<(), DriverError> {
        match self {
            Self::Memory(d) => d.drop_column(schema, column).await,
            Self::Sqlite3(d) => d.drop_column(schema, column).await,
        }
    }

    async fn drop_table(
        &self,
        schema: &SchemaDocument,
        model: &ModelDefinition,
    ) -> Result<(), DriverError> {
        match self {
            Self::Memory(d) => d.drop_table(schema, model).await,
            Self::Sqlite3(d) => d.drop_table(schema, model).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laborm_core::EngineCatalog;
    use laborm_core::types::{EngineOptions, Token, TokenKind};
    use std::path::Path;

    #[test]
    fn registry_lists_both_engines() {
        let names: Vec<_> = REGISTRY.names().collect();
        assert_eq!(names, vec!["memory", "sqlite3"]);
    }

    #[test]
    fn registry_is_an_engine_catalog() {
        assert!(REGISTRY.descriptor("SQLite3").is_some());
        assert!(REGISTRY.descriptor("postgres").is_none());
    }

    #[test]
    fn connect_memory_engine() {
        let engine = EngineOptions::new(Token::synthetic(TokenKind::Identifier, "memory"));
        let driver = REGISTRY
            .connect(&ConnectOptions::new(Path::new("."), &engine))
            .unwrap();
        assert!(matches!(driver, AnyDriver::Memory(_)));
    }

    #[test]
    fn connect_sqlite3_engine_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("db");
        let engine = EngineOptions::new(Token::synthetic(TokenKind::Identifier, "sqlite3"))
            .with_option("file", Token::synthetic(TokenKind::String, "app.sqlite"));
        let driver = REGISTRY
            .connect(&ConnectOptions::new(&folder, &engine))
            .unwrap();
        assert!(matches!(driver, AnyDriver::Sqlite3(_)));
        assert!(folder.join("app.sqlite").exists());
    }

    #[test]
    fn connect_unknown_engine_fails() {
        let engine = EngineOptions::new(Token::synthetic(TokenKind::Identifier, "oracle"));
        let err = REGISTRY
            .connect(&ConnectOptions::new(Path::new("."), &engine))
            .unwrap_err();
        assert!(matches!(err, DriverError::UnknownEngine { .. }));
    }
}

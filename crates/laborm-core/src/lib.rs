//! # laborm-core
//!
//! Schema model, semantic validation and migration diffing for LabORM.
//!
//! This crate is pure: it never touches a store. Parsing lives in
//! `laborm-dsl`, applying a diff lives in `laborm-driver`.

pub mod engine;
pub mod error;
pub mod migration;
pub mod types;
pub mod validation;

pub use engine::{EngineCatalog, EngineDescriptor, OptionSpec};
pub use error::ValidationError;
pub use migration::{DiffEngine, MigrationError, MigrationSafety, ModelDiff, SchemaDiff};
pub use types::{
    ColumnDefinition, ColumnType, EngineOptions, ModelDefinition, Relationship, SchemaDocument,
    SourceLocation, Span, Token, TokenKind,
};
pub use validation::validate;

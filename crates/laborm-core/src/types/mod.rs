mod column_definition;
mod column_type;
mod model_definition;
mod relationship;
mod schema_document;
mod token;

pub use column_definition::ColumnDefinition;
pub use column_type::ColumnType;
pub use model_definition::ModelDefinition;
pub use relationship::Relationship;
pub use schema_document::{EngineOptions, SchemaDocument};
pub use token::{SourceLocation, Span, Token, TokenKind};

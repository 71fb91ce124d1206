use std::fmt;

/// Errors raised by storage drivers.
///
/// All variants carry enough context to produce actionable error messages.
/// Uses `String` for external error details to maintain `Clone` + `Eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DriverError {
    /// No engine is registered under this name.
    UnknownEngine {
        name: String,
        available: Vec<String>,
    },
    /// The store could not be opened.
    ConnectionError { message: String },
    /// A table already exists when attempting creation.
    TableExists { table: String },
    /// A table does not exist.
    TableNotFound { table: String },
    /// A column already exists when attempting to add it.
    ColumnExists { table: String, column: String },
    /// A column does not exist.
    ColumnNotFound { table: String, column: String },
    /// A relation refers to a model or field missing from the declared schema.
    MissingReference {
        model: String,
        column: String,
        reference: String,
    },
    /// The engine cannot perform this structural change.
    Unsupported { operation: String, reason: String },
    /// The stored schema snapshot could not be read or written.
    Snapshot { message: String },
    /// A statement failed to execute.
    QueryError { statement: String, message: String },
    /// Internal or unexpected error.
    Internal { message: String },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEngine { name, available } => {
                write!(
                    f,
                    "unknown engine '{name}' (available: {})",
                    available.join(", ")
                )
            }
            Self::ConnectionError { message } => write!(f, "connection error: {message}"),
            Self::TableExists { table } => write!(f, "table '{table}' already exists"),
            Self::TableNotFound { table } => write!(f, "table '{table}' not found"),
            Self::ColumnExists { table, column } => {
                write!(f, "column '{table}.{column}' already exists")
            }
            Self::ColumnNotFound { table, column } => {
                write!(f, "column '{table}.{column}' not found")
            }
            Self::MissingReference {
                model,
                column,
                reference,
            } => write!(
                f,
                "relation '{model}.{column}' refers to '{reference}', which is not in the schema"
            ),
            Self::Unsupported { operation, reason } => {
                write!(f, "unsupported operation '{operation}': {reason}")
            }
            Self::Snapshot { message } => write!(f, "schema snapshot error: {message}"),
            Self::QueryError { statement, message } => {
                write!(f, "statement failed: {message}\n  {statement}")
            }
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<serde_json::Error> for DriverError {
    fn from(e: serde_json::Error) -> Self {
        Self::Snapshot {
            message: e.to_string(),
        }
    }
}

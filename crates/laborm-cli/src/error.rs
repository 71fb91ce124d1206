use std::path::PathBuf;

use laborm_core::{MigrationError, ValidationError};
use laborm_driver::{DriverError, MigrateError};
use laborm_dsl::DslError;

use crate::diagnostic;

/// Exit codes for the CLI process.
///
/// Each variant maps to a numeric exit code following standard conventions:
/// - 0: success
/// - 1: general error
/// - 2: invalid arguments / usage error
/// - 3..5: schema errors (syntax, validation, unsafe migration)
/// - 10+: driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    SyntaxError = 3,
    ValidationError = 4,
    UnsafeMigration = 5,
    ConnectionError = 10,
    MigrationError = 11,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Syntax errors from laborm-dsl.
    #[error("{} syntax error(s) in {}", .errors.len(), .file.display())]
    Syntax {
        errors: Vec<DslError>,
        source_text: String,
        file: PathBuf,
    },

    /// The schema parsed but is not valid.
    #[error("invalid schema: {error}")]
    Validation {
        error: ValidationError,
        source_text: String,
        file: PathBuf,
    },

    /// The differ refused the change set.
    #[error("unsafe migration: {error}")]
    Unsafe {
        error: MigrationError,
        source_text: String,
        file: PathBuf,
    },

    /// The store could not be opened.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// A driver call failed while applying the migration.
    #[error("migration failed: {0}")]
    Apply(MigrateError),

    /// IO errors (file not found, permission denied).
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// User cancelled operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Non-TTY requires --force for destructive operations.
    #[error("destructive changes require --force in non-interactive mode")]
    RequiresForce,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Syntax { .. } => ExitCode::SyntaxError,
            Self::Validation { .. } => ExitCode::ValidationError,
            Self::Unsafe { .. } => ExitCode::UnsafeMigration,
            Self::Driver(_) => ExitCode::ConnectionError,
            Self::Apply(_) => ExitCode::MigrationError,
            Self::Config { .. } => ExitCode::InvalidArguments,
            Self::Io { .. } | Self::Cancelled | Self::RequiresForce | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }

    /// Source-annotated reports for errors that point into the schema file.
    pub fn diagnostics(&self) -> Vec<miette::Report> {
        match self {
            Self::Syntax {
                errors,
                source_text,
                file,
            } => diagnostic::render_diagnostics(errors, source_text, &file.display().to_string()),
            Self::Validation {
                error,
                source_text,
                file,
            } => vec![miette::Report::new(
                diagnostic::validation_error_to_diagnostic(
                    error,
                    source_text,
                    &file.display().to_string(),
                ),
            )],
            Self::Unsafe {
                error,
                source_text,
                file,
            } => vec![miette::Report::new(
                diagnostic::migration_error_to_diagnostic(
                    error,
                    source_text,
                    &file.display().to_string(),
                ),
            )],
            _ => Vec::new(),
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Syntax { errors, file, .. } => {
                let error_list: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        let loc = e.location();
                        serde_json::json!({
                            "message": e.message(),
                            "line": loc.line,
                            "column": loc.column,
                        })
                    })
                    .collect();
                serde_json::json!({
                    "error": "syntax_error",
                    "file": file.display().to_string(),
                    "errors": error_list,
                })
            }
            Self::Validation { error, file, .. } => serde_json::json!({
                "error": "validation_error",
                "file": file.display().to_string(),
                "model": error.model(),
                "line": error.location().map(|l| l.line),
                "column": error.location().map(|l| l.column),
                "message": error.to_string(),
            }),
            Self::Unsafe { error, file, .. } => serde_json::json!({
                "error": "unsafe_migration",
                "file": file.display().to_string(),
                "line": error.location().line,
                "column": error.location().column,
                "message": error.to_string(),
            }),
            Self::Driver(e) => serde_json::json!({
                "error": "driver_error",
                "message": e.to_string(),
            }),
            Self::Apply(MigrateError::Driver {
                operation,
                completed,
                source,
            }) => serde_json::json!({
                "error": "migration_failed",
                "operation": operation.to_string(),
                "completed": completed.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "message": source.to_string(),
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::Config { message } => serde_json::json!({
                "error": "config_error",
                "message": message,
            }),
            other => serde_json::json!({
                "error": "error",
                "message": other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laborm_driver::Operation;
    use laborm_dsl::{SourceLocation, Span};

    fn location() -> SourceLocation {
        SourceLocation::new("schema.labORM", 2, 5, Span::new(10, 13))
    }

    fn syntax_error() -> CliError {
        CliError::Syntax {
            errors: vec![DslError::InvalidToken {
                text: "$".into(),
                location: location(),
            }],
            source_text: "model X {\n    $\n}".into(),
            file: PathBuf::from("schema.labORM"),
        }
    }

    #[test]
    fn syntax_error_exit_code() {
        assert_eq!(syntax_error().exit_code(), ExitCode::SyntaxError);
    }

    #[test]
    fn validation_error_exit_code() {
        let err = CliError::Validation {
            error: ValidationError::MissingEngine,
            source_text: String::new(),
            file: PathBuf::from("schema.labORM"),
        };
        assert_eq!(err.exit_code(), ExitCode::ValidationError);
    }

    #[test]
    fn unsafe_migration_exit_code() {
        let err = CliError::Unsafe {
            error: MigrationError::NewColumnWithoutDefault {
                model: "User".into(),
                column: "age".into(),
                location: location(),
            },
            source_text: String::new(),
            file: PathBuf::from("schema.labORM"),
        };
        assert_eq!(err.exit_code(), ExitCode::UnsafeMigration);
    }

    #[test]
    fn driver_error_exit_codes() {
        let err = CliError::Driver(DriverError::ConnectionError {
            message: "refused".into(),
        });
        assert_eq!(err.exit_code(), ExitCode::ConnectionError);

        let err = CliError::Apply(MigrateError::Driver {
            operation: Operation::StoreSchema,
            completed: vec![],
            source: DriverError::Internal {
                message: "disk full".into(),
            },
        });
        assert_eq!(err.exit_code(), ExitCode::MigrationError);
    }

    #[test]
    fn config_error_exit_code() {
        let err = CliError::Config {
            message: "bad config".into(),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
    }

    #[test]
    fn cancelled_exit_code() {
        assert_eq!(CliError::Cancelled.exit_code(), ExitCode::GeneralError);
    }

    #[test]
    fn display_syntax_error() {
        let msg = syntax_error().to_string();
        assert_eq!(msg, "1 syntax error(s) in schema.labORM");
    }

    #[test]
    fn schema_errors_have_diagnostics() {
        assert_eq!(syntax_error().diagnostics().len(), 1);
        assert!(CliError::Cancelled.diagnostics().is_empty());
    }

    #[test]
    fn to_json_syntax_error() {
        let json = syntax_error().to_json();
        assert_eq!(json["error"], "syntax_error");
        assert_eq!(json["file"], "schema.labORM");
        assert_eq!(json["errors"][0]["line"], 2);
        assert_eq!(json["errors"][0]["column"], 5);
    }

    #[test]
    fn to_json_validation_error() {
        let err = CliError::Validation {
            error: ValidationError::MissingEngine,
            source_text: String::new(),
            file: PathBuf::from("schema.labORM"),
        };
        let json = err.to_json();
        assert_eq!(json["error"], "validation_error");
        assert!(json["line"].is_null());
    }

    #[test]
    fn to_json_apply_error_lists_progress() {
        let err = CliError::Apply(MigrateError::Driver {
            operation: Operation::AddColumn {
                table: "User".into(),
                column: "age".into(),
            },
            completed: vec![Operation::CreateTable {
                table: "Post".into(),
            }],
            source: DriverError::Internal {
                message: "boom".into(),
            },
        });
        let json = err.to_json();
        assert_eq!(json["error"], "migration_failed");
        assert_eq!(json["operation"], "add column User.age");
        assert_eq!(json["completed"][0], "create table Post");
    }

    #[test]
    fn to_json_io_error() {
        let err = CliError::Io {
            path: PathBuf::from("/tmp/file"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let json = err.to_json();
        assert_eq!(json["error"], "io_error");
        assert_eq!(json["path"], "/tmp/file");
    }

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::InvalidArguments as i32, 2);
        assert_eq!(ExitCode::SyntaxError as i32, 3);
        assert_eq!(ExitCode::ValidationError as i32, 4);
        assert_eq!(ExitCode::UnsafeMigration as i32, 5);
        assert_eq!(ExitCode::ConnectionError as i32, 10);
        assert_eq!(ExitCode::MigrationError as i32, 11);
    }
}

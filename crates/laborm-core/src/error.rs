use std::fmt;

use crate::types::{ColumnType, SourceLocation, TokenKind};

/// Semantic errors found in a parsed schema document.
///
/// Validation stops at the first error, so a document produces at most one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// The document has no `@engine` block.
    MissingEngine,
    /// The engine name is not registered.
    UnknownEngine {
        engine: String,
        location: SourceLocation,
    },
    /// A required engine option is absent.
    MissingEngineOption {
        engine: String,
        option: String,
        location: SourceLocation,
    },
    /// An engine option value has the wrong token kind.
    InvalidEngineOption {
        engine: String,
        option: String,
        expected: TokenKind,
        found: TokenKind,
        location: SourceLocation,
    },
    /// Two models share a name (case-insensitive).
    DuplicateModel {
        model: String,
        location: SourceLocation,
    },
    /// Two columns of one model share a name (case-insensitive).
    DuplicateColumn {
        model: String,
        column: String,
        location: SourceLocation,
    },
    /// A model declares no primary key.
    MissingPrimaryKey {
        model: String,
        location: SourceLocation,
    },
    /// A model declares more than one primary key.
    MultiplePrimaryKeys {
        model: String,
        columns: Vec<String>,
        location: SourceLocation,
    },
    /// `autoincrement` on a column that is not `INT`.
    AutoIncrementNotInt {
        model: String,
        column: String,
        column_type: ColumnType,
        location: SourceLocation,
    },
    /// `autoincrement` combined with `default`.
    AutoIncrementWithDefault {
        model: String,
        column: String,
        location: SourceLocation,
    },
    /// A default value whose token kind does not match the column type.
    DefaultTypeMismatch {
        model: String,
        column: String,
        column_type: ColumnType,
        found: TokenKind,
        location: SourceLocation,
    },
    /// A column type that is neither scalar nor a declared relation.
    UnknownColumnType {
        model: String,
        column: String,
        type_name: String,
        location: SourceLocation,
    },
    /// A relation pointing at a model that does not exist.
    UnknownRelationTarget {
        model: String,
        column: String,
        target: String,
        location: SourceLocation,
    },
    /// The target model has no relation column pointing back.
    MissingBackReference {
        model: String,
        column: String,
        target: String,
        location: SourceLocation,
    },
    /// Both sides of a relation use the same variant (field/field or array/array).
    OneToOneRelation {
        model: String,
        column: String,
        target: String,
        other_column: String,
        location: SourceLocation,
    },
    /// A field relation pairs with more than one array column on the target.
    AmbiguousRelation {
        model: String,
        column: String,
        target: String,
        candidates: Vec<String>,
        location: SourceLocation,
    },
    /// The remote field of a field relation does not exist on the target.
    UnknownRemoteField {
        model: String,
        column: String,
        target: String,
        field: String,
        location: SourceLocation,
    },
    /// The remote field of a field relation is itself a relation column.
    RemoteFieldNotScalar {
        model: String,
        column: String,
        target: String,
        field: String,
        location: SourceLocation,
    },
    /// The local field of a field relation is already declared on the owner.
    LocalFieldConflict {
        model: String,
        column: String,
        field: String,
        location: SourceLocation,
    },
}

impl ValidationError {
    /// Source position the error points at, when there is one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::MissingEngine => None,
            Self::UnknownEngine { location, .. }
            | Self::MissingEngineOption { location, .. }
            | Self::InvalidEngineOption { location, .. }
            | Self::DuplicateModel { location, .. }
            | Self::DuplicateColumn { location, .. }
            | Self::MissingPrimaryKey { location, .. }
            | Self::MultiplePrimaryKeys { location, .. }
            | Self::AutoIncrementNotInt { location, .. }
            | Self::AutoIncrementWithDefault { location, .. }
            | Self::DefaultTypeMismatch { location, .. }
            | Self::UnknownColumnType { location, .. }
            | Self::UnknownRelationTarget { location, .. }
            | Self::MissingBackReference { location, .. }
            | Self::OneToOneRelation { location, .. }
            | Self::AmbiguousRelation { location, .. }
            | Self::UnknownRemoteField { location, .. }
            | Self::RemoteFieldNotScalar { location, .. }
            | Self::LocalFieldConflict { location, .. } => Some(location),
        }
    }

    /// The model the error is about, when there is one.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::MissingEngine
            | Self::UnknownEngine { .. }
            | Self::MissingEngineOption { .. }
            | Self::InvalidEngineOption { .. } => None,
            Self::DuplicateModel { model, .. }
            | Self::DuplicateColumn { model, .. }
            | Self::MissingPrimaryKey { model, .. }
            | Self::MultiplePrimaryKeys { model, .. }
            | Self::AutoIncrementNotInt { model, .. }
            | Self::AutoIncrementWithDefault { model, .. }
            | Self::DefaultTypeMismatch { model, .. }
            | Self::UnknownColumnType { model, .. }
            | Self::UnknownRelationTarget { model, .. }
            | Self::MissingBackReference { model, .. }
            | Self::OneToOneRelation { model, .. }
            | Self::AmbiguousRelation { model, .. }
            | Self::UnknownRemoteField { model, .. }
            | Self::RemoteFieldNotScalar { model, .. }
            | Self::LocalFieldConflict { model, .. } => Some(model),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEngine => write!(f, "no @engine block declared"),
            Self::UnknownEngine { engine, .. } => write!(f, "unknown engine '{engine}'"),
            Self::MissingEngineOption { engine, option, .. } => {
                write!(f, "engine '{engine}' requires option '{option}'")
            }
            Self::InvalidEngineOption {
                engine,
                option,
                expected,
                found,
                ..
            } => write!(
                f,
                "engine '{engine}' option '{option}' must be a {expected}, found {found}"
            ),
            Self::DuplicateModel { model, .. } => write!(f, "duplicate model '{model}'"),
            Self::DuplicateColumn { model, column, .. } => {
                write!(f, "duplicate column '{column}' in model '{model}'")
            }
            Self::MissingPrimaryKey { model, .. } => {
                write!(f, "model '{model}' has no primary key")
            }
            Self::MultiplePrimaryKeys { model, columns, .. } => write!(
                f,
                "model '{model}' has more than one primary key: {}",
                columns.join(", ")
            ),
            Self::AutoIncrementNotInt {
                model,
                column,
                column_type,
                ..
            } => write!(
                f,
                "autoincrement column '{model}.{column}' must be INT, not {column_type}"
            ),
            Self::AutoIncrementWithDefault { model, column, .. } => write!(
                f,
                "autoincrement column '{model}.{column}' cannot have a default value"
            ),
            Self::DefaultTypeMismatch {
                model,
                column,
                column_type,
                found,
                ..
            } => write!(
                f,
                "default value of '{model}.{column}' is a {found}, which does not match {column_type}"
            ),
            Self::UnknownColumnType {
                model,
                column,
                type_name,
                ..
            } => write!(
                f,
                "unknown column type '{type_name}' for '{model}.{column}'"
            ),
            Self::UnknownRelationTarget {
                model,
                column,
                target,
                ..
            } => write!(
                f,
                "relation '{model}.{column}' references unknown model '{target}'"
            ),
            Self::MissingBackReference {
                model,
                column,
                target,
                ..
            } => write!(
                f,
                "relation '{model}.{column}' has no matching relation column on '{target}'"
            ),
            Self::OneToOneRelation {
                model,
                column,
                target,
                other_column,
                ..
            } => write!(
                f,
                "one-to-one relations are not supported: '{model}.{column}' and '{target}.{other_column}' are the same kind"
            ),
            Self::AmbiguousRelation {
                model,
                column,
                target,
                candidates,
                ..
            } => write!(
                f,
                "relation '{model}.{column}' matches several columns on '{target}': {}",
                candidates.join(", ")
            ),
            Self::UnknownRemoteField {
                model,
                column,
                target,
                field,
                ..
            } => write!(
                f,
                "relation '{model}.{column}' references unknown field '{target}.{field}'"
            ),
            Self::RemoteFieldNotScalar {
                model,
                column,
                target,
                field,
                ..
            } => write!(
                f,
                "relation '{model}.{column}' references '{target}.{field}', which is a relation column"
            ),
            Self::LocalFieldConflict {
                model,
                column,
                field,
                ..
            } => write!(
                f,
                "relation '{model}.{column}' local field '{field}' is already declared on '{model}'"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("schema.labORM", 4, 5, Default::default())
    }

    #[test]
    fn error_display_messages() {
        let cases = vec![
            (ValidationError::MissingEngine, "no @engine block declared"),
            (
                ValidationError::UnknownEngine {
                    engine: "mysql".into(),
                    location: loc(),
                },
                "unknown engine 'mysql'",
            ),
            (
                ValidationError::InvalidEngineOption {
                    engine: "sqlite3".into(),
                    option: "file".into(),
                    expected: TokenKind::String,
                    found: TokenKind::Int,
                    location: loc(),
                },
                "engine 'sqlite3' option 'file' must be a string literal, found integer literal",
            ),
            (
                ValidationError::MultiplePrimaryKeys {
                    model: "User".into(),
                    columns: vec!["id".into(), "uuid".into()],
                    location: loc(),
                },
                "model 'User' has more than one primary key: id, uuid",
            ),
            (
                ValidationError::AutoIncrementNotInt {
                    model: "User".into(),
                    column: "id".into(),
                    column_type: ColumnType::String,
                    location: loc(),
                },
                "autoincrement column 'User.id' must be INT",
            ),
            (
                ValidationError::MissingBackReference {
                    model: "Post".into(),
                    column: "author".into(),
                    target: "Author".into(),
                    location: loc(),
                },
                "relation 'Post.author' has no matching relation column on 'Author'",
            ),
        ];

        for (error, expected_prefix) in cases {
            let msg = error.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error display for {error:?} = '{msg}', expected to start with '{expected_prefix}'"
            );
        }
    }

    #[test]
    fn location_and_model_accessors() {
        assert!(ValidationError::MissingEngine.location().is_none());
        let err = ValidationError::MissingPrimaryKey {
            model: "User".into(),
            location: loc(),
        };
        assert_eq!(err.location().map(|l| l.line), Some(4));
        assert_eq!(err.model(), Some("User"));
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ValidationError::MissingEngine);
        assert!(err.to_string().contains("@engine"));
    }
}

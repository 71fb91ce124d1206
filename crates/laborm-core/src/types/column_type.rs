use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::TokenKind;

/// The storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    String,
    Int,
    Float,
    /// A reference to another model. Never stored as a literal scalar.
    Relation,
}

impl ColumnType {
    /// Resolves a declared type name. `string`, `int` and `float` are matched
    /// case-insensitively; any other name is taken as a model reference.
    pub fn from_type_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("string") {
            Self::String
        } else if name.eq_ignore_ascii_case("int") {
            Self::Int
        } else if name.eq_ignore_ascii_case("float") {
            Self::Float
        } else {
            Self::Relation
        }
    }

    /// The token kind a literal must have to be a valid value of this type.
    pub fn literal_kind(&self) -> Option<TokenKind> {
        match self {
            Self::String => Some(TokenKind::String),
            Self::Int => Some(TokenKind::Int),
            Self::Float => Some(TokenKind::Float),
            Self::Relation => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Relation)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "STRING"),
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Relation => write!(f, "RELATION"),
        }
    }
}

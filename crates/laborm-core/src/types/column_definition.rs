use std::fmt;

use serde::{Deserialize, Serialize};

use super::column_type::ColumnType;
use super::relationship::Relationship;
use super::token::Token;

/// A column of a model, as declared in the schema source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: Token,
    pub type_name: Token,
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    pub owner_model_name: String,
}

impl ColumnDefinition {
    /// Creates a column with no modifiers. The column type is resolved from
    /// the type name token.
    pub fn new(owner_model_name: impl Into<String>, name: Token, type_name: Token) -> Self {
        let column_type = ColumnType::from_type_name(&type_name.text);
        Self {
            name,
            type_name,
            column_type,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            default_value: None,
            relationship: None,
            owner_model_name: owner_model_name.into(),
        }
    }

    /// Attaches a relation descriptor. The column type becomes `RELATION`.
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.column_type = ColumnType::Relation;
        self.relationship = Some(relationship);
        self
    }

    pub fn with_default(mut self, value: Token) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name.text
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.text_eq_ignore_case(name)
    }

    /// Returns true if the column is stored as a scalar on the model's table.
    pub fn is_stored(&self) -> bool {
        self.relationship.is_none() && self.column_type.is_scalar()
    }

    /// Returns true if any stored attribute differs from `other`: type,
    /// nullability, primary key, auto increment, or default value (by text
    /// and kind). Names and relation descriptors are not compared.
    pub fn attributes_differ(&self, other: &ColumnDefinition) -> bool {
        let default_differs = match (&self.default_value, &other.default_value) {
            (None, None) => false,
            (Some(a), Some(b)) => !a.same_lexeme(b),
            _ => true,
        };
        self.column_type != other.column_type
            || self.nullable != other.nullable
            || self.primary_key != other.primary_key
            || self.auto_increment != other.auto_increment
            || default_differs
    }

    /// Structural equality ignoring source positions.
    pub fn same_shape(&self, other: &ColumnDefinition) -> bool {
        let relationship_same = match (&self.relationship, &other.relationship) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_shape(b),
            _ => false,
        };
        self.name.text == other.name.text
            && self.type_name.text == other.type_name.text
            && self.owner_model_name == other.owner_model_name
            && relationship_same
            && !self.attributes_differ(other)
    }
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relationship {
            Some(rel) => write!(f, "{} {}", self.name.text, rel)?,
            None => write!(f, "{} {}", self.name.text, self.type_name.text)?,
        }
        if self.nullable {
            write!(f, " nullable")?;
        }
        if self.primary_key {
            write!(f, " primary")?;
        }
        if self.auto_increment {
            write!(f, " autoincrement")?;
        }
        if let Some(default) = &self.default_value {
            write!(f, " default {default}")?;
        }
        Ok(())
    }
}

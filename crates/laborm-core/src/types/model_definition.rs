use std::fmt;

use serde::{Deserialize, Serialize};

use super::column_definition::ColumnDefinition;
use super::token::Token;

/// A named model with an ordered list of columns. Maps to one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: Token,
    pub columns: Vec<ColumnDefinition>,
}

impl ModelDefinition {
    pub fn new(name: Token, columns: Vec<ColumnDefinition>) -> Self {
        Self { name, columns }
    }

    pub fn name(&self) -> &str {
        &self.name.text
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.text_eq_ignore_case(name)
    }

    /// Looks up a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.is_named(name))
    }

    /// All columns flagged `primary`.
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// The primary key column, if exactly one is declared.
    pub fn primary_key(&self) -> Option<&ColumnDefinition> {
        let mut keys = self.primary_keys();
        match (keys.next(), keys.next()) {
            (Some(pk), None) => Some(pk),
            _ => None,
        }
    }

    /// Columns stored on the model's own table (no relation columns).
    pub fn stored_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.is_stored())
    }

    /// Columns carrying a `Field` relation, each owning one relation table.
    pub fn owned_relations(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns
            .iter()
            .filter(|c| c.relationship.as_ref().is_some_and(|r| r.is_field()))
    }

    /// Structural equality ignoring source positions.
    pub fn same_shape(&self, other: &ModelDefinition) -> bool {
        self.name.text == other.name.text
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.same_shape(b))
    }
}

impl fmt::Display for ModelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model {} {{", self.name.text)?;
        for column in &self.columns {
            writeln!(f, "    {column}")?;
        }
        write!(f, "}}")
    }
}

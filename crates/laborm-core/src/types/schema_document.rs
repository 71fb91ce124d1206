use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model_definition::ModelDefinition;
use super::token::Token;

/// The `@engine` block: which storage engine to use and its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub driver_name: Token,
    /// Option values, kept as raw tokens so their kind can be checked later.
    #[serde(default)]
    pub options: BTreeMap<String, Token>,
}

impl EngineOptions {
    pub fn new(driver_name: Token) -> Self {
        Self {
            driver_name,
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: Token) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name.text
    }

    pub fn option(&self, name: &str) -> Option<&Token> {
        self.options.get(name)
    }

    fn same_shape(&self, other: &EngineOptions) -> bool {
        self.driver_name.text == other.driver_name.text
            && self.options.len() == other.options.len()
            && self
                .options
                .iter()
                .zip(&other.options)
                .all(|((ka, va), (kb, vb))| ka == kb && va.same_lexeme(vb))
    }
}

/// A parsed schema: optional engine block plus models in declaration order.
///
/// The same type describes both the declared schema (fresh from the parser)
/// and the physical schema (deserialized from the snapshot the driver stores
/// after each successful run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineOptions>,
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}

impl SchemaDocument {
    pub fn new(engine: Option<EngineOptions>, models: Vec<ModelDefinition>) -> Self {
        Self { engine, models }
    }

    /// Looks up a model by name (case-insensitive).
    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.is_named(name))
    }

    /// Serializes the document into the JSON snapshot format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Reads a document back from its JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Structural equality ignoring source positions.
    pub fn same_shape(&self, other: &SchemaDocument) -> bool {
        let engine_same = match (&self.engine, &other.engine) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_shape(b),
            _ => false,
        };
        engine_same
            && self.models.len() == other.models.len()
            && self
                .models
                .iter()
                .zip(&other.models)
                .all(|(a, b)| a.same_shape(b))
    }
}

impl fmt::Display for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(engine) = &self.engine {
            writeln!(f, "@engine {} {{", engine.driver_name.text)?;
            for (name, value) in &engine.options {
                writeln!(f, "    {name}: {value}")?;
            }
            writeln!(f, "}}")?;
        }
        for model in &self.models {
            writeln!(f, "{model}")?;
        }
        Ok(())
    }
}

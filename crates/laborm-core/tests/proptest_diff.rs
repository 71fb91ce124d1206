use std::collections::HashSet;

use proptest::prelude::*;
use laborm_core::migration::DiffEngine;
use laborm_core::types::{ColumnDefinition, ModelDefinition, SchemaDocument, Token, TokenKind};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,10}"
}

fn type_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("STRING"), Just("INT"), Just("FLOAT")]
}

fn column_strategy() -> impl Strategy<Value = (String, &'static str, bool)> {
    (name_strategy(), type_strategy(), any::<bool>())
}

fn model_strategy() -> impl Strategy<Value = ModelDefinition> {
    ("[A-Z][a-zA-Z0-9]{0,10}", prop::collection::vec(column_strategy(), 0..6)).prop_map(
        |(name, raw)| {
            let mut seen = HashSet::new();
            let columns = raw
                .into_iter()
                .filter(|(c, _, _)| seen.insert(c.to_ascii_lowercase()))
                .map(|(c, ty, nullable)| {
                    let col = ColumnDefinition::new(
                        name.clone(),
                        Token::synthetic(TokenKind::Identifier, c),
                        Token::synthetic(TokenKind::Identifier, ty),
                    );
                    if nullable {
                        col.nullable()
                    } else {
                        col
                    }
                })
                .collect();
            ModelDefinition::new(Token::synthetic(TokenKind::Identifier, name), columns)
        },
    )
}

fn schema_strategy() -> impl Strategy<Value = SchemaDocument> {
    prop::collection::vec(model_strategy(), 0..5).prop_map(|raw| {
        let mut seen = HashSet::new();
        let models = raw
            .into_iter()
            .filter(|m| seen.insert(m.name().to_ascii_lowercase()))
            .collect();
        SchemaDocument::new(None, models)
    })
}

// ---------------------------------------------------------------------------
// Diff properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn diff_against_itself_is_empty(schema in schema_strategy()) {
        let diff = DiffEngine::diff(&schema, &schema).unwrap();
        prop_assert!(diff.is_empty());
        prop_assert_eq!(diff.len(), 0);
    }

    #[test]
    fn diff_against_empty_creates_everything(schema in schema_strategy()) {
        let diff = DiffEngine::diff(&schema, &SchemaDocument::default()).unwrap();
        prop_assert_eq!(diff.models_to_add.len(), schema.models.len());
        prop_assert!(diff.models_to_drop.is_empty());
    }

    #[test]
    fn diff_to_empty_drops_everything(schema in schema_strategy()) {
        let diff = DiffEngine::diff(&SchemaDocument::default(), &schema).unwrap();
        prop_assert_eq!(diff.models_to_drop.len(), schema.models.len());
        prop_assert!(diff.models_to_add.is_empty());
    }

    #[test]
    fn snapshot_roundtrip_preserves_diff_identity(schema in schema_strategy()) {
        let json = schema.to_json().unwrap();
        let physical = SchemaDocument::from_json(&json).unwrap();
        prop_assert!(DiffEngine::diff(&schema, &physical).unwrap().is_empty());
    }
}

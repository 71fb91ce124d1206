use laborm_core::types::TokenKind;
use laborm_dsl::{lex, parse, print};
use proptest::prelude::*;

/// Strategy for generating model names.
fn model_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,15}".prop_filter("not a keyword", |s| !s.eq_ignore_ascii_case("model"))
}

/// Strategy for generating column names that are not modifiers or keywords.
fn column_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,15}".prop_filter("not a keyword", |s| {
        !matches!(
            s.to_ascii_lowercase().as_str(),
            "model" | "nullable" | "primary" | "autoincrement" | "default"
        )
    })
}

/// Strategy for generating a scalar type name in any case.
fn scalar_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("STRING".to_string()),
        Just("string".to_string()),
        Just("INT".to_string()),
        Just("Int".to_string()),
        Just("FLOAT".to_string()),
    ]
}

/// Strategy for a trailing modifier list.
fn modifiers() -> impl Strategy<Value = String> {
    (any::<bool>(), any::<bool>()).prop_map(|(nullable, primary)| {
        let mut out = String::new();
        if nullable {
            out.push_str(" nullable");
        }
        if primary {
            out.push_str(" primary");
        }
        out
    })
}

proptest! {
    /// The lexer is total: arbitrary input never panics and always ends in EOF.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,200}") {
        let tokens = lex("fuzz", &input);
        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    /// The parser terminates on arbitrary input, successfully or not.
    #[test]
    fn parser_never_panics(input in "\\PC{0,200}") {
        let _ = parse("fuzz", &input);
    }

    /// A well-formed single-model file always parses.
    #[test]
    fn valid_minimal_model_always_parses(
        name in model_name(),
        column in column_name(),
        ty in scalar_type(),
    ) {
        let source = format!("model {name} {{ {column} {ty} primary }}");
        let result = parse("gen", &source);
        prop_assert!(result.is_ok(), "Failed to parse: {source}");
        let doc = result.unwrap();
        prop_assert_eq!(doc.models.len(), 1);
        prop_assert_eq!(doc.models[0].name(), name.as_str());
    }

    /// Parse then print then parse yields a document of the same shape.
    #[test]
    fn round_trip_property(
        name in model_name(),
        col1 in column_name(),
        col2_prefix in "[a-z][a-z0-9]{0,5}",
        ty1 in scalar_type(),
        ty2 in scalar_type(),
        mods in modifiers(),
        default in "[a-zA-Z0-9 ]{0,10}",
    ) {
        let col2 = format!("{col2_prefix}X");
        prop_assume!(!col1.eq_ignore_ascii_case(&col2));

        let source = format!(
            "@engine sqlite3 {{ file: \"db\" }}\nmodel {name} {{\n{col1} {ty1}{mods}\n{col2} {ty2} default \"{default}\"\n}}"
        );
        let doc = parse("gen", &source).expect("generated source parses");
        let printed = print(&doc);
        let reparsed = parse("printed", &printed);
        prop_assert!(reparsed.is_ok(), "Re-parse failed for:\n{printed}");
        prop_assert!(doc.same_shape(&reparsed.unwrap()));
    }
}

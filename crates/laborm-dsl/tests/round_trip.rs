use laborm_dsl::{parse, print};

/// Helper: parse source, print it, parse again, and compare the two documents.
///
/// Documents cannot be compared with `==` because every token carries its
/// source position, which moves when the text is reformatted. Instead we
/// compare shapes: names, types, flags, defaults and relations.
fn assert_round_trip(source: &str) {
    let doc1 = parse("original.labORM", source).expect("first parse should succeed");
    let printed = print(&doc1);
    let doc2 = parse("printed.labORM", &printed).unwrap_or_else(|errors| {
        panic!(
            "second parse (after printing) failed with errors: {errors:?}\n\nPrinted DSL:\n{printed}"
        );
    });

    assert_eq!(
        doc1.models.len(),
        doc2.models.len(),
        "model count mismatch after round trip"
    );

    for (m1, m2) in doc1.models.iter().zip(doc2.models.iter()) {
        assert_eq!(m1.name(), m2.name(), "model name mismatch");
        assert_eq!(
            m1.columns.len(),
            m2.columns.len(),
            "column count mismatch for model '{}'",
            m1.name()
        );
        for (c1, c2) in m1.columns.iter().zip(m2.columns.iter()) {
            assert!(
                c1.same_shape(c2),
                "column mismatch for '{}.{}':\n{c1:?}\nvs\n{c2:?}",
                m1.name(),
                c1.name()
            );
        }
    }

    assert!(doc1.same_shape(&doc2), "document mismatch:\n{printed}");
    assert_eq!(print(&doc2), printed, "printing is not stable");
}

#[test]
fn round_trip_minimal_model() {
    assert_round_trip("model User { id INT primary }");
}

#[test]
fn round_trip_engine_options() {
    assert_round_trip(
        r#"@engine sqlite3 { file: "test.db" pages: 4 ratio: 0.75 mode: wal }
        model A { id int primary }"#,
    );
}

#[test]
fn round_trip_all_modifiers() {
    assert_round_trip(
        r#"model Everything {
            id INT primary autoincrement
            name STRING nullable
            title string default 'untitled'
            score FLOAT default 0.5
            rank int nullable default 3
        }"#,
    );
}

#[test]
fn round_trip_relations() {
    assert_round_trip(
        "model Author {
            id INT primary autoincrement
            posts Post[]
        }
        model Post {
            id INT primary autoincrement
            author Author @relation(authorId, id)
        }",
    );
}

#[test]
fn round_trip_tricky_strings() {
    assert_round_trip(
        r#"model Q {
            id int primary
            a string default "it's"
            b string default 'say "hi"'
            c string default `both ' and "`
            d string default "esc\"aped"
        }"#,
    );
}

#[test]
fn round_trip_ignores_comments() {
    assert_round_trip(
        "// users of the system
        model User {
            id INT primary /* surrogate key */
            name STRING
        }",
    );
}

#[test]
fn two_parses_of_same_text_are_equal() {
    let source = "@engine sqlite3 { file: \"a.db\" }\nmodel A { id int primary\n name string }";
    let a = parse("s", source).unwrap();
    let b = parse("s", source).unwrap();
    assert_eq!(a, b);
}

use laborm_core::migration::MigrationError;
use laborm_core::types::SchemaDocument;
use laborm_driver::{migrate, DriverCall, MemoryDriver, MigrateError, MigrateMode, MEMORY};

fn parse(source: &str) -> SchemaDocument {
    laborm_dsl::parse("schema.labORM", source).expect("schema parses")
}

fn validated(source: &str) -> SchemaDocument {
    let doc = parse(source);
    laborm_core::validate(&doc, &[MEMORY][..]).expect("schema validates");
    doc
}

/// Scenario: a blog schema is bootstrapped, then evolves over three runs.
#[tokio::test]
async fn schema_evolves_across_runs() {
    let driver = MemoryDriver::new();

    let v1 = validated(
        r#"
        @engine memory {}
        model Author {
            id INT primary autoincrement
            name STRING
        }
        "#,
    );
    let outcome = migrate(&driver, &v1, MigrateMode::Apply).await.unwrap();
    assert!(outcome.plan.is_bootstrap());
    assert_eq!(driver.tables(), vec!["Author"]);

    // Add a related model on both sides.
    let v2 = validated(
        r#"
        @engine memory {}
        model Author {
            id INT primary autoincrement
            name STRING
            posts Post[]
        }
        model Post {
            id INT primary autoincrement
            title STRING default "untitled"
            author Author @relation(authorId, id)
        }
        "#,
    );
    driver.clear_journal();
    let outcome = migrate(&driver, &v2, MigrateMode::Apply).await.unwrap();
    assert!(!outcome.plan.is_bootstrap());
    assert_eq!(
        driver.mutations(),
        vec![
            DriverCall::CreateTable {
                table: "Post".into()
            },
            DriverCall::AddColumn {
                table: "Author".into(),
                column: "posts".into()
            },
            DriverCall::StoreSchema,
        ]
    );
    assert_eq!(driver.tables(), vec!["Author", "Post"]);
    assert_eq!(
        driver.relation_tables(),
        vec!["LabPostFauthorIdToAuthorRelation"]
    );

    // Remove the relation pair and the Post model.
    let v3 = validated(
        r#"
        @engine memory {}
        model Author {
            id INT primary autoincrement
            name STRING nullable
        }
        "#,
    );
    driver.clear_journal();
    let outcome = migrate(&driver, &v3, MigrateMode::Apply).await.unwrap();
    assert!(outcome.plan.diff().has_destructive_changes());
    assert_eq!(driver.tables(), vec!["Author"]);
    assert!(driver.relation_tables().is_empty());

    let stored = SchemaDocument::from_json(&driver.snapshot_json().unwrap()).unwrap();
    assert!(stored.same_shape(&v3));
}

/// Scenario: changing a relation target is rejected before any mutation.
#[tokio::test]
async fn relation_change_is_rejected() {
    let v1 = validated(
        r#"
        @engine memory {}
        model Author {
            id INT primary
            posts Post[]
        }
        model Editor {
            id INT primary
            posts Post[]
        }
        model Post {
            id INT primary
            author Author @relation(authorId, id)
            editor Editor @relation(editorId, id)
        }
        "#,
    );
    let v2 = parse(
        r#"
        @engine memory {}
        model Author {
            id INT primary
            posts Post[]
        }
        model Editor {
            id INT primary
            posts Post[]
        }
        model Post {
            id INT primary
            author Editor @relation(authorId, id)
            editor Editor @relation(editorId, id)
        }
        "#,
    );
    let driver = MemoryDriver::new();
    migrate(&driver, &v1, MigrateMode::Apply).await.unwrap();
    driver.clear_journal();

    let err = migrate(&driver, &v2, MigrateMode::Apply).await.unwrap_err();
    match err {
        MigrateError::Unsafe(MigrationError::RelationshipChanged { model, column, .. }) => {
            assert_eq!(model, "Post");
            assert_eq!(column, "author");
        }
        other => panic!("expected relationship change, got {other:?}"),
    }
    assert!(driver.mutations().is_empty());
}

/// Scenario: a dry run against an existing store reports the plan only.
#[tokio::test]
async fn no_action_against_existing_store() {
    let v1 = validated(
        r#"
        @engine memory {}
        model User {
            id INT primary
            name STRING
        }
        "#,
    );
    let v2 = validated(
        r#"
        @engine memory {}
        model User {
            id INT primary
            age INT default 0
        }
        "#,
    );
    let driver = MemoryDriver::new();
    migrate(&driver, &v1, MigrateMode::Apply).await.unwrap();
    let before = driver.snapshot_json();
    driver.clear_journal();

    let outcome = migrate(&driver, &v2, MigrateMode::NoAction).await.unwrap();
    assert_eq!(
        outcome.plan.to_string(),
        "UPDATE TABLE User\n  ADD COLUMN age\n  DROP COLUMN name\n"
    );
    assert!(outcome.report.is_none());
    assert_eq!(driver.journal(), vec![DriverCall::LoadSchema]);
    assert_eq!(driver.snapshot_json(), before);
}

const BLOG_RELATION: &str = r#"
@engine memory {}
model Author {
    id INT primary autoincrement
    posts Post[]
}
model Post {
    id INT primary autoincrement
    author Author @relation(authorId, id)
}
"#;

/// Scenario: the relation target changes case only, then the pair is removed.
#[tokio::test]
async fn relation_target_case_change_then_drop() {
    let driver = MemoryDriver::new();
    let v1 = validated(BLOG_RELATION);
    migrate(&driver, &v1, MigrateMode::Apply).await.unwrap();

    let v2 = validated(&BLOG_RELATION.replace("author Author @relation", "author author @relation"));
    let outcome = migrate(&driver, &v2, MigrateMode::Apply).await.unwrap();
    assert!(outcome.plan.is_noop());

    let v3 = validated(
        r#"
        @engine memory {}
        model Author {
            id INT primary autoincrement
        }
        model Post {
            id INT primary autoincrement
        }
        "#,
    );
    driver.clear_journal();
    let outcome = migrate(&driver, &v3, MigrateMode::Apply).await.unwrap();
    assert_eq!(outcome.report.unwrap().structural_changes(), 2);
    assert!(driver.relation_tables().is_empty());
}

/// Scenario: an up-to-date run still rewrites the stored snapshot.
#[tokio::test]
async fn up_to_date_run_refreshes_snapshot() {
    let driver = MemoryDriver::new();
    let v1 = validated(BLOG_RELATION);
    migrate(&driver, &v1, MigrateMode::Apply).await.unwrap();

    // Same shape, different source positions.
    let moved = validated(&format!("\n\n{BLOG_RELATION}"));
    assert_ne!(moved.to_json().unwrap(), v1.to_json().unwrap());

    driver.clear_journal();
    let outcome = migrate(&driver, &moved, MigrateMode::Apply).await.unwrap();
    assert!(outcome.plan.is_noop());
    assert_eq!(driver.mutations(), vec![DriverCall::StoreSchema]);
    assert_eq!(driver.snapshot_json(), Some(moved.to_json().unwrap()));
}

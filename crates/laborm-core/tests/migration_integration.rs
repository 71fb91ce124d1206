use laborm_core::migration::{DiffEngine, MigrationError, MigrationSafety};
use laborm_core::types::*;
use laborm_core::{validate, EngineDescriptor, OptionSpec, ValidationError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ENGINES: [EngineDescriptor; 1] = [EngineDescriptor {
    name: "sqlite3",
    options: &[OptionSpec::required("file", TokenKind::String)],
}];

fn ident(s: &str) -> Token {
    Token::synthetic(TokenKind::Identifier, s)
}

fn string(s: &str) -> Token {
    Token::synthetic(TokenKind::String, s)
}

fn make_column(model: &str, name: &str, ty: &str) -> ColumnDefinition {
    ColumnDefinition::new(model, ident(name), ident(ty))
}

fn make_schema(models: Vec<ModelDefinition>) -> SchemaDocument {
    SchemaDocument::new(
        Some(EngineOptions::new(ident("sqlite3")).with_option("file", string("test.db"))),
        models,
    )
}

fn user_v1() -> ModelDefinition {
    ModelDefinition::new(
        ident("User"),
        vec![
            make_column("User", "id", "INT").primary().auto_increment(),
            make_column("User", "name", "STRING"),
        ],
    )
}

fn blog(author_target: &str) -> SchemaDocument {
    make_schema(vec![
        ModelDefinition::new(
            ident("Author"),
            vec![
                make_column("Author", "id", "INT").primary().auto_increment(),
                make_column("Author", "posts", "Post").with_relationship(Relationship::Array {
                    target_model: ident("Post"),
                }),
            ],
        ),
        ModelDefinition::new(
            ident("Post"),
            vec![
                make_column("Post", "id", "INT").primary().auto_increment(),
                make_column("Post", "author", author_target).with_relationship(
                    Relationship::Field {
                        target_model: ident(author_target),
                        local_field: ident("authorId"),
                        remote_field: ident("id"),
                    },
                ),
            ],
        ),
    ])
}

// ---------------------------------------------------------------------------
// Schema evolution scenarios
// ---------------------------------------------------------------------------

/// Scenario: a stored `User {id, name}` gains `age STRING default "0"`.
#[test]
fn scenario_add_column_with_default() {
    let physical = make_schema(vec![user_v1()]);
    let mut user = user_v1();
    user.columns
        .push(make_column("User", "age", "STRING").with_default(string("0")));
    let declared = make_schema(vec![user]);

    validate(&declared, &ENGINES[..]).unwrap();
    let diff = DiffEngine::diff(&declared, &physical).unwrap();

    assert!(diff.models_to_add.is_empty());
    assert!(diff.models_to_drop.is_empty());
    assert_eq!(diff.model_diffs.len(), 1);
    let md = &diff.model_diffs[0];
    assert_eq!(md.model.name(), "User");
    let added: Vec<_> = md.columns_to_add.iter().map(|c| c.name()).collect();
    assert_eq!(added, vec!["age"]);
    assert!(md.columns_to_remove.is_empty());
    assert!(md.columns_to_update.is_empty());
}

/// Scenario: the declared `User` no longer has `name`.
#[test]
fn scenario_drop_column() {
    let physical = make_schema(vec![user_v1()]);
    let mut user = user_v1();
    user.columns.retain(|c| c.name() != "name");
    let declared = make_schema(vec![user]);

    let diff = DiffEngine::diff(&declared, &physical).unwrap();
    let md = &diff.model_diffs[0];
    let removed: Vec<_> = md.columns_to_remove.iter().map(|c| c.name()).collect();
    assert_eq!(removed, vec!["name"]);
    assert!(md.columns_to_add.is_empty());
    assert_eq!(diff.overall_safety(), MigrationSafety::Destructive);
}

/// Scenario: `age` is added with neither a default nor a relation.
#[test]
fn scenario_add_column_without_default() {
    let physical = make_schema(vec![user_v1()]);
    let mut user = user_v1();
    user.columns.push(make_column("User", "age", "STRING"));
    let declared = make_schema(vec![user]);

    validate(&declared, &ENGINES[..]).unwrap();
    let err = DiffEngine::diff(&declared, &physical).unwrap_err();
    match err {
        MigrationError::NewColumnWithoutDefault { model, column, .. } => {
            assert_eq!(model, "User");
            assert_eq!(column, "age");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Scenario: an author/post pair validates and is created from scratch.
#[test]
fn scenario_relation_pair_created_from_scratch() {
    let declared = blog("Author");
    validate(&declared, &ENGINES[..]).unwrap();

    let diff = DiffEngine::diff(&declared, &make_schema(vec![])).unwrap();
    let names: Vec<_> = diff.models_to_add.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["Author", "Post"]);

    let post = &diff.models_to_add[1];
    let owned: Vec<_> = post.owned_relations().map(|c| c.name()).collect();
    assert_eq!(owned, vec!["author"]);
}

/// Scenario: the remote field of `Post.author` changes between versions.
#[test]
fn scenario_relation_field_change_is_rejected() {
    let physical = blog("Author");
    let mut declared = blog("Author");
    if let Some(Relationship::Field { remote_field, .. }) =
        declared.models[1].columns[1].relationship.as_mut()
    {
        *remote_field = ident("uuid");
    }

    let err = DiffEngine::diff(&declared, &physical).unwrap_err();
    assert!(matches!(
        err,
        MigrationError::RelationshipChanged { ref model, ref column, .. }
            if model == "Post" && column == "author"
    ));
}

/// Scenario: snapshot stored as JSON reloads into an identical physical schema.
#[test]
fn scenario_snapshot_reload_is_stable() {
    let declared = blog("Author");
    let json = declared.to_json().unwrap();
    let physical = SchemaDocument::from_json(&json).unwrap();

    let diff = DiffEngine::diff(&declared, &physical).unwrap();
    assert!(diff.is_empty());
}

/// Scenario: a model with two primary keys never reaches the differ.
#[test]
fn scenario_two_primary_keys() {
    let mut user = user_v1();
    user.columns[1].primary_key = true;
    let declared = make_schema(vec![user]);

    let err = validate(&declared, &ENGINES[..]).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::MultiplePrimaryKeys { ref model, .. } if model == "User"
    ));
}

//! Semantic checks over a parsed schema document.
//!
//! Checks run in a fixed order and stop at the first failure:
//! engine block, engine options, model names, per-model columns, relations.

use std::collections::HashSet;

use tracing::warn;

use crate::engine::EngineCatalog;
use crate::error::ValidationError;
use crate::types::{ColumnDefinition, ColumnType, ModelDefinition, Relationship, SchemaDocument};

/// Validates `doc` against the engines known to `catalog`.
pub fn validate<C>(doc: &SchemaDocument, catalog: &C) -> Result<(), ValidationError>
where
    C: EngineCatalog + ?Sized,
{
    check_engine(doc, catalog)?;
    check_model_names(doc)?;
    for model in &doc.models {
        check_model(model)?;
    }
    for model in &doc.models {
        for column in &model.columns {
            check_relation(doc, model, column)?;
        }
    }
    Ok(())
}

fn check_engine<C>(doc: &SchemaDocument, catalog: &C) -> Result<(), ValidationError>
where
    C: EngineCatalog + ?Sized,
{
    let engine = doc.engine.as_ref().ok_or(ValidationError::MissingEngine)?;
    let name = engine.driver_name();
    let descriptor =
        catalog
            .descriptor(name)
            .ok_or_else(|| ValidationError::UnknownEngine {
                engine: name.to_string(),
                location: engine.driver_name.location.clone(),
            })?;

    for spec in descriptor.options {
        match engine.option(spec.name) {
            None if spec.required => {
                return Err(ValidationError::MissingEngineOption {
                    engine: name.to_string(),
                    option: spec.name.to_string(),
                    location: engine.driver_name.location.clone(),
                });
            }
            None => {}
            Some(value) if value.kind != spec.kind => {
                return Err(ValidationError::InvalidEngineOption {
                    engine: name.to_string(),
                    option: spec.name.to_string(),
                    expected: spec.kind,
                    found: value.kind,
                    location: value.location.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for option in engine.options.keys() {
        if descriptor.option(option).is_none() {
            warn!(engine = name, option = %option, "ignoring unknown engine option");
        }
    }
    Ok(())
}

fn check_model_names(doc: &SchemaDocument) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(doc.models.len());
    for model in &doc.models {
        if !seen.insert(model.name().to_ascii_lowercase()) {
            return Err(ValidationError::DuplicateModel {
                model: model.name().to_string(),
                location: model.name.location.clone(),
            });
        }
    }
    Ok(())
}

fn check_model(model: &ModelDefinition) -> Result<(), ValidationError> {
    let model_name = model.name();

    let mut seen = HashSet::with_capacity(model.columns.len());
    for column in &model.columns {
        if !seen.insert(column.name().to_ascii_lowercase()) {
            return Err(ValidationError::DuplicateColumn {
                model: model_name.to_string(),
                column: column.name().to_string(),
                location: column.name.location.clone(),
            });
        }
    }

    let keys: Vec<&ColumnDefinition> = model.primary_keys().collect();
    match keys.as_slice() {
        [] => {
            return Err(ValidationError::MissingPrimaryKey {
                model: model_name.to_string(),
                location: model.name.location.clone(),
            });
        }
        [_] => {}
        [_, second, ..] => {
            return Err(ValidationError::MultiplePrimaryKeys {
                model: model_name.to_string(),
                columns: keys.iter().map(|c| c.name().to_string()).collect(),
                location: second.name.location.clone(),
            });
        }
    }

    for column in &model.columns {
        check_column(model_name, column)?;
    }
    Ok(())
}

fn check_column(model: &str, column: &ColumnDefinition) -> Result<(), ValidationError> {
    if column.auto_increment {
        if column.column_type != ColumnType::Int {
            return Err(ValidationError::AutoIncrementNotInt {
                model: model.to_string(),
                column: column.name().to_string(),
                column_type: column.column_type,
                location: column.type_name.location.clone(),
            });
        }
        if column.default_value.is_some() {
            return Err(ValidationError::AutoIncrementWithDefault {
                model: model.to_string(),
                column: column.name().to_string(),
                location: column.name.location.clone(),
            });
        }
    }

    if let Some(default) = &column.default_value {
        if column.column_type.literal_kind() != Some(default.kind) {
            return Err(ValidationError::DefaultTypeMismatch {
                model: model.to_string(),
                column: column.name().to_string(),
                column_type: column.column_type,
                found: default.kind,
                location: default.location.clone(),
            });
        }
    }
    Ok(())
}

fn check_relation(
    doc: &SchemaDocument,
    model: &ModelDefinition,
    column: &ColumnDefinition,
) -> Result<(), ValidationError> {
    if column.column_type != ColumnType::Relation {
        return Ok(());
    }
    let model_name = model.name();
    let column_name = column.name();

    let Some(relationship) = &column.relationship else {
        return Err(ValidationError::UnknownColumnType {
            model: model_name.to_string(),
            column: column_name.to_string(),
            type_name: column.type_name.text.clone(),
            location: column.type_name.location.clone(),
        });
    };

    let target_token = relationship.target_model();
    let Some(target) = doc.model(&target_token.text) else {
        return Err(ValidationError::UnknownRelationTarget {
            model: model_name.to_string(),
            column: column_name.to_string(),
            target: target_token.text.clone(),
            location: target_token.location.clone(),
        });
    };
    let target_name = target.name();

    // A self-relation must not count the column as its own back reference.
    let same_model = target.is_named(model_name);
    let back_refs: Vec<(&ColumnDefinition, &Relationship)> = target
        .columns
        .iter()
        .filter(|c| !(same_model && c.is_named(column_name)))
        .filter_map(|c| c.relationship.as_ref().map(|r| (c, r)))
        .filter(|(_, r)| r.targets(model_name))
        .collect();

    if back_refs.is_empty() {
        return Err(ValidationError::MissingBackReference {
            model: model_name.to_string(),
            column: column_name.to_string(),
            target: target_name.to_string(),
            location: column.name.location.clone(),
        });
    }

    if let Some((other, _)) = back_refs
        .iter()
        .find(|(_, r)| r.variant_name() == relationship.variant_name())
    {
        return Err(ValidationError::OneToOneRelation {
            model: model_name.to_string(),
            column: column_name.to_string(),
            target: target_name.to_string(),
            other_column: other.name().to_string(),
            location: column.name.location.clone(),
        });
    }

    let Relationship::Field {
        local_field,
        remote_field,
        ..
    } = relationship
    else {
        return Ok(());
    };

    if back_refs.len() > 1 {
        return Err(ValidationError::AmbiguousRelation {
            model: model_name.to_string(),
            column: column_name.to_string(),
            target: target_name.to_string(),
            candidates: back_refs.iter().map(|(c, _)| c.name().to_string()).collect(),
            location: column.name.location.clone(),
        });
    }

    match target.column(&remote_field.text) {
        None => {
            return Err(ValidationError::UnknownRemoteField {
                model: model_name.to_string(),
                column: column_name.to_string(),
                target: target_name.to_string(),
                field: remote_field.text.clone(),
                location: remote_field.location.clone(),
            });
        }
        Some(remote) if !remote.is_stored() => {
            return Err(ValidationError::RemoteFieldNotScalar {
                model: model_name.to_string(),
                column: column_name.to_string(),
                target: target_name.to_string(),
                field: remote_field.text.clone(),
                location: remote_field.location.clone(),
            });
        }
        Some(_) => {}
    }

    if model.column(&local_field.text).is_some() {
        return Err(ValidationError::LocalFieldConflict {
            model: model_name.to_string(),
            column: column_name.to_string(),
            field: local_field.text.clone(),
            location: local_field.location.clone(),
        });
    }
    Ok(())
}

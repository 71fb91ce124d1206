pub mod check;
pub mod migrate;

use std::path::{Path, PathBuf};

use laborm_core::types::SchemaDocument;

use crate::drivers::REGISTRY;
use crate::error::CliError;

/// A schema file that parsed and validated, with its text kept for diagnostics.
pub struct LoadedSchema {
    pub doc: SchemaDocument,
    pub source_text: String,
    pub file: PathBuf,
}

/// Read, parse and validate the schema file.
///
/// Validation runs against the engines compiled into the binary, so an
/// unknown `@engine` name is reported before any store is opened.
pub fn load_schema(path: &Path) -> Result<LoadedSchema, CliError> {
    let source_text = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let filename = path.display().to_string();

    let doc = match laborm_dsl::parse(&filename, &source_text) {
        Ok(doc) => doc,
        Err(errors) => {
            return Err(CliError::Syntax {
                errors,
                source_text,
                file: path.to_path_buf(),
            })
        }
    };

    if let Err(error) = laborm_core::validate(&doc, &REGISTRY) {
        return Err(CliError::Validation {
            error,
            source_text,
            file: path.to_path_buf(),
        });
    }

    tracing::debug!(file = %filename, models = doc.models.len(), "schema loaded");
    Ok(LoadedSchema {
        doc,
        source_text,
        file: path.to_path_buf(),
    })
}

use crate::cli::CheckArgs;
use crate::config::RunOptions;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

use super::load_schema;

/// Run the `check` command: parse and validate the schema file.
pub fn run(args: &CheckArgs, options: &RunOptions, output: &OutputContext) -> Result<(), CliError> {
    let loaded = load_schema(&options.schema_file)?;
    let doc = &loaded.doc;
    let engine = doc
        .engine
        .as_ref()
        .map(|e| e.driver_name().to_string())
        .unwrap_or_default();

    if args.print {
        print!("{}", laborm_dsl::print(doc));
        return Ok(());
    }

    match output.mode {
        OutputMode::Human => {
            for model in &doc.models {
                output.detail(&format!("  {} ({} columns)", model.name(), model.columns.len()));
            }
            output.success(&format!(
                "{}: {} model(s) for engine '{engine}'",
                loaded.file.display(),
                doc.models.len()
            ));
        }
        OutputMode::Json => {
            let models: Vec<serde_json::Value> = doc
                .models
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "name": m.name(),
                        "columns": m.columns.len(),
                    })
                })
                .collect();
            output.print_json(&serde_json::json!({
                "file": loaded.file.display().to_string(),
                "engine": engine,
                "valid": true,
                "models": models,
            }));
        }
        OutputMode::Plain => {
            for model in &doc.models {
                println!("{}\t{}", model.name(), model.columns.len());
            }
        }
    }

    Ok(())
}

use laborm_core::MigrationSafety;
use laborm_driver::{planned_operations, ApplyReport, ConnectOptions, MigrateError, MigrationPlan};

use crate::cli::MigrateArgs;
use crate::config::RunOptions;
use crate::drivers::{AnyDriver, REGISTRY};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

use super::{load_schema, LoadedSchema};

/// Run the `migrate` command: plan against the stored schema, then apply.
pub async fn run(
    args: &MigrateArgs,
    options: &RunOptions,
    output: &OutputContext,
) -> Result<(), CliError> {
    let loaded = load_schema(&options.schema_file)?;

    if let Some(path) = &args.output_json_schema_file {
        write_json_schema(&loaded, path)?;
        output.detail(&format!("Wrote schema JSON to {}", path.display()));
    }

    let Some(engine) = loaded.doc.engine.as_ref() else {
        return Err(CliError::Other("schema has no @engine block".into()));
    };
    let driver = REGISTRY.connect(&ConnectOptions::new(&options.folder, engine))?;
    if matches!(driver, AnyDriver::Memory(_)) {
        output.warn("the memory engine keeps nothing between runs");
    }
    output.status(&format!(
        "Migrating {} with engine '{}'",
        loaded.file.display(),
        engine.driver_name()
    ));

    let plan = laborm_driver::plan(&driver, &loaded.doc)
        .await
        .map_err(|e| migrate_error(e, &loaded))?;
    render_plan(&plan, args.no_action, output);

    if args.no_action {
        if output.mode == OutputMode::Json {
            output.print_json(&plan_json(&plan, true, None));
        }
        return Ok(());
    }

    if plan.diff().has_destructive_changes() && !(args.force || options.force) {
        confirm_destructive(output)?;
    }

    let report = laborm_driver::execute(&driver, &plan, &loaded.doc)
        .await
        .map_err(|e| migrate_error(e, &loaded))?;

    // An up-to-date run still rewrites the snapshot.
    match output.mode {
        OutputMode::Json => output.print_json(&plan_json(&plan, false, Some(&report))),
        _ if plan.is_noop() => output.detail("Stored schema snapshot refreshed."),
        _ => output.success(&format!(
            "Applied {} change(s) to {}.",
            report.structural_changes(),
            options.folder.display()
        )),
    }
    Ok(())
}

fn write_json_schema(loaded: &LoadedSchema, path: &std::path::Path) -> Result<(), CliError> {
    let json = loaded
        .doc
        .to_json()
        .map_err(|e| CliError::Other(format!("cannot serialize schema: {e}")))?;
    std::fs::write(path, json).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn migrate_error(error: MigrateError, loaded: &LoadedSchema) -> CliError {
    match error {
        MigrateError::Unsafe(error) => CliError::Unsafe {
            error,
            source_text: loaded.source_text.clone(),
            file: loaded.file.clone(),
        },
        other => CliError::Apply(other),
    }
}

fn confirm_destructive(output: &OutputContext) -> Result<(), CliError> {
    if !output.is_interactive() {
        return Err(CliError::RequiresForce);
    }

    let confirm = dialoguer::Confirm::new()
        .with_prompt("The plan drops tables or columns. Apply it?")
        .default(false)
        .interact()
        .map_err(|_| CliError::Cancelled)?;

    if confirm {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

fn render_plan(plan: &MigrationPlan, no_action: bool, output: &OutputContext) {
    let diff = plan.diff();
    let operations = planned_operations(diff);

    match output.mode {
        OutputMode::Human => {
            if plan.is_noop() {
                output.success("Schema is up to date.");
                return;
            }
            if plan.is_bootstrap() {
                println!("No stored schema found; creating every model.");
            }
            print!("{plan}");
            for (i, op) in operations.iter().enumerate() {
                output.detail(&format!("  {}. {op}", i + 1));
            }
            println!();
            println!(
                "{} change(s), {}",
                operations.len(),
                safety_label(diff.overall_safety())
            );
            if no_action {
                println!("No action taken (--no-action).");
            }
        }
        // Printed once the run is over, together with the report.
        OutputMode::Json => {}
        OutputMode::Plain => {
            for op in &operations {
                println!("{op}");
            }
        }
    }
}

fn plan_json(
    plan: &MigrationPlan,
    no_action: bool,
    report: Option<&ApplyReport>,
) -> serde_json::Value {
    serde_json::json!({
        "bootstrap": plan.is_bootstrap(),
        "up_to_date": plan.is_noop(),
        "safety": plan.diff().overall_safety().to_string(),
        "operations": planned_operations(plan.diff()),
        "no_action": no_action,
        "applied": report.is_some(),
        "structural_changes": report.map(ApplyReport::structural_changes),
    })
}

fn safety_label(safety: MigrationSafety) -> &'static str {
    match safety {
        MigrationSafety::Safe => "safe",
        MigrationSafety::RequiresConfirmation => "rewrites existing columns",
        MigrationSafety::Destructive => "destructive",
        _ => "unclassified",
    }
}

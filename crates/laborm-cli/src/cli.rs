use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Schema-driven migrations for relational stores.
///
/// labORM reads models declared in a `.labORM` schema file, compares them
/// with the schema last applied to the store and applies the difference.
#[derive(Parser)]
#[command(
    name = "laborm",
    version,
    about = "Schema-driven migrations for relational stores",
    after_help = "Use 'laborm <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: LABORM_CONFIG]
    #[arg(short = 'c', long = "config", global = true, env = "LABORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Schema file to read (default: schema.labORM)
    #[arg(long = "schema-file", global = true)]
    pub schema_file: Option<PathBuf>,

    /// Folder holding the database files (default: ./database)
    #[arg(long = "folder", global = true)]
    pub folder: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR", value_parser = clap::builder::BoolishValueParser::new())]
    pub no_color: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Plan and apply the migration from the stored schema to the schema file
    Migrate(MigrateArgs),

    /// Parse and validate the schema file without touching the store
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Individual command argument structs
// ---------------------------------------------------------------------------

/// Arguments for `laborm migrate`.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Print the plan and stop before changing the store
    #[arg(short = 'n', long = "no-action")]
    pub no_action: bool,

    /// Apply destructive changes without confirmation
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Write the validated schema as JSON to this file
    #[arg(long = "output-json-schema-file")]
    pub output_json_schema_file: Option<PathBuf>,
}

/// Arguments for `laborm check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the schema back in normalized form
    #[arg(long = "print")]
    pub print: bool,
}

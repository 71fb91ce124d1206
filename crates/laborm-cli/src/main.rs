mod cli;
mod commands;
mod config;
#[allow(unused_assignments)]
mod diagnostic;
mod drivers;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, RunOptions};
use crate::error::{CliError, ExitCode};
use crate::output::OutputContext;

/// `RUST_LOG` wins; otherwise `-v` raises the level one step per flag.
fn init_tracing(global: &cli::GlobalOpts, output: &OutputContext) {
    let level = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(output.use_color)
        .with_target(false)
        .init();
}

async fn run(cli: cli::Cli, output: &OutputContext) -> Result<(), CliError> {
    let config = load_config(cli.global.config.as_deref())?;
    let options = RunOptions::resolve(&config, &cli.global);
    tracing::debug!(?options, "resolved run options");

    match &cli.command {
        cli::Commands::Migrate(args) => commands::migrate::run(args, &options, output).await,
        cli::Commands::Check(args) => commands::check::run(args, &options, output),
    }
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    let output = OutputContext::from_global(&cli.global);
    init_tracing(&cli.global, &output);

    match run(cli, &output).await {
        Ok(()) => std::process::exit(ExitCode::Success as i32),
        Err(e) => {
            output.print_error(&e);
            std::process::exit(e.exit_code() as i32);
        }
    }
}

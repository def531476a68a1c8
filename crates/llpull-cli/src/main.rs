//! `llpull` entry point.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use llpull_cli::{Cli, CliError, Commands, handlers, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before the config reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Pull { model } => {
            let config = handlers::pull::resolve_config(&cli)?;
            handlers::pull::execute(&config, model.as_deref(), cli.json).await?;
        }
    }

    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

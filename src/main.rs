// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments, load configuration
//   and hand over to the UI flow.
// - Returns `anyhow::Result` so any account or network failure exits non-zero.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use drivestatus_cli::{
    cli::{Cli, Command},
    config::Config,
    ui::status_command,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    match &cli.command {
        Command::Status(args) => status_command(&config, args, &mut std::io::stdout().lock()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Overrides the `-v` derived level, e.g. `RAASTA_LOG=raasta_core=trace`.
const LOG_ENV: &str = "RAASTA_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(global: &GlobalOpts) {
    let level = match (global.quiet, global.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    if let Command::Completions(args) = command {
        clap_complete::generate(
            args.shell,
            &mut Cli::command(),
            "raasta",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let cfg = raasta_config::load_config()?;
    config::apply_display_defaults(&mut global, &cfg)?;
    let controller = config::build_controller(&cfg, &global)?;
    tracing::debug!(command = ?command, "dispatching command");
    let result = commands::dispatch(command, &controller, &global).await;

    // Pending account saves must land before the process exits.
    controller.shutdown().await;
    result
}

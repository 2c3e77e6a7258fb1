mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::EnvFilter;

use reportly_core::Session;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a server
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "reportly", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the resource server
        cmd => {
            let session_config = config::resolve_session_config(&cli.global)?;
            let session = Session::new(session_config)?;
            let mut notifications = session.notifications().subscribe();

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &session, &cli.global).await;

            // Toasts for this run
            if !cli.global.quiet {
                let color = output::should_color(cli.global.color);
                loop {
                    match notifications.try_recv() {
                        Ok(n) => output::print_notification(&n, color),
                        Err(TryRecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "notifications dropped");
                        }
                        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                    }
                }
            }

            result
        }
    }
}

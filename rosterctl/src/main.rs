#![allow(missing_docs)]

mod cli;
mod commands;
mod render;

use anyhow::Context;
use clap::Parser;
use roster_core::{
    BufferedNotifier, Console, FileStore, HttpGateway, RosterConfig,
    RosterError, SystemClock,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Console failures are already printed; override via RUST_LOG.
                "warn,roster_core=error".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let notifier = Arc::new(BufferedNotifier::new());
    let outcome = run(cli, Arc::clone(&notifier)).await;
    let toasted_error = render::flush_notifications(&notifier);

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !toasted_error {
                eprintln!("error: {}", describe(&err));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, notifier: Arc<BufferedNotifier>) -> anyhow::Result<()> {
    let mut config = RosterConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    let data_dir = config
        .resolve_data_dir()
        .context("no data directory available; pass --data-dir")?;
    tracing::debug!(path = %data_dir.display(), "using data directory");

    let gateway =
        HttpGateway::new(&config).context("failed to build the HTTP client")?;
    let console = Console::new(
        config,
        Arc::new(gateway),
        Arc::new(FileStore::in_dir(&data_dir)),
        Arc::new(SystemClock),
        notifier,
    );

    console
        .restore_session()
        .await
        .context("failed to restore the saved session")?;

    commands::execute(&console, cli.command).await
}

fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RosterError>() {
        Some(roster) => roster.user_message(),
        None => format!("{err:#}"),
    }
}

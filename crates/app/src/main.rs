//! Mafia Bot - moderator for Mafia games played over chat
//!
//! Reads chat traffic from stdin, one message per line, and prints what the
//! bot sends back. Logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mafia_core::{
    ChatGateway, ModeratorService, RefreshNotifier, ScenarioCatalog,
    Stores, User,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod gateway;
mod handler;
mod refresh;
mod render;

use config::{Cli, Settings};
use gateway::ConsoleGateway;
use handler::Handler;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mafia_bot=info,mafia_core=info")),
        )
        .init();

    let settings = Settings::load(Cli::parse())?;
    tracing::info!(
        token = %settings.token_fingerprint(),
        admins = settings.admins.len(),
        seed = settings.seed,
        "Starting Mafia Bot"
    );

    let runtime = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let result = runtime.block_on(run(settings));
    // stdin reads block a worker thread until the next line
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let notifier = Arc::new(RefreshNotifier::new());
    let gateway: Arc<dyn ChatGateway> = Arc::new(ConsoleGateway::stdout());
    let service = Arc::new(ModeratorService::new(
        Arc::new(Stores::new()),
        Box::new(ChaCha8Rng::seed_from_u64(settings.seed)),
        gateway.clone(),
        notifier.clone(),
    ));

    if let Some(dir) = &settings.scenarios_dir {
        load_catalog(&service, ScenarioCatalog::scan(dir.clone()));
    }

    let handler = Arc::new(Handler::new(
        service.clone(),
        Arc::new(settings.admins),
        notifier.clone(),
        gateway.clone(),
        shutdown.clone(),
    ));

    let refresher = tokio::spawn(refresh::run(
        service,
        notifier,
        gateway,
        settings.refresh,
        shutdown.clone(),
    ));

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, shutting down");
            }
            shutdown.cancel();
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line.context("reading stdin")?,
        };
        let Some(line) = line else {
            tracing::info!("Input closed");
            break;
        };

        let handler = handler.clone();
        tokio::task::spawn_blocking(move || handler.handle_line(&line))
            .await
            .context("handler task panicked")?;
    }

    shutdown.cancel();
    refresher.await.context("refresh driver panicked")?;
    Ok(())
}

/// Store every scenario found in the catalog directory
fn load_catalog(service: &ModeratorService, catalog: ScenarioCatalog) {
    let loader = User {
        admin: true,
        ..User::new(0, "catalog")
    };

    let mut stored = 0;
    for entry in catalog.entries() {
        match service.create_scenario(&loader, entry.document.clone()) {
            Ok(_) => stored += 1,
            Err(e) => tracing::warn!(path = %entry.path.display(), error = %e, "Rejected scenario"),
        }
    }
    tracing::info!(
        dir = %catalog.dir().display(),
        stored,
        failed = catalog.load_errors().len(),
        "Scenario catalog loaded"
    );
}

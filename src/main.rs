mod config;
mod credentials;
mod fetch;
mod providers;
mod render;
mod surface;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use calclock_core::ticker::{self, TickerSnapshot};

use crate::credentials::{CredentialProvider, GoogleCredentials};

#[derive(Parser)]
#[command(name = "calclock")]
#[command(about = "LED matrix clock with a scrolling Google Calendar ticker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Google Calendar and store tokens
    Auth,
    /// Fetch today's events once and print the ticker line
    Events,
    /// Run the clock display
    Run {
        /// Display backend to render on
        #[arg(long, value_enum, default_value = "sim")]
        display: DisplayKind,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DisplayKind {
    /// Simulated window
    Sim,
    /// Physical LED matrix (requires the `matrix` feature)
    Matrix,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth => cmd_auth().await,
        Commands::Events => cmd_events().await,
        Commands::Run { display } => cmd_run(display).await,
    }
}

async fn cmd_auth() -> Result<()> {
    let cfg = config::load_config()?;
    let gcal = cfg
        .providers
        .gcal
        .context("No [providers.gcal] section in config.toml; add your OAuth client first")?;

    println!("Authenticating with Google Calendar...");

    let tokens = providers::gcal::authenticate(&gcal).await?;
    config::save_tokens(&tokens)?;

    println!("\nTokens stored in {}", config::tokens_path()?.display());
    println!("Run `calclock run` to start the display.");

    Ok(())
}

async fn cmd_events() -> Result<()> {
    let cfg = config::load_config()?;
    let gcal = cfg
        .providers
        .gcal
        .context("No [providers.gcal] section in config.toml")?;

    let provider = GoogleCredentials::new(gcal.clone());
    let tokens = provider
        .obtain()
        .await
        .context("Could not obtain calendar credentials")?;

    let events = providers::gcal::fetch_today(&gcal, &tokens).await?;
    println!(
        "{}",
        ticker::ticker_line(&events, cfg.display.events, chrono::Utc::now())
    );

    Ok(())
}

async fn cmd_run(display: DisplayKind) -> Result<()> {
    let cfg = config::load_config()?;
    let gcal = cfg
        .providers
        .gcal
        .context("No [providers.gcal] section in config.toml")?;

    let provider = GoogleCredentials::new(gcal.clone());

    // Validate credentials up front so a missing or dead grant fails fast
    // instead of leaving a blank ticker forever.
    provider
        .obtain()
        .await
        .context("Could not obtain calendar credentials (run `calclock auth`)")?;

    let (tx, rx) = watch::channel(TickerSnapshot::default());
    let refresher = fetch::Refresher::new(
        provider,
        gcal,
        cfg.display.events,
        Duration::from_secs(cfg.display.refresh_secs),
        tx,
    );
    let fetch_task = tokio::spawn(refresher.run());

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    // The surfaces hold window/panel handles that must stay on this thread,
    // so the frame loop runs via block_in_place rather than a spawned task.
    let display_cfg = cfg.display.clone();
    let render_result = match display {
        DisplayKind::Sim => {
            let surface = surface::sim::SimSurface::new(display_cfg.width, display_cfg.height)?;
            let render = render::RenderLoop::new(surface, display_cfg, rx, shutdown.clone());
            tokio::task::block_in_place(move || render.run())
        }
        #[cfg(feature = "matrix")]
        DisplayKind::Matrix => {
            let surface = surface::matrix::MatrixSurface::new(&cfg.matrix)?;
            let render = render::RenderLoop::new(surface, display_cfg, rx, shutdown.clone());
            tokio::task::block_in_place(move || render.run())
        }
        #[cfg(not(feature = "matrix"))]
        DisplayKind::Matrix => {
            anyhow::bail!("built without the `matrix` feature; rebuild with --features matrix")
        }
    };

    fetch_task.abort();
    info!("display loop ended, shutting down");

    render_result
}

//! IntentLink host
//!
//! Process entry point: loads the configuration, builds the bundled demo
//! application and serves it to the core until Ctrl-C or until the
//! connection to the core is lost.

mod demo;

use anyhow::{bail, Context, Result};
use clap::Parser;
use intentlink_core::{build_registration_document, CoreConfig, Session, SessionState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "intentlink-host",
    version,
    about = "Serve voice application intents to a conversational core"
)]
struct Cli {
    /// Config file (defaults to <config dir>/intentlink/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Core WebSocket URL, overrides the config file
    #[arg(long)]
    core_url: Option<String>,

    /// Print the registration documents and exit
    #[arg(long)]
    print_schema: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("INTENTLINK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config =
        CoreConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(core_url) = cli.core_url {
        config = config.with_core_url(core_url);
        config.validate()?;
    }

    let apps = vec![Arc::new(demo::greeter_app())];

    if cli.print_schema {
        for app in &apps {
            let document = build_registration_document(app)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        return Ok(());
    }

    let session = Session::new(apps, config);
    session
        .start()
        .await
        .with_context(|| format!("Failed to start session {}", session.id()))?;

    info!("Serving intents, press Ctrl-C to stop");
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            session.stop().await;
            Ok(())
        }
        state = session.finished() => {
            session.stop().await;
            if state == SessionState::Failed {
                bail!("Lost connection to core: session {}", session.id());
            }
            Ok(())
        }
    }
}

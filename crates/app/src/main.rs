//! Vestibule - Main Entry Point
//!
//! Initializes logging, picks the identity provider from configuration,
//! mounts the session provider and runs the dashboard shell on stdin.

mod commands;
mod shell;

use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vestibule_application::SessionProvider;
use vestibule_application::ports::IdentityCollaborator;
use vestibule_infrastructure::{FirebaseIdentityClient, InMemoryIdentityProvider, load_from_env};

use crate::commands::HELP;
use crate::shell::{Shell, watch_session};

const DEMO_EMAIL: &str = "demo@vestibule.dev";
const DEMO_PASSWORD: &str = "demo-pass";

async fn build_collaborator() -> Result<Arc<dyn IdentityCollaborator>, Box<dyn std::error::Error>>
{
    match load_from_env(|name| std::env::var(name).ok()).await? {
        Some(config) => Ok(Arc::new(FirebaseIdentityClient::initialize(config)?)),
        None => {
            tracing::info!(
                email = DEMO_EMAIL,
                "no identity config found, using the local provider"
            );
            println!("Local provider: sign in with `signin {DEMO_EMAIL} {DEMO_PASSWORD}`");
            Ok(Arc::new(InMemoryIdentityProvider::new().with_account(
                DEMO_EMAIL,
                DEMO_PASSWORD,
                Some("Demo User"),
            )))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they do not interleave with the prompt.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Vestibule v{}", env!("CARGO_PKG_VERSION"));

    let collaborator = build_collaborator().await?;
    let provider = SessionProvider::mount(collaborator);
    let context = provider.context();
    let method = context.method();

    println!("{HELP}");
    let watcher = tokio::spawn(watch_session(
        context.subscribe(),
        method,
        tokio::io::stdout(),
    ));

    Shell::new(context)
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    provider.unmount().await?;
    watcher.await??;
    Ok(())
}

use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{PatientStore, router};

/// Main entry point for the ward development backend
///
/// Serves the patients resource from memory so the board and the `ward` CLI have something to
/// talk to.
///
/// # Environment Variables
/// - `WARD_REST_ADDR`: Server address (default: "0.0.0.0:3001")
/// - `WARD_SEED_FILE`: Optional `{ "patients": [...] }` file loaded at start-up
///
/// # Errors
/// Returns an error if the seed file cannot be read, the address cannot be bound, or the server
/// fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ward_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("WARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let store = match std::env::var("WARD_SEED_FILE").ok().filter(|v| !v.trim().is_empty()) {
        Some(path) => {
            let path = PathBuf::from(path);
            let store = PatientStore::from_seed_file(&path)?;
            tracing::info!(seed = %path.display(), patients = store.len(), "seed loaded");
            store
        }
        None => PatientStore::default(),
    };

    tracing::info!("++ Starting ward patients backend on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(store))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down");
        })
        .await?;

    Ok(())
}

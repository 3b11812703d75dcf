//! Biblio API Server
//!
//! Main entry point for the Biblio backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_api::{AppState, create_router};
use biblio_core::covers::CoverStorage;
use biblio_db::connect;
use biblio_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biblio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Set up cover image storage if configured
    let covers = match &config.covers {
        Some(covers_config) => match CoverStorage::from_config(covers_config) {
            Ok(storage) => {
                info!("Cover image storage configured");
                Some(Arc::new(storage))
            }
            Err(e) => {
                warn!(error = %e, "Cover storage misconfigured; uploads disabled");
                None
            }
        },
        None => {
            warn!("No cover storage configured; uploads disabled");
            None
        }
    };

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        covers,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! # Curio API Server
//!
//! REST API server for the Curio collection manager: accounts, collections,
//! items, search, and shareable read-only collection views.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p curio-api
//! ```

use curio_api::{
    app::{build_router, AppState},
    config::Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Curio API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool
    let db_config = curio_shared::db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    };
    let pool = curio_shared::db::pool::create_pool(db_config).await?;

    // Apply pending migrations
    curio_shared::db::migrations::run_migrations(&pool).await?;

    // Build Axum application
    let state = AppState::new(pool, config.clone());
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}

//! Process bootstrap: configuration, pool, migrations, HTTP server.

use std::sync::Arc;

use config::AppConfig;
use infrastructure::{Database, PgBookRepository, MIGRATOR};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    // Fails fast if the store is unreachable.
    let database = Database::connect(&config.database).await?;
    MIGRATOR.run(&database.pool()).await?;

    let books = Arc::new(PgBookRepository::new(database.pool()));
    let state = AppState::new(books);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("bookstore listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight requests have drained; release the pool last.
    database.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use spacetix_api::{app, AppState};
use spacetix_store::{app_config::Config, DbClient, HttpLaunchRegistry, PgBookingRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spacetix_api=debug,spacetix_booking=debug,spacetix_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Config loaded");

    let db = DbClient::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let registry = HttpLaunchRegistry::from_config(&config.registry)
        .context("Failed to build launch registry client")?;

    let state = AppState::new(
        Arc::new(PgBookingRepository::new(db.pool.clone())),
        Arc::new(registry),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("API running at http://{}/api/v1", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state, config.server.request_timeout()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

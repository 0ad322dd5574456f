use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::{info, warn};

use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    /// Opens the pool, retrying up to `connect_retries` times while the
    /// database is unreachable.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let attempts = cfg.connect_retries.max(1);
        let mut attempt = 1;

        info!("Connecting to database...");
        loop {
            let result = PgPoolOptions::new()
                .max_connections(cfg.max_connections)
                .min_connections(cfg.min_connections)
                .acquire_timeout(cfg.acquire_timeout())
                .max_lifetime(cfg.max_lifetime())
                .connect(&cfg.url)
                .await;

            match result {
                Ok(pool) => {
                    info!("Connected to database");
                    return Ok(Self { pool });
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        "Failed to connect to the database (attempt {}/{}): {}",
                        attempt, attempts, e
                    );
                    attempt += 1;
                    tokio::time::sleep(cfg.retry_interval()).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

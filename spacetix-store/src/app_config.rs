use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Upper bound on a whole request, registry call included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_retry_interval")]
    pub connect_retry_interval_secs: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.connect_retry_interval_secs)
    }
}

/// Outbound client settings for the external launch registry.
#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    pub endpoint: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    #[serde(default = "default_idle_timeout")]
    pub pool_idle_timeout_secs: u64,
    #[serde(default = "default_keepalive")]
    pub tcp_keepalive_secs: u64,
}

fn default_request_timeout() -> u64 { 15 }
fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }
fn default_max_lifetime() -> u64 { 1800 }
fn default_connect_retries() -> u32 { 5 }
fn default_retry_interval() -> u64 { 2 }
fn default_true() -> bool { true }
fn default_http_timeout() -> u64 { 10 }
fn default_connect_timeout() -> u64 { 5 }
fn default_max_idle_per_host() -> usize { 10 }
fn default_idle_timeout() -> u64 { 90 }
fn default_keepalive() -> u64 { 30 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. SPACETIX__DATABASE__URL=postgres://...
            .add_source(config::Environment::with_prefix("SPACETIX").separator("__"))
            .build()?;

        let cfg: Self = s.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(config::ConfigError::Message("database.url must be set".to_string()));
        }
        if self.database.connect_retries == 0 {
            return Err(config::ConfigError::Message(
                "database.connect_retries must be at least 1".to_string(),
            ));
        }
        if self.server.request_timeout_secs <= self.registry.timeout_secs {
            return Err(config::ConfigError::Message(
                "server.request_timeout_secs must exceed registry.timeout_secs".to_string(),
            ));
        }
        if self.registry.endpoint.trim().is_empty() {
            return Err(config::ConfigError::Message("registry.endpoint must be set".to_string()));
        }
        Ok(())
    }
}

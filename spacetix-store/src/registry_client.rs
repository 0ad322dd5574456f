use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use spacetix_core::{LaunchRegistry, RegistryError};

use crate::app_config::RegistryConfig;

const LAUNCH_QUERY_PATH: &str = "/v4/launches/query";

#[derive(Debug, Serialize)]
struct LaunchQueryRequest<'a> {
    query: LaunchQuery<'a>,
    options: QueryOptions,
}

#[derive(Debug, Serialize)]
struct LaunchQuery<'a> {
    launchpad: &'a str,
    date_utc: DateRange,
}

#[derive(Debug, Serialize)]
struct DateRange {
    #[serde(rename = "$gte")]
    gte: DateTime<Utc>,
    #[serde(rename = "$lt")]
    lt: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct QueryOptions {
    pagination: bool,
    // 0 asks for the totals only, no page of documents
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct LaunchQueryResponse {
    #[serde(rename = "totalDocs")]
    total_docs: u64,
}

/// Launch registry backed by the SpaceX v4 query API.
#[derive(Clone)]
pub struct HttpLaunchRegistry {
    client: Client,
    query_url: String,
}

impl HttpLaunchRegistry {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            query_url: format!("{}{}", endpoint.trim_end_matches('/'), LAUNCH_QUERY_PATH),
        }
    }

    pub fn from_config(cfg: &RegistryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .pool_max_idle_per_host(cfg.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(cfg.pool_idle_timeout_secs))
            .tcp_keepalive(Duration::from_secs(cfg.tcp_keepalive_secs))
            .build()?;

        Ok(Self::new(client, &cfg.endpoint))
    }
}

#[async_trait]
impl LaunchRegistry for HttpLaunchRegistry {
    async fn count_launches(
        &self,
        registry_pad_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<u64, RegistryError> {
        let payload = LaunchQueryRequest {
            query: LaunchQuery {
                launchpad: registry_pad_id,
                date_utc: DateRange { gte: day_start, lt: day_end },
            },
            options: QueryOptions { pagination: true, limit: 0 },
        };

        debug!("Querying launch registry at {} for pad {}", self.query_url, registry_pad_id);
        let response = self
            .client
            .post(&self.query_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        let body: LaunchQueryResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;

        debug!("Launch registry reported {} launch(es)", body.total_docs);
        Ok(body.total_docs)
    }
}

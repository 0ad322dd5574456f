use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Launch registry unreachable: {0}")]
    Transport(String),
    #[error("Launch registry answered with status {0}")]
    Status(u16),
    #[error("Launch registry response could not be decoded: {0}")]
    Decode(String),
}

/// Third-party record of real launches.
#[async_trait]
pub trait LaunchRegistry: Send + Sync {
    /// Number of launches from `registry_pad_id` in `[day_start, day_end)`.
    async fn count_launches(
        &self,
        registry_pad_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<u64, RegistryError>;
}

/// Registry that always answers the same thing. Used for local runs and tests.
#[derive(Debug, Clone)]
pub struct StaticLaunchRegistry {
    launches: u64,
    fail: bool,
}

impl StaticLaunchRegistry {
    pub fn with_launches(launches: u64) -> Self {
        Self { launches, fail: false }
    }

    pub fn empty() -> Self {
        Self::with_launches(0)
    }

    pub fn unavailable() -> Self {
        Self { launches: 0, fail: true }
    }
}

#[async_trait]
impl LaunchRegistry for StaticLaunchRegistry {
    async fn count_launches(
        &self,
        registry_pad_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<u64, RegistryError> {
        tracing::debug!(
            "Static registry queried for pad {} between {} and {}",
            registry_pad_id,
            day_start,
            day_end
        );

        if self.fail {
            return Err(RegistryError::Transport("static registry configured to fail".to_string()));
        }
        Ok(self.launches)
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, LaunchPad, NewBooking};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence port for bookings and the reference data used to validate them.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// All bookings that are not soft-deleted, oldest first.
    async fn list_active(&self) -> StoreResult<Vec<Booking>>;

    /// Fails with `NotFound` when the booking is absent or soft-deleted.
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Booking>;

    /// Stores the candidate, assigning id and timestamps.
    async fn insert(&self, candidate: NewBooking) -> StoreResult<Booking>;

    /// Marks a booking deleted. Returns the number of rows changed, which is 0
    /// for unknown or already deleted ids.
    async fn soft_delete(&self, id: Uuid) -> StoreResult<u64>;

    async fn get_launch_pad(&self, id: &str) -> StoreResult<LaunchPad>;

    async fn has_schedule_entry(
        &self,
        launch_pad_id: &str,
        destination_id: &str,
        weekday: &str,
    ) -> StoreResult<bool>;
}

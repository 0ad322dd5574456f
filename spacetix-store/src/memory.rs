use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use spacetix_core::{Booking, BookingRepository, LaunchPad, NewBooking, StoreError, StoreResult};

/// Process-local repository for development and tests.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
    launch_pads: RwLock<HashMap<String, LaunchPad>>,
    // (launch pad id, destination id, weekday)
    schedule: RwLock<HashSet<(String, String, String)>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_launch_pad(&self, pad: LaunchPad) {
        self.launch_pads.write().await.insert(pad.id.clone(), pad);
    }

    pub async fn add_schedule_entry(&self, launch_pad_id: &str, destination_id: &str, weekday: &str) {
        self.schedule.write().await.insert((
            launch_pad_id.to_string(),
            destination_id.to_string(),
            weekday.to_string(),
        ));
    }

    /// Every stored booking, soft-deleted ones included.
    pub async fn all_rows(&self) -> Vec<Booking> {
        self.bookings.read().await.clone()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn list_active(&self) -> StoreResult<Vec<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| !b.deleted)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Booking> {
        self.bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == id && !b.deleted)
            .cloned()
            .ok_or_else(|| StoreError::not_found("booking", id.to_string()))
    }

    async fn insert(&self, candidate: NewBooking) -> StoreResult<Booking> {
        let booking = Booking::from_candidate(Uuid::new_v4(), candidate, Utc::now());
        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn soft_delete(&self, id: Uuid) -> StoreResult<u64> {
        let mut bookings = self.bookings.write().await;
        match bookings.iter_mut().find(|b| b.id == id && !b.deleted) {
            Some(booking) => {
                booking.deleted = true;
                booking.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_launch_pad(&self, id: &str) -> StoreResult<LaunchPad> {
        self.launch_pads
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("launch pad", id))
    }

    async fn has_schedule_entry(
        &self,
        launch_pad_id: &str,
        destination_id: &str,
        weekday: &str,
    ) -> StoreResult<bool> {
        let key = (
            launch_pad_id.to_string(),
            destination_id.to_string(),
            weekday.to_string(),
        );
        Ok(self.schedule.read().await.contains(&key))
    }
}

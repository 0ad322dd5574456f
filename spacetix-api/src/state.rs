use std::sync::Arc;
use spacetix_booking::BookingPipeline;
use spacetix_core::{BookingRepository, LaunchRegistry};

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<dyn BookingRepository>,
    pub pipeline: BookingPipeline,
}

impl AppState {
    pub fn new(bookings: Arc<dyn BookingRepository>, registry: Arc<dyn LaunchRegistry>) -> Self {
        let pipeline = BookingPipeline::new(bookings.clone(), registry);
        Self { bookings, pipeline }
    }
}

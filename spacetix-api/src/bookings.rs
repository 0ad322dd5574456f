use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use spacetix_booking::BookingOutcome;
use spacetix_core::{utc_day_window, Booking, Customer, NewBooking, StoreError};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /api/v1/booking`. Dates are `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birthday: NaiveDate,
    pub launch_pad_id: String,
    pub destination_id: String,
    pub launch_date: NaiveDate,
}

impl CreateBookingRequest {
    pub fn into_candidate(self) -> Result<NewBooking, AppError> {
        if self.launch_pad_id.trim().is_empty() {
            return Err(AppError::ValidationError("launch_pad_id must not be empty".to_string()));
        }
        if self.destination_id.trim().is_empty() {
            return Err(AppError::ValidationError("destination_id must not be empty".to_string()));
        }
        if utc_day_window(self.launch_date).is_none() {
            return Err(AppError::ValidationError(format!(
                "launch_date {} is out of range",
                self.launch_date
            )));
        }

        Ok(NewBooking {
            customer: Customer {
                first_name: self.first_name,
                last_name: self.last_name,
                gender: self.gender,
                birthday: self.birthday,
            },
            launch_pad_id: self.launch_pad_id,
            destination_id: self.destination_id,
            launch_date: self.launch_date,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BookingResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birthday: NaiveDate,
    pub launch_pad_id: String,
    pub destination_id: String,
    pub launch_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            first_name: booking.customer.first_name,
            last_name: booking.customer.last_name,
            gender: booking.customer.gender,
            birthday: booking.customer.birthday,
            launch_pad_id: booking.launch_pad_id,
            destination_id: booking.destination_id,
            launch_date: booking.launch_date,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn json(status: impl Into<String>) -> Json<Self> {
        Json(Self { status: status.into() })
    }
}

pub const RECORD_DELETED: &str = "Record deleted";
pub const ID_NOT_RECOGNISED: &str = "ID not recognised";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/bookings", get(list_bookings))
        .route("/api/v1/booking", post(create_booking))
        .route("/api/v1/booking/{id}", get(get_booking).delete(delete_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/bookings
async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.bookings.list_active().await?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// GET /api/v1/booking/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let not_found = || AppError::NotFoundError(format!("Booking {} not found", id));
    let booking_id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    match state.bookings.get_by_id(booking_id).await {
        Ok(booking) => Ok(Json(booking.into())),
        Err(StoreError::NotFound { .. }) => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/v1/booking
///
/// Rejections are normal answers: 200 with a status message.
async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;
    let candidate = req.into_candidate()?;

    match state.pipeline.propose(candidate).await? {
        BookingOutcome::Accepted(booking) => Ok(Json(BookingResponse::from(booking)).into_response()),
        BookingOutcome::Rejected(reason) => {
            Ok(StatusResponse::json(format!("Flight cancelled, {}", reason)).into_response())
        }
    }
}

/// DELETE /api/v1/booking/{id}
async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let Ok(booking_id) = Uuid::parse_str(&id) else {
        info!("Delete requested for malformed booking id {}", id);
        return Ok(StatusResponse::json(ID_NOT_RECOGNISED));
    };

    let affected = state.bookings.soft_delete(booking_id).await?;

    if affected == 0 {
        return Ok(StatusResponse::json(ID_NOT_RECOGNISED));
    }

    info!("Booking deleted: {}", booking_id);
    Ok(StatusResponse::json(RECORD_DELETED))
}

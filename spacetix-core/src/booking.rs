use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Passenger details carried inside a booking. Has no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birthday: NaiveDate,
}

/// A booking candidate that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    #[serde(flatten)]
    pub customer: Customer,
    pub launch_pad_id: String,
    pub destination_id: String,
    pub launch_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    #[serde(flatten)]
    pub customer: Customer,
    pub launch_pad_id: String,
    pub destination_id: String,
    pub launch_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted: bool,
}

impl Booking {
    /// Builds the stored row for a candidate. Storage adapters call this with
    /// the id and timestamp they assign.
    pub fn from_candidate(id: Uuid, candidate: NewBooking, now: DateTime<Utc>) -> Self {
        Self {
            id,
            customer: candidate.customer,
            launch_pad_id: candidate.launch_pad_id,
            destination_id: candidate.destination_id,
            launch_date: candidate.launch_date,
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }
}

/// Launch site reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPad {
    pub id: String,
    pub full_name: String,
    /// Identifier of this pad in the external launch registry
    pub registry_pad_id: String,
}

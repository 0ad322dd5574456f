use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use spacetix_core::{Booking, BookingRepository, Customer, LaunchPad, NewBooking, StoreError, StoreResult};

const BOOKING_COLUMNS: &str = "id, first_name, last_name, gender, birthday, launchpad_id, \
     destination_id, launch_date, created_at, updated_at, deleted";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    gender: String,
    birthday: NaiveDate,
    launchpad_id: String,
    destination_id: String,
    launch_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted: bool,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            customer: Customer {
                first_name: row.first_name,
                last_name: row.last_name,
                gender: row.gender,
                birthday: row.birthday,
            },
            launch_pad_id: row.launchpad_id,
            destination_id: row.destination_id,
            launch_date: row.launch_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted: row.deleted,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LaunchPadRow {
    id: String,
    full_name: String,
    registry_pad_id: String,
}

fn backend(context: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| StoreError::Backend(format!("{}: {}", context, e))
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn list_active(&self) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE deleted = false ORDER BY created_at",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend("error querying bookings"))?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Booking> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 AND deleted = false",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("error querying booking"))?
        .map(Booking::from)
        .ok_or_else(|| StoreError::not_found("booking", id.to_string()))
    }

    async fn insert(&self, candidate: NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (first_name, last_name, gender, birthday, launchpad_id, destination_id, launch_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(&candidate.customer.first_name)
        .bind(&candidate.customer.last_name)
        .bind(&candidate.customer.gender)
        .bind(candidate.customer.birthday)
        .bind(&candidate.launch_pad_id)
        .bind(&candidate.destination_id)
        .bind(candidate.launch_date)
        .fetch_one(&self.pool)
        .await
        .map_err(backend("error creating booking"))?;

        Ok(row.into())
    }

    async fn soft_delete(&self, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE bookings SET deleted = true, updated_at = NOW() WHERE id = $1 AND deleted = false",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(backend("could not mark booking as deleted"))?;

        tracing::info!("Number of rows updated: {}", result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn get_launch_pad(&self, id: &str) -> StoreResult<LaunchPad> {
        let row = sqlx::query_as::<_, LaunchPadRow>(
            "SELECT id, full_name, registry_pad_id FROM launchpads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("error querying launch pad"))?
        .ok_or_else(|| StoreError::not_found("launch pad", id))?;

        Ok(LaunchPad {
            id: row.id,
            full_name: row.full_name,
            registry_pad_id: row.registry_pad_id,
        })
    }

    async fn has_schedule_entry(
        &self,
        launch_pad_id: &str,
        destination_id: &str,
        weekday: &str,
    ) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM launch_schedules
                WHERE launchpad_id = $1 AND destination_id = $2 AND day_of_week = $3
            )
            "#,
        )
        .bind(launch_pad_id)
        .bind(destination_id)
        .bind(weekday)
        .fetch_one(&self.pool)
        .await
        .map_err(backend("error querying launch schedule"))
    }
}

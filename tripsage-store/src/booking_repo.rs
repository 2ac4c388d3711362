use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use tripsage_core::booking::{Booking, BookingDetails, BookingStatus, BookingType};
use tripsage_core::repository::BookingRepository;
use tripsage_core::RepoError;

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
    user_id: Uuid,
    booking_type: String,
    status: String,
    total_price: f64,
    details: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let booking_type = BookingType::parse(&row.booking_type).ok_or_else(|| {
            RepoError::Backend(anyhow!("unknown booking type '{}'", row.booking_type))
        })?;
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| RepoError::Backend(anyhow!("unknown booking status '{}'", row.status)))?;
        let details: BookingDetails = serde_json::from_value(row.details)
            .map_err(|e| RepoError::Backend(anyhow!("malformed booking details: {}", e)))?;

        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            booking_type,
            status,
            total_price: row.total_price,
            details,
            created_at: row.created_at,
        })
    }
}

fn backend(err: sqlx::Error) -> RepoError {
    RepoError::Backend(err.into())
}

const BOOKING_COLUMNS: &str = "id, user_id, booking_type, status, total_price, details, created_at";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), RepoError> {
        let details = serde_json::to_value(&booking.details)
            .map_err(|e| RepoError::Backend(anyhow!("failed to encode details: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, booking_type, status, total_price, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.booking_type.as_str())
        .bind(booking.status.as_str())
        .bind(booking.total_price)
        .bind(details)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Booking::try_from).transpose()
    }

    async fn cancel(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        // Status guard in the WHERE clause; zero rows means the booking
        // was already terminal (or raced with another cancel).
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = 'cancelled'
            WHERE id = $1 AND status IN ('pending', 'confirmed')
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

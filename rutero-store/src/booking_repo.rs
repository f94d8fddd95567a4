use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rutero_booking::models::{
    Booking, BookingFilter, BookingKey, BookingUpdate, CancellationRecord,
};
use rutero_booking::repository::{BookingStore, CancellationStore};
use rutero_booking::status::BookingStatus;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Booking records in Postgres, keyed by (id, bus_route_id).
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    user_id: String,
    bus_id: String,
    bus_route_id: String,
    status: String,
    seat_number: String,
    travel_date: String,
    date_created: Option<DateTime<Utc>>,
    date_confirmed: Option<DateTime<Utc>>,
    is_cancelled: Option<bool>,
    request_timestamp: String,
    version: i64,
}

impl BookingRow {
    fn into_domain(self) -> Result<Booking, BoxError> {
        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            bus_id: self.bus_id,
            bus_route_id: self.bus_route_id,
            status: BookingStatus::parse(&self.status)?,
            seat_number: self.seat_number,
            travel_date: self.travel_date,
            date_created: self.date_created,
            date_confirmed: self.date_confirmed,
            is_cancelled: self.is_cancelled,
            // Cancellation details live on the audit record, not the row.
            cancelled: None,
            timestamp: self.request_timestamp,
            version: self.version,
        })
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn put(&self, booking: &Booking) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, bus_id, bus_route_id, status, seat_number, travel_date, date_created, date_confirmed, is_cancelled, request_timestamp, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id, bus_route_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                bus_id = EXCLUDED.bus_id,
                status = EXCLUDED.status,
                seat_number = EXCLUDED.seat_number,
                travel_date = EXCLUDED.travel_date,
                date_confirmed = EXCLUDED.date_confirmed,
                is_cancelled = EXCLUDED.is_cancelled,
                request_timestamp = EXCLUDED.request_timestamp,
                version = EXCLUDED.version
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.user_id)
        .bind(&booking.bus_id)
        .bind(&booking.bus_route_id)
        .bind(booking.status.as_str())
        .bind(&booking.seat_number)
        .bind(&booking.travel_date)
        .bind(booking.date_created)
        .bind(booking.date_confirmed)
        .bind(booking.is_cancelled)
        .bind(&booking.timestamp)
        .bind(booking.version)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &BookingKey) -> Result<Option<Booking>, BoxError> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, bus_id, bus_route_id, status, seat_number, travel_date, date_created, date_confirmed, is_cancelled, request_timestamp, version
            FROM bookings
            WHERE id = $1 AND bus_route_id = $2
            "#,
        )
        .bind(&key.id)
        .bind(&key.bus_route_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BookingRow::into_domain).transpose()
    }

    async fn update(&self, key: &BookingKey, update: &BookingUpdate) -> Result<Booking, BoxError> {
        // A two-level date_confirmed distinguishes "leave as is" from
        // "clear the stamp". $5 carries which of the two was meant.
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            UPDATE bookings SET
                status = COALESCE($3, status),
                seat_number = COALESCE($4, seat_number),
                date_confirmed = CASE WHEN $5 THEN $6 ELSE date_confirmed END,
                is_cancelled = COALESCE($7, is_cancelled),
                version = version + 1
            WHERE id = $1 AND bus_route_id = $2
            RETURNING id, user_id, bus_id, bus_route_id, status, seat_number, travel_date, date_created, date_confirmed, is_cancelled, request_timestamp, version
            "#,
        )
        .bind(&key.id)
        .bind(&key.bus_route_id)
        .bind(update.status.map(|status| status.as_str()))
        .bind(update.seat_number.as_deref())
        .bind(update.date_confirmed.is_some())
        .bind(update.date_confirmed.flatten())
        .bind(update.is_cancelled)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or("booking record not found")?.into_domain()
    }

    async fn filter(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BoxError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, bus_id, bus_route_id, status, seat_number, travel_date, date_created, date_confirmed, is_cancelled, request_timestamp, version
            FROM bookings
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR bus_id = $2)
              AND ($3::TEXT IS NULL OR bus_route_id = $3)
            ORDER BY date_created
            "#,
        )
        .bind(filter.status.as_deref())
        .bind(filter.bus_id.as_deref())
        .bind(filter.bus_route_id.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRow::into_domain).collect()
    }
}

/// Cancellation audit records in Postgres. The UNIQUE constraint on
/// booking_id is what makes the conditional write settle duplicates.
pub struct PgCancellationStore {
    pool: PgPool,
}

impl PgCancellationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CancellationRow {
    id: String,
    booking_id: String,
    reason: String,
    cancelled_by: String,
    date_cancelled: DateTime<Utc>,
}

impl CancellationRow {
    fn into_domain(self) -> CancellationRecord {
        CancellationRecord {
            id: self.id,
            booking_id: self.booking_id,
            reason: self.reason,
            cancelled_by: self.cancelled_by,
            date_cancelled: self.date_cancelled,
        }
    }
}

#[async_trait]
impl CancellationStore for PgCancellationStore {
    async fn exists(&self, booking_id: &str) -> Result<bool, BoxError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM booking_cancellations WHERE booking_id = $1)",
        )
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn create_if_absent(&self, record: &CancellationRecord) -> Result<bool, BoxError> {
        let result = sqlx::query(
            r#"
            INSERT INTO booking_cancellations (id, booking_id, reason, cancelled_by, date_cancelled)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (booking_id) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.booking_id)
        .bind(&record.reason)
        .bind(&record.cancelled_by)
        .bind(record.date_cancelled)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn for_booking(&self, booking_id: &str) -> Result<Vec<CancellationRecord>, BoxError> {
        let rows: Vec<CancellationRow> = sqlx::query_as(
            r#"
            SELECT id, booking_id, reason, cancelled_by, date_cancelled
            FROM booking_cancellations
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CancellationRow::into_domain).collect())
    }
}

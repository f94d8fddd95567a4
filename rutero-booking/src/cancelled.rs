use std::sync::Arc;

use chrono::Utc;
use rutero_accounts::{is_staff_actor, UserStore};
use rutero_catalog::{RouteKey, RouteStore};
use rutero_core::{identity, Mailer};
use tracing::info;

use crate::error::BookingError;
use crate::models::{Booking, BookingKey, BookingUpdate, CancellationRecord};
use crate::notice;
use crate::repository::{BookingStore, CancellationStore};

/// Applies a `booking:cancelled` announcement: moves the stored record
/// into its terminal state, writes the audit record and notifies the
/// passenger.
///
/// Deliveries arrive at least once. The record update sets the same
/// fields every time, and the audit write is conditional on no record
/// existing for the booking, so replays converge on a single audit row.
pub struct CancellationHandler {
    bookings: Arc<dyn BookingStore>,
    cancellations: Arc<dyn CancellationStore>,
    users: Arc<dyn UserStore>,
    routes: Arc<dyn RouteStore>,
    mailer: Arc<dyn Mailer>,
    customer_support: String,
}

impl CancellationHandler {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        cancellations: Arc<dyn CancellationStore>,
        users: Arc<dyn UserStore>,
        routes: Arc<dyn RouteStore>,
        mailer: Arc<dyn Mailer>,
        customer_support: String,
    ) -> Self {
        Self {
            bookings,
            cancellations,
            users,
            routes,
            mailer,
            customer_support,
        }
    }

    pub async fn process(&self, detail: &str) -> Result<(), BookingError> {
        let booking: Booking = serde_json::from_str(detail)
            .map_err(|err| BookingError::MalformedPayload(err.to_string()))?;

        // 1. Apply the terminal state and clear any confirmation stamp a
        // CONFIRMED transition may have left behind.
        let key = BookingKey {
            id: booking.id.clone(),
            bus_route_id: booking.bus_route_id.clone(),
        };
        self.bookings
            .update(
                &key,
                &BookingUpdate {
                    status: Some(booking.status),
                    seat_number: None,
                    date_confirmed: Some(None),
                    is_cancelled: Some(true),
                },
            )
            .await?;

        // 2. Write the audit record at most once per booking. The
        // existence check skips the work on a straight replay; the
        // conditional write settles a concurrent duplicate.
        let detail_fields = booking.cancelled.clone().unwrap_or_default();
        if !self.cancellations.exists(&booking.id).await? {
            let record = CancellationRecord {
                id: identity::record_id(),
                booking_id: booking.id.clone(),
                reason: detail_fields.reason.clone(),
                cancelled_by: detail_fields.cancelled_by.clone(),
                date_cancelled: Utc::now(),
            };
            if !self.cancellations.create_if_absent(&record).await? {
                info!(id = %booking.id, "audit record already written, skipping");
            }
        }

        // 3. Fetch the passenger and the trip the notice describes. An
        // absent record fails the delivery for the bus to retry.
        let user = self
            .users
            .get_by_id(&booking.user_id)
            .await?
            .ok_or_else(|| BookingError::UnknownUser(booking.user_id.clone()))?;
        let route = self
            .routes
            .get(&RouteKey {
                id: booking.bus_route_id.clone(),
                bus_id: booking.bus_id.clone(),
            })
            .await?
            .ok_or_else(|| BookingError::UnknownRoute(booking.bus_route_id.clone()))?;

        // 4. The wording depends on who asked: a staff actor means the
        // operator called the trip off, anyone else asked for it.
        let subject = format!(
            "CANCELLED BOOKING: {} to {} [{}]",
            route.from_route, route.to_route, booking.travel_date
        );
        let body = if is_staff_actor(&detail_fields.cancelled_by) {
            notice::cancelled_by_staff(&user, &route, &booking, &self.customer_support)
        } else {
            notice::cancelled_by_customer(&user, &route, &booking, &self.customer_support)
        };
        self.mailer.send(&user.email, &subject, &body).await?;

        info!(id = %booking.id, cancelled_by = %detail_fields.cancelled_by, "cancelled booking");

        Ok(())
    }
}

use std::sync::Arc;

use chrono::Utc;
use rutero_accounts::UserStore;
use rutero_catalog::{RouteKey, RouteStore};
use rutero_core::Mailer;
use tracing::info;

use crate::error::BookingError;
use crate::models::{Booking, BookingKey, BookingUpdate};
use crate::notice;
use crate::repository::BookingStore;

/// Applies a `booking:confirmed` announcement: stamps the stored record
/// and mails the passenger their schedule.
///
/// Deliveries arrive at least once. The record update sets the same
/// fields every time, so a redelivery converges instead of corrupting.
pub struct ConfirmationHandler {
    bookings: Arc<dyn BookingStore>,
    users: Arc<dyn UserStore>,
    routes: Arc<dyn RouteStore>,
    mailer: Arc<dyn Mailer>,
    customer_support: String,
}

impl ConfirmationHandler {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        users: Arc<dyn UserStore>,
        routes: Arc<dyn RouteStore>,
        mailer: Arc<dyn Mailer>,
        customer_support: String,
    ) -> Self {
        Self {
            bookings,
            users,
            routes,
            mailer,
            customer_support,
        }
    }

    pub async fn process(&self, detail: &str) -> Result<(), BookingError> {
        let mut booking: Booking = serde_json::from_str(detail)
            .map_err(|err| BookingError::MalformedPayload(err.to_string()))?;

        // 1. Stamp the confirmation and apply the announced fields.
        booking.date_confirmed = Some(Utc::now());
        let key = BookingKey {
            id: booking.id.clone(),
            bus_route_id: booking.bus_route_id.clone(),
        };
        self.bookings
            .update(
                &key,
                &BookingUpdate {
                    status: Some(booking.status),
                    seat_number: Some(booking.seat_number.clone()),
                    date_confirmed: Some(booking.date_confirmed),
                    is_cancelled: None,
                },
            )
            .await?;

        // 2. Fetch the passenger and the trip the notice describes. An
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

        // 3. Mail the schedule.
        let subject = format!(
            "BOOKING SCHEDULE: {} to {} [{}]",
            route.from_route, route.to_route, booking.travel_date
        );
        let body = notice::confirmed(&user, &route, &booking, &self.customer_support);
        self.mailer.send(&user.email, &subject, &body).await?;

        info!(id = %booking.id, "confirmed booking");

        Ok(())
    }
}

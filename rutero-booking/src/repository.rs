use async_trait::async_trait;

use crate::models::{Booking, BookingFilter, BookingKey, BookingUpdate, CancellationRecord};

/// Store trait for booking record access, keyed by (id, bus_route_id).
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn put(&self, booking: &Booking) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        key: &BookingKey,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Applies the carried fields onto the stored record and returns the
    /// result. Repeating the same update is harmless.
    async fn update(
        &self,
        key: &BookingKey,
        update: &BookingUpdate,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>>;

    async fn filter(
        &self,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Store trait for cancellation audit records, keyed by booking id.
#[async_trait]
pub trait CancellationStore: Send + Sync {
    async fn exists(
        &self,
        booking_id: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Writes the audit record unless one already exists for the booking,
    /// returning whether a row was written. Concurrent duplicates collapse
    /// to a single row.
    async fn create_if_absent(
        &self,
        record: &CancellationRecord,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn for_booking(
        &self,
        booking_id: &str,
    ) -> Result<Vec<CancellationRecord>, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use rutero_accounts::{User, UserStore};
    use rutero_catalog::{BusRoute, RouteFilter, RouteKey, RouteStore};
    use rutero_core::{DeliveryQueue, EventBus, Mailer};
    use rutero_shared::{EventEnvelope, QueuedMessage};

    use super::*;

    type BoxError = Box<dyn std::error::Error + Send + Sync>;

    #[derive(Default)]
    pub struct FakeBookingStore {
        rows: Mutex<Vec<Booking>>,
    }

    impl FakeBookingStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(booking: Booking) -> Self {
            Self {
                rows: Mutex::new(vec![booking]),
            }
        }

        pub fn rows(&self) -> Vec<Booking> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BookingStore for FakeBookingStore {
        async fn put(&self, booking: &Booking) -> Result<(), BoxError> {
            let mut rows = self.rows.lock().unwrap();
            rows.retain(|row| !(row.id == booking.id && row.bus_route_id == booking.bus_route_id));
            rows.push(booking.clone());
            Ok(())
        }

        async fn get(&self, key: &BookingKey) -> Result<Option<Booking>, BoxError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|row| row.id == key.id && row.bus_route_id == key.bus_route_id)
                .cloned())
        }

        async fn update(&self, key: &BookingKey, update: &BookingUpdate) -> Result<Booking, BoxError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|row| row.id == key.id && row.bus_route_id == key.bus_route_id)
                .ok_or("booking record not found")?;

            if let Some(status) = update.status {
                row.status = status;
            }
            if let Some(seat_number) = &update.seat_number {
                row.seat_number = seat_number.clone();
            }
            if let Some(date_confirmed) = update.date_confirmed {
                row.date_confirmed = date_confirmed;
            }
            if let Some(is_cancelled) = update.is_cancelled {
                row.is_cancelled = Some(is_cancelled);
            }
            row.version += 1;

            Ok(row.clone())
        }

        async fn filter(&self, filter: &BookingFilter) -> Result<Vec<Booking>, BoxError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|row| {
                    filter
                        .status
                        .as_deref()
                        .map_or(true, |status| row.status.as_str() == status)
                        && filter
                            .bus_id
                            .as_deref()
                            .map_or(true, |bus_id| row.bus_id == bus_id)
                        && filter
                            .bus_route_id
                            .as_deref()
                            .map_or(true, |route_id| row.bus_route_id == route_id)
                })
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct FakeCancellationStore {
        rows: Mutex<Vec<CancellationRecord>>,
    }

    impl FakeCancellationStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rows(&self) -> Vec<CancellationRecord> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CancellationStore for FakeCancellationStore {
        async fn exists(&self, booking_id: &str) -> Result<bool, BoxError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().any(|row| row.booking_id == booking_id))
        }

        async fn create_if_absent(&self, record: &CancellationRecord) -> Result<bool, BoxError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|row| row.booking_id == record.booking_id) {
                return Ok(false);
            }
            rows.push(record.clone());
            Ok(true)
        }

        async fn for_booking(&self, booking_id: &str) -> Result<Vec<CancellationRecord>, BoxError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|row| row.booking_id == booking_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct RecordingQueue {
        messages: Mutex<Vec<QueuedMessage>>,
    }

    impl RecordingQueue {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn messages(&self) -> Vec<QueuedMessage> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeliveryQueue for RecordingQueue {
        async fn enqueue(&self, message: QueuedMessage) -> Result<(), BoxError> {
            self.messages.lock().unwrap().push(message);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingBus {
        events: Mutex<Vec<EventEnvelope>>,
    }

    impl RecordingBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn published(&self) -> Vec<EventEnvelope> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventBus for RecordingBus {
        async fn publish(&self, event: EventEnvelope) -> Result<(), BoxError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    /// Records sends, or refuses them all when built with `failing()`.
    pub struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
        failing: bool,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing: true,
            }
        }

        pub fn sent(&self) -> Vec<(String, String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), BoxError> {
            if self.failing {
                return Err("smtp connection refused".into());
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), html_body.to_string()));
            Ok(())
        }
    }

    pub struct FakeUserStore {
        users: Mutex<Vec<User>>,
    }

    impl FakeUserStore {
        pub fn with(user: User) -> Self {
            Self {
                users: Mutex::new(vec![user]),
            }
        }

        pub fn empty() -> Self {
            Self {
                users: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn put(&self, user: &User) -> Result<(), BoxError> {
            self.users.lock().unwrap().push(user.clone());
            Ok(())
        }

        async fn get(&self, id: &str, username: &str) -> Result<Option<User>, BoxError> {
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|user| user.id == id && user.username == username)
                .cloned())
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<User>, BoxError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|user| user.id == id).cloned())
        }

        async fn username_taken(&self, username: &str) -> Result<bool, BoxError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().any(|user| user.username == username))
        }

        async fn with_credentials(
            &self,
            username: &str,
            password: &str,
        ) -> Result<Option<User>, BoxError> {
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|user| user.username == username && user.password.inner() == password)
                .cloned())
        }

        async fn record_login(
            &self,
            id: &str,
            username: &str,
            last_login: &str,
        ) -> Result<(), BoxError> {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users
                .iter_mut()
                .find(|user| user.id == id && user.username == username)
            {
                user.last_login = last_login.to_string();
            }
            Ok(())
        }
    }

    pub struct FakeRouteStore {
        routes: Mutex<Vec<BusRoute>>,
    }

    impl FakeRouteStore {
        pub fn with(route: BusRoute) -> Self {
            Self {
                routes: Mutex::new(vec![route]),
            }
        }
    }

    #[async_trait]
    impl RouteStore for FakeRouteStore {
        async fn put(&self, route: &BusRoute) -> Result<(), BoxError> {
            self.routes.lock().unwrap().push(route.clone());
            Ok(())
        }

        async fn get(&self, key: &RouteKey) -> Result<Option<BusRoute>, BoxError> {
            let routes = self.routes.lock().unwrap();
            Ok(routes
                .iter()
                .find(|route| route.id == key.id && route.bus_id == key.bus_id)
                .cloned())
        }

        async fn exists_matching(&self, _filter: &RouteFilter) -> Result<bool, BoxError> {
            Ok(false)
        }

        async fn filter(&self, _filter: &RouteFilter) -> Result<Vec<BusRoute>, BoxError> {
            Ok(Vec::new())
        }
    }
}

//! In-memory implementations of every port, for integration tests and
//! local development without Kafka, Postgres, or an SMTP relay.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use rutero_accounts::repository::UserStore;
use rutero_accounts::User;
use rutero_booking::models::{
    Booking, BookingFilter, BookingKey, BookingUpdate, CancellationRecord,
};
use rutero_booking::repository::{BookingStore, CancellationStore};
use rutero_catalog::line::{BusLine, LineFilter};
use rutero_catalog::repository::{LineStore, RouteStore, UnitStore};
use rutero_catalog::route::{BusRoute, RouteFilter, RouteKey};
use rutero_catalog::unit::{BusUnit, UnitFilter};
use rutero_core::{DeliveryQueue, EventBus, Mailer};
use rutero_shared::{EventEnvelope, QueuedMessage};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Delivery queue backed by a Vec. Messages whose dedup token was already
/// seen collapse silently, the way the external queue collapses repeats
/// of the same payload.
#[derive(Default)]
pub struct MemoryQueue {
    seen: RwLock<HashSet<String>>,
    messages: RwLock<Vec<QueuedMessage>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every pending message, oldest first.
    pub fn drain(&self) -> Vec<QueuedMessage> {
        self.messages.write().unwrap().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DeliveryQueue for MemoryQueue {
    async fn enqueue(&self, message: QueuedMessage) -> Result<(), BoxError> {
        if !self.seen.write().unwrap().insert(message.dedup_token.clone()) {
            return Ok(());
        }
        self.messages.write().unwrap().push(message);
        Ok(())
    }
}

/// Event bus backed by a Vec.
#[derive(Default)]
pub struct MemoryBus {
    events: RwLock<Vec<EventEnvelope>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every published event, oldest first.
    pub fn drain(&self) -> Vec<EventEnvelope> {
        self.events.write().unwrap().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventBus for MemoryBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), BoxError> {
        self.events.write().unwrap().push(event);
        Ok(())
    }
}

/// A notice captured by the in-memory mailer.
#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct MemoryMailer {
    sent: RwLock<Vec<OutboundMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), BoxError> {
        self.sent.write().unwrap().push(OutboundMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBookingStore {
    rows: RwLock<Vec<Booking>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Booking> {
        self.rows.read().unwrap().clone()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn put(&self, booking: &Booking) -> Result<(), BoxError> {
        let mut rows = self.rows.write().unwrap();
        rows.retain(|row| !(row.id == booking.id && row.bus_route_id == booking.bus_route_id));
        rows.push(booking.clone());
        Ok(())
    }

    async fn get(&self, key: &BookingKey) -> Result<Option<Booking>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.id == key.id && row.bus_route_id == key.bus_route_id)
            .cloned())
    }

    async fn update(&self, key: &BookingKey, update: &BookingUpdate) -> Result<Booking, BoxError> {
        let mut rows = self.rows.write().unwrap();
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
        let rows = self.rows.read().unwrap();
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
pub struct MemoryCancellationStore {
    rows: RwLock<Vec<CancellationRecord>>,
}

impl MemoryCancellationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<CancellationRecord> {
        self.rows.read().unwrap().clone()
    }
}

#[async_trait]
impl CancellationStore for MemoryCancellationStore {
    async fn exists(&self, booking_id: &str) -> Result<bool, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.iter().any(|row| row.booking_id == booking_id))
    }

    async fn create_if_absent(&self, record: &CancellationRecord) -> Result<bool, BoxError> {
        let mut rows = self.rows.write().unwrap();
        if rows.iter().any(|row| row.booking_id == record.booking_id) {
            return Ok(false);
        }
        rows.push(record.clone());
        Ok(true)
    }

    async fn for_booking(&self, booking_id: &str) -> Result<Vec<CancellationRecord>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.booking_id == booking_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryLineStore {
    rows: RwLock<Vec<BusLine>>,
}

impl MemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LineStore for MemoryLineStore {
    async fn put(&self, line: &BusLine) -> Result<(), BoxError> {
        let mut rows = self.rows.write().unwrap();
        rows.retain(|row| !(row.id == line.id && row.name == line.name));
        rows.push(line.clone());
        Ok(())
    }

    async fn get(&self, id: &str, name: &str) -> Result<Option<BusLine>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.id == id && row.name == name)
            .cloned())
    }

    async fn exists(&self, name: &str, company: &str) -> Result<bool, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .any(|row| row.name == name && row.company == company))
    }

    async fn filter(&self, filter: &LineFilter) -> Result<Vec<BusLine>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| {
                filter.name.as_deref().map_or(true, |name| row.name == name)
                    && filter
                        .company
                        .as_deref()
                        .map_or(true, |company| row.company == company)
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUnitStore {
    rows: RwLock<Vec<BusUnit>>,
}

impl MemoryUnitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitStore for MemoryUnitStore {
    async fn put(&self, unit: &BusUnit) -> Result<(), BoxError> {
        let mut rows = self.rows.write().unwrap();
        rows.retain(|row| !(row.code == unit.code && row.bus_id == unit.bus_id));
        rows.push(unit.clone());
        Ok(())
    }

    async fn get(&self, code: &str, bus_id: &str) -> Result<Option<BusUnit>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.code == code && row.bus_id == bus_id)
            .cloned())
    }

    async fn exists(&self, code: &str, bus_id: &str) -> Result<bool, BoxError> {
        Ok(self.get(code, bus_id).await?.is_some())
    }

    async fn filter(&self, filter: &UnitFilter) -> Result<Vec<BusUnit>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| {
                filter.code.as_deref().map_or(true, |code| row.code == code)
                    && filter
                        .bus_id
                        .as_deref()
                        .map_or(true, |bus_id| row.bus_id == bus_id)
                    && filter
                        .active
                        .map_or(true, |active| row.active == Some(active))
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryRouteStore {
    rows: RwLock<Vec<BusRoute>>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn route_matches(row: &BusRoute, filter: &RouteFilter) -> bool {
    filter.bus_id.as_deref().map_or(true, |v| row.bus_id == v)
        && filter
            .bus_unit_id
            .as_deref()
            .map_or(true, |v| row.bus_unit_id == v)
        && filter.active.map_or(true, |v| row.active == Some(v))
        && filter
            .departure_time
            .as_deref()
            .map_or(true, |v| row.departure_time == v)
        && filter
            .arrival_time
            .as_deref()
            .map_or(true, |v| row.arrival_time == v)
        && filter
            .from_route
            .as_deref()
            .map_or(true, |v| row.from_route == v)
        && filter.to_route.as_deref().map_or(true, |v| row.to_route == v)
}

#[async_trait]
impl RouteStore for MemoryRouteStore {
    async fn put(&self, route: &BusRoute) -> Result<(), BoxError> {
        let mut rows = self.rows.write().unwrap();
        rows.retain(|row| !(row.id == route.id && row.bus_id == route.bus_id));
        rows.push(route.clone());
        Ok(())
    }

    async fn get(&self, key: &RouteKey) -> Result<Option<BusRoute>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.id == key.id && row.bus_id == key.bus_id)
            .cloned())
    }

    async fn exists_matching(&self, filter: &RouteFilter) -> Result<bool, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.iter().any(|row| route_matches(row, filter)))
    }

    async fn filter(&self, filter: &RouteFilter) -> Result<Vec<BusRoute>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| route_matches(row, filter))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn put(&self, user: &User) -> Result<(), BoxError> {
        let mut rows = self.rows.write().unwrap();
        rows.retain(|row| row.id != user.id);
        rows.push(user.clone());
        Ok(())
    }

    async fn get(&self, id: &str, username: &str) -> Result<Option<User>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.id == id && row.username == username)
            .cloned())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn username_taken(&self, username: &str) -> Result<bool, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.iter().any(|row| row.username == username))
    }

    async fn with_credentials(&self, username: &str, password: &str) -> Result<Option<User>, BoxError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.username == username && row.password.inner() == password)
            .cloned())
    }

    async fn record_login(&self, id: &str, username: &str, last_login: &str) -> Result<(), BoxError> {
        let mut rows = self.rows.write().unwrap();
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.id == id && row.username == username)
        {
            row.last_login = last_login.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rutero_booking::status::BookingStatus;

    #[tokio::test]
    async fn the_queue_collapses_repeated_tokens() {
        let queue = MemoryQueue::new();
        let message = QueuedMessage {
            body: r#"{"status":"PENDING"}"#.into(),
            dedup_token: "a1b2c3".into(),
            group_id: "process.booking".into(),
        };

        queue.enqueue(message.clone()).await.unwrap();
        queue.enqueue(message).await.unwrap();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn update_bumps_the_version_and_rejects_missing_records() {
        let store = MemoryBookingStore::new();
        let booking = Booking {
            id: "bd866a7e".into(),
            bus_route_id: "RTRTB15001900877732".into(),
            status: BookingStatus::Pending,
            version: 1,
            ..Default::default()
        };
        store.put(&booking).await.unwrap();

        let key = BookingKey {
            id: booking.id.clone(),
            bus_route_id: booking.bus_route_id.clone(),
        };
        let updated = store
            .update(
                &key,
                &BookingUpdate {
                    status: Some(BookingStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.version, 2);

        let missing = BookingKey {
            id: "nope".into(),
            bus_route_id: booking.bus_route_id,
        };
        let err = store
            .update(&missing, &BookingUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "booking record not found");
    }

    #[tokio::test]
    async fn the_audit_write_is_first_come_only() {
        let store = MemoryCancellationStore::new();
        let record = CancellationRecord {
            id: "5c2dad6a".into(),
            booking_id: "bd866a7e".into(),
            reason: "Sudden change of plans".into(),
            cancelled_by: "CSTMR-855048".into(),
            date_cancelled: chrono::Utc::now(),
        };

        assert!(store.create_if_absent(&record).await.unwrap());
        assert!(!store.create_if_absent(&record).await.unwrap());
        assert_eq!(store.rows().len(), 1);
    }
}

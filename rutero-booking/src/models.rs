use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::BookingStatus;

/// A seat reservation for a scheduled bus trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Booking {
    /// Fresh UUID assigned by the worker when the record is created.
    pub id: String,
    pub user_id: String,
    pub bus_id: String,
    /// Sort key of the record alongside `id`.
    pub bus_route_id: String,
    pub status: BookingStatus,
    /// One or more seats, comma separated, e.g. "23,24,25".
    pub seat_number: String,
    pub travel_date: String,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_confirmed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cancelled: Option<bool>,
    /// Cancellation details riding along with a CANCELLED transition.
    /// Never persisted on the booking row; the audit record owns them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<CancellationDetail>,
    /// Client-supplied request timestamp, stored as given.
    #[serde(default)]
    pub timestamp: String,
    /// Bumped by the store on every update; last write wins.
    #[serde(skip)]
    pub version: i64,
}

/// Who cancelled a booking and why, carried on a CANCELLED transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationDetail {
    #[serde(default)]
    pub reason: String,
    /// Account id of the actor; staff ids carry the ADMN prefix.
    #[serde(default)]
    pub cancelled_by: String,
}

/// Audit record of a cancellation, at most one per booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub id: String,
    pub booking_id: String,
    pub reason: String,
    pub cancelled_by: String,
    pub date_cancelled: DateTime<Utc>,
}

/// Creation payload accepted at intake and replayed by the worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub bus_id: String,
    #[serde(default)]
    pub bus_route_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub seat_number: String,
    #[serde(default)]
    pub travel_date: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Partial transition payload; blank fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub seat_number: String,
    #[serde(default)]
    pub is_cancelled: Option<bool>,
    #[serde(default)]
    pub cancelled: Option<CancellationDetail>,
}

/// Composite storage key of a booking record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingKey {
    pub id: String,
    pub bus_route_id: String,
}

/// Field set applied by the event handlers; `None` leaves a field as is.
/// `date_confirmed` is two-level so the cancellation handler can clear it.
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub seat_number: Option<String>,
    pub date_confirmed: Option<Option<DateTime<Utc>>>,
    pub is_cancelled: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<String>,
    pub bus_id: Option<String>,
    pub bus_route_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_lifecycle_fields_stay_off_the_wire() {
        let booking = Booking {
            id: "36bc8bc5-44d6-447b-a63b-039b99658b78".into(),
            status: BookingStatus::Pending,
            ..Default::default()
        };

        let json = serde_json::to_string(&booking).unwrap();

        assert!(!json.contains("date_confirmed"));
        assert!(!json.contains("is_cancelled"));
        assert!(!json.contains("cancelled"));
        assert!(!json.contains("version"));
    }

    #[test]
    fn a_transition_payload_tolerates_missing_fields() {
        let change: StatusChange = serde_json::from_str(r#"{"status":"CONFIRMED"}"#).unwrap();

        assert_eq!(change.status, "CONFIRMED");
        assert!(change.seat_number.is_empty());
        assert!(change.is_cancelled.is_none());
        assert!(change.cancelled.is_none());
    }
}

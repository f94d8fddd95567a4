use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Lifecycle status of a booking.
///
/// PENDING is the initial state stamped by the worker. CONFIRMED and
/// CANCELLED are terminal: nothing transitions out of them, and
/// re-confirming a cancelled booking is rejected outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(candidate: &str) -> Result<BookingStatus, BookingError> {
        match candidate {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::InvalidStatus(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    /// The event source a transition into this status is announced under.
    /// PENDING is not an announceable state.
    pub fn event_source(&self) -> Result<EventSource, BookingError> {
        match self {
            BookingStatus::Confirmed => Ok(EventSource::Confirmed),
            BookingStatus::Cancelled => Ok(EventSource::Cancelled),
            BookingStatus::Pending => Err(BookingError::InvalidEventSource),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source tag of a booking lifecycle announcement on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Confirmed,
    Cancelled,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Confirmed => "booking:confirmed",
            EventSource::Cancelled => "booking:cancelled",
        }
    }

    /// Maps a delivered source tag back to its typed form. Consumers use
    /// this to dispatch; an unknown tag is left to the caller to drop.
    pub fn parse(source: &str) -> Option<EventSource> {
        match source {
            "booking:confirmed" => Some(EventSource::Confirmed),
            "booking:cancelled" => Some(EventSource::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_the_three_statuses() {
        assert_eq!(BookingStatus::parse("PENDING").unwrap(), BookingStatus::Pending);
        assert_eq!(BookingStatus::parse("CONFIRMED").unwrap(), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::parse("CANCELLED").unwrap(), BookingStatus::Cancelled);
    }

    #[test]
    fn parse_rejects_anything_else() {
        let err = BookingStatus::parse("confirmed").unwrap_err();
        assert_eq!(err.to_string(), "invalid booking status");

        assert!(BookingStatus::parse("").is_err());
        assert!(BookingStatus::parse("DONE").is_err());
    }

    #[test]
    fn wire_form_is_screaming_snake_case() {
        let json = serde_json::to_string(&BookingStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");

        let status: BookingStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(status, BookingStatus::Pending);
    }

    #[test]
    fn terminal_statuses_have_event_sources() {
        let confirmed = BookingStatus::Confirmed.event_source().unwrap();
        assert_eq!(confirmed.as_str(), "booking:confirmed");

        let cancelled = BookingStatus::Cancelled.event_source().unwrap();
        assert_eq!(cancelled.as_str(), "booking:cancelled");
    }

    #[test]
    fn pending_has_no_event_source() {
        let err = BookingStatus::Pending.event_source().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid booking event source [valid: CONFIRMED, CANCELLED]"
        );
    }

    #[test]
    fn delivered_source_tags_map_back() {
        assert_eq!(EventSource::parse("booking:confirmed"), Some(EventSource::Confirmed));
        assert_eq!(EventSource::parse("booking:cancelled"), Some(EventSource::Cancelled));
        assert_eq!(EventSource::parse("booking:created"), None);
    }
}

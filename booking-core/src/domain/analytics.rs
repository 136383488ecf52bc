//! Booking funnel events.

use serde_json::{json, Value};

use super::submission::SubmissionKind;

#[derive(Debug, Clone, PartialEq)]
pub enum BookingEvent {
    /// The booking modal was opened
    Started { teacher_id: String },
    Confirmed {
        teacher_id: String,
        kind: SubmissionKind,
        price: u64,
    },
    Error { teacher_id: String, message: String },
}

impl BookingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BookingEvent::Started { .. } => "booking_started",
            BookingEvent::Confirmed { .. } => "booking_confirmed",
            BookingEvent::Error { .. } => "booking_error",
        }
    }

    pub fn properties(&self) -> Value {
        match self {
            BookingEvent::Started { teacher_id } => json!({ "teacherId": teacher_id }),
            BookingEvent::Confirmed { teacher_id, kind, price } => json!({
                "teacherId": teacher_id,
                "bookingType": kind.as_str(),
                "price": price,
            }),
            BookingEvent::Error { teacher_id, message } => json!({
                "teacherId": teacher_id,
                "error": message,
            }),
        }
    }
}

/// Destination for funnel events; failures to deliver are the sink's concern
pub trait AnalyticsSink {
    fn track(&self, event: &BookingEvent);
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn track(&self, _event: &BookingEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_and_properties() {
        let confirmed = BookingEvent::Confirmed {
            teacher_id: "teacher-1".into(),
            kind: SubmissionKind::MultiSlotPackage,
            price: 7200,
        };
        assert_eq!(confirmed.name(), "booking_confirmed");
        assert_eq!(confirmed.properties()["price"], 7200);
        assert_eq!(confirmed.properties()["bookingType"], "MULTI_SLOT_PACKAGE");

        let failed = BookingEvent::Error {
            teacher_id: "teacher-1".into(),
            message: "Slot taken".into(),
        };
        assert_eq!(failed.name(), "booking_error");
        assert_eq!(failed.properties()["error"], "Slot taken");

        NoopAnalytics.track(&failed);
    }
}

use booking_core::domain::analytics::{AnalyticsSink, BookingEvent};

/// Funnel events go to the console log until a tracking backend exists
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LogAnalytics;

impl AnalyticsSink for LogAnalytics {
    fn track(&self, event: &BookingEvent) {
        log::info!(target: "analytics", "{} {}", event.name(), event.properties());
    }
}

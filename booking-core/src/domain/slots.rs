//! Loading concrete slots and month calendars.
//!
//! Every fetch is tagged with a generation number; a response whose
//! generation is no longer current is dropped so a slow reply for an old
//! date can never overwrite the slots of the date now on screen.

use chrono::{Datelike, NaiveDate};
use log::{debug, error};
use shared::{AvailabilityCalendar, AvailableSlotsResponse, SlotWithTimezone};

use crate::api::SchedulingApi;
use crate::error::ApiError;

/// Monotonic counter identifying the latest request of one kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestGeneration(u64);

impl RequestGeneration {
    /// Start a new request; anything issued earlier becomes stale
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// Drop any in-flight request without starting a new one
    pub fn invalidate(&mut self) {
        self.0 += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    generation: u64,
    pub date: NaiveDate,
}

/// Concrete slots for the selected date
#[derive(Debug, Clone, Default)]
pub struct SlotLoader {
    date: Option<NaiveDate>,
    slots: Vec<SlotWithTimezone>,
    loading: bool,
    generation: RequestGeneration,
}

impl SlotLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `date` and start a fetch for it
    pub fn select_date(&mut self, date: NaiveDate) -> SlotTicket {
        self.date = Some(date);
        self.slots.clear();
        self.loading = true;
        SlotTicket {
            generation: self.generation.next(),
            date,
        }
    }

    /// Apply a fetch result. Returns false when the ticket is stale.
    ///
    /// A failed fetch leaves the day empty; the error is logged only.
    pub fn apply(&mut self, ticket: SlotTicket, result: Result<AvailableSlotsResponse, ApiError>) -> bool {
        if !self.generation.is_current(ticket.generation) {
            debug!("Dropping stale slot response for {}", ticket.date);
            return false;
        }
        self.loading = false;
        match result {
            Ok(response) => self.slots = response.slots,
            Err(e) => {
                error!("Failed to load slots for {}: {}", ticket.date, e);
                self.slots.clear();
            }
        }
        true
    }

    pub async fn load<A: SchedulingApi + ?Sized>(
        &mut self,
        api: &A,
        teacher_id: &str,
        date: NaiveDate,
        user_timezone: &str,
    ) -> bool {
        let ticket = self.select_date(date);
        let result = api.get_available_slots(teacher_id, date, user_timezone).await;
        self.apply(ticket, result)
    }

    pub fn clear(&mut self) {
        self.generation.invalidate();
        self.date = None;
        self.slots.clear();
        self.loading = false;
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn slots(&self) -> &[SlotWithTimezone] {
        &self.slots
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTicket {
    generation: u64,
    pub year_month: String,
}

/// Month view with per-day availability markers
#[derive(Debug, Clone)]
pub struct CalendarLoader {
    year: i32,
    month: u32,
    calendar: Option<AvailabilityCalendar>,
    loading: bool,
    generation: RequestGeneration,
}

impl CalendarLoader {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: today.month(),
            calendar: None,
            loading: false,
            generation: RequestGeneration::default(),
        }
    }

    /// Start a fetch for the month currently shown
    pub fn begin_load(&mut self) -> CalendarTicket {
        self.loading = true;
        CalendarTicket {
            generation: self.generation.next(),
            year_month: self.year_month(),
        }
    }

    pub fn apply(&mut self, ticket: CalendarTicket, result: Result<AvailabilityCalendar, ApiError>) -> bool {
        if !self.generation.is_current(ticket.generation) {
            debug!("Dropping stale calendar response for {}", ticket.year_month);
            return false;
        }
        self.loading = false;
        match result {
            Ok(calendar) => self.calendar = Some(calendar),
            Err(e) => {
                error!("Failed to load calendar for {}: {}", ticket.year_month, e);
                self.calendar = None;
            }
        }
        true
    }

    pub async fn load<A: SchedulingApi + ?Sized>(&mut self, api: &A, teacher_id: &str, subject_id: &str) -> bool {
        let ticket = self.begin_load();
        let result = api
            .get_availability_calendar(teacher_id, &ticket.year_month, subject_id)
            .await;
        self.apply(ticket, result)
    }

    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
        self.calendar = None;
    }

    pub fn previous_month(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
        self.calendar = None;
    }

    /// Jump to the month containing `date` (used by the quick pick)
    pub fn show_month_of(&mut self, date: NaiveDate) {
        if (self.year, self.month) != (date.year(), date.month()) {
            self.year = date.year();
            self.month = date.month();
            self.calendar = None;
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year_month(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn calendar(&self) -> Option<&AvailabilityCalendar> {
        self.calendar.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{slot, FakeSchedulingApi};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_stale_slot_response_is_dropped() {
        let mut loader = SlotLoader::new();
        let first = loader.select_date(date(10));
        let second = loader.select_date(date(11));

        let late = AvailableSlotsResponse {
            slots: vec![slot("2026-03-10T09:00:00Z", "9:00 AM")],
            teacher_timezone: None,
            user_timezone: None,
        };
        assert!(!loader.apply(first, Ok(late)));
        assert!(loader.is_loading());
        assert!(loader.slots().is_empty());

        let fresh = AvailableSlotsResponse {
            slots: vec![slot("2026-03-11T10:00:00Z", "10:00 AM")],
            teacher_timezone: None,
            user_timezone: None,
        };
        assert!(loader.apply(second, Ok(fresh)));
        assert_eq!(loader.date(), Some(date(11)));
        assert_eq!(loader.slots().len(), 1);
        assert_eq!(loader.slots()[0].label, "10:00 AM");
    }

    #[test]
    fn test_failed_fetch_leaves_day_empty() {
        let mut loader = SlotLoader::new();
        let ticket = loader.select_date(date(12));
        assert!(loader.apply(ticket, Err(ApiError::Network("offline".into()))));
        assert!(!loader.is_loading());
        assert!(loader.slots().is_empty());
    }

    #[test]
    fn test_clear_invalidates_in_flight_fetch() {
        let mut loader = SlotLoader::new();
        let ticket = loader.select_date(date(12));
        loader.clear();
        assert!(!loader.apply(ticket, Ok(AvailableSlotsResponse {
            slots: vec![slot("2026-03-12T09:00:00Z", "9:00 AM")],
            teacher_timezone: None,
            user_timezone: None,
        })));
        assert!(loader.slots().is_empty());
    }

    #[tokio::test]
    async fn test_load_through_api() {
        let api = FakeSchedulingApi::new();
        api.set_slots(vec![slot("2026-03-10T09:00:00Z", "9:00 AM")]);

        let mut loader = SlotLoader::new();
        assert!(loader.load(&api, "teacher-1", date(10), "Africa/Khartoum").await);
        assert_eq!(loader.slots().len(), 1);
    }

    #[test]
    fn test_month_navigation_wraps_years() {
        let mut calendar = CalendarLoader::new(NaiveDate::from_ymd_opt(2026, 12, 5).unwrap());
        assert_eq!(calendar.year_month(), "2026-12");
        calendar.next_month();
        assert_eq!(calendar.year_month(), "2027-01");
        calendar.previous_month();
        calendar.previous_month();
        assert_eq!(calendar.year_month(), "2026-11");

        calendar.show_month_of(NaiveDate::from_ymd_opt(2027, 2, 1).unwrap());
        assert_eq!((calendar.year(), calendar.month()), (2027, 2));
    }

    #[test]
    fn test_stale_calendar_response_is_dropped() {
        let mut calendar = CalendarLoader::new(date(1));
        let march = calendar.begin_load();
        calendar.next_month();
        let april = calendar.begin_load();
        assert_eq!(april.year_month, "2026-04");

        let body = AvailabilityCalendar {
            available_dates: vec![date(2)],
            fully_booked_dates: vec![],
            next_available_slot: None,
        };
        assert!(!calendar.apply(march, Ok(body.clone())));
        assert!(calendar.calendar().is_none());
        assert!(calendar.apply(april, Ok(body)));
        assert!(calendar.calendar().is_some());
    }
}

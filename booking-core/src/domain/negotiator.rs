//! # Recurring availability negotiation
//!
//! A new package purchase needs a weekly pattern the server can place all of
//! its sessions on. [`AvailabilityNegotiator`] collects up to N weekly
//! (weekday, time) picks from the [`WeeklyGrid`] and runs the multi-slot
//! availability check. [`LegacyPatternNegotiator`] is the older single
//! weekday/time variant that returns suggested dates instead.
//!
//! Any change to the selection drops the previous result and invalidates an
//! in-flight check, so a result is never shown against a pattern set it was
//! not computed for.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use shared::{
    CheckMultiSlotAvailabilityRequest, CheckRecurringAvailabilityRequest, MultiSlotAvailabilityResponse,
    RecurringAvailabilityResponse, RecurringPattern, Weekday,
};

use super::slots::RequestGeneration;
use super::weekly_grid::WeeklyGrid;
use crate::api::SchedulingApi;
use crate::error::ApiError;

/// Message shown when the check request itself failed
pub const CHECK_FAILED_MESSAGE: &str = "An error occurred while checking availability";

/// Outcome of clicking a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternToggle {
    Added,
    Removed,
    /// Selection is already at the maximum; nothing changed
    LimitReached,
    /// The cell is not selectable in the grid; nothing changed
    Unavailable,
}

impl PatternToggle {
    pub fn changed(&self) -> bool {
        matches!(self, PatternToggle::Added | PatternToggle::Removed)
    }
}

/// An issued availability check; pass it back with the response
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityTicket {
    generation: u64,
    pub request: CheckMultiSlotAvailabilityRequest,
}

#[derive(Debug, Clone)]
pub struct AvailabilityNegotiator {
    teacher_id: String,
    recurring_session_count: u32,
    duration: u32,
    max_slots: usize,
    patterns: Vec<RecurringPattern>,
    result: Option<MultiSlotAvailabilityResponse>,
    checking: bool,
    generation: RequestGeneration,
}

impl AvailabilityNegotiator {
    pub fn new(
        teacher_id: impl Into<String>,
        recurring_session_count: u32,
        duration: u32,
        max_slots: usize,
    ) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            recurring_session_count,
            duration,
            max_slots,
            patterns: Vec::new(),
            result: None,
            checking: false,
            generation: RequestGeneration::default(),
        }
    }

    /// Seed with a selection restored from a draft
    pub fn with_selection(
        mut self,
        patterns: Vec<RecurringPattern>,
        result: Option<MultiSlotAvailabilityResponse>,
    ) -> Self {
        self.patterns = patterns;
        self.patterns.truncate(self.max_slots);
        self.result = if self.patterns.is_empty() { None } else { result };
        self
    }

    pub fn toggle_pattern(&mut self, grid: &WeeklyGrid, weekday: Weekday, time: &str) -> PatternToggle {
        let outcome = if let Some(index) = self.patterns.iter().position(|p| p.matches(weekday, time)) {
            self.patterns.remove(index);
            PatternToggle::Removed
        } else if !grid.is_available(weekday, time) {
            PatternToggle::Unavailable
        } else if self.patterns.len() >= self.max_slots {
            PatternToggle::LimitReached
        } else {
            self.patterns.push(RecurringPattern::new(weekday, time));
            PatternToggle::Added
        };

        if outcome.changed() {
            debug!("Pattern {} {} {:?}; {} selected", weekday, time, outcome, self.patterns.len());
            self.invalidate();
        }
        outcome
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.result = None;
        self.checking = false;
        self.generation.invalidate();
    }

    /// `ceil(recurring_session_count / selected)`; the full count when nothing is selected
    pub fn weeks_needed(&self) -> u32 {
        match self.patterns.len() as u32 {
            0 => self.recurring_session_count,
            n => self.recurring_session_count.div_ceil(n),
        }
    }

    /// Issue a check for the current selection.
    ///
    /// Returns `None` when nothing is selected or a check is already running.
    pub fn begin_check(&mut self) -> Option<AvailabilityTicket> {
        if self.patterns.is_empty() || self.checking {
            return None;
        }
        self.checking = true;
        self.result = None;
        Some(AvailabilityTicket {
            generation: self.generation.next(),
            request: CheckMultiSlotAvailabilityRequest {
                teacher_id: self.teacher_id.clone(),
                patterns: self.patterns.clone(),
                recurring_session_count: self.recurring_session_count,
                duration: self.duration,
            },
        })
    }

    /// Record the response for `ticket`.
    ///
    /// Transport failures become a negative result. Returns `None` if the
    /// ticket was superseded by a later change.
    pub fn apply_result(
        &mut self,
        ticket: AvailabilityTicket,
        result: Result<MultiSlotAvailabilityResponse, ApiError>,
    ) -> Option<&MultiSlotAvailabilityResponse> {
        if !self.generation.is_current(ticket.generation) {
            debug!("Dropping stale availability result");
            return None;
        }
        self.checking = false;
        let response = match result {
            Ok(response) => {
                info!(
                    "Availability for {} patterns: available={} conflicts={}",
                    ticket.request.patterns.len(),
                    response.available,
                    response.conflict_count()
                );
                response
            }
            Err(e) => {
                warn!("Availability check failed: {}", e);
                MultiSlotAvailabilityResponse::failed(CHECK_FAILED_MESSAGE)
            }
        };
        self.result = Some(response);
        self.result.as_ref()
    }

    pub async fn check_availability<A: SchedulingApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> Option<MultiSlotAvailabilityResponse> {
        let ticket = self.begin_check()?;
        let result = api.check_multi_slot_availability(&ticket.request).await;
        self.apply_result(ticket, result).cloned()
    }

    pub fn patterns(&self) -> &[RecurringPattern] {
        &self.patterns
    }

    pub fn is_selected(&self, weekday: Weekday, time: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(weekday, time))
    }

    pub fn can_add_more(&self) -> bool {
        self.patterns.len() < self.max_slots
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    pub fn recurring_session_count(&self) -> u32 {
        self.recurring_session_count
    }

    pub fn result(&self) -> Option<&MultiSlotAvailabilityResponse> {
        self.result.as_ref()
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }
}

/// A confirmed single weekly pattern and the dates the server placed
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySelection {
    pub weekday: Weekday,
    pub time: String,
    pub suggested_dates: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyTicket {
    generation: u64,
    pub request: CheckRecurringAvailabilityRequest,
}

/// One weekday and one time, checked for the whole package
#[derive(Debug, Clone)]
pub struct LegacyPatternNegotiator {
    teacher_id: String,
    session_count: u32,
    duration: u32,
    weekday: Option<Weekday>,
    time: Option<String>,
    result: Option<RecurringAvailabilityResponse>,
    checking: bool,
    generation: RequestGeneration,
}

impl LegacyPatternNegotiator {
    pub fn new(teacher_id: impl Into<String>, session_count: u32, duration: u32) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            session_count,
            duration,
            weekday: None,
            time: None,
            result: None,
            checking: false,
            generation: RequestGeneration::default(),
        }
    }

    /// Seed with a pattern restored from a draft. A draft only carries
    /// suggested dates for a pattern the server accepted, so a complete
    /// selection counts as confirmed again.
    pub fn with_selection(
        mut self,
        weekday: Option<Weekday>,
        time: Option<String>,
        suggested_dates: Vec<DateTime<Utc>>,
    ) -> Self {
        self.weekday = weekday;
        self.time = time;
        if self.weekday.is_some() && self.time.is_some() && !suggested_dates.is_empty() {
            self.result = Some(RecurringAvailabilityResponse {
                available: true,
                conflicts: Vec::new(),
                suggested_dates,
                package_end_date: None,
                message: None,
            });
        }
        self
    }

    pub fn select_weekday(&mut self, weekday: Weekday) {
        if self.weekday != Some(weekday) {
            self.weekday = Some(weekday);
            self.invalidate();
        }
    }

    pub fn select_time(&mut self, time: impl Into<String>) {
        let time = time.into();
        if self.time.as_deref() != Some(time.as_str()) {
            self.time = Some(time);
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.result = None;
        self.checking = false;
        self.generation.invalidate();
    }

    pub fn begin_check(&mut self) -> Option<LegacyTicket> {
        let (weekday, time) = (self.weekday?, self.time.clone()?);
        if self.checking {
            return None;
        }
        self.checking = true;
        self.result = None;
        Some(LegacyTicket {
            generation: self.generation.next(),
            request: CheckRecurringAvailabilityRequest {
                teacher_id: self.teacher_id.clone(),
                weekday,
                time,
                session_count: self.session_count,
                duration: self.duration,
            },
        })
    }

    pub fn apply_result(
        &mut self,
        ticket: LegacyTicket,
        result: Result<RecurringAvailabilityResponse, ApiError>,
    ) -> Option<&RecurringAvailabilityResponse> {
        if !self.generation.is_current(ticket.generation) {
            debug!("Dropping stale recurring availability result");
            return None;
        }
        self.checking = false;
        let response = result.unwrap_or_else(|e| {
            warn!("Recurring availability check failed: {}", e);
            RecurringAvailabilityResponse::failed(CHECK_FAILED_MESSAGE)
        });
        self.result = Some(response);
        self.result.as_ref()
    }

    pub async fn check_availability<A: SchedulingApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> Option<RecurringAvailabilityResponse> {
        let ticket = self.begin_check()?;
        let result = api.check_recurring_availability(&ticket.request).await;
        self.apply_result(ticket, result).cloned()
    }

    /// The pattern to write into the flow, once the server accepted it
    pub fn confirmed(&self) -> Option<LegacySelection> {
        let result = self.result.as_ref().filter(|r| r.available)?;
        Some(LegacySelection {
            weekday: self.weekday?,
            time: self.time.clone()?,
            suggested_dates: result.suggested_dates.clone(),
        })
    }

    pub fn weekday(&self) -> Option<Weekday> {
        self.weekday
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn result(&self) -> Option<&RecurringAvailabilityResponse> {
        self.result.as_ref()
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{available_response, FakeSchedulingApi};
    use shared::TeacherAvailabilityWindow;

    fn open_grid() -> WeeklyGrid {
        let windows: Vec<TeacherAvailabilityWindow> = Weekday::ALL
            .iter()
            .map(|day| TeacherAvailabilityWindow {
                day_of_week: day.as_str().to_string(),
                start_time: "08:00".to_string(),
                end_time: "23:00".to_string(),
            })
            .collect();
        WeeklyGrid::build(&windows, WeeklyGrid::hourly_slots(8, 22), 60)
    }

    fn negotiator() -> AvailabilityNegotiator {
        AvailabilityNegotiator::new("teacher-1", 8, 60, 4)
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let grid = open_grid();
        let mut n = negotiator();
        n.toggle_pattern(&grid, Weekday::Sunday, "10:00");
        let before = n.patterns().to_vec();

        assert_eq!(n.toggle_pattern(&grid, Weekday::Monday, "14:00"), PatternToggle::Added);
        assert_eq!(n.toggle_pattern(&grid, Weekday::Monday, "14:00"), PatternToggle::Removed);
        assert_eq!(n.patterns(), before.as_slice());
    }

    #[test]
    fn test_fifth_pattern_is_ignored() {
        let grid = open_grid();
        let mut n = negotiator();
        for day in [Weekday::Sunday, Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday] {
            assert_eq!(n.toggle_pattern(&grid, day, "09:00"), PatternToggle::Added);
        }
        assert!(!n.can_add_more());
        assert_eq!(n.toggle_pattern(&grid, Weekday::Thursday, "09:00"), PatternToggle::LimitReached);
        assert_eq!(n.patterns().len(), 4);
        assert!(!n.is_selected(Weekday::Thursday, "09:00"));
    }

    #[test]
    fn test_unavailable_cell_cannot_be_selected() {
        let grid = WeeklyGrid::build(&[], WeeklyGrid::hourly_slots(8, 22), 60);
        let mut n = negotiator();
        assert_eq!(n.toggle_pattern(&grid, Weekday::Sunday, "10:00"), PatternToggle::Unavailable);
        assert!(n.patterns().is_empty());
    }

    #[test]
    fn test_weeks_needed_rounds_up() {
        let grid = open_grid();
        let mut n = AvailabilityNegotiator::new("teacher-1", 10, 60, 4);
        assert_eq!(n.weeks_needed(), 10);
        n.toggle_pattern(&grid, Weekday::Sunday, "10:00");
        assert_eq!(n.weeks_needed(), 10);
        n.toggle_pattern(&grid, Weekday::Monday, "10:00");
        assert_eq!(n.weeks_needed(), 5);
        n.toggle_pattern(&grid, Weekday::Tuesday, "10:00");
        assert_eq!(n.weeks_needed(), 4);
    }

    #[test]
    fn test_change_discards_result() {
        let grid = open_grid();
        let mut n = negotiator();
        n.toggle_pattern(&grid, Weekday::Sunday, "10:00");
        let ticket = n.begin_check().unwrap();
        assert!(n.apply_result(ticket, Ok(available_response(8))).is_some());
        assert!(n.result().is_some());

        n.toggle_pattern(&grid, Weekday::Monday, "10:00");
        assert!(n.result().is_none());
    }

    #[test]
    fn test_in_flight_result_for_old_selection_is_dropped() {
        let grid = open_grid();
        let mut n = negotiator();
        n.toggle_pattern(&grid, Weekday::Sunday, "10:00");
        let ticket = n.begin_check().unwrap();
        assert!(n.is_checking());

        n.toggle_pattern(&grid, Weekday::Monday, "10:00");
        assert!(!n.is_checking());
        assert!(n.apply_result(ticket, Ok(available_response(8))).is_none());
        assert!(n.result().is_none());
    }

    #[test]
    fn test_check_is_not_reentrant() {
        let grid = open_grid();
        let mut n = negotiator();
        assert!(n.begin_check().is_none());
        n.toggle_pattern(&grid, Weekday::Sunday, "10:00");
        assert!(n.begin_check().is_some());
        assert!(n.begin_check().is_none());
    }

    #[test]
    fn test_transport_error_becomes_negative_result() {
        let grid = open_grid();
        let mut n = negotiator();
        n.toggle_pattern(&grid, Weekday::Sunday, "10:00");
        let ticket = n.begin_check().unwrap();
        let result = n
            .apply_result(ticket, Err(ApiError::Network("timeout".into())))
            .unwrap();
        assert!(!result.available);
        assert_eq!(result.message, CHECK_FAILED_MESSAGE);
        assert_eq!(result.conflict_count(), 0);
    }

    #[test]
    fn test_restored_selection_respects_limit() {
        let patterns = (8..14)
            .map(|h| RecurringPattern::new(Weekday::Sunday, format!("{:02}:00", h)))
            .collect();
        let n = negotiator().with_selection(patterns, Some(available_response(8)));
        assert_eq!(n.patterns().len(), 4);
        assert!(n.result().is_some());

        let empty = negotiator().with_selection(Vec::new(), Some(available_response(8)));
        assert!(empty.result().is_none());
    }

    #[tokio::test]
    async fn test_check_sends_selection_to_api() {
        let grid = open_grid();
        let api = FakeSchedulingApi::new();
        api.set_multi_slot_response(Ok(available_response(8)));

        let mut n = negotiator();
        n.toggle_pattern(&grid, Weekday::Sunday, "10:00");
        n.toggle_pattern(&grid, Weekday::Wednesday, "17:00");
        let result = n.check_availability(&api).await.unwrap();
        assert!(result.available);

        let sent = api.multi_slot_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].patterns.len(), 2);
        assert_eq!(sent[0].recurring_session_count, 8);
        assert_eq!(sent[0].duration, 60);
        assert_eq!(sent[0].teacher_id, "teacher-1");
    }

    #[tokio::test]
    async fn test_legacy_negotiator_confirms_available_pattern() {
        let api = FakeSchedulingApi::new();
        let dates: Vec<DateTime<Utc>> = vec![
            "2026-03-01T10:00:00Z".parse().unwrap(),
            "2026-03-08T10:00:00Z".parse().unwrap(),
        ];
        api.set_recurring_response(Ok(RecurringAvailabilityResponse {
            available: true,
            conflicts: vec![],
            suggested_dates: dates.clone(),
            package_end_date: None,
            message: None,
        }));

        let mut legacy = LegacyPatternNegotiator::new("teacher-1", 2, 60);
        assert!(legacy.begin_check().is_none());
        legacy.select_weekday(Weekday::Sunday);
        legacy.select_time("10:00");
        legacy.check_availability(&api).await.unwrap();

        let confirmed = legacy.confirmed().unwrap();
        assert_eq!(confirmed.weekday, Weekday::Sunday);
        assert_eq!(confirmed.suggested_dates, dates);

        legacy.select_time("11:00");
        assert!(legacy.confirmed().is_none());
    }

    #[test]
    fn test_legacy_selection_restored_from_draft() {
        let dates: Vec<DateTime<Utc>> = vec!["2026-03-03T09:00:00Z".parse().unwrap()];
        let legacy = LegacyPatternNegotiator::new("teacher-1", 4, 60).with_selection(
            Some(Weekday::Tuesday),
            Some("09:00".into()),
            dates.clone(),
        );
        let confirmed = legacy.confirmed().unwrap();
        assert_eq!(confirmed.weekday, Weekday::Tuesday);
        assert_eq!(confirmed.time, "09:00");
        assert_eq!(confirmed.suggested_dates, dates);

        let mut legacy = legacy;
        legacy.select_time("10:00");
        assert!(legacy.confirmed().is_none());

        // weekday and time without dates were never accepted
        let unchecked = LegacyPatternNegotiator::new("teacher-1", 4, 60).with_selection(
            Some(Weekday::Tuesday),
            Some("09:00".into()),
            Vec::new(),
        );
        assert_eq!(unchecked.weekday(), Some(Weekday::Tuesday));
        assert!(unchecked.confirmed().is_none());
    }

    #[test]
    fn test_legacy_failure_is_not_confirmed() {
        let mut legacy = LegacyPatternNegotiator::new("teacher-1", 4, 60);
        legacy.select_weekday(Weekday::Monday);
        legacy.select_time("09:00");
        let ticket = legacy.begin_check().unwrap();
        let result = legacy
            .apply_result(ticket, Err(ApiError::Network("down".into())))
            .unwrap();
        assert!(!result.available);
        assert!(legacy.confirmed().is_none());
    }
}

//! # Booking flow state machine
//!
//! Owns the wizard state for one modal session: the current step, which
//! steps are done, and every selection made so far. Navigation is gated by
//! per-step completion predicates and by the login boundary in front of the
//! details step. State changes are persisted as a debounced draft.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use shared::{
    BookingType, BookingTypeOption, MultiSlotAvailabilityResponse, RecurringPattern, ScheduledSession,
    SlotWithTimezone, UserRole, Weekday,
};

use super::draft::{DraftCheck, DraftDebouncer, DraftStore, PersistedDraft};
use super::steps::{FIRST_AUTH_STEP, LAST_STEP, STEP_BOOKING_TYPE, STEP_COUNT, STEP_DETAILS, STEP_SCHEDULE, STEP_SUBJECT};
use crate::config::BookingConfig;
use crate::error::StorageError;
use crate::storage::DraftStorage;

/// Shown when "next" is pressed on an incomplete step
pub const INCOMPLETE_STEP_MESSAGE: &str = "Please complete all required fields";

/// Everything the user has chosen so far
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingFlowState {
    pub current_step: usize,
    pub completed_steps: BTreeSet<usize>,
    pub selected_subject: String,
    pub selected_booking_option: Option<BookingTypeOption>,
    pub selected_date: Option<NaiveDate>,
    pub selected_slot: Option<SlotWithTimezone>,
    pub recurring_patterns: Vec<RecurringPattern>,
    pub scheduled_sessions: Vec<ScheduledSession>,
    pub availability_response: Option<MultiSlotAvailabilityResponse>,
    pub recurring_weekday: Option<Weekday>,
    pub recurring_time: Option<String>,
    pub suggested_dates: Vec<DateTime<Utc>>,
    pub selected_child_id: Option<String>,
    pub booking_notes: String,
    pub terms_accepted: bool,
}

impl BookingFlowState {
    /// Derived from the selected option; there is no separate field to keep in sync
    pub fn selected_booking_type(&self) -> Option<BookingType> {
        self.selected_booking_option.as_ref().map(|o| o.booking_type)
    }

    pub fn is_new_package_purchase(&self) -> bool {
        self.selected_booking_option
            .as_ref()
            .map(BookingTypeOption::is_new_package_purchase)
            .unwrap_or(false)
    }

    /// The weekly schedule negotiated for a new package, if any.
    ///
    /// A non-empty multi-slot selection always wins; the single-pattern
    /// fields are only consulted when no multi-slot pattern is selected.
    pub fn recurring_schedule(&self) -> Option<RecurringSchedule<'_>> {
        if !self.recurring_patterns.is_empty() {
            return Some(RecurringSchedule::MultiSlot {
                patterns: &self.recurring_patterns,
                response: self.availability_response.as_ref(),
            });
        }
        match (self.recurring_weekday, self.recurring_time.as_deref()) {
            (Some(weekday), Some(time)) => Some(RecurringSchedule::LegacySingle {
                weekday,
                time,
                suggested_dates: &self.suggested_dates,
            }),
            _ => None,
        }
    }
}

/// Which recurring-schedule model a package selection uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecurringSchedule<'a> {
    MultiSlot {
        patterns: &'a [RecurringPattern],
        response: Option<&'a MultiSlotAvailabilityResponse>,
    },
    LegacySingle {
        weekday: Weekday,
        time: &'a str,
        suggested_dates: &'a [DateTime<Utc>],
    },
}

impl RecurringSchedule<'_> {
    /// Multi-slot needs an accepted availability check; legacy needs placed dates
    pub fn is_confirmed(&self) -> bool {
        match self {
            RecurringSchedule::MultiSlot { response, .. } => response.map(|r| r.available).unwrap_or(false),
            RecurringSchedule::LegacySingle { suggested_dates, .. } => !suggested_dates.is_empty(),
        }
    }
}

/// Who is booking with whom
#[derive(Debug, Clone, PartialEq)]
pub struct FlowContext {
    pub teacher_id: String,
    pub user_id: Option<String>,
    pub role: Option<UserRole>,
    pub is_guest: bool,
}

impl FlowContext {
    pub fn guest(teacher_id: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            user_id: None,
            role: None,
            is_guest: true,
        }
    }

    pub fn signed_in(teacher_id: impl Into<String>, user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            user_id: Some(user_id.into()),
            role: Some(role),
            is_guest: false,
        }
    }

    pub fn is_parent(&self) -> bool {
        self.role == Some(UserRole::Parent)
    }
}

/// Single-field state change
#[derive(Debug, Clone, PartialEq)]
pub enum FlowUpdate {
    Subject(String),
    BookingOption(Option<BookingTypeOption>),
    Date(Option<NaiveDate>),
    Slot(Option<SlotWithTimezone>),
    RecurringPatterns(Vec<RecurringPattern>),
    ScheduledSessions(Vec<ScheduledSession>),
    AvailabilityResponse(Option<MultiSlotAvailabilityResponse>),
    RecurringWeekday(Option<Weekday>),
    RecurringTime(Option<String>),
    SuggestedDates(Vec<DateTime<Utc>>),
    ChildId(Option<String>),
    Notes(String),
    TermsAccepted(bool),
}

/// Result of pressing "next"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAdvance {
    Advanced,
    /// Guest is about to enter the details step; nothing changed
    LoginRequired,
    /// Current step is missing required input; nothing changed
    Incomplete,
    /// Already on the last step: the caller submits instead
    AtLastStep,
}

/// What the primary button of the modal does right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Next,
    Login,
    Confirm,
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    state: BookingFlowState,
    context: FlowContext,
    /// False until the caller knows whether the user is signed in
    identity_known: bool,
    notes_limit: usize,
    debouncer: DraftDebouncer,
}

impl BookingFlow {
    pub fn new(context: FlowContext, config: &BookingConfig) -> Self {
        Self {
            state: BookingFlowState::default(),
            context,
            identity_known: true,
            notes_limit: config.notes_limit_modal,
            debouncer: DraftDebouncer::new(config.persist_debounce()),
        }
    }

    /// Flow opened before the profile answered.
    ///
    /// Until [`Self::set_context`] is called no draft is offered or written
    /// and updates are ignored, so a draft is never claimed or stamped under
    /// the wrong identity.
    pub fn awaiting_identity(teacher_id: impl Into<String>, config: &BookingConfig) -> Self {
        let mut flow = Self::new(FlowContext::guest(teacher_id), config);
        flow.identity_known = false;
        flow
    }

    /// Use the shorter notes limit of the quick-booking entry point
    pub fn with_notes_limit(mut self, limit: usize) -> Self {
        self.notes_limit = limit;
        self
    }

    pub fn state(&self) -> &BookingFlowState {
        &self.state
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    /// Refresh identity after the profile loads or the user signs in
    pub fn set_context(&mut self, context: FlowContext) {
        self.context = context;
        self.identity_known = true;
    }

    pub fn identity_known(&self) -> bool {
        self.identity_known
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn notes_limit(&self) -> usize {
        self.notes_limit
    }

    pub fn selected_booking_type(&self) -> Option<BookingType> {
        self.state.selected_booking_type()
    }

    pub fn is_step_complete(&self, step: usize) -> bool {
        let state = &self.state;
        match step {
            STEP_SUBJECT => !state.selected_subject.is_empty(),
            STEP_BOOKING_TYPE => state.selected_booking_option.is_some(),
            STEP_SCHEDULE => {
                if state.is_new_package_purchase() {
                    state
                        .recurring_schedule()
                        .map(|schedule| schedule.is_confirmed())
                        .unwrap_or(false)
                } else {
                    state.selected_date.is_some() && state.selected_slot.is_some()
                }
            }
            STEP_DETAILS => {
                state.terms_accepted && (!self.context.is_parent() || state.selected_child_id.is_some())
            }
            _ => false,
        }
    }

    /// Every step before `target` is complete and the login boundary allows it
    pub fn can_go_to_step(&self, target: usize) -> bool {
        if target >= STEP_COUNT {
            return false;
        }
        if self.context.is_guest && target >= FIRST_AUTH_STEP {
            return false;
        }
        (0..target).all(|step| self.is_step_complete(step))
    }

    pub fn go_to_step(&mut self, target: usize) -> bool {
        if !self.can_go_to_step(target) {
            debug!("Jump to step {} rejected", target);
            return false;
        }
        self.state.current_step = target;
        true
    }

    /// What [`Self::go_to_next_step`] would do, without doing it
    pub fn next_step_outcome(&self) -> StepAdvance {
        let current = self.state.current_step;
        if !self.is_step_complete(current) {
            StepAdvance::Incomplete
        } else if self.context.is_guest && current + 1 == FIRST_AUTH_STEP {
            StepAdvance::LoginRequired
        } else if current >= LAST_STEP {
            StepAdvance::AtLastStep
        } else {
            StepAdvance::Advanced
        }
    }

    pub fn go_to_next_step(&mut self) -> StepAdvance {
        let outcome = self.next_step_outcome();
        let current = self.state.current_step;
        match outcome {
            StepAdvance::Incomplete => debug!("Step {} incomplete", current),
            StepAdvance::LoginRequired => info!("Login required to continue past step {}", current),
            StepAdvance::AtLastStep => {
                self.state.completed_steps.insert(current);
            }
            StepAdvance::Advanced => {
                self.state.completed_steps.insert(current);
                self.state.current_step = current + 1;
                info!("Advanced to step {}", self.state.current_step);
            }
        }
        outcome
    }

    /// Always allowed, including back across the login boundary
    pub fn go_to_previous_step(&mut self) -> bool {
        if self.state.current_step == 0 {
            return false;
        }
        self.state.current_step -= 1;
        true
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.context.is_guest && self.state.current_step + 1 == FIRST_AUTH_STEP {
            PrimaryAction::Login
        } else if self.state.current_step >= LAST_STEP {
            PrimaryAction::Confirm
        } else {
            PrimaryAction::Next
        }
    }

    /// Guests on an auth-gated step see the login checkpoint instead
    pub fn shows_login_checkpoint(&self) -> bool {
        self.identity_known && self.context.is_guest && self.state.current_step >= FIRST_AUTH_STEP
    }

    /// A guest with progress is asked before the modal closes
    pub fn needs_close_confirmation(&self) -> bool {
        self.context.is_guest && self.state.current_step > 0
    }

    pub fn update(&mut self, update: FlowUpdate) {
        if !self.identity_known {
            debug!("Ignoring update before identity is known");
            return;
        }
        let state = &mut self.state;
        match update {
            FlowUpdate::Subject(subject) => state.selected_subject = subject,
            FlowUpdate::BookingOption(option) => state.selected_booking_option = option,
            FlowUpdate::Date(date) => state.selected_date = date,
            FlowUpdate::Slot(slot) => state.selected_slot = slot,
            FlowUpdate::RecurringPatterns(patterns) => state.recurring_patterns = patterns,
            FlowUpdate::ScheduledSessions(sessions) => state.scheduled_sessions = sessions,
            FlowUpdate::AvailabilityResponse(response) => state.availability_response = response,
            FlowUpdate::RecurringWeekday(weekday) => state.recurring_weekday = weekday,
            FlowUpdate::RecurringTime(time) => state.recurring_time = time,
            FlowUpdate::SuggestedDates(dates) => state.suggested_dates = dates,
            FlowUpdate::ChildId(child_id) => state.selected_child_id = child_id,
            FlowUpdate::Notes(notes) => {
                state.booking_notes = if notes.chars().count() > self.notes_limit {
                    notes.chars().take(self.notes_limit).collect()
                } else {
                    notes
                }
            }
            FlowUpdate::TermsAccepted(accepted) => state.terms_accepted = accepted,
        }
    }

    pub fn update_many(&mut self, updates: impl IntoIterator<Item = FlowUpdate>) {
        for update in updates {
            self.update(update);
        }
    }

    /// Snapshot for storage; `None` until a subject is chosen
    pub fn draft(&self, now: DateTime<Utc>) -> Option<PersistedDraft> {
        if !self.identity_known || self.state.selected_subject.is_empty() {
            return None;
        }
        Some(PersistedDraft::new(
            self.state.clone(),
            &self.context.teacher_id,
            self.context.user_id.as_deref(),
            now,
        ))
    }

    /// Queue a draft write after a state change; returns when it falls due
    pub fn schedule_persist(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let draft = self.draft(now)?;
        Some(self.debouncer.schedule(draft, now))
    }

    pub fn flush_due<S: DraftStorage>(&mut self, store: &DraftStore<S>, now: DateTime<Utc>) -> Result<bool, StorageError> {
        self.debouncer.flush_due(store, now)
    }

    /// Write the queued draft now, regardless of its due time
    pub fn flush_pending<S: DraftStorage>(&mut self, store: &DraftStore<S>) -> Result<bool, StorageError> {
        self.debouncer.flush(store)
    }

    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn pending_draft<S: DraftStorage>(&self, store: &DraftStore<S>, now: DateTime<Utc>) -> DraftCheck {
        if !self.identity_known {
            return DraftCheck::Absent;
        }
        store.check(
            &self.context.teacher_id,
            self.context.user_id.as_deref(),
            now,
        )
    }

    pub fn check_pending_booking<S: DraftStorage>(&self, store: &DraftStore<S>, now: DateTime<Utc>) -> bool {
        self.pending_draft(store, now).is_valid()
    }

    /// Restore the stored draft. Terms must be accepted again.
    pub fn resume_booking<S: DraftStorage>(&mut self, store: &DraftStore<S>, now: DateTime<Utc>) -> bool {
        let Some(draft) = self.pending_draft(store, now).into_draft() else {
            return false;
        };
        let mut state = draft.state;
        state.terms_accepted = false;
        state.current_step = state.current_step.min(LAST_STEP);
        state.completed_steps.retain(|step| *step < STEP_COUNT);
        info!(
            "Resumed booking draft for teacher {} at step {}",
            draft.teacher_id, state.current_step
        );
        self.state = state;
        true
    }

    /// Delete the stored draft, dropping any write still waiting to land
    pub fn clear_saved_state<S: DraftStorage>(&mut self, store: &DraftStore<S>) -> Result<(), StorageError> {
        if self.debouncer.cancel() {
            debug!("Cancelled pending draft write");
        }
        store.clear()?;
        info!("Cleared booking draft");
        Ok(())
    }

    /// Back to a blank flow with no stored draft
    pub fn reset_state<S: DraftStorage>(&mut self, store: &DraftStore<S>) -> Result<(), StorageError> {
        self.state = BookingFlowState::default();
        let cleared = self.clear_saved_state(store);
        if let Err(e) = &cleared {
            warn!("Flow reset but draft could not be cleared: {}", e);
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDraftStorage;
    use crate::test_utils::{at, available_response, demo_option, single_option, slot, tier_option};
    use chrono::Duration;

    fn config() -> BookingConfig {
        BookingConfig::default()
    }

    fn guest_flow() -> BookingFlow {
        BookingFlow::new(FlowContext::guest("teacher-1"), &config())
    }

    fn student_flow() -> BookingFlow {
        BookingFlow::new(
            FlowContext::signed_in("teacher-1", "user-1", UserRole::Student),
            &config(),
        )
    }

    fn store(storage: &InMemoryDraftStorage) -> DraftStore<&InMemoryDraftStorage> {
        DraftStore::new(storage, &config())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn fill_schedule(flow: &mut BookingFlow) {
        flow.update_many([
            FlowUpdate::Subject("math-1".into()),
            FlowUpdate::BookingOption(Some(single_option(1000))),
            FlowUpdate::Date(Some(date())),
            FlowUpdate::Slot(Some(slot("2025-03-10T09:00:00Z", "11:00 AM"))),
        ]);
    }

    #[test]
    fn test_guest_demo_hits_login_gate() {
        let mut flow = guest_flow();
        flow.update(FlowUpdate::Subject("math-1".into()));
        assert_eq!(flow.go_to_next_step(), StepAdvance::Advanced);
        flow.update(FlowUpdate::BookingOption(Some(demo_option())));
        assert_eq!(flow.selected_booking_type(), Some(BookingType::Demo));
        assert_eq!(flow.go_to_next_step(), StepAdvance::Advanced);
        flow.update_many([
            FlowUpdate::Date(Some(date())),
            FlowUpdate::Slot(Some(slot("2025-03-10T09:00:00Z", "11:00 AM"))),
        ]);

        assert_eq!(flow.primary_action(), PrimaryAction::Login);
        let before = flow.state().clone();
        assert_eq!(flow.go_to_next_step(), StepAdvance::LoginRequired);
        assert_eq!(flow.state(), &before);
        assert_eq!(flow.current_step(), STEP_SCHEDULE);
    }

    #[test]
    fn test_incomplete_step_blocks_next() {
        let mut flow = student_flow();
        assert_eq!(flow.go_to_next_step(), StepAdvance::Incomplete);
        assert_eq!(flow.current_step(), 0);
        assert!(flow.state().completed_steps.is_empty());
    }

    #[test]
    fn test_signed_in_user_reaches_last_step() {
        let mut flow = student_flow();
        fill_schedule(&mut flow);
        assert_eq!(flow.go_to_next_step(), StepAdvance::Advanced);
        assert_eq!(flow.go_to_next_step(), StepAdvance::Advanced);
        assert_eq!(flow.go_to_next_step(), StepAdvance::Advanced);
        assert_eq!(flow.current_step(), STEP_DETAILS);
        assert_eq!(flow.primary_action(), PrimaryAction::Confirm);

        assert_eq!(flow.go_to_next_step(), StepAdvance::Incomplete);
        flow.update(FlowUpdate::TermsAccepted(true));
        assert_eq!(flow.go_to_next_step(), StepAdvance::AtLastStep);
        assert_eq!(flow.current_step(), STEP_DETAILS);
        assert_eq!(flow.state().completed_steps.len(), 4);
    }

    #[test]
    fn test_parent_needs_child_for_details() {
        let mut flow = BookingFlow::new(
            FlowContext::signed_in("teacher-1", "parent-1", UserRole::Parent),
            &config(),
        );
        flow.update(FlowUpdate::TermsAccepted(true));
        assert!(!flow.is_step_complete(STEP_DETAILS));
        flow.update(FlowUpdate::ChildId(Some("child-1".into())));
        assert!(flow.is_step_complete(STEP_DETAILS));
    }

    #[test]
    fn test_completion_is_pure() {
        let mut flow = student_flow();
        fill_schedule(&mut flow);
        let before = flow.state().clone();
        let first: Vec<bool> = (0..STEP_COUNT).map(|s| flow.is_step_complete(s)).collect();
        let second: Vec<bool> = (0..STEP_COUNT).map(|s| flow.is_step_complete(s)).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![true, true, true, false]);
        assert_eq!(flow.state(), &before);
    }

    #[test]
    fn test_package_schedule_needs_accepted_patterns() {
        let mut flow = student_flow();
        flow.update_many([
            FlowUpdate::Subject("math-1".into()),
            FlowUpdate::BookingOption(Some(tier_option("tier-8", 8))),
            FlowUpdate::Date(Some(date())),
            FlowUpdate::Slot(Some(slot("2025-03-10T09:00:00Z", "11:00 AM"))),
        ]);
        // a concrete slot does not satisfy a package purchase
        assert!(!flow.is_step_complete(STEP_SCHEDULE));

        flow.update(FlowUpdate::RecurringPatterns(vec![RecurringPattern::new(Weekday::Sunday, "10:00")]));
        assert!(!flow.is_step_complete(STEP_SCHEDULE));

        let mut rejected = available_response(8);
        rejected.available = false;
        flow.update(FlowUpdate::AvailabilityResponse(Some(rejected)));
        assert!(!flow.is_step_complete(STEP_SCHEDULE));

        flow.update(FlowUpdate::AvailabilityResponse(Some(available_response(8))));
        assert!(flow.is_step_complete(STEP_SCHEDULE));
    }

    #[test]
    fn test_multi_slot_selection_shadows_legacy_fields() {
        let mut flow = student_flow();
        flow.update_many([
            FlowUpdate::Subject("math-1".into()),
            FlowUpdate::BookingOption(Some(tier_option("tier-8", 8))),
            FlowUpdate::RecurringWeekday(Some(Weekday::Monday)),
            FlowUpdate::RecurringTime(Some("10:00".into())),
            FlowUpdate::SuggestedDates(vec![at("2025-03-10T10:00:00Z")]),
        ]);
        assert!(matches!(
            flow.state().recurring_schedule(),
            Some(RecurringSchedule::LegacySingle { .. })
        ));
        assert!(flow.is_step_complete(STEP_SCHEDULE));

        // an unconfirmed multi-slot selection is not rescued by the legacy fields
        flow.update(FlowUpdate::RecurringPatterns(vec![RecurringPattern::new(Weekday::Sunday, "10:00")]));
        assert!(matches!(
            flow.state().recurring_schedule(),
            Some(RecurringSchedule::MultiSlot { .. })
        ));
        assert!(!flow.is_step_complete(STEP_SCHEDULE));
        assert_eq!(flow.state().recurring_weekday, Some(Weekday::Monday));
    }

    #[test]
    fn test_go_to_step_requires_previous_steps() {
        let mut flow = student_flow();
        assert!(flow.go_to_step(0));
        assert!(!flow.go_to_step(2));
        flow.update(FlowUpdate::Subject("math-1".into()));
        assert!(flow.go_to_step(1));
        assert!(!flow.go_to_step(2));
        assert!(!flow.go_to_step(STEP_COUNT));
    }

    #[test]
    fn test_guest_cannot_jump_to_details() {
        let mut flow = guest_flow();
        fill_schedule(&mut flow);
        assert!(flow.go_to_step(2));
        assert!(!flow.go_to_step(3));
        assert_eq!(flow.current_step(), 2);
    }

    #[test]
    fn test_previous_step_floors_at_zero() {
        let mut flow = student_flow();
        fill_schedule(&mut flow);
        flow.go_to_step(2);
        assert!(flow.go_to_previous_step());
        assert!(flow.go_to_previous_step());
        assert!(!flow.go_to_previous_step());
        assert_eq!(flow.current_step(), 0);
    }

    #[test]
    fn test_guest_checkpoint_and_close_confirmation() {
        let mut flow = guest_flow();
        assert!(!flow.needs_close_confirmation());
        flow.update(FlowUpdate::Subject("math-1".into()));
        flow.go_to_next_step();
        assert!(flow.needs_close_confirmation());
        assert!(!flow.shows_login_checkpoint());

        let mut signed_in = student_flow();
        signed_in.update(FlowUpdate::Subject("math-1".into()));
        signed_in.go_to_next_step();
        assert!(!signed_in.needs_close_confirmation());
    }

    #[test]
    fn test_notes_are_capped() {
        let mut flow = student_flow().with_notes_limit(5);
        flow.update(FlowUpdate::Notes("abcdefgh".into()));
        assert_eq!(flow.state().booking_notes, "abcde");
    }

    #[test]
    fn test_reset_then_check_finds_nothing() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let mut flow = student_flow();
        fill_schedule(&mut flow);
        let now = at("2026-03-01T10:00:00Z");
        flow.schedule_persist(now);
        flow.flush_due(&store, now + Duration::seconds(1)).unwrap();
        assert!(flow.check_pending_booking(&store, now + Duration::seconds(2)));

        flow.reset_state(&store).unwrap();
        assert!(!flow.check_pending_booking(&store, now + Duration::seconds(3)));
        assert_eq!(flow.state(), &BookingFlowState::default());
    }

    #[test]
    fn test_clear_cancels_pending_write() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let mut flow = student_flow();
        flow.update(FlowUpdate::Subject("math-1".into()));
        let now = at("2026-03-01T10:00:00Z");
        assert!(flow.schedule_persist(now).is_some());

        flow.clear_saved_state(&store).unwrap();
        assert!(!flow.has_pending_write());
        assert!(!flow.flush_due(&store, now + Duration::seconds(5)).unwrap());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_nothing_persisted_without_subject() {
        let mut flow = student_flow();
        assert!(flow.schedule_persist(at("2026-03-01T10:00:00Z")).is_none());
        assert!(!flow.has_pending_write());
    }

    #[test]
    fn test_expired_draft_is_rejected_and_removed() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let now = at("2026-03-01T10:00:00Z");
        let mut state = BookingFlowState::default();
        state.selected_subject = "math-1".into();
        store
            .save(&PersistedDraft::new(state, "teacher-1", None, now - Duration::minutes(31)))
            .unwrap();

        let flow = guest_flow();
        assert!(!flow.check_pending_booking(&store, now));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_draft_ownership() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let now = at("2026-03-01T10:00:00Z");
        let mut state = BookingFlowState::default();
        state.selected_subject = "math-1".into();
        store
            .save(&PersistedDraft::new(state, "teacher-1", Some("A"), now - Duration::minutes(1)))
            .unwrap();

        let as_user = |id: &str| {
            BookingFlow::new(FlowContext::signed_in("teacher-1", id, UserRole::Student), &config())
        };
        assert!(!as_user("B").check_pending_booking(&store, now));
        assert!(as_user("A").check_pending_booking(&store, now));
        assert!(guest_flow().check_pending_booking(&store, now));
    }

    #[test]
    fn test_no_draft_claimed_before_identity_is_known() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let now = at("2026-03-01T10:00:00Z");
        let mut owner = BookingFlow::new(
            FlowContext::signed_in("teacher-1", "A", UserRole::Student),
            &config(),
        );
        fill_schedule(&mut owner);
        owner.schedule_persist(now);
        assert!(owner.flush_pending(&store).unwrap());

        let mut loading = BookingFlow::awaiting_identity("teacher-1", &config());
        assert!(!loading.identity_known());
        assert!(!loading.check_pending_booking(&store, now));
        assert!(!loading.resume_booking(&store, now));
        assert!(!loading.shows_login_checkpoint());

        // nothing typed while loading reaches the store
        loading.update(FlowUpdate::Subject("sci-2".into()));
        assert!(loading.state().selected_subject.is_empty());
        assert!(loading.schedule_persist(now).is_none());

        loading.set_context(FlowContext::signed_in("teacher-1", "B", UserRole::Student));
        assert!(loading.identity_known());
        assert!(!loading.check_pending_booking(&store, now));
        assert!(!loading.resume_booking(&store, now));

        let mut returning = BookingFlow::awaiting_identity("teacher-1", &config());
        returning.set_context(FlowContext::signed_in("teacher-1", "A", UserRole::Student));
        assert!(returning.resume_booking(&store, now));
        assert_eq!(returning.state().selected_subject, "math-1");
    }

    #[test]
    fn test_resume_after_reload() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let now = at("2026-03-01T10:00:00Z");
        let state = BookingFlowState {
            current_step: 2,
            completed_steps: [0, 1].into_iter().collect(),
            selected_subject: "sci-2".into(),
            selected_booking_option: Some(single_option(1000)),
            terms_accepted: true,
            ..BookingFlowState::default()
        };
        store
            .save(&PersistedDraft::new(state, "teacher-1", None, now - Duration::minutes(5)))
            .unwrap();

        let mut flow = guest_flow();
        assert!(flow.check_pending_booking(&store, now));
        assert!(flow.resume_booking(&store, now));
        assert_eq!(flow.state().selected_subject, "sci-2");
        assert_eq!(flow.current_step(), 2);
        assert!(!flow.state().terms_accepted);
        assert_eq!(flow.selected_booking_type(), Some(BookingType::Single));
    }

    #[test]
    fn test_resume_without_draft_keeps_state() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let mut flow = student_flow();
        flow.update(FlowUpdate::Subject("math-1".into()));
        assert!(!flow.resume_booking(&store, at("2026-03-01T10:00:00Z")));
        assert_eq!(flow.state().selected_subject, "math-1");
    }
}

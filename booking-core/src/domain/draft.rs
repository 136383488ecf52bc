//! # Booking draft persistence
//!
//! An in-progress booking is written to durable client storage so it
//! survives the modal closing, a reload or the login round trip. A stored
//! draft is only offered back when it belongs to the same teacher, does not
//! belong to another signed-in user, is younger than the TTL and actually
//! has progress in it.

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use shared::BookingType;

use super::flow::BookingFlowState;
use crate::config::BookingConfig;
use crate::error::StorageError;
use crate::storage::DraftStorage;

/// Snapshot written to storage: flow state plus its owner and write time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDraft {
    #[serde(flatten)]
    pub state: BookingFlowState,
    /// Mirrors the selected option's type for older readers of the key
    #[serde(default)]
    pub selected_booking_type: Option<BookingType>,
    pub teacher_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl PersistedDraft {
    pub fn new(state: BookingFlowState, teacher_id: &str, user_id: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            selected_booking_type: state.selected_booking_type(),
            state,
            teacher_id: teacher_id.to_string(),
            user_id: user_id.map(str::to_string),
            timestamp: now.timestamp_millis(),
        }
    }

    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    pub fn has_progress(&self) -> bool {
        !self.state.selected_subject.is_empty() || self.state.current_step >= 1
    }
}

/// Why a stored draft was not offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftRejection {
    TeacherMismatch,
    OwnerMismatch,
    Expired,
    NoProgress,
    Corrupt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftCheck {
    Absent,
    Valid(Box<PersistedDraft>),
    Rejected(DraftRejection),
}

impl DraftCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, DraftCheck::Valid(_))
    }

    pub fn into_draft(self) -> Option<PersistedDraft> {
        match self {
            DraftCheck::Valid(draft) => Some(*draft),
            _ => None,
        }
    }
}

/// Typed access to the single draft slot
#[derive(Debug, Clone)]
pub struct DraftStore<S> {
    storage: S,
    key: String,
    ttl: Duration,
}

impl<S: DraftStorage> DraftStore<S> {
    pub fn new(storage: S, config: &BookingConfig) -> Self {
        Self {
            storage,
            key: config.draft_storage_key.clone(),
            ttl: config.draft_ttl(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, draft: &PersistedDraft) -> Result<(), StorageError> {
        let json = serde_json::to_string(draft).map_err(|e| StorageError::Write(e.to_string()))?;
        self.storage.set(&self.key, &json)?;
        debug!(
            "Saved booking draft for teacher {} at step {}",
            draft.teacher_id, draft.state.current_step
        );
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }

    /// Validate the stored draft against the current teacher and user.
    ///
    /// Expired and unreadable drafts are deleted; the other rejections
    /// leave the draft in place for the page it belongs to.
    pub fn check(&self, teacher_id: &str, user_id: Option<&str>, now: DateTime<Utc>) -> DraftCheck {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return DraftCheck::Absent,
            Err(e) => {
                warn!("Could not read booking draft: {}", e);
                return DraftCheck::Absent;
            }
        };

        let draft: PersistedDraft = match serde_json::from_str(&raw) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("Discarding unreadable booking draft: {}", e);
                self.remove_quietly();
                return DraftCheck::Rejected(DraftRejection::Corrupt);
            }
        };

        if let Some(option) = &draft.state.selected_booking_option {
            if !option.has_valid_package_reference() {
                warn!("Discarding booking draft with both package and tier ids");
                self.remove_quietly();
                return DraftCheck::Rejected(DraftRejection::Corrupt);
            }
        }

        if draft.teacher_id != teacher_id {
            return DraftCheck::Rejected(DraftRejection::TeacherMismatch);
        }

        if let (Some(owner), Some(current)) = (draft.user_id.as_deref(), user_id) {
            if owner != current {
                return DraftCheck::Rejected(DraftRejection::OwnerMismatch);
            }
        }

        let age = now.timestamp_millis() - draft.timestamp;
        if age >= self.ttl.num_milliseconds() {
            info!("Booking draft expired after {} minutes", age / 60_000);
            self.remove_quietly();
            return DraftCheck::Rejected(DraftRejection::Expired);
        }

        if !draft.has_progress() {
            return DraftCheck::Rejected(DraftRejection::NoProgress);
        }

        DraftCheck::Valid(Box::new(draft))
    }

    fn remove_quietly(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!("Could not remove booking draft: {}", e);
        }
    }
}

/// Coalesces rapid state changes into one storage write
#[derive(Debug, Clone)]
pub struct DraftDebouncer {
    delay: Duration,
    pending: Option<(PersistedDraft, DateTime<Utc>)>,
}

impl DraftDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Replace any pending write; the quiet period restarts at `now`
    pub fn schedule(&mut self, draft: PersistedDraft, now: DateTime<Utc>) -> DateTime<Utc> {
        let due = now + self.delay;
        self.pending = Some((draft, due));
        due
    }

    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the pending draft if its quiet period has elapsed
    pub fn flush_due<S: DraftStorage>(&mut self, store: &DraftStore<S>, now: DateTime<Utc>) -> Result<bool, StorageError> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.flush(store),
            _ => Ok(false),
        }
    }

    /// Write the pending draft immediately
    pub fn flush<S: DraftStorage>(&mut self, store: &DraftStore<S>) -> Result<bool, StorageError> {
        match self.pending.take() {
            Some((draft, _)) => store.save(&draft).map(|_| true),
            None => Ok(false),
        }
    }

    /// Drop the pending write so it cannot resurrect a cleared draft
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDraftStorage;
    use crate::test_utils::{at, single_option};

    fn config() -> BookingConfig {
        BookingConfig::default()
    }

    fn state_with_subject(subject: &str) -> BookingFlowState {
        BookingFlowState {
            selected_subject: subject.to_string(),
            ..BookingFlowState::default()
        }
    }

    fn store(storage: &InMemoryDraftStorage) -> DraftStore<&InMemoryDraftStorage> {
        DraftStore::new(storage, &config())
    }

    #[test]
    fn test_valid_draft_is_offered() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let draft = PersistedDraft::new(state_with_subject("math"), "teacher-1", Some("user-1"), at("2026-03-01T10:00:00Z"));
        store.save(&draft).unwrap();

        let check = store.check("teacher-1", Some("user-1"), at("2026-03-01T10:29:00Z"));
        assert_eq!(check.into_draft().unwrap(), draft);
    }

    #[test]
    fn test_draft_expires_at_ttl_and_is_deleted() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        store
            .save(&PersistedDraft::new(state_with_subject("math"), "teacher-1", None, at("2026-03-01T10:00:00Z")))
            .unwrap();

        let check = store.check("teacher-1", None, at("2026-03-01T10:30:00Z"));
        assert_eq!(check, DraftCheck::Rejected(DraftRejection::Expired));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_other_teacher_draft_is_kept_but_not_offered() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        store
            .save(&PersistedDraft::new(state_with_subject("math"), "teacher-1", None, at("2026-03-01T10:00:00Z")))
            .unwrap();

        let check = store.check("teacher-2", None, at("2026-03-01T10:01:00Z"));
        assert_eq!(check, DraftCheck::Rejected(DraftRejection::TeacherMismatch));
        assert!(storage.contains(store.key()));
    }

    #[test]
    fn test_owner_mismatch_only_when_both_known() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let now = at("2026-03-01T10:05:00Z");

        store
            .save(&PersistedDraft::new(state_with_subject("math"), "teacher-1", Some("user-a"), at("2026-03-01T10:00:00Z")))
            .unwrap();
        assert_eq!(
            store.check("teacher-1", Some("user-b"), now),
            DraftCheck::Rejected(DraftRejection::OwnerMismatch)
        );
        assert!(store.check("teacher-1", None, now).is_valid());

        // guest draft claimed after login
        store
            .save(&PersistedDraft::new(state_with_subject("math"), "teacher-1", None, at("2026-03-01T10:00:00Z")))
            .unwrap();
        assert!(store.check("teacher-1", Some("user-b"), now).is_valid());
    }

    #[test]
    fn test_draft_without_progress_is_rejected() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        store
            .save(&PersistedDraft::new(BookingFlowState::default(), "teacher-1", None, at("2026-03-01T10:00:00Z")))
            .unwrap();
        assert_eq!(
            store.check("teacher-1", None, at("2026-03-01T10:01:00Z")),
            DraftCheck::Rejected(DraftRejection::NoProgress)
        );
    }

    #[test]
    fn test_corrupt_draft_is_removed() {
        let storage = InMemoryDraftStorage::new();
        storage.set("pendingBooking", "{not json").unwrap();
        let store = store(&storage);
        assert_eq!(
            store.check("teacher-1", None, at("2026-03-01T10:01:00Z")),
            DraftCheck::Rejected(DraftRejection::Corrupt)
        );
        assert!(storage.is_empty());
        assert_eq!(store.check("teacher-1", None, at("2026-03-01T10:01:00Z")), DraftCheck::Absent);
    }

    #[test]
    fn test_draft_with_both_package_ids_is_corrupt() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let mut option = single_option(1000);
        option.package_id = Some("pkg-1".into());
        option.tier_id = Some("tier-1".into());
        let state = BookingFlowState {
            selected_subject: "math".into(),
            selected_booking_option: Some(option),
            ..BookingFlowState::default()
        };
        store
            .save(&PersistedDraft::new(state, "teacher-1", None, at("2026-03-01T10:00:00Z")))
            .unwrap();
        assert_eq!(
            store.check("teacher-1", None, at("2026-03-01T10:01:00Z")),
            DraftCheck::Rejected(DraftRejection::Corrupt)
        );
    }

    #[test]
    fn test_serialized_shape_uses_storage_names() {
        let mut state = state_with_subject("math");
        state.selected_booking_option = Some(single_option(1000));
        let draft = PersistedDraft::new(state, "teacher-1", Some("user-1"), at("2026-03-01T10:00:00Z"));
        let value = serde_json::to_value(&draft).unwrap();

        assert_eq!(value["selectedSubject"], "math");
        assert_eq!(value["selectedBookingType"], "SINGLE");
        assert_eq!(value["teacherId"], "teacher-1");
        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["timestamp"], at("2026-03-01T10:00:00Z").timestamp_millis());
        assert_eq!(value["termsAccepted"], false);
    }

    #[test]
    fn test_partial_draft_fills_defaults() {
        let json = r#"{"selectedSubject":"math","currentStep":1,"teacherId":"teacher-1","timestamp":0}"#;
        let draft: PersistedDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.state.current_step, 1);
        assert!(draft.state.recurring_patterns.is_empty());
        assert!(draft.user_id.is_none());
    }

    #[test]
    fn test_debouncer_coalesces_writes() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let mut debouncer = DraftDebouncer::new(config().persist_debounce());

        let t0 = at("2026-03-01T10:00:00Z");
        debouncer.schedule(PersistedDraft::new(state_with_subject("math"), "teacher-1", None, t0), t0);
        let t1 = t0 + Duration::milliseconds(300);
        debouncer.schedule(PersistedDraft::new(state_with_subject("physics"), "teacher-1", None, t1), t1);

        assert!(!debouncer.flush_due(&store, t0 + Duration::milliseconds(600)).unwrap());
        assert!(storage.is_empty());

        assert!(debouncer.flush_due(&store, t1 + Duration::milliseconds(500)).unwrap());
        let saved = store.check("teacher-1", None, t1 + Duration::seconds(1)).into_draft().unwrap();
        assert_eq!(saved.state.selected_subject, "physics");
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancelled_write_never_lands() {
        let storage = InMemoryDraftStorage::new();
        let store = store(&storage);
        let mut debouncer = DraftDebouncer::new(config().persist_debounce());
        let t0 = at("2026-03-01T10:00:00Z");
        debouncer.schedule(PersistedDraft::new(state_with_subject("math"), "teacher-1", None, t0), t0);

        assert!(debouncer.cancel());
        assert!(!debouncer.flush_due(&store, t0 + Duration::seconds(5)).unwrap());
        assert!(storage.is_empty());
    }
}

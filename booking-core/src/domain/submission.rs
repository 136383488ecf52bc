//! # Booking submission
//!
//! Turns a completed flow into exactly one of three backend requests:
//!
//! 1. multi-slot package purchase, when a new tier was chosen with weekly patterns
//! 2. legacy single-pattern package, when a new tier was chosen without patterns
//! 3. regular booking (demo, single or existing package) on a concrete slot
//!
//! Every path carries an idempotency key. Keys are derived from the attempt
//! timestamp, and [`AttemptClock`] hands a retry of an unchanged selection
//! the timestamp of its first attempt so the server sees the same key.

use chrono::{DateTime, Duration, Utc};
use log::{error, info};
use shared::{
    BookingReceipt, BookingType, CreateBookingRequest, PurchaseMultiSlotPackageRequest, UserRole,
};

use super::flow::{BookingFlow, BookingFlowState};
use super::steps::{BOOKING_STEPS, STEP_COUNT};
use crate::api::SchedulingApi;
use crate::config::BookingConfig;
use crate::error::SubmissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    MultiSlotPackage,
    LegacyPackage,
    Demo,
    Single,
    ExistingPackage,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::MultiSlotPackage => "MULTI_SLOT_PACKAGE",
            SubmissionKind::LegacyPackage => "LEGACY_PACKAGE",
            SubmissionKind::Demo => "DEMO",
            SubmissionKind::Single => "SINGLE",
            SubmissionKind::ExistingPackage => "EXISTING_PACKAGE",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            SubmissionKind::MultiSlotPackage | SubmissionKind::LegacyPackage => {
                "Package purchased! Your sessions have been scheduled."
            }
            SubmissionKind::Demo => "Your demo session request was sent to the teacher.",
            SubmissionKind::Single | SubmissionKind::ExistingPackage => {
                "Your booking request was sent to the teacher."
            }
        }
    }
}

/// The request to send for a completed flow
#[derive(Debug, Clone, PartialEq)]
pub enum BookingSubmission {
    MultiSlotPurchase(PurchaseMultiSlotPackageRequest),
    LegacyPackage(CreateBookingRequest),
    Regular {
        kind: SubmissionKind,
        request: CreateBookingRequest,
    },
}

impl BookingSubmission {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            BookingSubmission::MultiSlotPurchase(_) => SubmissionKind::MultiSlotPackage,
            BookingSubmission::LegacyPackage(_) => SubmissionKind::LegacyPackage,
            BookingSubmission::Regular { kind, .. } => *kind,
        }
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        match self {
            BookingSubmission::MultiSlotPurchase(request) => Some(&request.idempotency_key),
            BookingSubmission::LegacyPackage(request) | BookingSubmission::Regular { request, .. } => {
                request.idempotency_key.as_deref()
            }
        }
    }
}

/// Build the request for a completed flow.
///
/// `submitted_at` is the attempt time; it seeds the idempotency key and is
/// the fallback start of a legacy package that has no suggested date.
pub fn build_submission(
    flow: &BookingFlow,
    config: &BookingConfig,
    timezone: &str,
    submitted_at: DateTime<Utc>,
) -> Result<BookingSubmission, SubmissionError> {
    if let Some(step) = (0..STEP_COUNT).find(|step| !flow.is_step_complete(*step)) {
        return Err(SubmissionError::Incomplete(BOOKING_STEPS[step].short_label));
    }

    let state = flow.state();
    let context = flow.context();
    let user_id = context
        .user_id
        .as_deref()
        .ok_or(SubmissionError::MissingSelection("signed-in user"))?;
    let option = state
        .selected_booking_option
        .as_ref()
        .ok_or(SubmissionError::MissingSelection("booking type"))?;
    let child_id = if context.is_parent() {
        state.selected_child_id.clone()
    } else {
        None
    };
    let stamp = submitted_at.timestamp_millis();

    if let Some(tier_id) = option.tier_id.as_deref() {
        let key = format!("{}-{}-{}-{}-{}", user_id, context.teacher_id, state.selected_subject, tier_id, stamp);

        if !state.recurring_patterns.is_empty() {
            let student_id = match &child_id {
                Some(child) => child.clone(),
                None => user_id.to_string(),
            };
            info!(
                "Submitting multi-slot package purchase: tier {} with {} patterns",
                tier_id,
                state.recurring_patterns.len()
            );
            return Ok(BookingSubmission::MultiSlotPurchase(PurchaseMultiSlotPackageRequest {
                student_id,
                teacher_id: context.teacher_id.clone(),
                subject_id: state.selected_subject.clone(),
                tier_id: tier_id.to_string(),
                recurring_patterns: state.recurring_patterns.clone(),
                idempotency_key: key,
                timezone: timezone.to_string(),
            }));
        }

        let start_time = state.suggested_dates.first().copied().unwrap_or(submitted_at);
        info!("Submitting legacy package purchase: tier {} starting {}", tier_id, start_time);
        return Ok(BookingSubmission::LegacyPackage(CreateBookingRequest {
            teacher_id: context.teacher_id.clone(),
            subject_id: state.selected_subject.clone(),
            child_id,
            start_time,
            end_time: start_time + Duration::minutes(config.session_duration_minutes as i64),
            price: option.price,
            package_id: None,
            tier_id: Some(tier_id.to_string()),
            is_demo: false,
            booking_notes: state.booking_notes.clone(),
            terms_accepted: state.terms_accepted,
            idempotency_key: Some(key),
        }));
    }

    let slot = state
        .selected_slot
        .as_ref()
        .ok_or(SubmissionError::MissingSelection("time slot"))?;
    let is_demo = option.booking_type == BookingType::Demo;
    let kind = if is_demo {
        SubmissionKind::Demo
    } else if option.package_id.is_some() {
        SubmissionKind::ExistingPackage
    } else {
        SubmissionKind::Single
    };
    let start_time = slot.start_time_utc;
    let key = format!(
        "{}-{}-{}-{}-{}",
        user_id,
        context.teacher_id,
        state.selected_subject,
        start_time.timestamp_millis(),
        stamp
    );
    info!("Submitting {} booking at {}", kind.as_str(), start_time);

    Ok(BookingSubmission::Regular {
        kind,
        request: CreateBookingRequest {
            teacher_id: context.teacher_id.clone(),
            subject_id: state.selected_subject.clone(),
            child_id,
            start_time,
            end_time: start_time + Duration::minutes(config.duration_for(is_demo) as i64),
            price: option.price,
            package_id: option.package_id.clone(),
            tier_id: None,
            is_demo,
            booking_notes: state.booking_notes.clone(),
            terms_accepted: state.terms_accepted,
            idempotency_key: Some(key),
        },
    })
}

/// Send the request; errors are returned for the caller to show as-is
pub async fn submit_booking<A: SchedulingApi + ?Sized>(
    api: &A,
    submission: &BookingSubmission,
) -> Result<BookingReceipt, SubmissionError> {
    let result = match submission {
        BookingSubmission::MultiSlotPurchase(request) => api.purchase_multi_slot_package(request).await,
        BookingSubmission::LegacyPackage(request) | BookingSubmission::Regular { request, .. } => {
            api.create_booking(request).await
        }
    };

    match result {
        Ok(receipt) => {
            info!(
                "Booking submitted ({}): {}",
                submission.kind().as_str(),
                receipt.readable_id.as_deref().or(receipt.id.as_deref()).unwrap_or("-")
            );
            Ok(receipt)
        }
        Err(e) => {
            error!("Booking submission failed ({}): {}", submission.kind().as_str(), e);
            Err(e.into())
        }
    }
}

/// Remembers the first attempt time for the selection being submitted
#[derive(Debug, Clone, Default)]
pub struct AttemptClock {
    attempt: Option<(String, DateTime<Utc>)>,
}

impl AttemptClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt time for `state`; unchanged selections keep their first stamp
    pub fn stamp(&mut self, state: &BookingFlowState, now: DateTime<Utc>) -> DateTime<Utc> {
        let fingerprint = serde_json::to_string(state).unwrap_or_default();
        match &self.attempt {
            Some((previous, at)) if *previous == fingerprint => *at,
            _ => {
                self.attempt = Some((fingerprint, now));
                now
            }
        }
    }

    /// Forget the attempt after a successful submission
    pub fn reset(&mut self) {
        self.attempt = None;
    }
}

/// Where to send the user once the booking went through
pub fn post_booking_destination(role: Option<UserRole>) -> &'static str {
    match role {
        Some(UserRole::Parent) => "/parent/bookings",
        _ => "/student/sessions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::{FlowContext, FlowUpdate};
    use crate::error::ApiError;
    use crate::test_utils::{at, available_response, demo_option, single_option, slot, tier_option, FakeSchedulingApi};
    use chrono::NaiveDate;
    use shared::{RecurringPattern, Weekday};

    fn config() -> BookingConfig {
        BookingConfig::default()
    }

    fn flow_for(role: UserRole, user: &str) -> BookingFlow {
        let mut flow = BookingFlow::new(FlowContext::signed_in("teacher-1", user, role), &config());
        flow.update_many([
            FlowUpdate::Subject("math-1".into()),
            FlowUpdate::TermsAccepted(true),
            FlowUpdate::Notes("Algebra revision".into()),
        ]);
        if role == UserRole::Parent {
            flow.update(FlowUpdate::ChildId(Some("child-7".into())));
        }
        flow
    }

    fn with_slot(flow: &mut BookingFlow) {
        flow.update_many([
            FlowUpdate::Date(Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())),
            FlowUpdate::Slot(Some(slot("2025-03-10T09:00:00Z", "11:00 AM"))),
        ]);
    }

    #[test]
    fn test_demo_booking_is_thirty_minutes() {
        let mut flow = flow_for(UserRole::Student, "user-1");
        flow.update(FlowUpdate::BookingOption(Some(demo_option())));
        with_slot(&mut flow);

        let submission = build_submission(&flow, &config(), "Africa/Khartoum", at("2025-03-01T08:00:00Z")).unwrap();
        let BookingSubmission::Regular { kind, request } = &submission else {
            panic!("expected a regular booking, got {:?}", submission);
        };
        assert_eq!(*kind, SubmissionKind::Demo);
        assert!(request.is_demo);
        assert_eq!(request.start_time, at("2025-03-10T09:00:00Z"));
        assert_eq!(request.end_time, at("2025-03-10T09:30:00Z"));
        assert_eq!(request.child_id, None);
        assert_eq!(request.booking_notes, "Algebra revision");
        assert!(submission.idempotency_key().is_some());
    }

    #[test]
    fn test_single_booking_for_parent_carries_child() {
        let mut flow = flow_for(UserRole::Parent, "parent-1");
        flow.update(FlowUpdate::BookingOption(Some(single_option(1500))));
        with_slot(&mut flow);

        let submission = build_submission(&flow, &config(), "UTC", at("2025-03-01T08:00:00Z")).unwrap();
        let BookingSubmission::Regular { kind, request } = submission else {
            panic!("expected a regular booking");
        };
        assert_eq!(kind, SubmissionKind::Single);
        assert_eq!(request.child_id.as_deref(), Some("child-7"));
        assert_eq!(request.price, 1500);
        assert_eq!(request.end_time - request.start_time, Duration::minutes(60));
    }

    #[test]
    fn test_multi_slot_purchase_for_parent_books_child() {
        let mut flow = flow_for(UserRole::Parent, "parent-1");
        flow.update_many([
            FlowUpdate::BookingOption(Some(tier_option("tier-8", 8))),
            FlowUpdate::RecurringPatterns(vec![
                RecurringPattern::new(Weekday::Sunday, "10:00"),
                RecurringPattern::new(Weekday::Wednesday, "17:00"),
            ]),
            FlowUpdate::AvailabilityResponse(Some(available_response(8))),
        ]);

        let submitted_at = at("2025-03-01T08:00:00Z");
        let submission = build_submission(&flow, &config(), "Africa/Khartoum", submitted_at).unwrap();
        let BookingSubmission::MultiSlotPurchase(request) = submission else {
            panic!("expected a package purchase");
        };
        assert_eq!(request.student_id, "child-7");
        assert_eq!(request.recurring_patterns.len(), 2);
        assert_eq!(request.timezone, "Africa/Khartoum");
        assert_eq!(
            request.idempotency_key,
            format!("parent-1-teacher-1-math-1-tier-8-{}", submitted_at.timestamp_millis())
        );
    }

    #[test]
    fn test_legacy_package_uses_first_suggested_date() {
        let mut flow = flow_for(UserRole::Student, "user-1");
        flow.update_many([
            FlowUpdate::BookingOption(Some(tier_option("tier-4", 4))),
            FlowUpdate::RecurringWeekday(Some(Weekday::Monday)),
            FlowUpdate::RecurringTime(Some("18:00".into())),
            FlowUpdate::SuggestedDates(vec![at("2025-03-10T15:00:00Z"), at("2025-03-17T15:00:00Z")]),
        ]);

        let submission = build_submission(&flow, &config(), "UTC", at("2025-03-01T08:00:00Z")).unwrap();
        assert_eq!(submission.kind(), SubmissionKind::LegacyPackage);
        let BookingSubmission::LegacyPackage(request) = submission else {
            panic!("expected a legacy package");
        };
        assert_eq!(request.start_time, at("2025-03-10T15:00:00Z"));
        assert_eq!(request.end_time, at("2025-03-10T16:00:00Z"));
        assert_eq!(request.tier_id.as_deref(), Some("tier-4"));
        assert!(!request.is_demo);
    }

    #[test]
    fn test_incomplete_flow_is_not_submitted() {
        let mut flow = flow_for(UserRole::Student, "user-1");
        flow.update(FlowUpdate::BookingOption(Some(single_option(1000))));
        let err = build_submission(&flow, &config(), "UTC", at("2025-03-01T08:00:00Z")).unwrap_err();
        assert_eq!(err, SubmissionError::Incomplete("Date & time"));
    }

    #[test]
    fn test_retry_reuses_first_attempt_stamp() {
        let mut flow = flow_for(UserRole::Student, "user-1");
        flow.update(FlowUpdate::BookingOption(Some(single_option(1000))));
        with_slot(&mut flow);

        let mut clock = AttemptClock::new();
        let first = clock.stamp(flow.state(), at("2025-03-01T08:00:00Z"));
        let retry = clock.stamp(flow.state(), at("2025-03-01T08:00:05Z"));
        assert_eq!(first, retry);

        let a = build_submission(&flow, &config(), "UTC", first).unwrap();
        let b = build_submission(&flow, &config(), "UTC", retry).unwrap();
        assert_eq!(a.idempotency_key(), b.idempotency_key());

        flow.update(FlowUpdate::Notes("Geometry instead".into()));
        assert_eq!(clock.stamp(flow.state(), at("2025-03-01T08:00:09Z")), at("2025-03-01T08:00:09Z"));

        clock.reset();
        assert_eq!(clock.stamp(flow.state(), at("2025-03-01T08:01:00Z")), at("2025-03-01T08:01:00Z"));
    }

    #[tokio::test]
    async fn test_backend_message_surfaces_verbatim() {
        let api = FakeSchedulingApi::new();
        api.set_create_booking_response(Err(ApiError::Http {
            status: 409,
            message: "This slot was just booked by someone else".into(),
        }));

        let mut flow = flow_for(UserRole::Student, "user-1");
        flow.update(FlowUpdate::BookingOption(Some(single_option(1000))));
        with_slot(&mut flow);
        let submission = build_submission(&flow, &config(), "UTC", at("2025-03-01T08:00:00Z")).unwrap();

        let err = submit_booking(&api, &submission).await.unwrap_err();
        assert_eq!(err.user_message(), "This slot was just booked by someone else");
        assert_eq!(api.create_booking_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_goes_to_package_endpoint() {
        let api = FakeSchedulingApi::new();
        let mut flow = flow_for(UserRole::Student, "user-1");
        flow.update_many([
            FlowUpdate::BookingOption(Some(tier_option("tier-8", 8))),
            FlowUpdate::RecurringPatterns(vec![RecurringPattern::new(Weekday::Sunday, "10:00")]),
            FlowUpdate::AvailabilityResponse(Some(available_response(8))),
        ]);
        let submission = build_submission(&flow, &config(), "UTC", at("2025-03-01T08:00:00Z")).unwrap();

        let receipt = submit_booking(&api, &submission).await.unwrap();
        assert!(receipt.id.is_some());
        let sent = api.purchase_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].student_id, "user-1");
        assert!(api.create_booking_requests().is_empty());
    }

    #[test]
    fn test_post_booking_destination() {
        assert_eq!(post_booking_destination(Some(UserRole::Parent)), "/parent/bookings");
        assert_eq!(post_booking_destination(Some(UserRole::Student)), "/student/sessions");
        assert_eq!(post_booking_destination(None), "/student/sessions");
    }
}

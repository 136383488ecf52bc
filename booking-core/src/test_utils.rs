//! Fixtures and an in-memory scheduling API for unit tests.

use std::cell::RefCell;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    ActivePackage, AvailabilityCalendar, AvailableSlotsResponse, BookingReceipt, BookingType, BookingTypeOption,
    CheckMultiSlotAvailabilityRequest, CheckRecurringAvailabilityRequest, CreateBookingRequest, DemoEligibility,
    MultiSlotAvailabilityResponse, PackageTier, PurchaseMultiSlotPackageRequest, RecurringAvailabilityResponse,
    ScheduledSession, SlotWithTimezone, TeacherAvailabilityWindow, UserProfile, UserRole,
};

use crate::api::SchedulingApi;
use crate::error::ApiError;

pub fn at(iso: &str) -> DateTime<Utc> {
    iso.parse().expect("valid RFC 3339 timestamp")
}

pub fn slot(start_utc: &str, label: &str) -> SlotWithTimezone {
    let start = at(start_utc);
    SlotWithTimezone {
        start_time_utc: start,
        label: label.to_string(),
        user_date: start.date_naive(),
    }
}

fn option(booking_type: BookingType, price: u64) -> BookingTypeOption {
    BookingTypeOption {
        booking_type,
        enabled: true,
        reason: None,
        package_id: None,
        tier_id: None,
        price,
        display_price: None,
        original_price: None,
        discount_percent: None,
        savings: None,
        session_count: Some(1),
        sessions_remaining: None,
        expires_at: None,
        is_recommended: false,
        recurring_ratio: None,
    }
}

pub fn single_option(price: u64) -> BookingTypeOption {
    option(BookingType::Single, price)
}

pub fn demo_option() -> BookingTypeOption {
    option(BookingType::Demo, 0)
}

pub fn tier_option(tier_id: &str, sessions: u32) -> BookingTypeOption {
    BookingTypeOption {
        tier_id: Some(tier_id.to_string()),
        session_count: Some(sessions),
        recurring_ratio: Some(1.0),
        ..option(BookingType::Package, 900 * sessions as u64)
    }
}

/// Positive multi-slot result placing `sessions` weekly sessions
pub fn available_response(sessions: u32) -> MultiSlotAvailabilityResponse {
    MultiSlotAvailabilityResponse {
        available: true,
        patterns: Vec::new(),
        scheduled_sessions: (1..=sessions)
            .map(|n| ScheduledSession {
                session_number: n,
                date: format!("2026-03-{:02}", n),
                weekday: None,
                time: "10:00".to_string(),
            })
            .collect(),
        total_weeks_needed: sessions,
        first_session: Some("2026-03-01".to_string()),
        last_session: None,
        package_end_date: None,
        message: String::new(),
    }
}

/// Scheduling API double: canned responses, recorded requests
#[derive(Default)]
pub struct FakeSchedulingApi {
    slots: RefCell<Vec<SlotWithTimezone>>,
    multi_slot_response: RefCell<Option<Result<MultiSlotAvailabilityResponse, ApiError>>>,
    recurring_response: RefCell<Option<Result<RecurringAvailabilityResponse, ApiError>>>,
    create_booking_response: RefCell<Option<Result<BookingReceipt, ApiError>>>,
    multi_slot_requests: RefCell<Vec<CheckMultiSlotAvailabilityRequest>>,
    create_booking_requests: RefCell<Vec<CreateBookingRequest>>,
    purchase_requests: RefCell<Vec<PurchaseMultiSlotPackageRequest>>,
}

impl FakeSchedulingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_slots(&self, slots: Vec<SlotWithTimezone>) {
        *self.slots.borrow_mut() = slots;
    }

    pub fn set_multi_slot_response(&self, response: Result<MultiSlotAvailabilityResponse, ApiError>) {
        *self.multi_slot_response.borrow_mut() = Some(response);
    }

    pub fn set_recurring_response(&self, response: Result<RecurringAvailabilityResponse, ApiError>) {
        *self.recurring_response.borrow_mut() = Some(response);
    }

    pub fn set_create_booking_response(&self, response: Result<BookingReceipt, ApiError>) {
        *self.create_booking_response.borrow_mut() = Some(response);
    }

    pub fn multi_slot_requests(&self) -> Vec<CheckMultiSlotAvailabilityRequest> {
        self.multi_slot_requests.borrow().clone()
    }

    pub fn create_booking_requests(&self) -> Vec<CreateBookingRequest> {
        self.create_booking_requests.borrow().clone()
    }

    pub fn purchase_requests(&self) -> Vec<PurchaseMultiSlotPackageRequest> {
        self.purchase_requests.borrow().clone()
    }

    fn receipt(id: &str) -> BookingReceipt {
        BookingReceipt {
            id: Some(id.to_string()),
            readable_id: Some(format!("BK-{}", id)),
            status: Some("PENDING_TEACHER_APPROVAL".to_string()),
        }
    }
}

#[async_trait(?Send)]
impl SchedulingApi for FakeSchedulingApi {
    async fn get_available_slots(
        &self,
        _teacher_id: &str,
        date: NaiveDate,
        _user_timezone: &str,
    ) -> Result<AvailableSlotsResponse, ApiError> {
        let slots = self
            .slots
            .borrow()
            .iter()
            .filter(|s| s.user_date == date)
            .cloned()
            .collect();
        Ok(AvailableSlotsResponse {
            slots,
            teacher_timezone: Some("Africa/Khartoum".to_string()),
            user_timezone: None,
        })
    }

    async fn get_availability_calendar(
        &self,
        _teacher_id: &str,
        _year_month: &str,
        _subject_id: &str,
    ) -> Result<AvailabilityCalendar, ApiError> {
        let mut available_dates: Vec<NaiveDate> = self.slots.borrow().iter().map(|s| s.user_date).collect();
        available_dates.dedup();
        Ok(AvailabilityCalendar {
            available_dates,
            fully_booked_dates: Vec::new(),
            next_available_slot: None,
        })
    }

    async fn get_teacher_weekly_availability(
        &self,
        _teacher_id: &str,
    ) -> Result<Vec<TeacherAvailabilityWindow>, ApiError> {
        Ok(Vec::new())
    }

    async fn check_multi_slot_availability(
        &self,
        request: &CheckMultiSlotAvailabilityRequest,
    ) -> Result<MultiSlotAvailabilityResponse, ApiError> {
        self.multi_slot_requests.borrow_mut().push(request.clone());
        self.multi_slot_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(available_response(request.recurring_session_count)))
    }

    async fn check_recurring_availability(
        &self,
        _request: &CheckRecurringAvailabilityRequest,
    ) -> Result<RecurringAvailabilityResponse, ApiError> {
        self.recurring_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(ApiError::Network("no response configured".to_string())))
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<BookingReceipt, ApiError> {
        self.create_booking_requests.borrow_mut().push(request.clone());
        self.create_booking_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(Self::receipt("booking-1")))
    }

    async fn purchase_multi_slot_package(
        &self,
        request: &PurchaseMultiSlotPackageRequest,
    ) -> Result<BookingReceipt, ApiError> {
        self.purchase_requests.borrow_mut().push(request.clone());
        Ok(Self::receipt("package-1"))
    }

    async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        Ok(UserProfile {
            id: "user-1".to_string(),
            email: Some("student@example.com".to_string()),
            role: UserRole::Student,
            parent_profile: None,
        })
    }

    async fn get_package_tiers(&self) -> Result<Vec<PackageTier>, ApiError> {
        Ok(Vec::new())
    }

    async fn check_demo_eligibility(&self, _teacher_id: &str) -> Result<DemoEligibility, ApiError> {
        Ok(DemoEligibility {
            allowed: true,
            reason: None,
        })
    }

    async fn get_active_package(
        &self,
        _teacher_id: &str,
        _subject_id: &str,
    ) -> Result<Option<ActivePackage>, ApiError> {
        Ok(None)
    }
}

//! # Scheduling API port
//!
//! The backend operations the booking core consumes. The browser client
//! implements this over HTTP; tests use an in-memory double.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    ActivePackage, AvailabilityCalendar, AvailableSlotsResponse, BookingReceipt,
    CheckMultiSlotAvailabilityRequest, CheckRecurringAvailabilityRequest, CreateBookingRequest,
    DemoEligibility, MultiSlotAvailabilityResponse, PackageTier, PurchaseMultiSlotPackageRequest,
    RecurringAvailabilityResponse, TeacherAvailabilityWindow, UserProfile,
};

use crate::error::ApiError;

/// Backend operations used by the booking flow.
///
/// Futures are not required to be `Send`; the browser runs them on the
/// single-threaded executor.
#[async_trait(?Send)]
pub trait SchedulingApi {
    /// Concrete slots for one day, labelled in the viewer's timezone
    async fn get_available_slots(
        &self,
        teacher_id: &str,
        date: NaiveDate,
        user_timezone: &str,
    ) -> Result<AvailableSlotsResponse, ApiError>;

    /// Month calendar; `year_month` is `YYYY-MM`
    async fn get_availability_calendar(
        &self,
        teacher_id: &str,
        year_month: &str,
        subject_id: &str,
    ) -> Result<AvailabilityCalendar, ApiError>;

    /// Declared weekly open-hours windows
    async fn get_teacher_weekly_availability(
        &self,
        teacher_id: &str,
    ) -> Result<Vec<TeacherAvailabilityWindow>, ApiError>;

    async fn check_multi_slot_availability(
        &self,
        request: &CheckMultiSlotAvailabilityRequest,
    ) -> Result<MultiSlotAvailabilityResponse, ApiError>;

    async fn check_recurring_availability(
        &self,
        request: &CheckRecurringAvailabilityRequest,
    ) -> Result<RecurringAvailabilityResponse, ApiError>;

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<BookingReceipt, ApiError>;

    async fn purchase_multi_slot_package(
        &self,
        request: &PurchaseMultiSlotPackageRequest,
    ) -> Result<BookingReceipt, ApiError>;

    async fn get_profile(&self) -> Result<UserProfile, ApiError>;

    async fn get_package_tiers(&self) -> Result<Vec<PackageTier>, ApiError>;

    async fn check_demo_eligibility(&self, teacher_id: &str) -> Result<DemoEligibility, ApiError>;

    async fn get_active_package(
        &self,
        teacher_id: &str,
        subject_id: &str,
    ) -> Result<Option<ActivePackage>, ApiError>;
}

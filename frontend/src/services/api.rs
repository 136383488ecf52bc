use async_trait::async_trait;
use booking_core::api::SchedulingApi;
use booking_core::ApiError;
use chrono::NaiveDate;
use gloo::net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    ActivePackage, ApiErrorBody, AvailabilityCalendar, AvailableSlotsResponse, BookingReceipt,
    CheckMultiSlotAvailabilityRequest, CheckRecurringAvailabilityRequest, CreateBookingRequest,
    DemoEligibility, MultiSlotAvailabilityResponse, PackageTier, PurchaseMultiSlotPackageRequest,
    RecurringAvailabilityResponse, TeacherAvailabilityWindow, TeacherBookingProfile, UserProfile,
};
use web_sys::RequestCredentials;

const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// HTTP client for the scheduling backend
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Base URL from `BOOKING_API_URL` at build time, or the local default
    pub fn new() -> Self {
        Self {
            base_url: option_env!("BOOKING_API_URL")
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Session cookies ride along on every call
    fn get(&self, path: &str) -> RequestBuilder {
        Request::get(&self.url(path)).credentials(RequestCredentials::Include)
    }

    async fn get_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = Request::post(&self.url(path))
            .credentials(RequestCredentials::Include)
            .json(body)
            .map_err(|e| ApiError::Parse(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response).await
    }

    /// Public teacher profile with subjects, settings and open hours
    pub async fn get_teacher_booking_profile(&self, teacher_id: &str) -> Result<TeacherBookingProfile, ApiError> {
        self.get_json(self.get(&format!("/marketplace/teachers/{}/profile", teacher_id)))
            .await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a success body, or turn an error body into [`ApiError::Http`]
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.ok() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(ApiError::Http {
            status,
            message: error_message(status, &text),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Server text from `{"message": ...}`, else a status line
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.message_text())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

#[async_trait(?Send)]
impl SchedulingApi for ApiClient {
    async fn get_available_slots(
        &self,
        teacher_id: &str,
        date: NaiveDate,
        user_timezone: &str,
    ) -> Result<AvailableSlotsResponse, ApiError> {
        let date = date.format("%Y-%m-%d").to_string();
        let builder = self
            .get(&format!("/marketplace/teachers/{}/available-slots", teacher_id))
            .query([("date", date.as_str()), ("userTimezone", user_timezone)]);
        self.get_json(builder).await
    }

    async fn get_availability_calendar(
        &self,
        teacher_id: &str,
        year_month: &str,
        subject_id: &str,
    ) -> Result<AvailabilityCalendar, ApiError> {
        let builder = self
            .get(&format!("/marketplace/teachers/{}/availability-calendar", teacher_id))
            .query([("month", year_month), ("subjectId", subject_id)]);
        self.get_json(builder).await
    }

    async fn get_teacher_weekly_availability(
        &self,
        teacher_id: &str,
    ) -> Result<Vec<TeacherAvailabilityWindow>, ApiError> {
        self.get_json(self.get(&format!("/marketplace/teachers/{}/availability", teacher_id)))
            .await
    }

    async fn check_multi_slot_availability(
        &self,
        request: &CheckMultiSlotAvailabilityRequest,
    ) -> Result<MultiSlotAvailabilityResponse, ApiError> {
        self.post_json("/packages/smart-pack/check-multi-slot-availability", request)
            .await
    }

    async fn check_recurring_availability(
        &self,
        request: &CheckRecurringAvailabilityRequest,
    ) -> Result<RecurringAvailabilityResponse, ApiError> {
        let session_count = request.session_count.to_string();
        let duration = request.duration.to_string();
        let builder = self
            .get(&format!(
                "/marketplace/teachers/{}/availability/check-recurring",
                request.teacher_id
            ))
            .query([
                ("weekday", request.weekday.as_str()),
                ("time", request.time.as_str()),
                ("sessionCount", session_count.as_str()),
                ("duration", duration.as_str()),
            ]);
        self.get_json(builder).await
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<BookingReceipt, ApiError> {
        self.post_json("/bookings", request).await
    }

    async fn purchase_multi_slot_package(
        &self,
        request: &PurchaseMultiSlotPackageRequest,
    ) -> Result<BookingReceipt, ApiError> {
        self.post_json("/packages/smart-pack/purchase", request).await
    }

    async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json(self.get("/auth/profile")).await
    }

    async fn get_package_tiers(&self) -> Result<Vec<PackageTier>, ApiError> {
        self.get_json(self.get("/packages/tiers")).await
    }

    async fn check_demo_eligibility(&self, teacher_id: &str) -> Result<DemoEligibility, ApiError> {
        self.get_json(self.get(&format!("/packages/demo/check/{}", teacher_id)))
            .await
    }

    async fn get_active_package(
        &self,
        teacher_id: &str,
        subject_id: &str,
    ) -> Result<Option<ActivePackage>, ApiError> {
        let builder = self
            .get("/packages/my")
            .query([("teacherId", teacher_id), ("subjectId", subject_id), ("status", "ACTIVE")]);
        let mut packages: Vec<ActivePackage> = self.get_json(builder).await?;
        // prefer a package that can still be drawn on
        packages.sort_by_key(|p| p.sessions_remaining() == 0);
        Ok(packages.into_iter().next())
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of purchasable booking offered to the student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingType {
    /// Free introductory session
    Demo,
    /// One paid session at the subject's base price
    Single,
    /// Multi-session package, either pre-purchased or bought now
    Package,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Demo => "DEMO",
            BookingType::Single => "SINGLE",
            BookingType::Package => "PACKAGE",
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week as the scheduling backend names it (week starts on Sunday)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All weekdays in display order, Sunday first
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Sunday => "SUNDAY",
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
        }
    }

    /// Human-readable English label
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    pub fn short_label(&self) -> &'static str {
        &self.label()[..3]
    }

    /// Parse a weekday name case-insensitively ("monday", "MONDAY", "Monday")
    pub fn parse(value: &str) -> Option<Weekday> {
        let upper = value.trim().to_ascii_uppercase();
        Weekday::ALL.into_iter().find(|day| day.as_str() == upper)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Weekday::Sunday,
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of the authenticated account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Parent,
    Student,
    Teacher,
    Admin,
    #[serde(other)]
    Other,
}

/// One purchasable entry of the booking-type catalog.
///
/// At most one of `package_id` (pre-purchased package) and `tier_id`
/// (new package purchase) is set. Neither set means single or demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingTypeOption {
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_id: Option<String>,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub is_recommended: bool,
    /// Share of the package scheduled on a fixed weekly pattern, e.g. 0.8
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_ratio: Option<f64>,
}

impl BookingTypeOption {
    /// True when choosing this option buys a new package and triggers the weekly-pattern flow
    pub fn is_new_package_purchase(&self) -> bool {
        self.tier_id.is_some()
    }

    /// True when the option draws on a package the student already owns
    pub fn is_existing_package(&self) -> bool {
        self.package_id.is_some()
    }

    /// Both identifiers set is the one shape the catalog never produces
    pub fn has_valid_package_reference(&self) -> bool {
        !(self.package_id.is_some() && self.tier_id.is_some())
    }

    /// Sessions that the weekly pattern has to place: `round(sessionCount × recurringRatio)`
    pub fn recurring_session_count(&self) -> u32 {
        let count = self.session_count.unwrap_or(0);
        let ratio = self.recurring_ratio.unwrap_or(1.0).clamp(0.0, 1.0);
        (count as f64 * ratio).round() as u32
    }

    /// Same catalog entry, compared by identity rather than display fields
    pub fn same_entry(&self, other: &BookingTypeOption) -> bool {
        if self.booking_type != other.booking_type {
            return false;
        }
        match (&self.tier_id, &other.tier_id, &self.package_id, &other.package_id) {
            (Some(a), Some(b), _, _) => a == b,
            (None, None, Some(a), Some(b)) => a == b,
            (None, None, None, None) => true,
            _ => false,
        }
    }
}

/// A concrete bookable time, as returned by the slot endpoint.
///
/// `start_time_utc` is the only identity key; `label` is locale-formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotWithTimezone {
    pub start_time_utc: DateTime<Utc>,
    pub label: String,
    pub user_date: NaiveDate,
}

impl SlotWithTimezone {
    pub fn same_slot(&self, other: &SlotWithTimezone) -> bool {
        self.start_time_utc == other.start_time_utc
    }
}

/// A weekly (weekday, "HH:mm") pair in the multi-slot selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecurringPattern {
    pub weekday: Weekday,
    pub time: String,
}

impl RecurringPattern {
    pub fn new(weekday: Weekday, time: impl Into<String>) -> Self {
        Self {
            weekday,
            time: time.into(),
        }
    }

    pub fn matches(&self, weekday: Weekday, time: &str) -> bool {
        self.weekday == weekday && self.time == time
    }
}

/// A session placed by the server when all patterns are clear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    pub session_number: u32,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConflict {
    pub date: String,
    pub reason: String,
}

/// Per-pattern result of a multi-slot availability check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAvailability {
    pub weekday: Weekday,
    pub time: String,
    #[serde(default)]
    pub available_weeks: u32,
    #[serde(default)]
    pub conflicts: Vec<PatternConflict>,
}

/// Server answer to a multi-slot availability check.
///
/// Either globally available with a full schedule, or not available with
/// per-pattern conflicts. Partial availability is never bookable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSlotAvailabilityResponse {
    pub available: bool,
    #[serde(default)]
    pub patterns: Vec<PatternAvailability>,
    #[serde(default)]
    pub scheduled_sessions: Vec<ScheduledSession>,
    #[serde(default)]
    pub total_weeks_needed: u32,
    #[serde(default)]
    pub first_session: Option<String>,
    #[serde(default)]
    pub last_session: Option<String>,
    #[serde(default)]
    pub package_end_date: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl MultiSlotAvailabilityResponse {
    /// Negative, conflict-free result used when the check itself failed
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            available: false,
            patterns: Vec::new(),
            scheduled_sessions: Vec::new(),
            total_weeks_needed: 0,
            first_session: None,
            last_session: None,
            package_end_date: None,
            message: message.into(),
        }
    }

    pub fn conflict_count(&self) -> usize {
        self.patterns.iter().map(|p| p.conflicts.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMultiSlotAvailabilityRequest {
    pub teacher_id: String,
    pub patterns: Vec<RecurringPattern>,
    pub recurring_session_count: u32,
    pub duration: u32,
}

/// Legacy single weekday/time availability check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecurringAvailabilityRequest {
    pub teacher_id: String,
    pub weekday: Weekday,
    pub time: String,
    pub session_count: u32,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringAvailabilityResponse {
    pub available: bool,
    #[serde(default)]
    pub conflicts: Vec<PatternConflict>,
    #[serde(default)]
    pub suggested_dates: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub package_end_date: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RecurringAvailabilityResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            available: false,
            conflicts: Vec::new(),
            suggested_dates: Vec::new(),
            package_end_date: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsResponse {
    #[serde(default)]
    pub slots: Vec<SlotWithTimezone>,
    #[serde(default)]
    pub teacher_timezone: Option<String>,
    #[serde(default)]
    pub user_timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAvailableSlot {
    pub date: NaiveDate,
    pub display: String,
    pub start_time_utc: DateTime<Utc>,
}

/// Month-level availability for the schedule step calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCalendar {
    #[serde(default)]
    pub available_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub fully_booked_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub next_available_slot: Option<NextAvailableSlot>,
}

impl AvailabilityCalendar {
    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.available_dates.contains(&date)
    }

    pub fn is_fully_booked(&self, date: NaiveDate) -> bool {
        self.fully_booked_dates.contains(&date)
    }
}

/// One declared open-hours window of the teacher's weekly schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAvailabilityWindow {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
}

/// Create a booking request (single, demo, existing package, legacy package purchase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub teacher_id: String,
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_id: Option<String>,
    pub is_demo: bool,
    pub booking_notes: String,
    pub terms_accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

/// Purchase a new package scheduled on one or more weekly patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseMultiSlotPackageRequest {
    pub student_id: String,
    pub teacher_id: String,
    pub subject_id: String,
    pub tier_id: String,
    pub recurring_patterns: Vec<RecurringPattern>,
    pub idempotency_key: String,
    pub timezone: String,
}

/// Minimal acknowledgement returned by booking creation and package purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub readable_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub grade_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParentProfile {
    #[serde(default)]
    pub children: Vec<ChildSummary>,
}

/// Authenticated account profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub parent_profile: Option<ParentProfile>,
}

impl UserProfile {
    pub fn children(&self) -> &[ChildSummary] {
        self.parent_profile
            .as_ref()
            .map(|p| p.children.as_slice())
            .unwrap_or(&[])
    }

    /// Display name derived from the email's local part
    pub fn display_name(&self) -> String {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .unwrap_or_default()
            .to_string()
    }
}

/// Package tier configured by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageTier {
    pub id: String,
    pub session_count: u32,
    pub discount_percent: f64,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub recurring_ratio: Option<f64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    Active,
    Depleted,
    Expired,
    Cancelled,
    #[serde(other)]
    Other,
}

/// A package the student already owns with this teacher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePackage {
    pub id: String,
    pub session_count: u32,
    pub sessions_used: u32,
    pub status: PackageStatus,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl ActivePackage {
    pub fn sessions_remaining(&self) -> u32 {
        self.session_count.saturating_sub(self.sessions_used)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoEligibility {
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Platform-wide feature switches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub demos_enabled: bool,
    pub packages_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSettings {
    pub demo_enabled: bool,
}

/// Subject offered by the teacher, with the per-session price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherSubject {
    pub id: String,
    pub name: String,
    pub price: u64,
}

/// What the booking modal needs to know about the teacher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherBookingProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub subjects: Vec<TeacherSubject>,
    pub global_settings: PlatformSettings,
    pub teacher_settings: TeacherSettings,
    #[serde(default)]
    pub package_tiers: Vec<PackageTier>,
    #[serde(default)]
    pub availability: Vec<TeacherAvailabilityWindow>,
}

/// Error body produced by the backend; `message` may be a string or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: serde_json::Value,
}

impl ApiErrorBody {
    pub fn message_text(&self) -> Option<String> {
        match &self.message {
            serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
            serde_json::Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            _ => None,
        }
    }
}

/// Static description of one wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingStep {
    pub id: usize,
    pub label: &'static str,
    pub short_label: &'static str,
    /// Fields the step always requires; schedule and details add dynamic ones
    pub required_fields: &'static [&'static str],
    pub guest_allowed: bool,
}

pub const STEP_SUBJECT: usize = 0;
pub const STEP_BOOKING_TYPE: usize = 1;
pub const STEP_SCHEDULE: usize = 2;
pub const STEP_DETAILS: usize = 3;

/// First step a guest may not enter
pub const FIRST_AUTH_STEP: usize = STEP_DETAILS;

/// Steps wired into the multi-step modal
pub const BOOKING_STEPS: [BookingStep; 4] = [
    BookingStep {
        id: STEP_SUBJECT,
        label: "Choose a subject",
        short_label: "Subject",
        required_fields: &["selectedSubject"],
        guest_allowed: true,
    },
    BookingStep {
        id: STEP_BOOKING_TYPE,
        label: "Choose number of sessions",
        short_label: "Sessions",
        required_fields: &["selectedBookingType", "selectedBookingOption"],
        guest_allowed: true,
    },
    BookingStep {
        id: STEP_SCHEDULE,
        label: "Pick date and time",
        short_label: "Date & time",
        required_fields: &[],
        guest_allowed: true,
    },
    BookingStep {
        id: STEP_DETAILS,
        label: "Details and confirmation",
        short_label: "Confirm",
        required_fields: &["termsAccepted"],
        guest_allowed: false,
    },
];

/// Review block shown inside the details step; not counted in the modal
pub const REVIEW_STEP: BookingStep = BookingStep {
    id: 4,
    label: "Booking summary",
    short_label: "Review",
    required_fields: &["termsAccepted"],
    guest_allowed: false,
};

pub const STEP_COUNT: usize = BOOKING_STEPS.len();
pub const LAST_STEP: usize = STEP_COUNT - 1;

pub fn step(index: usize) -> Option<&'static BookingStep> {
    BOOKING_STEPS.get(index)
}

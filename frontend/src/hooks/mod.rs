pub mod use_availability_negotiator;
pub mod use_available_slots;
pub mod use_booking_flow;
pub mod use_booking_options;
pub mod use_teacher_profile;
pub mod use_toast;
pub mod use_user_profile;
pub mod use_weekly_availability;

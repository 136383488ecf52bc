pub mod availability_calendar;
pub mod booking_modal;
pub mod login_checkpoint;
pub mod progress_indicator;
pub mod recurring_pattern_selector;
pub mod resume_prompt;
pub mod steps;
pub mod toast;
pub mod weekly_availability_grid;

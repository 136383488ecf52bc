pub mod booking_type_step;
pub mod details_step;
pub mod review_summary;
pub mod schedule_step;
pub mod subject_step;

pub use booking_type_step::BookingTypeStep;
pub use details_step::DetailsStep;
pub use review_summary::ReviewSummary;
pub use schedule_step::ScheduleStep;
pub use subject_step::SubjectStep;

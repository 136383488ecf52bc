//! # Booking Core
//!
//! Platform-independent core of the tutoring booking wizard: the booking-type
//! catalog, the weekly availability negotiation, the step state machine with
//! draft persistence, and submission payload building.
//!
//! Everything that touches the network or the browser goes through the
//! [`api::SchedulingApi`] and [`storage::DraftStorage`] ports so the rules can
//! be exercised natively.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::BookingConfig;
pub use domain::flow::{BookingFlow, BookingFlowState, FlowContext, FlowUpdate, StepAdvance};
pub use error::{ApiError, StorageError, SubmissionError};

//! Durable client storage used for the booking draft.

pub mod memory;
pub mod traits;

pub use memory::InMemoryDraftStorage;
pub use traits::DraftStorage;

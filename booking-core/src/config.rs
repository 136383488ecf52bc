use chrono::Duration;
use serde::Deserialize;

use crate::error::ConfigError;

/// Tunables of the booking flow.
///
/// Every field has a default so a partial JSON document is enough to
/// override a single value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingConfig {
    pub draft_storage_key: String,
    pub draft_ttl_minutes: i64,
    pub persist_debounce_ms: u32,
    pub max_recurring_slots: usize,
    pub session_duration_minutes: u32,
    pub demo_duration_minutes: u32,
    pub notes_limit_modal: usize,
    pub notes_limit_quick: usize,
    pub currency: String,
    pub grid_start_hour: u32,
    pub grid_end_hour: u32,
    pub log_level: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            draft_storage_key: "pendingBooking".to_string(),
            draft_ttl_minutes: 30,
            persist_debounce_ms: 500,
            max_recurring_slots: 4,
            session_duration_minutes: 60,
            demo_duration_minutes: 30,
            notes_limit_modal: 1000,
            notes_limit_quick: 300,
            currency: "SDG".to_string(),
            grid_start_hour: 8,
            grid_end_hour: 22,
            log_level: "info".to_string(),
        }
    }
}

impl BookingConfig {
    /// Parse a (possibly partial) JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BookingConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.draft_storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("draftStorageKey must not be empty"));
        }
        if self.draft_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid("draftTtlMinutes must be positive"));
        }
        if self.max_recurring_slots == 0 {
            return Err(ConfigError::Invalid("maxRecurringSlots must be at least 1"));
        }
        if self.grid_start_hour > self.grid_end_hour || self.grid_end_hour > 23 {
            return Err(ConfigError::Invalid("grid hours must satisfy start <= end <= 23"));
        }
        Ok(())
    }

    pub fn draft_ttl(&self) -> Duration {
        Duration::minutes(self.draft_ttl_minutes)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::milliseconds(self.persist_debounce_ms as i64)
    }

    /// Session length for the chosen booking kind
    pub fn duration_for(&self, is_demo: bool) -> u32 {
        if is_demo {
            self.demo_duration_minutes
        } else {
            self.session_duration_minutes
        }
    }

    /// Notes cap; the quick booking entry point allows less text
    pub fn notes_limit_for(&self, quick_booking: bool) -> usize {
        if quick_booking {
            self.notes_limit_quick
        } else {
            self.notes_limit_modal
        }
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_ascii_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

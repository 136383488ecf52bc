//! Selectable weekly grid built from the teacher's declared open hours.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use shared::{TeacherAvailabilityWindow, Weekday};

/// Which (weekday, start time) cells can host a full session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeeklyGrid {
    time_slots: Vec<String>,
    cells: BTreeMap<Weekday, BTreeSet<String>>,
}

impl WeeklyGrid {
    /// Expand open-hours windows into discrete cells.
    ///
    /// A candidate start time is selectable when it lies inside a window
    /// and the window still has `session_minutes` of room after it.
    pub fn build(
        windows: &[TeacherAvailabilityWindow],
        time_slots: Vec<String>,
        session_minutes: u32,
    ) -> Self {
        let mut cells: BTreeMap<Weekday, BTreeSet<String>> = BTreeMap::new();

        for window in windows {
            let Some(weekday) = Weekday::parse(&window.day_of_week) else {
                warn!("Skipping availability window with unknown day '{}'", window.day_of_week);
                continue;
            };
            let (Some(start), Some(end)) = (
                parse_minutes(&window.start_time),
                parse_minutes(&window.end_time),
            ) else {
                warn!(
                    "Skipping availability window with bad times {}-{} on {}",
                    window.start_time, window.end_time, weekday
                );
                continue;
            };

            for slot in &time_slots {
                let Some(slot_start) = parse_minutes(slot) else {
                    continue;
                };
                if slot_start >= start && slot_start + session_minutes <= end {
                    cells.entry(weekday).or_default().insert(slot.clone());
                }
            }
        }

        Self { time_slots, cells }
    }

    /// Candidate start times on the hour, `start_hour..=end_hour`
    pub fn hourly_slots(start_hour: u32, end_hour: u32) -> Vec<String> {
        (start_hour..=end_hour).map(|h| format!("{:02}:00", h)).collect()
    }

    pub fn time_slots(&self) -> &[String] {
        &self.time_slots
    }

    pub fn is_available(&self, weekday: Weekday, time: &str) -> bool {
        self.cells
            .get(&weekday)
            .map(|times| times.contains(time))
            .unwrap_or(false)
    }

    pub fn available_times(&self, weekday: Weekday) -> Vec<&str> {
        self.cells
            .get(&weekday)
            .map(|times| times.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Weekdays with at least one selectable cell, Sunday first
    pub fn available_weekdays(&self) -> Vec<Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(|day| self.cells.get(day).map(|t| !t.is_empty()).unwrap_or(false))
            .collect()
    }

    pub fn has_any(&self) -> bool {
        self.cells.values().any(|times| !times.is_empty())
    }
}

/// "HH:mm" or "HH:mm:ss" to minutes after midnight; "24:00" is end of day
pub fn parse_minutes(value: &str) -> Option<u32> {
    let mut parts = value.trim().split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    if let Some(seconds) = parts.next() {
        seconds.parse::<u32>().ok()?;
    }
    if minutes >= 60 || hours > 24 || (hours == 24 && minutes > 0) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// 24h "HH:mm" to "h:mm AM/PM"
pub fn format_time_display(time: &str) -> String {
    match parse_minutes(time) {
        Some(total) => {
            let hours = (total / 60) % 24;
            let minutes = total % 60;
            let period = if hours >= 12 { "PM" } else { "AM" };
            let display_hours = match hours % 12 {
                0 => 12,
                h => h,
            };
            format!("{}:{:02} {}", display_hours, minutes, period)
        }
        None => time.to_string(),
    }
}

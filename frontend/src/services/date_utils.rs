use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use js_sys::Date;

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "January",
    }
}

/// Browser clock as a UTC instant
pub fn now_utc() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(Date::now() as i64)
        .single()
        .unwrap_or_default()
}

/// Today in the viewer's local calendar
pub fn today() -> NaiveDate {
    let now = Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_else(|| now_utc().date_naive())
}

/// IANA timezone of the browser, e.g. "Africa/Khartoum"
pub fn user_timezone() -> String {
    let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
    js_sys::Reflect::get(&format.resolved_options(), &"timeZone".into())
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| "UTC".to_string())
}

/// "Monday, March 10"
pub fn format_date_for_display(date: NaiveDate) -> String {
    let weekday = shared::Weekday::from(date.weekday());
    format!("{}, {} {}", weekday.label(), month_name(date.month()), date.day())
}

/// "2026-03-10" as "March 10, 2026"; other text is returned unchanged
pub fn format_iso_date(value: &str) -> String {
    let date_part = value.split('T').next().unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => format!("{} {}, {}", month_name(date.month()), date.day(), date.year()),
        Err(_) => value.to_string(),
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}

/// Month laid out Sunday-first; `None` pads the first week
pub fn month_cells(year: i32, month: u32) -> Vec<Option<NaiveDate>> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let leading = first.weekday().num_days_from_sunday() as usize;
    let mut cells = vec![None; leading];
    cells.extend((1..=days_in_month(year, month)).map(|day| NaiveDate::from_ymd_opt(year, month, day)));
    cells
}

use booking_core::domain::negotiator::{LegacyPatternNegotiator, LegacySelection};
use booking_core::domain::weekly_grid::format_time_display;
use chrono::{DateTime, Utc};
use shared::Weekday;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::hooks::use_availability_negotiator::use_legacy_pattern;
use crate::services::api::ApiClient;
use crate::services::date_utils::{format_date_for_display, format_iso_date};

#[derive(Properties, PartialEq)]
pub struct RecurringPatternSelectorProps {
    pub api_client: ApiClient,
    pub teacher_id: String,
    pub session_count: u32,
    pub session_duration: u32,
    /// Days offered; all seven when empty
    #[prop_or_default]
    pub weekdays: Vec<Weekday>,
    pub time_slots: Vec<String>,
    pub timezone: String,
    /// Pattern restored from a draft
    #[prop_or_default]
    pub initial_weekday: Option<Weekday>,
    #[prop_or_default]
    pub initial_time: Option<String>,
    #[prop_or_default]
    pub initial_dates: Vec<DateTime<Utc>>,
    pub on_confirm: Callback<Option<LegacySelection>>,
}

/// One fixed weekday and time for every session of the package
#[function_component(RecurringPatternSelector)]
pub fn recurring_pattern_selector(props: &RecurringPatternSelectorProps) -> Html {
    let negotiator = LegacyPatternNegotiator::new(props.teacher_id.clone(), props.session_count, props.session_duration)
        .with_selection(props.initial_weekday, props.initial_time.clone(), props.initial_dates.clone());
    let pattern = use_legacy_pattern(&props.api_client, negotiator, props.on_confirm.clone());
    let state = &pattern.state;

    let weekdays: Vec<Weekday> = if props.weekdays.is_empty() {
        Weekday::ALL.to_vec()
    } else {
        props.weekdays.clone()
    };

    let on_weekday_change = {
        let select_weekday = pattern.actions.select_weekday.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(weekday) = Weekday::parse(&select.value()) {
                select_weekday.emit(weekday);
            }
        })
    };

    let on_time_change = {
        let select_time = pattern.actions.select_time.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            if !value.is_empty() {
                select_time.emit(value);
            }
        })
    };

    let on_check = {
        let check = pattern.actions.check.clone();
        Callback::from(move |_: MouseEvent| check.emit(()))
    };

    let can_check = state.weekday.is_some() && state.time.is_some() && !state.checking;

    html! {
        <div class="recurring-pattern-selector">
            <h3>{"Choose a weekly pattern"}</h3>

            <div class="timezone-notice">
                <p><strong>{"All times are shown in your local time"}</strong></p>
                <p>{format!("Your timezone: {}", props.timezone)}</p>
            </div>

            <div class="recurring-pattern-info">
                <p>{format!("{} sessions will be booked automatically", props.session_count)}</p>
                <p>{format!("Pick the same day and time every week for {} weeks", props.session_count)}</p>
            </div>

            <div class="form-group">
                <label for="recurring-weekday">{"Day"}</label>
                <select id="recurring-weekday" onchange={on_weekday_change}>
                    <option value="" selected={state.weekday.is_none()} disabled=true>{"Select a day"}</option>
                    {for weekdays.iter().map(|day| html! {
                        <option value={day.as_str()} selected={state.weekday == Some(*day)}>{day.label()}</option>
                    })}
                </select>
            </div>

            <div class="form-group">
                <label for="recurring-time">{"Time"}</label>
                <select id="recurring-time" onchange={on_time_change}>
                    <option value="" selected={state.time.is_none()} disabled=true>{"Select a time"}</option>
                    {for props.time_slots.iter().map(|time| html! {
                        <option value={time.clone()} selected={state.time.as_deref() == Some(time.as_str())}>
                            {format_time_display(time)}
                        </option>
                    })}
                </select>
            </div>

            <button type="button" class="btn btn-primary btn-block" disabled={!can_check} onclick={on_check}>
                {if state.checking { "Checking availability..." } else { "Check availability" }}
            </button>

            {match &state.result {
                Some(result) if result.available => html! {
                    <div class="availability-result success">
                        <p class="availability-result-title">{"This time is available every week"}</p>
                        <ul class="suggested-dates">
                            {for result.suggested_dates.iter().enumerate().map(|(index, date)| html! {
                                <li key={index}>{format!("#{} {}", index + 1, format_date_for_display(date.date_naive()))}</li>
                            })}
                        </ul>
                        {match &result.package_end_date {
                            Some(end) => html! { <p>{format!("Package ends {}", format_iso_date(end))}</p> },
                            None => html! {},
                        }}
                    </div>
                },
                Some(result) => html! {
                    <div class="availability-result failure">
                        <p class="availability-result-title">
                            {result.message.clone().unwrap_or_else(|| "This time is not available every week".to_string())}
                        </p>
                        <ul>
                            {for result.conflicts.iter().map(|conflict| html! {
                                <li>{format!("{}: {}", format_iso_date(&conflict.date), conflict.reason)}</li>
                            })}
                        </ul>
                    </div>
                },
                None => html! {},
            }}
        </div>
    }
}

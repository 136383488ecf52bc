use booking_core::domain::negotiator::{AvailabilityNegotiator, PatternToggle};
use booking_core::domain::weekly_grid::{format_time_display, WeeklyGrid};
use shared::{MultiSlotAvailabilityResponse, RecurringPattern, Weekday};
use yew::prelude::*;

use crate::hooks::use_availability_negotiator::{use_availability_negotiator, PatternSelection};
use crate::services::api::ApiClient;
use crate::services::date_utils::format_iso_date;

#[derive(Properties, PartialEq)]
pub struct WeeklyAvailabilityGridProps {
    pub api_client: ApiClient,
    pub teacher_id: String,
    pub grid: WeeklyGrid,
    pub loading: bool,
    pub recurring_session_count: u32,
    pub session_duration: u32,
    pub max_slots: usize,
    pub timezone: String,
    /// Selection restored from a draft
    #[prop_or_default]
    pub initial_patterns: Vec<RecurringPattern>,
    #[prop_or_default]
    pub initial_result: Option<MultiSlotAvailabilityResponse>,
    pub on_change: Callback<PatternSelection>,
}

#[function_component(WeeklyAvailabilityGrid)]
pub fn weekly_availability_grid(props: &WeeklyAvailabilityGridProps) -> Html {
    let negotiator = AvailabilityNegotiator::new(
        props.teacher_id.clone(),
        props.recurring_session_count,
        props.session_duration,
        props.max_slots,
    )
    .with_selection(props.initial_patterns.clone(), props.initial_result.clone());

    let negotiator = use_availability_negotiator(&props.api_client, &props.grid, negotiator, props.on_change.clone());
    let state = &negotiator.state;
    let actions = &negotiator.actions;

    if props.loading && !props.grid.has_any() {
        return html! {
            <div class="weekly-grid-loading">
                <div class="spinner"></div>
                <p>{"Loading the teacher's weekly hours..."}</p>
            </div>
        };
    }

    if !props.grid.has_any() {
        return html! {
            <div class="weekly-grid-empty">
                <h3>{"No available times"}</h3>
                <p>{"This teacher has not published weekly hours yet. Please try again later or choose another teacher."}</p>
            </div>
        };
    }

    let weeks_hint = if state.patterns.is_empty() {
        format!("One weekly time = {} weeks", state.recurring_session_count)
    } else {
        format!("{} weekly times = about {} weeks", state.patterns.len(), state.weeks_needed)
    };

    let on_check = {
        let check = actions.check.clone();
        Callback::from(move |_: MouseEvent| check.emit(()))
    };

    html! {
        <div class="weekly-grid">
            <div class="weekly-grid-header">
                <h3>{"Choose your weekly times"}</h3>
                <span class="weekly-grid-count">{format!("{}/{} selected", state.patterns.len(), state.max_slots)}</span>
            </div>

            <div class="timezone-notice">
                {"All times are shown in "}<strong>{&props.timezone}</strong>
            </div>

            <div class="weekly-grid-info">
                <p>{format!(
                    "Pick up to {} weekly times for {} recurring sessions",
                    state.max_slots, state.recurring_session_count
                )}</p>
                <p>{weeks_hint}</p>
            </div>

            <table class="weekly-grid-table">
                <thead>
                    <tr>
                        <th class="weekly-grid-time-header">{"Time"}</th>
                        {for Weekday::ALL.iter().map(|day| html! {
                            <th key={day.as_str()}>
                                <span class="weekday-label">{day.label()}</span>
                                <span class="weekday-short-label">{day.short_label()}</span>
                            </th>
                        })}
                    </tr>
                </thead>
                <tbody>
                    {for props.grid.time_slots().iter().map(|time| html! {
                        <tr key={time.clone()}>
                            <td class="weekly-grid-time">{format_time_display(time)}</td>
                            {for Weekday::ALL.iter().map(|day| {
                                let day = *day;
                                let available = props.grid.is_available(day, time);
                                let selected = state.patterns.iter().any(|p| p.matches(day, time));
                                let can_select = available && (selected || state.can_add_more);

                                let class = if selected {
                                    "grid-cell selected"
                                } else if !available {
                                    "grid-cell unavailable"
                                } else if can_select {
                                    "grid-cell available"
                                } else {
                                    "grid-cell available at-limit"
                                };
                                let title = if !available {
                                    "Not available"
                                } else if selected {
                                    "Click to remove"
                                } else if can_select {
                                    "Click to select"
                                } else {
                                    "Maximum reached"
                                };

                                let onclick = {
                                    let toggle = actions.toggle.clone();
                                    let time = time.clone();
                                    Callback::from(move |_: MouseEvent| {
                                        let outcome = toggle.emit((day, time.clone()));
                                        if outcome == PatternToggle::LimitReached {
                                            log::debug!("Weekly slot limit reached");
                                        }
                                    })
                                };

                                html! {
                                    <td key={day.as_str()}>
                                        <button type="button" {class} {title} disabled={!can_select} {onclick}>
                                            {if selected { "✓" } else if available { "•" } else { "" }}
                                        </button>
                                    </td>
                                }
                            })}
                        </tr>
                    })}
                </tbody>
            </table>

            <div class="weekly-grid-legend">
                <span class="legend-item available">{"Available"}</span>
                <span class="legend-item selected">{"Selected"}</span>
                <span class="legend-item unavailable">{"Not available"}</span>
            </div>

            {if !state.patterns.is_empty() {
                html! {
                    <div class="selected-patterns">
                        <h4>{"Selected times:"}</h4>
                        <div class="selected-pattern-chips">
                            {for state.patterns.iter().map(|pattern| {
                                let onclick = {
                                    let toggle = actions.toggle.clone();
                                    let pattern = pattern.clone();
                                    Callback::from(move |_: MouseEvent| {
                                        toggle.emit((pattern.weekday, pattern.time.clone()));
                                    })
                                };
                                html! {
                                    <span key={format!("{}-{}", pattern.weekday.as_str(), pattern.time)} class="pattern-chip">
                                        <span class="pattern-chip-day">{pattern.weekday.label()}</span>
                                        <span class="pattern-chip-time">{format_time_display(&pattern.time)}</span>
                                        <button type="button" class="pattern-chip-remove" aria-label="Remove" {onclick}>{"×"}</button>
                                    </span>
                                }
                            })}
                        </div>
                    </div>
                }
            } else {
                html! {}
            }}

            {if !state.patterns.is_empty() {
                html! {
                    <button type="button" class="btn btn-primary btn-block" disabled={state.checking} onclick={on_check}>
                        {if state.checking { "Checking availability..." } else { "Check availability" }}
                    </button>
                }
            } else {
                html! {}
            }}

            {match &state.result {
                Some(result) => render_result(result),
                None => html! {},
            }}
        </div>
    }
}

fn render_result(result: &MultiSlotAvailabilityResponse) -> Html {
    let class = if result.available {
        "availability-result success"
    } else {
        "availability-result failure"
    };

    html! {
        <div {class}>
            <p class="availability-result-title">
                {if result.available {
                    "The teacher is available at these times"
                } else {
                    "The teacher is not available at these times"
                }}
            </p>
            {if !result.message.is_empty() {
                html! { <p class="availability-result-message">{&result.message}</p> }
            } else {
                html! {}
            }}

            {if result.available && !result.scheduled_sessions.is_empty() {
                html! {
                    <div class="scheduled-sessions">
                        <p>{format!(
                            "{} sessions over {} weeks",
                            result.scheduled_sessions.len(),
                            result.total_weeks_needed
                        )}</p>
                        {match (&result.first_session, &result.last_session) {
                            (Some(first), Some(last)) => html! {
                                <p>{format!("From {} to {}", format_iso_date(first), format_iso_date(last))}</p>
                            },
                            _ => html! {},
                        }}
                        <ul class="scheduled-session-list">
                            {for result.scheduled_sessions.iter().map(|session| html! {
                                <li key={session.session_number}>
                                    {format!(
                                        "#{} {} at {}",
                                        session.session_number,
                                        format_iso_date(&session.date),
                                        format_time_display(&session.time)
                                    )}
                                </li>
                            })}
                        </ul>
                    </div>
                }
            } else {
                html! {}
            }}

            {if result.conflict_count() > 0 {
                html! {
                    <div class="pattern-conflicts">
                        {for result.patterns.iter().filter(|p| !p.conflicts.is_empty()).map(|pattern| html! {
                            <div class="pattern-conflict" key={format!("{}-{}", pattern.weekday.as_str(), pattern.time)}>
                                <p class="pattern-conflict-title">{format!(
                                    "{} {}: {} weeks free",
                                    pattern.weekday.label(),
                                    format_time_display(&pattern.time),
                                    pattern.available_weeks
                                )}</p>
                                <ul>
                                    {for pattern.conflicts.iter().map(|conflict| html! {
                                        <li>{format!("{}: {}", format_iso_date(&conflict.date), conflict.reason)}</li>
                                    })}
                                </ul>
                            </div>
                        })}
                    </div>
                }
            } else {
                html! {}
            }}
        </div>
    }
}

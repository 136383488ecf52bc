use std::rc::Rc;

use booking_core::domain::negotiator::LegacySelection;
use booking_core::domain::weekly_grid::WeeklyGrid;
use booking_core::{BookingConfig, FlowUpdate};
use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    BookingTypeOption, MultiSlotAvailabilityResponse, RecurringPattern, SlotWithTimezone,
    TeacherAvailabilityWindow, Weekday,
};
use yew::prelude::*;

use crate::components::availability_calendar::AvailabilityCalendarView;
use crate::components::recurring_pattern_selector::RecurringPatternSelector;
use crate::components::weekly_availability_grid::WeeklyAvailabilityGrid;
use crate::hooks::use_availability_negotiator::PatternSelection;
use crate::hooks::use_available_slots::use_available_slots;
use crate::hooks::use_weekly_availability::use_weekly_availability;
use crate::services::api::ApiClient;
use crate::services::date_utils::{format_date_for_display, today};

#[derive(Properties, PartialEq)]
pub struct ScheduleStepProps {
    pub api_client: ApiClient,
    pub config: Rc<BookingConfig>,
    pub teacher_id: String,
    pub availability: Vec<TeacherAvailabilityWindow>,
    pub subject_id: String,
    pub option: BookingTypeOption,
    pub timezone: String,
    pub selected_date: Option<NaiveDate>,
    pub selected_slot: Option<SlotWithTimezone>,
    pub recurring_patterns: Vec<RecurringPattern>,
    pub availability_response: Option<MultiSlotAvailabilityResponse>,
    pub recurring_weekday: Option<Weekday>,
    pub recurring_time: Option<String>,
    pub suggested_dates: Vec<DateTime<Utc>>,
    pub on_update: Callback<Vec<FlowUpdate>>,
}

/// Concrete slot for single, demo and owned-package bookings; weekly
/// pattern for a new package
#[function_component(ScheduleStep)]
pub fn schedule_step(props: &ScheduleStepProps) -> Html {
    if props.option.is_new_package_purchase() {
        let tier_id = props.option.tier_id.clone().unwrap_or_default();
        html! {
            <RecurringSchedulePicker
                key={tier_id}
                api_client={props.api_client.clone()}
                config={props.config.clone()}
                teacher_id={props.teacher_id.clone()}
                availability={props.availability.clone()}
                option={props.option.clone()}
                timezone={props.timezone.clone()}
                recurring_patterns={props.recurring_patterns.clone()}
                availability_response={props.availability_response.clone()}
                recurring_weekday={props.recurring_weekday}
                recurring_time={props.recurring_time.clone()}
                suggested_dates={props.suggested_dates.clone()}
                on_update={props.on_update.clone()}
            />
        }
    } else {
        html! {
            <SlotPicker
                api_client={props.api_client.clone()}
                teacher_id={props.teacher_id.clone()}
                subject_id={props.subject_id.clone()}
                timezone={props.timezone.clone()}
                selected_date={props.selected_date}
                selected_slot={props.selected_slot.clone()}
                on_update={props.on_update.clone()}
            />
        }
    }
}

#[derive(Properties, PartialEq)]
struct SlotPickerProps {
    api_client: ApiClient,
    teacher_id: String,
    subject_id: String,
    timezone: String,
    selected_date: Option<NaiveDate>,
    selected_slot: Option<SlotWithTimezone>,
    on_update: Callback<Vec<FlowUpdate>>,
}

#[function_component(SlotPicker)]
fn slot_picker(props: &SlotPickerProps) -> Html {
    let slots = use_available_slots(&props.api_client, &props.teacher_id, &props.subject_id, props.selected_date);
    let state = &slots.state;
    let today = today();

    // a new date never keeps the slot picked on another day
    let on_date_select = {
        let select_date = slots.actions.select_date.clone();
        let on_update = props.on_update.clone();
        let current = props.selected_date;
        Callback::from(move |date: NaiveDate| {
            if current == Some(date) {
                return;
            }
            select_date.emit(date);
            on_update.emit(vec![FlowUpdate::Date(Some(date)), FlowUpdate::Slot(None)]);
        })
    };

    let quick_pick = match (&state.calendar, props.selected_date) {
        (Some(calendar), None) => calendar.next_available_slot.clone(),
        _ => None,
    };

    html! {
        <div class="booking-step schedule-step">
            <div class="step-intro">
                <h3>{"Pick a date and time"}</h3>
                <p>{"Days marked with a dot have open times"}</p>
            </div>

            <div class="schedule-columns">
                <AvailabilityCalendarView
                    year={state.year}
                    month={state.month}
                    calendar={state.calendar.clone()}
                    loading={state.calendar_loading}
                    {today}
                    selected={props.selected_date}
                    on_select={on_date_select.clone()}
                    on_prev_month={slots.actions.previous_month.clone()}
                    on_next_month={slots.actions.next_month.clone()}
                />

                <div class="slot-list-panel">
                    <div class="slot-list-header">
                        <h4>{"Available times"}</h4>
                        {match props.selected_date {
                            Some(date) => html! { <span class="slot-list-date">{format_date_for_display(date)}</span> },
                            None => html! {},
                        }}
                    </div>

                    {if props.selected_date.is_none() {
                        html! { <p class="slot-list-empty">{"Choose a date on the calendar first"}</p> }
                    } else if state.slots_loading {
                        html! {
                            <div class="slot-list-loading">
                                <div class="spinner"></div>
                                <p>{"Loading times..."}</p>
                            </div>
                        }
                    } else if state.slots.is_empty() {
                        html! { <p class="slot-list-empty">{"No open times on this day"}</p> }
                    } else {
                        html! {
                            <div class="slot-list">
                                {for state.slots.iter().map(|slot| {
                                    let is_selected = props.selected_slot.as_ref().map(|s| s.same_slot(slot)).unwrap_or(false);
                                    let onclick = {
                                        let on_update = props.on_update.clone();
                                        let slot = slot.clone();
                                        Callback::from(move |_: MouseEvent| {
                                            on_update.emit(vec![FlowUpdate::Slot(Some(slot.clone()))]);
                                        })
                                    };
                                    html! {
                                        <button type="button" key={slot.start_time_utc.to_rfc3339()}
                                            class={classes!("slot-button", is_selected.then_some("selected"))}
                                            {onclick}>
                                            <span class="slot-label">{&slot.label}</span>
                                            {if is_selected { html! { <span class="slot-check">{"✓"}</span> } } else { html! {} }}
                                        </button>
                                    }
                                })}
                            </div>
                        }
                    }}

                    {if !state.slots.is_empty() {
                        html! { <p class="timezone-notice">{format!("All times are in {}", props.timezone)}</p> }
                    } else {
                        html! {}
                    }}
                </div>
            </div>

            {match quick_pick {
                Some(next) => {
                    let onclick = {
                        let on_date_select = on_date_select.clone();
                        let date = next.date;
                        Callback::from(move |_: MouseEvent| on_date_select.emit(date))
                    };
                    html! {
                        <button type="button" class="quick-pick" {onclick}>
                            {format!("Quick pick: {}", next.display)}
                        </button>
                    }
                }
                None => html! {},
            }}
        </div>
    }
}

#[derive(Clone, Copy, PartialEq)]
enum PatternMode {
    MultiSlot,
    LegacySingle,
}

#[derive(Properties, PartialEq)]
struct RecurringSchedulePickerProps {
    api_client: ApiClient,
    config: Rc<BookingConfig>,
    teacher_id: String,
    availability: Vec<TeacherAvailabilityWindow>,
    option: BookingTypeOption,
    timezone: String,
    recurring_patterns: Vec<RecurringPattern>,
    availability_response: Option<MultiSlotAvailabilityResponse>,
    recurring_weekday: Option<Weekday>,
    recurring_time: Option<String>,
    suggested_dates: Vec<DateTime<Utc>>,
    on_update: Callback<Vec<FlowUpdate>>,
}

#[function_component(RecurringSchedulePicker)]
fn recurring_schedule_picker(props: &RecurringSchedulePickerProps) -> Html {
    let config = &props.config;
    let weekly = use_weekly_availability(
        &props.api_client,
        &props.teacher_id,
        &props.availability,
        config.session_duration_minutes,
        (config.grid_start_hour, config.grid_end_hour),
    );
    let mode = use_state(|| {
        if props.recurring_patterns.is_empty() && props.recurring_weekday.is_some() {
            PatternMode::LegacySingle
        } else {
            PatternMode::MultiSlot
        }
    });

    let on_patterns_change = {
        let on_update = props.on_update.clone();
        Callback::from(move |(patterns, response): PatternSelection| {
            let sessions = response
                .as_ref()
                .map(|r| r.scheduled_sessions.clone())
                .unwrap_or_default();
            on_update.emit(vec![
                FlowUpdate::RecurringPatterns(patterns),
                FlowUpdate::AvailabilityResponse(response),
                FlowUpdate::ScheduledSessions(sessions),
            ]);
        })
    };

    let on_legacy_confirm = {
        let on_update = props.on_update.clone();
        Callback::from(move |selection: Option<LegacySelection>| {
            let updates = match selection {
                Some(selection) => vec![
                    FlowUpdate::RecurringWeekday(Some(selection.weekday)),
                    FlowUpdate::RecurringTime(Some(selection.time)),
                    FlowUpdate::SuggestedDates(selection.suggested_dates),
                ],
                None => vec![
                    FlowUpdate::RecurringWeekday(None),
                    FlowUpdate::RecurringTime(None),
                    FlowUpdate::SuggestedDates(Vec::new()),
                ],
            };
            on_update.emit(updates);
        })
    };

    let on_switch_mode = {
        let mode = mode.clone();
        let on_update = props.on_update.clone();
        Callback::from(move |_: MouseEvent| {
            // one schedule model at a time; the other one's fields are dropped
            let (next, cleared) = match *mode {
                PatternMode::MultiSlot => (
                    PatternMode::LegacySingle,
                    vec![
                        FlowUpdate::RecurringPatterns(Vec::new()),
                        FlowUpdate::AvailabilityResponse(None),
                        FlowUpdate::ScheduledSessions(Vec::new()),
                    ],
                ),
                PatternMode::LegacySingle => (
                    PatternMode::MultiSlot,
                    vec![
                        FlowUpdate::RecurringWeekday(None),
                        FlowUpdate::RecurringTime(None),
                        FlowUpdate::SuggestedDates(Vec::new()),
                    ],
                ),
            };
            on_update.emit(cleared);
            mode.set(next);
        })
    };

    let tier_label = format!("{} sessions", props.option.session_count.unwrap_or(0));

    html! {
        <div class="booking-step schedule-step recurring">
            <div class="step-intro">
                <h3>{format!("Set the weekly schedule for your {} package", tier_label)}</h3>
                <p>{"Sessions repeat every week at the times you choose"}</p>
            </div>

            {match *mode {
                PatternMode::MultiSlot => html! {
                    <WeeklyAvailabilityGrid
                        api_client={props.api_client.clone()}
                        teacher_id={props.teacher_id.clone()}
                        grid={weekly.grid.clone()}
                        loading={weekly.loading}
                        recurring_session_count={props.option.recurring_session_count()}
                        session_duration={config.session_duration_minutes}
                        max_slots={config.max_recurring_slots}
                        timezone={props.timezone.clone()}
                        initial_patterns={props.recurring_patterns.clone()}
                        initial_result={props.availability_response.clone()}
                        on_change={on_patterns_change}
                    />
                },
                PatternMode::LegacySingle => html! {
                    <RecurringPatternSelector
                        api_client={props.api_client.clone()}
                        teacher_id={props.teacher_id.clone()}
                        session_count={props.option.session_count.unwrap_or(0)}
                        session_duration={config.session_duration_minutes}
                        weekdays={weekly.grid.available_weekdays()}
                        time_slots={legacy_times(&weekly.grid, config)}
                        timezone={props.timezone.clone()}
                        initial_weekday={props.recurring_weekday}
                        initial_time={props.recurring_time.clone()}
                        initial_dates={props.suggested_dates.clone()}
                        on_confirm={on_legacy_confirm}
                    />
                },
            }}

            <button type="button" class="link-button pattern-mode-switch" onclick={on_switch_mode}>
                {match *mode {
                    PatternMode::MultiSlot => "Prefer one fixed day and time instead?",
                    PatternMode::LegacySingle => "Choose several weekly times instead",
                }}
            </button>
        </div>
    }
}

/// Grid start times, or the configured hours when the grid is empty
fn legacy_times(grid: &WeeklyGrid, config: &BookingConfig) -> Vec<String> {
    if grid.time_slots().is_empty() {
        WeeklyGrid::hourly_slots(config.grid_start_hour, config.grid_end_hour)
    } else {
        grid.time_slots().to_vec()
    }
}

use booking_core::domain::catalog::format_currency;
use booking_core::domain::flow::RecurringSchedule;
use booking_core::domain::steps::REVIEW_STEP;
use booking_core::domain::weekly_grid::format_time_display;
use booking_core::BookingFlowState;
use yew::prelude::*;

use super::booking_type_step::option_title;
use crate::services::date_utils::{format_date_for_display, format_iso_date};

#[derive(Properties, PartialEq)]
pub struct ReviewSummaryProps {
    pub teacher_name: String,
    pub subject_name: String,
    pub state: BookingFlowState,
    pub currency: String,
}

#[function_component(ReviewSummary)]
pub fn review_summary(props: &ReviewSummaryProps) -> Html {
    let state = &props.state;
    let Some(option) = state.selected_booking_option.as_ref() else {
        return html! {};
    };

    let price = option
        .display_price
        .clone()
        .unwrap_or_else(|| format_currency(option.price, &props.currency));

    let schedule = match state.recurring_schedule() {
        Some(RecurringSchedule::MultiSlot { patterns, response }) if state.is_new_package_purchase() => html! {
            <>
                <SummaryRow label="Weekly times" value={patterns
                    .iter()
                    .map(|p| format!("{} {}", p.weekday.label(), format_time_display(&p.time)))
                    .collect::<Vec<_>>()
                    .join(", ")} />
                {match response {
                    Some(response) => html! {
                        <SummaryRow label="Sessions" value={match (&response.first_session, &response.last_session) {
                            (Some(first), Some(last)) => format!(
                                "{} sessions, {} to {}",
                                response.scheduled_sessions.len(),
                                format_iso_date(first),
                                format_iso_date(last)
                            ),
                            _ => format!("{} sessions", response.scheduled_sessions.len()),
                        }} />
                    },
                    None => html! {},
                }}
            </>
        },
        Some(RecurringSchedule::LegacySingle { weekday, time, suggested_dates }) if state.is_new_package_purchase() => html! {
            <>
                <SummaryRow label="Every week" value={format!("{} at {}", weekday.label(), format_time_display(time))} />
                {match suggested_dates.first() {
                    Some(first) => html! {
                        <SummaryRow label="First session" value={format_date_for_display(first.date_naive())} />
                    },
                    None => html! {},
                }}
            </>
        },
        _ => html! {
            <>
                {match state.selected_date {
                    Some(date) => html! { <SummaryRow label="Date" value={format_date_for_display(date)} /> },
                    None => html! {},
                }}
                {match &state.selected_slot {
                    Some(slot) => html! { <SummaryRow label="Time" value={slot.label.clone()} /> },
                    None => html! {},
                }}
            </>
        },
    };

    html! {
        <div class="review-summary">
            <h4>{REVIEW_STEP.label}</h4>
            <SummaryRow label="Teacher" value={props.teacher_name.clone()} />
            <SummaryRow label="Subject" value={props.subject_name.clone()} />
            <SummaryRow label="Booking" value={option_title(option)} />
            {schedule}
            <div class="summary-row summary-total">
                <span class="summary-label">{"Total"}</span>
                <span class="summary-value">{if option.is_existing_package() {
                    "Included in your package".to_string()
                } else if option.price == 0 {
                    "Free".to_string()
                } else {
                    price
                }}</span>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct SummaryRowProps {
    label: AttrValue,
    value: AttrValue,
}

#[function_component(SummaryRow)]
fn summary_row(props: &SummaryRowProps) -> Html {
    html! {
        <div class="summary-row">
            <span class="summary-label">{&props.label}</span>
            <span class="summary-value">{&props.value}</span>
        </div>
    }
}

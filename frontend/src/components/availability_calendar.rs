use chrono::{Datelike, NaiveDate};
use shared::AvailabilityCalendar;
use yew::prelude::*;

use crate::services::date_utils::{month_cells, month_name};

#[derive(Properties, PartialEq)]
pub struct AvailabilityCalendarProps {
    pub year: i32,
    pub month: u32,
    pub calendar: Option<AvailabilityCalendar>,
    pub loading: bool,
    pub today: NaiveDate,
    pub selected: Option<NaiveDate>,
    pub on_select: Callback<NaiveDate>,
    pub on_prev_month: Callback<()>,
    pub on_next_month: Callback<()>,
}

#[function_component(AvailabilityCalendarView)]
pub fn availability_calendar_view(props: &AvailabilityCalendarProps) -> Html {
    let calendar = props.calendar.as_ref();

    let mut calendar_days = Vec::new();
    for (index, cell) in month_cells(props.year, props.month).into_iter().enumerate() {
        let Some(date) = cell else {
            calendar_days.push(html! { <div key={format!("pad-{}", index)} class="calendar-day empty"></div> });
            continue;
        };

        let is_past = date < props.today;
        let is_available = calendar.map(|c| c.is_available(date)).unwrap_or(false);
        let is_fully_booked = calendar.map(|c| c.is_fully_booked(date)).unwrap_or(false);

        let mut class = classes!("calendar-day");
        if is_past {
            class.push("past");
        }
        if is_available {
            class.push("has-availability");
        }
        if is_fully_booked {
            class.push("fully-booked");
        }
        if props.selected == Some(date) {
            class.push("selected");
        }
        if date == props.today {
            class.push("today");
        }

        let onclick = {
            let on_select = props.on_select.clone();
            Callback::from(move |_: MouseEvent| on_select.emit(date))
        };

        calendar_days.push(html! {
            <button type="button" key={date.to_string()} {class} disabled={is_past} {onclick}>
                <span class="day-number">{date.day()}</span>
                {if is_available && !is_past {
                    html! { <span class="availability-dot"></span> }
                } else {
                    html! {}
                }}
            </button>
        });
    }

    let on_prev = {
        let on_prev_month = props.on_prev_month.clone();
        Callback::from(move |_: MouseEvent| on_prev_month.emit(()))
    };
    let on_next = {
        let on_next_month = props.on_next_month.clone();
        Callback::from(move |_: MouseEvent| on_next_month.emit(()))
    };
    // nothing before the current month is bookable
    let at_current_month = (props.year, props.month) <= (props.today.year(), props.today.month());

    html! {
        <div class="calendar booking-calendar">
            <div class="calendar-header">
                <button type="button" class="calendar-nav" disabled={at_current_month} onclick={on_prev}>{"‹"}</button>
                <h4 class="calendar-title">{format!("{} {}", month_name(props.month), props.year)}</h4>
                <button type="button" class="calendar-nav" onclick={on_next}>{"›"}</button>
                {if props.loading {
                    html! { <span class="calendar-loading">{"Loading..."}</span> }
                } else {
                    html! {}
                }}
            </div>

            <div class="calendar-weekdays">
                <div class="weekday">{"Sun"}</div>
                <div class="weekday">{"Mon"}</div>
                <div class="weekday">{"Tue"}</div>
                <div class="weekday">{"Wed"}</div>
                <div class="weekday">{"Thu"}</div>
                <div class="weekday">{"Fri"}</div>
                <div class="weekday">{"Sat"}</div>
            </div>
            <div class="calendar-grid">
                {for calendar_days}
            </div>

            <div class="calendar-legend">
                <span class="legend-item has-availability">{"Available"}</span>
                <span class="legend-item fully-booked">{"Fully booked"}</span>
            </div>
        </div>
    }
}

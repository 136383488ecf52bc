use std::cell::RefCell;
use std::rc::Rc;

use booking_core::api::SchedulingApi;
use booking_core::domain::slots::{CalendarLoader, SlotLoader};
use chrono::NaiveDate;
use shared::{AvailabilityCalendar, SlotWithTimezone};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::date_utils::{today, user_timezone};

#[derive(Clone, PartialEq)]
pub struct AvailableSlotsState {
    pub date: Option<NaiveDate>,
    pub slots: Vec<SlotWithTimezone>,
    pub slots_loading: bool,
    pub year: i32,
    pub month: u32,
    pub calendar: Option<AvailabilityCalendar>,
    pub calendar_loading: bool,
}

#[derive(Clone, PartialEq)]
pub struct UseAvailableSlotsActions {
    pub select_date: Callback<NaiveDate>,
    pub next_month: Callback<()>,
    pub previous_month: Callback<()>,
}

pub struct UseAvailableSlotsResult {
    pub state: AvailableSlotsState,
    pub actions: UseAvailableSlotsActions,
}

fn fetch_calendar(
    api_client: ApiClient,
    loader: Rc<RefCell<CalendarLoader>>,
    teacher_id: String,
    subject_id: String,
    trigger: UseForceUpdateHandle,
) {
    let ticket = loader.borrow_mut().begin_load();
    trigger.force_update();
    spawn_local(async move {
        let result = api_client
            .get_availability_calendar(&teacher_id, &ticket.year_month, &subject_id)
            .await;
        if loader.borrow_mut().apply(ticket, result) {
            trigger.force_update();
        }
    });
}

/// Month calendar plus the concrete slots of the selected day
#[hook]
pub fn use_available_slots(
    api_client: &ApiClient,
    teacher_id: &str,
    subject_id: &str,
    initial_date: Option<NaiveDate>,
) -> UseAvailableSlotsResult {
    let slot_loader = use_mut_ref(SlotLoader::new);
    let calendar_loader = use_mut_ref(|| CalendarLoader::new(initial_date.unwrap_or_else(today)));
    let trigger = use_force_update();

    let select_date = {
        let api_client = api_client.clone();
        let slot_loader = slot_loader.clone();
        let calendar_loader = calendar_loader.clone();
        let trigger = trigger.clone();
        let teacher_id = teacher_id.to_string();
        let subject_id = subject_id.to_string();
        use_callback((), move |date: NaiveDate, _| {
            let ticket = slot_loader.borrow_mut().select_date(date);
            let month_changed = {
                let mut calendar = calendar_loader.borrow_mut();
                let before = calendar.year_month();
                calendar.show_month_of(date);
                before != calendar.year_month()
            };
            if month_changed {
                fetch_calendar(
                    api_client.clone(),
                    calendar_loader.clone(),
                    teacher_id.clone(),
                    subject_id.clone(),
                    trigger.clone(),
                );
            }
            trigger.force_update();

            let api_client = api_client.clone();
            let slot_loader = slot_loader.clone();
            let trigger = trigger.clone();
            let teacher_id = teacher_id.clone();
            spawn_local(async move {
                let result = api_client.get_available_slots(&teacher_id, ticket.date, &user_timezone()).await;
                if slot_loader.borrow_mut().apply(ticket, result) {
                    trigger.force_update();
                }
            });
        })
    };

    let next_month = {
        let api_client = api_client.clone();
        let calendar_loader = calendar_loader.clone();
        let trigger = trigger.clone();
        let teacher_id = teacher_id.to_string();
        let subject_id = subject_id.to_string();
        use_callback((), move |_: (), _| {
            calendar_loader.borrow_mut().next_month();
            fetch_calendar(
                api_client.clone(),
                calendar_loader.clone(),
                teacher_id.clone(),
                subject_id.clone(),
                trigger.clone(),
            );
        })
    };

    let previous_month = {
        let api_client = api_client.clone();
        let calendar_loader = calendar_loader.clone();
        let trigger = trigger.clone();
        let teacher_id = teacher_id.to_string();
        let subject_id = subject_id.to_string();
        use_callback((), move |_: (), _| {
            calendar_loader.borrow_mut().previous_month();
            fetch_calendar(
                api_client.clone(),
                calendar_loader.clone(),
                teacher_id.clone(),
                subject_id.clone(),
                trigger.clone(),
            );
        })
    };

    // Initial month, and the slots of a date restored from a draft
    {
        let api_client = api_client.clone();
        let calendar_loader = calendar_loader.clone();
        let trigger = trigger.clone();
        let select_date = select_date.clone();
        use_effect_with(
            (teacher_id.to_string(), subject_id.to_string()),
            move |(teacher_id, subject_id)| {
                fetch_calendar(api_client, calendar_loader, teacher_id.clone(), subject_id.clone(), trigger);
                if let Some(date) = initial_date {
                    select_date.emit(date);
                }
                || ()
            },
        );
    }

    let state = {
        let slots = slot_loader.borrow();
        let calendar = calendar_loader.borrow();
        AvailableSlotsState {
            date: slots.date(),
            slots: slots.slots().to_vec(),
            slots_loading: slots.is_loading(),
            year: calendar.year(),
            month: calendar.month(),
            calendar: calendar.calendar().cloned(),
            calendar_loading: calendar.is_loading(),
        }
    };

    UseAvailableSlotsResult {
        state,
        actions: UseAvailableSlotsActions {
            select_date,
            next_month,
            previous_month,
        },
    }
}

use booking_core::api::SchedulingApi;
use booking_core::domain::negotiator::{AvailabilityNegotiator, LegacyPatternNegotiator, LegacySelection, PatternToggle};
use booking_core::domain::weekly_grid::WeeklyGrid;
use shared::{MultiSlotAvailabilityResponse, RecurringAvailabilityResponse, RecurringPattern, Weekday};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::logging::Logger;

/// Selection plus the latest accepted check result, as written into the flow
pub type PatternSelection = (Vec<RecurringPattern>, Option<MultiSlotAvailabilityResponse>);

#[derive(Clone, PartialEq)]
pub struct NegotiatorState {
    pub patterns: Vec<RecurringPattern>,
    pub result: Option<MultiSlotAvailabilityResponse>,
    pub checking: bool,
    pub weeks_needed: u32,
    pub can_add_more: bool,
    pub max_slots: usize,
    pub recurring_session_count: u32,
}

#[derive(Clone, PartialEq)]
pub struct UseNegotiatorActions {
    pub toggle: Callback<(Weekday, String), PatternToggle>,
    pub clear: Callback<()>,
    pub check: Callback<()>,
}

pub struct UseNegotiatorResult {
    pub state: NegotiatorState,
    pub actions: UseNegotiatorActions,
}

/// Multi-slot weekly pattern selection for a new package.
///
/// The negotiator lives for one tier; the caller keys the component by tier
/// so a tier change starts from a fresh selection.
#[hook]
pub fn use_availability_negotiator(
    api_client: &ApiClient,
    grid: &WeeklyGrid,
    negotiator: AvailabilityNegotiator,
    on_change: Callback<PatternSelection>,
) -> UseNegotiatorResult {
    let negotiator = use_mut_ref(move || negotiator);
    let trigger = use_force_update();

    let toggle = {
        let negotiator = negotiator.clone();
        let trigger = trigger.clone();
        let on_change = on_change.clone();
        use_callback(grid.clone(), move |(weekday, time): (Weekday, String), grid| {
            let outcome = negotiator.borrow_mut().toggle_pattern(grid, weekday, &time);
            if outcome.changed() {
                let patterns = negotiator.borrow().patterns().to_vec();
                on_change.emit((patterns, None));
                trigger.force_update();
            }
            outcome
        })
    };

    let clear = {
        let negotiator = negotiator.clone();
        let trigger = trigger.clone();
        let on_change = on_change.clone();
        use_callback((), move |_: (), _| {
            negotiator.borrow_mut().clear();
            on_change.emit((Vec::new(), None));
            trigger.force_update();
        })
    };

    let check = {
        let api_client = api_client.clone();
        let negotiator = negotiator.clone();
        let trigger = trigger.clone();
        use_callback((), move |_: (), _| {
            let Some(ticket) = negotiator.borrow_mut().begin_check() else {
                return;
            };
            trigger.force_update();

            let api_client = api_client.clone();
            let negotiator = negotiator.clone();
            let trigger = trigger.clone();
            let on_change = on_change.clone();
            spawn_local(async move {
                let result = api_client.check_multi_slot_availability(&ticket.request).await;
                let applied = negotiator.borrow_mut().apply_result(ticket, result).cloned();
                if let Some(response) = applied {
                    Logger::info_with_component(
                        "use_availability_negotiator",
                        &format!("Availability check: available={} conflicts={}", response.available, response.conflict_count()),
                    );
                    let patterns = negotiator.borrow().patterns().to_vec();
                    on_change.emit((patterns, Some(response)));
                    trigger.force_update();
                }
            });
        })
    };

    let state = {
        let negotiator = negotiator.borrow();
        NegotiatorState {
            patterns: negotiator.patterns().to_vec(),
            result: negotiator.result().cloned(),
            checking: negotiator.is_checking(),
            weeks_needed: negotiator.weeks_needed(),
            can_add_more: negotiator.can_add_more(),
            max_slots: negotiator.max_slots(),
            recurring_session_count: negotiator.recurring_session_count(),
        }
    };

    UseNegotiatorResult {
        state,
        actions: UseNegotiatorActions { toggle, clear, check },
    }
}

#[derive(Clone, PartialEq)]
pub struct LegacyPatternState {
    pub weekday: Option<Weekday>,
    pub time: Option<String>,
    pub result: Option<RecurringAvailabilityResponse>,
    pub checking: bool,
}

#[derive(Clone, PartialEq)]
pub struct UseLegacyPatternActions {
    pub select_weekday: Callback<Weekday>,
    pub select_time: Callback<String>,
    pub check: Callback<()>,
}

pub struct UseLegacyPatternResult {
    pub state: LegacyPatternState,
    pub actions: UseLegacyPatternActions,
}

/// Single weekday/time pattern; `on_confirm` receives `None` whenever the
/// pick changes and the placed dates once the server accepts it
#[hook]
pub fn use_legacy_pattern(
    api_client: &ApiClient,
    negotiator: LegacyPatternNegotiator,
    on_confirm: Callback<Option<LegacySelection>>,
) -> UseLegacyPatternResult {
    let negotiator = use_mut_ref(move || negotiator);
    let trigger = use_force_update();

    let select_weekday = {
        let negotiator = negotiator.clone();
        let trigger = trigger.clone();
        let on_confirm = on_confirm.clone();
        use_callback((), move |weekday: Weekday, _| {
            negotiator.borrow_mut().select_weekday(weekday);
            on_confirm.emit(None);
            trigger.force_update();
        })
    };

    let select_time = {
        let negotiator = negotiator.clone();
        let trigger = trigger.clone();
        let on_confirm = on_confirm.clone();
        use_callback((), move |time: String, _| {
            negotiator.borrow_mut().select_time(time);
            on_confirm.emit(None);
            trigger.force_update();
        })
    };

    let check = {
        let api_client = api_client.clone();
        let negotiator = negotiator.clone();
        let trigger = trigger.clone();
        use_callback((), move |_: (), _| {
            let Some(ticket) = negotiator.borrow_mut().begin_check() else {
                return;
            };
            trigger.force_update();

            let api_client = api_client.clone();
            let negotiator = negotiator.clone();
            let trigger = trigger.clone();
            let on_confirm = on_confirm.clone();
            spawn_local(async move {
                let result = api_client.check_recurring_availability(&ticket.request).await;
                let applied = negotiator.borrow_mut().apply_result(ticket, result).is_some();
                if applied {
                    let confirmed = negotiator.borrow().confirmed();
                    on_confirm.emit(confirmed);
                    trigger.force_update();
                }
            });
        })
    };

    let state = {
        let negotiator = negotiator.borrow();
        LegacyPatternState {
            weekday: negotiator.weekday(),
            time: negotiator.time().map(str::to_string),
            result: negotiator.result().cloned(),
            checking: negotiator.is_checking(),
        }
    };

    UseLegacyPatternResult {
        state,
        actions: UseLegacyPatternActions {
            select_weekday,
            select_time,
            check,
        },
    }
}

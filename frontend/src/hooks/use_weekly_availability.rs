use booking_core::api::SchedulingApi;
use booking_core::domain::weekly_grid::WeeklyGrid;
use shared::TeacherAvailabilityWindow;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;

#[derive(Clone, PartialEq)]
pub struct WeeklyAvailabilityState {
    pub grid: WeeklyGrid,
    pub loading: bool,
    pub error: Option<String>,
}

/// Teacher's open hours as a selectable weekly grid.
///
/// `fallback` is the availability embedded in the teacher profile; it is
/// used until (or instead of) the dedicated endpoint answers.
#[hook]
pub fn use_weekly_availability(
    api_client: &ApiClient,
    teacher_id: &str,
    fallback: &[TeacherAvailabilityWindow],
    session_minutes: u32,
    hours: (u32, u32),
) -> WeeklyAvailabilityState {
    let windows = use_state(|| fallback.to_vec());
    let loading = use_state(|| true);
    let error = use_state(|| Option::<String>::None);

    {
        let api_client = api_client.clone();
        let windows = windows.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with(teacher_id.to_string(), move |teacher_id| {
            let teacher_id = teacher_id.clone();
            spawn_local(async move {
                loading.set(true);
                match api_client.get_teacher_weekly_availability(&teacher_id).await {
                    Ok(list) => {
                        windows.set(list);
                        error.set(None);
                    }
                    Err(e) => {
                        log::error!("Failed to load weekly availability for {}: {}", teacher_id, e);
                        error.set(Some(e.to_string()));
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    let grid = use_memo(
        ((*windows).clone(), session_minutes, hours),
        |(windows, session_minutes, (start_hour, end_hour))| {
            WeeklyGrid::build(windows, WeeklyGrid::hourly_slots(*start_hour, *end_hour), *session_minutes)
        },
    );

    WeeklyAvailabilityState {
        grid: (*grid).clone(),
        loading: *loading,
        error: (*error).clone(),
    }
}

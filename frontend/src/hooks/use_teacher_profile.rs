use shared::TeacherBookingProfile;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;

#[derive(Clone, PartialEq)]
pub struct TeacherProfileState {
    pub teacher: Option<TeacherBookingProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

#[hook]
pub fn use_teacher_profile(api_client: &ApiClient, teacher_id: &str) -> TeacherProfileState {
    let teacher = use_state(|| Option::<TeacherBookingProfile>::None);
    let loading = use_state(|| true);
    let error = use_state(|| Option::<String>::None);

    {
        let api_client = api_client.clone();
        let teacher = teacher.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with(teacher_id.to_string(), move |teacher_id| {
            let teacher_id = teacher_id.clone();
            spawn_local(async move {
                loading.set(true);
                match api_client.get_teacher_booking_profile(&teacher_id).await {
                    Ok(profile) => {
                        teacher.set(Some(profile));
                        error.set(None);
                    }
                    Err(e) => {
                        log::error!("Failed to load teacher {}: {}", teacher_id, e);
                        error.set(Some(e.to_string()));
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    TeacherProfileState {
        teacher: (*teacher).clone(),
        loading: *loading,
        error: (*error).clone(),
    }
}

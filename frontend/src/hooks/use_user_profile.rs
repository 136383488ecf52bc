use booking_core::api::SchedulingApi;
use shared::UserProfile;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::api::ApiClient;
use crate::services::logging::Logger;

#[derive(Clone, PartialEq)]
pub struct UserProfileState {
    /// `None` for guests
    pub profile: Option<UserProfile>,
    pub loading: bool,
}

impl UserProfileState {
    pub fn is_guest(&self) -> bool {
        self.profile.is_none()
    }
}

/// Authenticated profile; an auth failure means the visitor is a guest
#[hook]
pub fn use_user_profile(api_client: &ApiClient) -> UserProfileState {
    let profile = use_state(|| Option::<UserProfile>::None);
    let loading = use_state(|| true);

    {
        let api_client = api_client.clone();
        let profile = profile.clone();
        let loading = loading.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api_client.get_profile().await {
                    Ok(user) => {
                        Logger::debug_with_component("use_user_profile", &format!("Signed in as {:?}", user.role));
                        profile.set(Some(user));
                    }
                    Err(e) => {
                        Logger::debug_with_component("use_user_profile", &format!("Browsing as guest: {}", e));
                        profile.set(None);
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    UserProfileState {
        profile: (*profile).clone(),
        loading: *loading,
    }
}


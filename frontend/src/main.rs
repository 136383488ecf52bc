use booking_core::domain::catalog::format_currency;
use booking_core::BookingConfig;
use yew::prelude::*;

mod components;
mod hooks;
mod services;

use components::booking_modal::BookingModal;
use components::toast::ToastContainer;
use hooks::use_teacher_profile::use_teacher_profile;
use hooks::use_toast::use_toast;
use services::api::ApiClient;
use services::logging;
use services::navigation::query_param;

const CONFIG_ELEMENT_ID: &str = "booking-config";

/// Defaults, overridden by an inline `<script id="booking-config" type="application/json">`
fn load_config() -> BookingConfig {
    let inline = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content());

    match inline {
        Some(json) if !json.trim().is_empty() => match BookingConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                gloo::console::warn!(format!("Ignoring booking config: {}", e));
                BookingConfig::default()
            }
        },
        _ => BookingConfig::default(),
    }
}

#[function_component(App)]
fn app() -> Html {
    let config = use_memo((), |_| {
        let config = load_config();
        logging::init(config.log_level_filter());
        config
    });
    let api_client = use_memo((), |_| ApiClient::new());
    let teacher_id = use_memo((), |_| query_param("teacher").unwrap_or_default());
    let quick_booking = use_memo((), |_| query_param("quick").is_some());
    let teacher = use_teacher_profile(&api_client, &teacher_id);
    let toast = use_toast();
    let modal_open = use_state(|| false);

    let on_open = {
        let modal_open = modal_open.clone();
        Callback::from(move |_: MouseEvent| modal_open.set(true))
    };
    let on_close = {
        let modal_open = modal_open.clone();
        Callback::from(move |_: ()| modal_open.set(false))
    };

    let content = if teacher_id.is_empty() {
        html! { <p class="page-message">{"No teacher selected."}</p> }
    } else if teacher.loading && teacher.teacher.is_none() {
        html! {
            <div class="page-loading">
                <div class="spinner"></div>
                <p>{"Loading teacher..."}</p>
            </div>
        }
    } else if let Some(profile) = teacher.teacher.clone() {
        let lowest_price = profile.subjects.iter().map(|s| s.price).min();
        html! {
            <>
                <div class="teacher-card">
                    <h1 class="teacher-name">{&profile.display_name}</h1>
                    <ul class="teacher-subjects">
                        {for profile.subjects.iter().map(|subject| html! {
                            <li key={subject.id.clone()}>{&subject.name}</li>
                        })}
                    </ul>
                    {match lowest_price {
                        Some(price) => html! {
                            <p class="teacher-price">{format!("From {} per session", format_currency(price, &config.currency))}</p>
                        },
                        None => html! {},
                    }}
                    <button type="button" class="btn btn-primary" onclick={on_open}>{"Book a session"}</button>
                </div>

                {if *modal_open {
                    html! {
                        <BookingModal
                            api_client={(*api_client).clone()}
                            config={config.clone()}
                            teacher={profile.clone()}
                            toast={toast.actions.clone()}
                            on_close={on_close}
                            quick_booking={*quick_booking}
                        />
                    }
                } else {
                    html! {}
                }}
            </>
        }
    } else {
        html! {
            <p class="page-message error">
                {teacher.error.clone().unwrap_or_else(|| "Teacher not found.".to_string())}
            </p>
        }
    };

    html! {
        <div class="app">
            {content}
            <ToastContainer toasts={toast.toasts.clone()} on_dismiss={toast.actions.dismiss.clone()} />
        </div>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}

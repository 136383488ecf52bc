use yew::prelude::*;

use crate::services::navigation::{current_path, login_url, navigate, register_url};

#[derive(Properties, PartialEq)]
pub struct LoginCheckpointProps {
    pub teacher_name: String,
}

/// Shown to guests in place of the details step; the draft is already
/// stored, so the flow resumes after signing in
#[function_component(LoginCheckpoint)]
pub fn login_checkpoint(props: &LoginCheckpointProps) -> Html {
    let on_login = Callback::from(|_: MouseEvent| navigate(&login_url(&current_path())));
    let on_register = Callback::from(|_: MouseEvent| navigate(&register_url(&current_path())));

    html! {
        <div class="login-checkpoint">
            <div class="login-checkpoint-icon">{"🔒"}</div>
            <h3 class="login-checkpoint-title">{"Sign in to finish your booking"}</h3>
            <p class="login-checkpoint-text">
                {format!(
                    "Your choices are saved. Sign in or create an account to confirm your session with {}.",
                    props.teacher_name
                )}
            </p>
            <div class="login-checkpoint-buttons">
                <button type="button" class="btn btn-primary" onclick={on_login}>{"Sign in"}</button>
                <button type="button" class="btn btn-secondary" onclick={on_register}>{"Create account"}</button>
            </div>
        </div>
    }
}

use yew::prelude::*;

use crate::hooks::use_toast::Toast;

#[derive(Properties, PartialEq)]
pub struct ToastContainerProps {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u32>,
}

#[function_component(ToastContainer)]
pub fn toast_container(props: &ToastContainerProps) -> Html {
    if props.toasts.is_empty() {
        return html! {};
    }

    html! {
        <div class="toast-container" role="status" aria-live="polite">
            {for props.toasts.iter().map(|toast| {
                let on_dismiss = {
                    let on_dismiss = props.on_dismiss.clone();
                    let id = toast.id;
                    Callback::from(move |_: MouseEvent| on_dismiss.emit(id))
                };
                html! {
                    <div key={toast.id} class={toast.kind.css_class()}>
                        <span class="toast-message">{&toast.message}</span>
                        <button type="button" class="toast-close" aria-label="Dismiss" onclick={on_dismiss}>
                            {"×"}
                        </button>
                    </div>
                }
            })}
        </div>
    }
}

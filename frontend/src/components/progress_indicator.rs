use booking_core::domain::steps::BOOKING_STEPS;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ProgressIndicatorProps {
    pub current_step: usize,
    pub completed: Vec<bool>,
    pub reachable: Vec<bool>,
    pub on_select: Callback<usize>,
}

#[function_component(ProgressIndicator)]
pub fn progress_indicator(props: &ProgressIndicatorProps) -> Html {
    html! {
        <ol class="booking-progress">
            {for BOOKING_STEPS.iter().map(|step| {
                let index = step.id;
                let is_current = index == props.current_step;
                let is_done = props.completed.get(index).copied().unwrap_or(false) && !is_current;
                let reachable = props.reachable.get(index).copied().unwrap_or(false);

                let mut class = classes!("progress-step");
                if is_current {
                    class.push("current");
                }
                if is_done {
                    class.push("completed");
                }
                if !reachable {
                    class.push("locked");
                }

                let onclick = {
                    let on_select = props.on_select.clone();
                    Callback::from(move |_: MouseEvent| on_select.emit(index))
                };

                html! {
                    <li key={index} {class}>
                        <button type="button" class="progress-step-button" disabled={!reachable} {onclick}>
                            <span class="progress-step-marker">
                                {if is_done { "✓".to_string() } else { (index + 1).to_string() }}
                            </span>
                            <span class="progress-step-label">{step.label}</span>
                            <span class="progress-step-short-label">{step.short_label}</span>
                        </button>
                    </li>
                }
            })}
        </ol>
    }
}

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ResumePromptProps {
    pub on_resume: Callback<()>,
    pub on_start_over: Callback<()>,
}

/// Offered when a valid draft from an earlier visit exists
#[function_component(ResumePrompt)]
pub fn resume_prompt(props: &ResumePromptProps) -> Html {
    let on_resume = {
        let on_resume = props.on_resume.clone();
        Callback::from(move |_: MouseEvent| on_resume.emit(()))
    };
    let on_start_over = {
        let on_start_over = props.on_start_over.clone();
        Callback::from(move |_: MouseEvent| on_start_over.emit(()))
    };

    html! {
        <div class="resume-prompt">
            <h3 class="resume-prompt-title">{"Continue your previous booking?"}</h3>
            <p class="resume-prompt-text">
                {"You started booking with this teacher recently. Pick up where you left off or start again."}
            </p>
            <div class="resume-prompt-buttons">
                <button type="button" class="btn btn-primary" onclick={on_resume}>{"Continue booking"}</button>
                <button type="button" class="btn btn-secondary" onclick={on_start_over}>{"Start over"}</button>
            </div>
        </div>
    }
}

use booking_core::domain::catalog::format_currency;
use shared::TeacherSubject;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SubjectStepProps {
    pub subjects: Vec<TeacherSubject>,
    pub selected: String,
    pub currency: String,
    pub on_select: Callback<String>,
}

#[function_component(SubjectStep)]
pub fn subject_step(props: &SubjectStepProps) -> Html {
    html! {
        <div class="booking-step subject-step">
            <div class="step-intro">
                <h3>{"Which subject do you want to study?"}</h3>
                <p>{"Prices are per session for each subject"}</p>
            </div>

            {if props.subjects.is_empty() {
                html! { <p class="step-empty">{"This teacher has not listed any subjects yet."}</p> }
            } else {
                html! {
                    <div class="option-list">
                        {for props.subjects.iter().map(|subject| {
                            let is_selected = props.selected == subject.id;
                            let onclick = {
                                let on_select = props.on_select.clone();
                                let id = subject.id.clone();
                                Callback::from(move |_: MouseEvent| on_select.emit(id.clone()))
                            };
                            html! {
                                <button type="button" key={subject.id.clone()}
                                    class={classes!("option-card", is_selected.then_some("selected"))}
                                    {onclick}>
                                    <span class="option-check">{if is_selected { "✓" } else { "" }}</span>
                                    <span class="option-title">{&subject.name}</span>
                                    <span class="option-price">
                                        <strong>{format_currency(subject.price, &props.currency)}</strong>
                                        <small>{"per session"}</small>
                                    </span>
                                </button>
                            }
                        })}
                    </div>
                }
            }}
        </div>
    }
}

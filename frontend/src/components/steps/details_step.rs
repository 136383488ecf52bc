use booking_core::{BookingFlowState, FlowUpdate};
use shared::{UserProfile, UserRole};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use super::review_summary::ReviewSummary;
use crate::services::navigation::{add_child_url, current_path, navigate};

#[derive(Properties, PartialEq)]
pub struct DetailsStepProps {
    pub profile: Option<UserProfile>,
    pub state: BookingFlowState,
    pub notes_limit: usize,
    pub teacher_name: String,
    pub subject_name: String,
    pub currency: String,
    pub on_update: Callback<Vec<FlowUpdate>>,
}

/// Who the session is for, notes, and the terms checkbox, above the summary
#[function_component(DetailsStep)]
pub fn details_step(props: &DetailsStepProps) -> Html {
    let state = &props.state;
    let is_parent = props.profile.as_ref().map(|p| p.role == UserRole::Parent).unwrap_or(false);

    let on_child_change = {
        let on_update = props.on_update.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            let child = if value.is_empty() { None } else { Some(value) };
            on_update.emit(vec![FlowUpdate::ChildId(child)]);
        })
    };

    let on_add_child = Callback::from(|_: MouseEvent| navigate(&add_child_url(&current_path())));

    let on_notes_input = {
        let on_update = props.on_update.clone();
        Callback::from(move |e: InputEvent| {
            let textarea: HtmlTextAreaElement = e.target_unchecked_into();
            on_update.emit(vec![FlowUpdate::Notes(textarea.value())]);
        })
    };

    let on_terms_change = {
        let on_update = props.on_update.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_update.emit(vec![FlowUpdate::TermsAccepted(input.checked())]);
        })
    };

    let notes_length = state.booking_notes.chars().count();

    let attendee = match &props.profile {
        Some(profile) if is_parent => {
            let children = profile.children();
            html! {
                <div class="form-group">
                    <label for="booking-child">{"Who is this session for?"}</label>
                    {if children.is_empty() {
                        html! {
                            <div class="no-children">
                                <p>{"Add your child's profile before booking a session for them"}</p>
                            </div>
                        }
                    } else {
                        html! {
                            <select id="booking-child" onchange={on_child_change}>
                                <option value="" selected={state.selected_child_id.is_none()}>{"Select a child"}</option>
                                {for children.iter().map(|child| html! {
                                    <option key={child.id.clone()} value={child.id.clone()}
                                        selected={state.selected_child_id.as_deref() == Some(child.id.as_str())}>
                                        {match &child.grade_level {
                                            Some(grade) => format!("{} ({})", child.name, grade),
                                            None => child.name.clone(),
                                        }}
                                    </option>
                                })}
                            </select>
                        }
                    }}
                    <button type="button" class="btn btn-secondary add-child-button" onclick={on_add_child}>
                        {"+ Add a child"}
                    </button>
                </div>
            }
        }
        Some(profile) => html! {
            <p class="booking-for">{format!("Booking for {}", profile.display_name())}</p>
        },
        None => html! {},
    };

    html! {
        <div class="booking-step details-step">
            <div class="step-intro">
                <h3>{"Almost done"}</h3>
            </div>

            {attendee}

            <div class="form-group">
                <label for="booking-notes">{"Notes for the teacher (optional)"}</label>
                <textarea
                    id="booking-notes"
                    rows="4"
                    maxlength={props.notes_limit.to_string()}
                    placeholder="What would you like to focus on?"
                    value={state.booking_notes.clone()}
                    oninput={on_notes_input}
                />
                <span class={classes!("notes-counter", (notes_length >= props.notes_limit).then_some("at-limit"))}>
                    {format!("{}/{}", notes_length, props.notes_limit)}
                </span>
            </div>

            <div class="form-group terms">
                <label class="checkbox-label">
                    <input type="checkbox" checked={state.terms_accepted} onchange={on_terms_change} />
                    {" I agree to the booking terms and cancellation policy"}
                </label>
            </div>

            <ReviewSummary
                teacher_name={props.teacher_name.clone()}
                subject_name={props.subject_name.clone()}
                state={state.clone()}
                currency={props.currency.clone()}
            />
        </div>
    }
}

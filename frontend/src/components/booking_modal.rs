use std::cell::RefCell;
use std::rc::Rc;

use booking_core::domain::analytics::{AnalyticsSink, BookingEvent};
use booking_core::domain::flow::{PrimaryAction, INCOMPLETE_STEP_MESSAGE};
use booking_core::domain::steps::{STEP_BOOKING_TYPE, STEP_DETAILS, STEP_SCHEDULE, STEP_SUBJECT};
use booking_core::domain::submission::{post_booking_destination, submit_booking};
use booking_core::{BookingConfig, FlowContext, FlowUpdate, StepAdvance};
use gloo::events::EventListener;
use shared::{BookingTypeOption, TeacherBookingProfile};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, KeyboardEvent};
use yew::prelude::*;

use crate::components::login_checkpoint::LoginCheckpoint;
use crate::components::progress_indicator::ProgressIndicator;
use crate::components::resume_prompt::ResumePrompt;
use crate::components::steps::{BookingTypeStep, DetailsStep, ScheduleStep, SubjectStep};
use crate::hooks::use_booking_flow::use_booking_flow;
use crate::hooks::use_booking_options::use_booking_options;
use crate::hooks::use_toast::UseToastActions;
use crate::hooks::use_user_profile::{use_user_profile, UserProfileState};
use crate::services::analytics::LogAnalytics;
use crate::services::api::ApiClient;
use crate::services::date_utils::user_timezone;
use crate::services::logging::Logger;
use crate::services::navigation::navigate;

#[derive(Properties, PartialEq)]
pub struct BookingModalProps {
    pub api_client: ApiClient,
    pub config: Rc<BookingConfig>,
    pub teacher: TeacherBookingProfile,
    pub toast: UseToastActions,
    pub on_close: Callback<()>,
    /// Opened from the quick booking entry point; notes are shorter
    #[prop_or_default]
    pub quick_booking: bool,
}

/// Flow identity once the profile request settled, `None` while it is in flight
fn flow_context(teacher_id: &str, user: &UserProfileState) -> Option<FlowContext> {
    if user.loading {
        return None;
    }
    Some(match &user.profile {
        Some(profile) => FlowContext::signed_in(teacher_id, profile.id.clone(), profile.role),
        None => FlowContext::guest(teacher_id),
    })
}

/// Schedule fields that only make sense for the option they were picked under
fn cleared_schedule() -> Vec<FlowUpdate> {
    vec![
        FlowUpdate::Date(None),
        FlowUpdate::Slot(None),
        FlowUpdate::RecurringPatterns(Vec::new()),
        FlowUpdate::AvailabilityResponse(None),
        FlowUpdate::ScheduledSessions(Vec::new()),
        FlowUpdate::RecurringWeekday(None),
        FlowUpdate::RecurringTime(None),
        FlowUpdate::SuggestedDates(Vec::new()),
    ]
}

/// Claim the single submission slot; false when a request is already out
fn begin_submission(in_flight: &RefCell<bool>) -> bool {
    if *in_flight.borrow() {
        return false;
    }
    *in_flight.borrow_mut() = true;
    true
}

fn scroll_to_top(content_ref: &NodeRef) {
    if let Some(content) = content_ref.cast::<Element>() {
        content.set_scroll_top(0);
    }
}

#[function_component(BookingModal)]
pub fn booking_modal(props: &BookingModalProps) -> Html {
    let user = use_user_profile(&props.api_client);
    let profile = user.profile.clone();
    let context = flow_context(&props.teacher.id, &user);

    let booking = use_booking_flow(&props.teacher.id, context, props.config.clone(), props.quick_booking);
    let snapshot = &booking.snapshot;
    let state = &snapshot.state;
    let actions = booking.actions.clone();
    let currency = props.config.currency.clone();

    let options = use_booking_options(
        &props.api_client,
        &props.teacher,
        &state.selected_subject,
        !user.is_guest(),
        &currency,
    );

    let submitting = use_state(|| false);
    // read at click time; `submitting` is only the rendered copy
    let in_flight = use_mut_ref(|| false);
    let checkpoint_requested = use_state(|| false);
    let content_ref = use_node_ref();

    {
        let teacher_id = props.teacher.id.clone();
        use_effect_with((), move |_| {
            LogAnalytics.track(&BookingEvent::Started { teacher_id });
            || ()
        });
    }

    let request_close = {
        let on_close = props.on_close.clone();
        let needs_confirmation = snapshot.needs_close_confirmation;
        let ttl_minutes = props.config.draft_ttl_minutes;
        Callback::from(move |_: ()| {
            if needs_confirmation
                && !gloo::dialogs::confirm(&format!(
                    "Your choices stay saved for {} minutes. Close the booking?",
                    ttl_minutes
                ))
            {
                return;
            }
            on_close.emit(());
        })
    };

    // Escape closes, with the same confirmation as the close button
    {
        let request_close = request_close.clone();
        use_effect_with(request_close, move |request_close| {
            let request_close = request_close.clone();
            let listener = web_sys::window().map(|window| {
                EventListener::new(&window, "keydown", move |event| {
                    if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                        if event.key() == "Escape" {
                            request_close.emit(());
                        }
                    }
                })
            });
            move || drop(listener)
        });
    }

    let on_backdrop_click = {
        let request_close = request_close.clone();
        Callback::from(move |_: MouseEvent| request_close.emit(()))
    };
    let on_close_click = {
        let request_close = request_close.clone();
        Callback::from(move |_: MouseEvent| request_close.emit(()))
    };
    let on_modal_click = Callback::from(|e: MouseEvent| e.stop_propagation());

    let on_step_select = {
        let go_to = actions.go_to.clone();
        let checkpoint_requested = checkpoint_requested.clone();
        let content_ref = content_ref.clone();
        Callback::from(move |step: usize| {
            if go_to.emit(step) {
                checkpoint_requested.set(false);
                scroll_to_top(&content_ref);
            }
        })
    };

    let on_subject_select = {
        let update = actions.update.clone();
        let current = state.selected_subject.clone();
        Callback::from(move |subject_id: String| {
            if subject_id == current {
                return;
            }
            let mut updates = vec![FlowUpdate::Subject(subject_id), FlowUpdate::BookingOption(None)];
            updates.extend(cleared_schedule());
            update.emit(updates);
        })
    };

    let on_option_select = {
        let update = actions.update.clone();
        let current = state.selected_booking_option.clone();
        Callback::from(move |option: BookingTypeOption| {
            let same_entry = current.as_ref().map(|c| c.same_entry(&option)).unwrap_or(false);
            let mut updates = vec![FlowUpdate::BookingOption(Some(option))];
            if !same_entry {
                updates.extend(cleared_schedule());
            }
            update.emit(updates);
        })
    };

    let submit = {
        let prepare = actions.prepare_submission.clone();
        let finish = actions.finish.clone();
        let toast = props.toast.clone();
        let api_client = props.api_client.clone();
        let submitting = submitting.clone();
        let in_flight = in_flight.clone();
        let on_close = props.on_close.clone();
        let teacher_id = props.teacher.id.clone();
        let role = profile.as_ref().map(|p| p.role);
        let price = state.selected_booking_option.as_ref().map(|o| o.price).unwrap_or(0);

        Callback::from(move |_: ()| {
            if !begin_submission(&in_flight) {
                Logger::debug_with_component("booking_modal", "Booking already in flight");
                return;
            }
            let submission = match prepare.emit(()) {
                Ok(submission) => submission,
                Err(e) => {
                    *in_flight.borrow_mut() = false;
                    toast.error(e.user_message());
                    return;
                }
            };
            submitting.set(true);

            let finish = finish.clone();
            let toast = toast.clone();
            let api_client = api_client.clone();
            let submitting = submitting.clone();
            let in_flight = in_flight.clone();
            let on_close = on_close.clone();
            let teacher_id = teacher_id.clone();

            spawn_local(async move {
                let kind = submission.kind();
                match submit_booking(&api_client, &submission).await {
                    Ok(_) => {
                        toast.success(kind.success_message());
                        LogAnalytics.track(&BookingEvent::Confirmed { teacher_id, kind, price });
                        finish.emit(());
                        on_close.emit(());
                        navigate(post_booking_destination(role));
                    }
                    Err(e) => {
                        // the draft stays so the same selection can be retried
                        let message = e.user_message();
                        Logger::error_with_component("booking_modal", &message);
                        LogAnalytics.track(&BookingEvent::Error {
                            teacher_id,
                            message: message.clone(),
                        });
                        toast.error(message);
                        *in_flight.borrow_mut() = false;
                        submitting.set(false);
                    }
                }
            });
        })
    };

    let on_primary = {
        let next = actions.next.clone();
        let submit = submit.clone();
        let toast = props.toast.clone();
        let checkpoint_requested = checkpoint_requested.clone();
        let content_ref = content_ref.clone();
        Callback::from(move |_: MouseEvent| match next.emit(()) {
            StepAdvance::Advanced => scroll_to_top(&content_ref),
            StepAdvance::Incomplete => toast.error(INCOMPLETE_STEP_MESSAGE),
            StepAdvance::LoginRequired => checkpoint_requested.set(true),
            StepAdvance::AtLastStep => submit.emit(()),
        })
    };

    let on_back = {
        let previous = actions.previous.clone();
        let checkpoint_requested = checkpoint_requested.clone();
        let content_ref = content_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if *checkpoint_requested {
                checkpoint_requested.set(false);
                return;
            }
            previous.emit(());
            scroll_to_top(&content_ref);
        })
    };

    let subject_name = props
        .teacher
        .subjects
        .iter()
        .find(|s| s.id == state.selected_subject)
        .map(|s| s.name.clone())
        .unwrap_or_default();
    let show_checkpoint = snapshot.shows_login_checkpoint || *checkpoint_requested;
    let current_step = snapshot.current_step();

    let identity_pending = !snapshot.identity_known;
    let body = if identity_pending {
        html! {
            <div class="booking-loading">
                <div class="spinner"></div>
                <p>{"Checking your account..."}</p>
            </div>
        }
    } else if booking.has_pending_draft {
        html! {
            <ResumePrompt on_resume={actions.resume.clone()} on_start_over={actions.start_over.clone()} />
        }
    } else if show_checkpoint {
        html! { <LoginCheckpoint teacher_name={props.teacher.display_name.clone()} /> }
    } else {
        match current_step {
            STEP_SUBJECT => html! {
                <SubjectStep
                    subjects={props.teacher.subjects.clone()}
                    selected={state.selected_subject.clone()}
                    currency={currency.clone()}
                    on_select={on_subject_select}
                />
            },
            STEP_BOOKING_TYPE => html! {
                <BookingTypeStep
                    options={options.options.clone()}
                    loading={options.loading}
                    selected={state.selected_booking_option.clone()}
                    currency={currency.clone()}
                    on_select={on_option_select}
                />
            },
            STEP_SCHEDULE => match &state.selected_booking_option {
                Some(option) => html! {
                    <ScheduleStep
                        api_client={props.api_client.clone()}
                        config={props.config.clone()}
                        teacher_id={props.teacher.id.clone()}
                        availability={props.teacher.availability.clone()}
                        subject_id={state.selected_subject.clone()}
                        option={option.clone()}
                        timezone={user_timezone()}
                        selected_date={state.selected_date}
                        selected_slot={state.selected_slot.clone()}
                        recurring_patterns={state.recurring_patterns.clone()}
                        availability_response={state.availability_response.clone()}
                        recurring_weekday={state.recurring_weekday}
                        recurring_time={state.recurring_time.clone()}
                        suggested_dates={state.suggested_dates.clone()}
                        on_update={actions.update.clone()}
                    />
                },
                None => html! { <p class="step-hint">{"Choose a booking type first"}</p> },
            },
            STEP_DETAILS => html! {
                <DetailsStep
                    profile={profile.clone()}
                    state={state.clone()}
                    notes_limit={snapshot.notes_limit}
                    teacher_name={props.teacher.display_name.clone()}
                    subject_name={subject_name.clone()}
                    currency={currency.clone()}
                    on_update={actions.update.clone()}
                />
            },
            _ => html! {},
        }
    };

    let primary_label = match snapshot.primary_action {
        PrimaryAction::Login => "Continue and sign in",
        PrimaryAction::Confirm if *submitting => "Booking...",
        PrimaryAction::Confirm => "Confirm booking",
        PrimaryAction::Next => "Next",
    };

    html! {
        <div class="modal-overlay booking-modal-overlay" onclick={on_backdrop_click}>
            <div class="modal booking-modal" role="dialog" aria-modal="true" onclick={on_modal_click}>
                <div class="booking-modal-header">
                    <h2 class="booking-modal-title">{format!("Book a session with {}", props.teacher.display_name)}</h2>
                    <button type="button" class="modal-close" aria-label="Close" onclick={on_close_click}>{"×"}</button>
                </div>

                {if booking.has_pending_draft || identity_pending {
                    html! {}
                } else {
                    html! {
                        <ProgressIndicator
                            current_step={current_step}
                            completed={snapshot.completed.clone()}
                            reachable={snapshot.reachable.clone()}
                            on_select={on_step_select}
                        />
                    }
                }}

                <div class="booking-modal-content" ref={content_ref}>
                    {body}
                </div>

                {if booking.has_pending_draft || identity_pending {
                    html! {}
                } else {
                    html! {
                        <div class="booking-modal-footer">
                            <button type="button" class="btn btn-secondary"
                                disabled={(current_step == 0 && !show_checkpoint) || *submitting}
                                onclick={on_back}>
                                {"Back"}
                            </button>
                            {if show_checkpoint {
                                html! {}
                            } else {
                                html! {
                                    <button type="button" class="btn btn-primary" disabled={*submitting} onclick={on_primary}>
                                        {primary_label}
                                    </button>
                                }
                            }}
                        </div>
                    }
                }}
            </div>
        </div>
    }
}

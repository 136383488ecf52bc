use std::cell::RefCell;
use std::rc::Rc;

use booking_core::domain::draft::DraftStore;
use booking_core::domain::flow::PrimaryAction;
use booking_core::domain::steps::STEP_COUNT;
use booking_core::domain::submission::{build_submission, AttemptClock, BookingSubmission};
use booking_core::{BookingConfig, BookingFlow, BookingFlowState, FlowContext, FlowUpdate, StepAdvance, SubmissionError};
use gloo::timers::callback::Timeout;
use yew::prelude::*;

use crate::services::date_utils::{now_utc, user_timezone};
use crate::services::logging::Logger;
use crate::services::storage::LocalDraftStorage;

type SharedFlow = Rc<RefCell<BookingFlow>>;
type SharedTimer = Rc<RefCell<Option<Timeout>>>;

/// Render-time view of the flow
#[derive(Clone, PartialEq)]
pub struct BookingFlowSnapshot {
    pub state: BookingFlowState,
    pub completed: Vec<bool>,
    pub reachable: Vec<bool>,
    pub primary_action: PrimaryAction,
    pub shows_login_checkpoint: bool,
    pub needs_close_confirmation: bool,
    pub notes_limit: usize,
    pub identity_known: bool,
}

impl BookingFlowSnapshot {
    fn of(flow: &BookingFlow) -> Self {
        Self {
            state: flow.state().clone(),
            completed: (0..STEP_COUNT).map(|step| flow.is_step_complete(step)).collect(),
            reachable: (0..STEP_COUNT).map(|step| flow.can_go_to_step(step)).collect(),
            primary_action: flow.primary_action(),
            shows_login_checkpoint: flow.shows_login_checkpoint(),
            needs_close_confirmation: flow.needs_close_confirmation(),
            notes_limit: flow.notes_limit(),
            identity_known: flow.identity_known(),
        }
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }
}

#[derive(Clone, PartialEq)]
pub struct UseBookingFlowActions {
    pub update: Callback<Vec<FlowUpdate>>,
    pub next: Callback<(), StepAdvance>,
    pub previous: Callback<()>,
    pub go_to: Callback<usize, bool>,
    pub resume: Callback<()>,
    pub start_over: Callback<()>,
    pub prepare_submission: Callback<(), Result<BookingSubmission, SubmissionError>>,
    /// Clear everything after the backend accepted the booking
    pub finish: Callback<()>,
}

pub struct UseBookingFlowResult {
    pub snapshot: BookingFlowSnapshot,
    pub has_pending_draft: bool,
    pub actions: UseBookingFlowActions,
}

fn schedule_write(flow: &SharedFlow, store: &Rc<DraftStore<LocalDraftStorage>>, timer: &SharedTimer, delay_ms: u32) {
    if flow.borrow_mut().schedule_persist(now_utc()).is_none() {
        return;
    }
    let flow = flow.clone();
    let store = store.clone();
    // replacing the handle drops and cancels the previous timer
    *timer.borrow_mut() = Some(Timeout::new(delay_ms, move || {
        if let Err(e) = flow.borrow_mut().flush_pending(&*store) {
            Logger::warn_with_component("use_booking_flow", &format!("Draft not saved: {}", e));
        }
    }));
}

fn is_pristine(state: &BookingFlowState) -> bool {
    state.current_step == 0 && state.selected_subject.is_empty()
}

/// Wizard state with debounced draft persistence in `localStorage`.
///
/// `context` stays `None` while the user profile is loading; the flow
/// neither offers nor writes a draft until it arrives.
#[hook]
pub fn use_booking_flow(
    teacher_id: &str,
    context: Option<FlowContext>,
    config: Rc<BookingConfig>,
    quick_booking: bool,
) -> UseBookingFlowResult {
    let flow: SharedFlow = {
        let teacher_id = teacher_id.to_string();
        let config = config.clone();
        use_mut_ref(move || {
            BookingFlow::awaiting_identity(teacher_id, &config).with_notes_limit(config.notes_limit_for(quick_booking))
        })
    };
    let store = use_memo(config.clone(), |config| DraftStore::new(LocalDraftStorage, config));
    let timer: SharedTimer = use_mut_ref(|| None);
    let clock = use_mut_ref(AttemptClock::new);
    let has_pending_draft = use_state(|| false);
    let update_trigger = use_force_update();
    let delay_ms = config.persist_debounce_ms;

    // Identity arrives after the profile loads; re-offer the draft while nothing was chosen yet
    {
        let flow = flow.clone();
        let store = store.clone();
        let has_pending_draft = has_pending_draft.clone();
        let update_trigger = update_trigger.clone();
        use_effect_with(context, move |context| {
            if let Some(context) = context {
                let mut flow = flow.borrow_mut();
                flow.set_context(context.clone());
                if is_pristine(flow.state()) {
                    let pending = flow.check_pending_booking(&*store, now_utc());
                    if pending {
                        Logger::info_with_component("use_booking_flow", "Found a saved booking draft");
                    }
                    has_pending_draft.set(pending);
                }
                update_trigger.force_update();
            }
            || ()
        });
    }

    // Land a write still waiting in the quiet period when the modal closes
    {
        let flow = flow.clone();
        let store = store.clone();
        let timer = timer.clone();
        use_effect_with((), move |_| {
            move || {
                timer.borrow_mut().take();
                if let Err(e) = flow.borrow_mut().flush_pending(&*store) {
                    Logger::warn_with_component("use_booking_flow", &format!("Draft not saved on close: {}", e));
                }
            }
        });
    }

    let update = {
        let flow = flow.clone();
        let store = store.clone();
        let timer = timer.clone();
        let update_trigger = update_trigger.clone();
        use_callback((), move |updates: Vec<FlowUpdate>, _| {
            flow.borrow_mut().update_many(updates);
            schedule_write(&flow, &store, &timer, delay_ms);
            update_trigger.force_update();
        })
    };

    let next = {
        let flow = flow.clone();
        let store = store.clone();
        let timer = timer.clone();
        let update_trigger = update_trigger.clone();
        use_callback((), move |_: (), _| {
            let outcome = flow.borrow_mut().go_to_next_step();
            match outcome {
                StepAdvance::Advanced | StepAdvance::AtLastStep => {
                    schedule_write(&flow, &store, &timer, delay_ms);
                    update_trigger.force_update();
                }
                // the guest leaves for the login page next; write now
                StepAdvance::LoginRequired => {
                    timer.borrow_mut().take();
                    let mut flow = flow.borrow_mut();
                    flow.schedule_persist(now_utc());
                    if let Err(e) = flow.flush_pending(&*store) {
                        Logger::warn_with_component("use_booking_flow", &format!("Draft not saved before login: {}", e));
                    }
                }
                StepAdvance::Incomplete => {}
            }
            outcome
        })
    };

    let previous = {
        let flow = flow.clone();
        let store = store.clone();
        let timer = timer.clone();
        let update_trigger = update_trigger.clone();
        use_callback((), move |_: (), _| {
            if flow.borrow_mut().go_to_previous_step() {
                schedule_write(&flow, &store, &timer, delay_ms);
                update_trigger.force_update();
            }
        })
    };

    let go_to = {
        let flow = flow.clone();
        let store = store.clone();
        let timer = timer.clone();
        let update_trigger = update_trigger.clone();
        use_callback((), move |target: usize, _| {
            let moved = flow.borrow_mut().go_to_step(target);
            if moved {
                schedule_write(&flow, &store, &timer, delay_ms);
                update_trigger.force_update();
            }
            moved
        })
    };

    let resume = {
        let flow = flow.clone();
        let store = store.clone();
        let has_pending_draft = has_pending_draft.clone();
        let update_trigger = update_trigger.clone();
        use_callback((), move |_: (), _| {
            if !flow.borrow_mut().resume_booking(&*store, now_utc()) {
                Logger::warn_with_component("use_booking_flow", "Saved draft is no longer valid");
            }
            has_pending_draft.set(false);
            update_trigger.force_update();
        })
    };

    let start_over = {
        let flow = flow.clone();
        let store = store.clone();
        let timer = timer.clone();
        let has_pending_draft = has_pending_draft.clone();
        let update_trigger = update_trigger.clone();
        use_callback((), move |_: (), _| {
            timer.borrow_mut().take();
            if let Err(e) = flow.borrow_mut().reset_state(&*store) {
                Logger::warn_with_component("use_booking_flow", &format!("Draft not cleared: {}", e));
            }
            has_pending_draft.set(false);
            update_trigger.force_update();
        })
    };

    let prepare_submission = {
        let flow = flow.clone();
        let clock = clock.clone();
        let config = config.clone();
        use_callback((), move |_: (), _| {
            let flow = flow.borrow();
            let submitted_at = clock.borrow_mut().stamp(flow.state(), now_utc());
            build_submission(&flow, &config, &user_timezone(), submitted_at)
        })
    };

    let finish = {
        let flow = flow.clone();
        let store = store.clone();
        let timer = timer.clone();
        let clock = clock.clone();
        let update_trigger = update_trigger.clone();
        use_callback((), move |_: (), _| {
            timer.borrow_mut().take();
            clock.borrow_mut().reset();
            if let Err(e) = flow.borrow_mut().reset_state(&*store) {
                Logger::warn_with_component("use_booking_flow", &format!("Draft not cleared after booking: {}", e));
            }
            update_trigger.force_update();
        })
    };

    let snapshot = BookingFlowSnapshot::of(&flow.borrow());

    UseBookingFlowResult {
        snapshot,
        has_pending_draft: *has_pending_draft,
        actions: UseBookingFlowActions {
            update,
            next,
            previous,
            go_to,
            resume,
            start_over,
            prepare_submission,
            finish,
        },
    }
}

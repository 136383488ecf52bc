use std::rc::Rc;

use gloo::timers::callback::Timeout;
use yew::prelude::*;

const TOAST_LIFETIME_MS: u32 = 4000;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
            ToastKind::Info => "toast toast-info",
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Default, PartialEq)]
struct ToastList {
    toasts: Vec<Toast>,
}

enum ToastAction {
    Push(Toast),
    Dismiss(u32),
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut toasts = self.toasts.clone();
        match action {
            ToastAction::Push(toast) => toasts.push(toast),
            ToastAction::Dismiss(id) => toasts.retain(|t| t.id != id),
        }
        Rc::new(ToastList { toasts })
    }
}

#[derive(Clone, PartialEq)]
pub struct UseToastActions {
    pub show: Callback<(ToastKind, String)>,
    pub dismiss: Callback<u32>,
}

impl UseToastActions {
    pub fn success(&self, message: impl Into<String>) {
        self.show.emit((ToastKind::Success, message.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show.emit((ToastKind::Error, message.into()));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show.emit((ToastKind::Info, message.into()));
    }
}

pub struct UseToastResult {
    pub toasts: Vec<Toast>,
    pub actions: UseToastActions,
}

/// Transient notifications that dismiss themselves
#[hook]
pub fn use_toast() -> UseToastResult {
    let list = use_reducer(ToastList::default);
    let next_id = use_mut_ref(|| 0u32);

    let show = {
        let dispatcher = list.dispatcher();
        use_callback((), move |(kind, message): (ToastKind, String), _| {
            let id = {
                let mut next_id = next_id.borrow_mut();
                *next_id += 1;
                *next_id
            };
            dispatcher.dispatch(ToastAction::Push(Toast { id, kind, message }));
            let dispatcher = dispatcher.clone();
            Timeout::new(TOAST_LIFETIME_MS, move || {
                dispatcher.dispatch(ToastAction::Dismiss(id));
            })
            .forget();
        })
    };

    let dismiss = {
        let dispatcher = list.dispatcher();
        use_callback((), move |id: u32, _| {
            dispatcher.dispatch(ToastAction::Dismiss(id));
        })
    };

    UseToastResult {
        toasts: list.toasts.clone(),
        actions: UseToastActions { show, dismiss },
    }
}

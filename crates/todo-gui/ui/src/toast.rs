use std::cell::Cell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use todo_core::notify::{
  Notifier,
  Toast,
  ToastId
};
use yew::{
  Reducible,
  UseReducerDispatcher
};

pub enum ToastAction {
  Upsert(ToastId, Toast),
  Dismiss(Option<ToastId>)
}

/// Toasts on screen, oldest first.
#[derive(Clone, PartialEq, Default)]
pub struct ToastState {
  pub toasts: Vec<(ToastId, Toast)>
}

impl Reducible for ToastState {
  type Action = ToastAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut toasts = self.toasts.clone();
    match action {
      | ToastAction::Upsert(id, toast) => {
        match toasts
          .iter_mut()
          .find(|(existing, _)| *existing == id)
        {
          | Some(slot) => slot.1 = toast,
          | None => toasts.push((id, toast))
        }
      }
      | ToastAction::Dismiss(Some(id)) => {
        toasts.retain(|(existing, _)| {
          *existing != id
        });
      }
      | ToastAction::Dismiss(None) => {
        toasts.clear();
      }
    }
    Rc::new(Self { toasts })
  }
}

/// [`Notifier`] backed by the toast stack.
/// Toasts with a duration remove themselves
/// when it runs out.
#[derive(Clone)]
pub struct ToastNotifier {
  dispatcher: UseReducerDispatcher<ToastState>,
  next_id:    Rc<Cell<ToastId>>
}

impl ToastNotifier {
  pub fn new(
    dispatcher: UseReducerDispatcher<
      ToastState
    >,
    next_id: Rc<Cell<ToastId>>
  ) -> Self {
    Self {
      dispatcher,
      next_id
    }
  }

  fn put(&self, id: ToastId, toast: Toast) {
    let expires_in = toast.duration;
    self
      .dispatcher
      .dispatch(ToastAction::Upsert(id, toast));

    if let Some(duration) = expires_in {
      let dispatcher = self.dispatcher.clone();
      let millis = u32::try_from(
        duration.as_millis()
      )
      .unwrap_or(u32::MAX);
      Timeout::new(millis, move || {
        dispatcher.dispatch(
          ToastAction::Dismiss(Some(id))
        );
      })
      .forget();
    }
  }
}

impl PartialEq for ToastNotifier {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.next_id, &other.next_id)
      && self.dispatcher == other.dispatcher
  }
}

impl Notifier for ToastNotifier {
  fn show(&self, toast: Toast) -> ToastId {
    let id = self.next_id.get() + 1;
    self.next_id.set(id);
    self.put(id, toast);
    id
  }

  fn resolve(
    &self,
    id: ToastId,
    toast: Toast
  ) {
    self.put(id, toast);
  }

  fn dismiss(&self, id: Option<ToastId>) {
    self
      .dispatcher
      .dispatch(ToastAction::Dismiss(id));
  }
}

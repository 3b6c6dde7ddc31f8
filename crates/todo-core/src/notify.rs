use std::cell::{
  Cell,
  RefCell
};
use std::rc::Rc;
use std::time::Duration;

pub type ToastId = u64;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ToastKind {
  Blank,
  Success,
  Error,
  Loading
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub kind:     ToastKind,
  pub message:  String,
  pub icon:     Option<String>,
  pub duration: Option<Duration>
}

impl Toast {
  pub fn blank(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind:     ToastKind::Blank,
      message:  message.into(),
      icon:     None,
      duration: None
    }
  }

  pub fn success(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind: ToastKind::Success,
      ..Self::blank(message)
    }
  }

  pub fn error(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind: ToastKind::Error,
      ..Self::blank(message)
    }
  }

  pub fn loading(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind: ToastKind::Loading,
      ..Self::blank(message)
    }
  }

  pub fn with_icon(
    mut self,
    icon: impl Into<String>
  ) -> Self {
    self.icon = Some(icon.into());
    self
  }

  pub fn with_duration(
    mut self,
    duration: Duration
  ) -> Self {
    self.duration = Some(duration);
    self
  }

  /// Icon and message as one line.
  pub fn text(&self) -> String {
    match &self.icon {
      | Some(icon) => {
        format!(
          "{} {}",
          icon.trim_end(),
          self.message
        )
      }
      | None => self.message.clone()
    }
  }
}

/// The user-facing notification channel.
/// A loading toast can later be resolved in
/// place by id.
pub trait Notifier {
  fn show(&self, toast: Toast) -> ToastId;

  fn resolve(
    &self,
    id: ToastId,
    toast: Toast
  );

  /// `None` dismisses every toast.
  fn dismiss(&self, id: Option<ToastId>);

  fn loading(
    &self,
    message: &str
  ) -> ToastId {
    self.show(Toast::loading(message))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
  Show(ToastId, Toast),
  Resolve(ToastId, Toast),
  Dismiss(Option<ToastId>)
}

/// Keeps every notification in memory, in
/// order.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
  events:  Rc<RefCell<Vec<NotifyEvent>>>,
  next_id: Rc<Cell<ToastId>>
}

impl MemoryNotifier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn events(
    &self
  ) -> Vec<NotifyEvent> {
    self.events.borrow().clone()
  }

  /// Toasts as the user would last have
  /// seen them: shows and in-place
  /// resolutions, in order.
  pub fn messages(&self) -> Vec<String> {
    self
      .events
      .borrow()
      .iter()
      .filter_map(|event| match event {
        | NotifyEvent::Show(_, toast)
        | NotifyEvent::Resolve(_, toast) => {
          Some(toast.text())
        }
        | NotifyEvent::Dismiss(_) => None
      })
      .collect()
  }

  pub fn is_empty(&self) -> bool {
    self.events.borrow().is_empty()
  }
}

impl Notifier for MemoryNotifier {
  fn show(&self, toast: Toast) -> ToastId {
    let id = self.next_id.get() + 1;
    self.next_id.set(id);
    self
      .events
      .borrow_mut()
      .push(NotifyEvent::Show(id, toast));
    id
  }

  fn resolve(
    &self,
    id: ToastId,
    toast: Toast
  ) {
    self
      .events
      .borrow_mut()
      .push(NotifyEvent::Resolve(id, toast));
  }

  fn dismiss(&self, id: Option<ToastId>) {
    self
      .events
      .borrow_mut()
      .push(NotifyEvent::Dismiss(id));
  }
}

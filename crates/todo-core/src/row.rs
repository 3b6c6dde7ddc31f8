//! One task row: its local edit state and
//! the remote mutations it can issue.
//!
//! Local collection state only changes after
//! the service confirms a mutation. Toggle
//! and delete failures are logged and never
//! shown; rename failures show the server's
//! message when it sent one.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use todo_gui_shared::{
  TaskDto,
  TaskId
};
use tracing::{
  debug,
  error,
  info,
  instrument
};

use crate::api::TaskApi;
use crate::collection::{
  TaskChange,
  TaskListHandle
};
use crate::notify::{
  Notifier,
  Toast
};

const TOAST_TASK_NOT_FOUND: &str =
  "🛠️ Task was not found";
const TOAST_DOING_TASK: &str =
  "Doing task...";
const TOAST_UNDOING_TASK: &str =
  "Task is back to in-progress state...";
const TOAST_TASK_DONE: &str =
  "Task is done!";
const TOAST_TASK_IN_PROGRESS: &str =
  "Task is now in progress";
const TOAST_RENAMING: &str =
  "Renaming task...";
const TOAST_RENAMED: &str =
  "Task was successfully renamed!";
const TOAST_DELETED: &str =
  "✅ Task was successfully deleted!";

pub const KEY_CONFIRM: &str = "Enter";
pub const KEY_CANCEL: &str = "Escape";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum EditMode {
  #[default]
  Viewing,
  Editing
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum KeyAction {
  Commit,
  Cancelled,
  Ignored
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameStep {
  Unchanged,
  Submit { id: TaskId, title: String }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DeleteStep {
  CancelEdit,
  Submit { id: TaskId }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ToggleOutcome {
  NotFound,
  Toggled { completed: bool },
  Failed,
  Abandoned
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
  Unchanged,
  Renamed { title: String },
  Failed { message: Option<String> },
  Abandoned
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DeleteOutcome {
  CancelledEdit,
  Deleted,
  Failed,
  Abandoned
}

/// Ties in-flight requests to the row that
/// issued them. Once cancelled, responses
/// neither write to the collection nor
/// notify.
#[derive(Debug, Clone, Default)]
pub struct RowScope {
  cancelled: Rc<Cell<bool>>
}

impl RowScope {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.cancelled.set(true);
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancelled.get()
  }
}

/// Local state of a row. Editing is never
/// shared with other rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowItem {
  id:             TaskId,
  mode:           EditMode,
  input_value:    String,
  original_title: String
}

impl RowItem {
  pub fn new(task: &TaskDto) -> Self {
    Self {
      id:             task.id,
      mode:           EditMode::Viewing,
      input_value:    task.title.clone(),
      original_title: task.title.clone()
    }
  }

  pub fn id(&self) -> TaskId {
    self.id
  }

  pub fn mode(&self) -> EditMode {
    self.mode
  }

  pub fn is_editing(&self) -> bool {
    self.mode == EditMode::Editing
  }

  pub fn input_value(&self) -> &str {
    &self.input_value
  }

  pub fn original_title(&self) -> &str {
    &self.original_title
  }

  /// Shows the input. The input keeps
  /// whatever was typed last time; it is not
  /// re-seeded.
  pub fn begin_edit(&mut self) {
    self.mode = EditMode::Editing;
  }

  pub fn set_input(
    &mut self,
    value: impl Into<String>
  ) {
    self.input_value = value.into();
  }

  pub fn cancel_edit(&mut self) {
    self.mode = EditMode::Viewing;
  }

  pub fn on_key(
    &mut self,
    key: &str
  ) -> KeyAction {
    if !self.is_editing() {
      return KeyAction::Ignored;
    }

    match key {
      | KEY_CONFIRM => KeyAction::Commit,
      | KEY_CANCEL => {
        self.cancel_edit();
        KeyAction::Cancelled
      }
      | _ => KeyAction::Ignored
    }
  }

  /// Decides whether `new_title` needs a
  /// request. Blank titles and titles equal
  /// to the last committed one (both
  /// trimmed) leave edit mode right away.
  pub fn prepare_rename(
    &mut self,
    new_title: &str
  ) -> RenameStep {
    let title = new_title.trim();
    if title.is_empty()
      || title == self.original_title.trim()
    {
      debug!(id = self.id, "task was not changed");
      self.mode = EditMode::Viewing;
      return RenameStep::Unchanged;
    }

    RenameStep::Submit {
      id:    self.id,
      title: title.to_string()
    }
  }

  /// Edit mode ends whatever the outcome.
  pub fn finish_rename(
    &mut self,
    outcome: &RenameOutcome
  ) {
    if let RenameOutcome::Renamed {
      title
    } = outcome
    {
      self.original_title = title.clone();
    }
    self.mode = EditMode::Viewing;
  }

  /// While editing, the delete control acts
  /// as cancel.
  pub fn prepare_delete(
    &mut self
  ) -> DeleteStep {
    if self.is_editing() {
      self.mode = EditMode::Viewing;
      return DeleteStep::CancelEdit;
    }

    DeleteStep::Submit { id: self.id }
  }

  pub async fn rename<A, L, N>(
    &mut self,
    actions: &RowActions<A, L, N>,
    new_title: &str
  ) -> RenameOutcome
  where
    A: TaskApi,
    L: TaskListHandle,
    N: Notifier
  {
    match self.prepare_rename(new_title) {
      | RenameStep::Unchanged => {
        RenameOutcome::Unchanged
      }
      | RenameStep::Submit {
        id,
        title
      } => {
        let outcome = actions
          .submit_rename(id, &title)
          .await;
        self.finish_rename(&outcome);
        outcome
      }
    }
  }

  /// Renames to the current input value.
  pub async fn commit<A, L, N>(
    &mut self,
    actions: &RowActions<A, L, N>
  ) -> RenameOutcome
  where
    A: TaskApi,
    L: TaskListHandle,
    N: Notifier
  {
    let input = self.input_value.clone();
    self.rename(actions, &input).await
  }

  pub async fn delete<A, L, N>(
    &mut self,
    actions: &RowActions<A, L, N>
  ) -> DeleteOutcome
  where
    A: TaskApi,
    L: TaskListHandle,
    N: Notifier
  {
    match self.prepare_delete() {
      | DeleteStep::CancelEdit => {
        DeleteOutcome::CancelledEdit
      }
      | DeleteStep::Submit {
        id
      } => actions.submit_delete(id).await
    }
  }
}

/// Everything a row needs to mutate a task
/// remotely: the shared client, the
/// collection handle, the notification
/// channel and the row's scope.
#[derive(Debug, Clone)]
pub struct RowActions<A, L, N> {
  api:            A,
  tasks:          L,
  notifier:       N,
  scope:          RowScope,
  toast_duration: Duration
}

impl<A, L, N> RowActions<A, L, N>
where
  A: TaskApi,
  L: TaskListHandle,
  N: Notifier
{
  pub fn new(
    api: A,
    tasks: L,
    notifier: N,
    scope: RowScope,
    toast_duration: Duration
  ) -> Self {
    Self {
      api,
      tasks,
      notifier,
      scope,
      toast_duration
    }
  }

  pub fn scope(&self) -> &RowScope {
    &self.scope
  }

  #[instrument(skip(self))]
  pub async fn toggle_completion(
    &self,
    id: TaskId
  ) -> ToggleOutcome {
    let Some(current) = self.tasks.find(id)
    else {
      self.notifier.show(
        Toast::error(TOAST_TASK_NOT_FOUND)
          .with_duration(self.toast_duration)
      );
      return ToggleOutcome::NotFound;
    };

    let completing = !current.completed;
    let toast_id =
      self.notifier.loading(if completing {
        TOAST_DOING_TASK
      } else {
        TOAST_UNDOING_TASK
      });

    match self.api.toggle_task(id).await {
      | Ok(body) => {
        debug!(id, %body, "toggle response");
        if self.scope.is_cancelled() {
          debug!(id, "row gone; discarding toggle response");
          self.notifier.dismiss(Some(toast_id));
          return ToggleOutcome::Abandoned;
        }

        self.tasks.apply(TaskChange::Toggle(id));
        let toast = if completing {
          Toast::success(TOAST_TASK_DONE)
            .with_icon("✅ ")
        } else {
          Toast::success(TOAST_TASK_IN_PROGRESS)
            .with_icon("↩️ ")
        };
        self.notifier.resolve(
          toast_id,
          toast
            .with_duration(self.toast_duration)
        );
        info!(id, completed = completing, "task toggled");
        ToggleOutcome::Toggled {
          completed: completing
        }
      }
      | Err(err) => {
        error!(id, error = %err, "failed to toggle task");
        self.notifier.dismiss(Some(toast_id));
        ToggleOutcome::Failed
      }
    }
  }

  #[instrument(skip(self))]
  pub async fn submit_rename(
    &self,
    id: TaskId,
    title: &str
  ) -> RenameOutcome {
    let toast_id =
      self.notifier.loading(TOAST_RENAMING);

    let result =
      self.api.rename_task(id, title).await;
    if self.scope.is_cancelled() {
      debug!(id, "row gone; discarding rename response");
      self.notifier.dismiss(Some(toast_id));
      return RenameOutcome::Abandoned;
    }

    match result {
      | Ok(()) => {
        self.tasks.apply(TaskChange::Rename {
          id,
          title: title.to_string()
        });
        self.notifier.resolve(
          toast_id,
          Toast::blank(TOAST_RENAMED)
            .with_icon("✅")
            .with_duration(self.toast_duration)
        );
        info!(id, title, "task renamed");
        RenameOutcome::Renamed {
          title: title.to_string()
        }
      }
      | Err(err) => {
        error!(id, error = %err, "failed to rename task");
        self.notifier.dismiss(None);
        let message = err
          .server_message()
          .map(str::to_string);
        if let Some(message) = &message {
          self.notifier.show(
            Toast::blank(format!("❌ {message}"))
              .with_duration(self.toast_duration)
          );
        }
        RenameOutcome::Failed { message }
      }
    }
  }

  #[instrument(skip(self))]
  pub async fn submit_delete(
    &self,
    id: TaskId
  ) -> DeleteOutcome {
    match self.api.delete_task(id).await {
      | Ok(()) => {
        if self.scope.is_cancelled() {
          debug!(id, "row gone; discarding delete response");
          return DeleteOutcome::Abandoned;
        }

        self.tasks.apply(TaskChange::Remove(id));
        self.notifier.show(
          Toast::blank(TOAST_DELETED)
            .with_duration(self.toast_duration)
        );
        info!(id, "task deleted");
        DeleteOutcome::Deleted
      }
      | Err(err) => {
        error!(id, error = %err, "failed to delete task");
        DeleteOutcome::Failed
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use async_trait::async_trait;

  use super::*;
  use crate::api::{
    ApiError,
    ApiResult
  };
  use crate::collection::{
    SharedTaskList,
    TaskCollection,
    task
  };
  use crate::notify::{
    MemoryNotifier,
    NotifyEvent,
    ToastKind
  };

  #[derive(Debug, Clone, PartialEq, Eq)]
  enum Call {
    Toggle(TaskId),
    Rename(TaskId, String),
    Delete(TaskId)
  }

  #[derive(Debug, Clone, Default)]
  struct FakeApi {
    calls:   Rc<RefCell<Vec<Call>>>,
    failure: Option<(u16, Option<String>)>,
    /// Cancelled while the request is "in
    /// flight".
    cancel:  Option<RowScope>
  }

  impl FakeApi {
    fn failing(
      status: u16,
      message: Option<&str>
    ) -> Self {
      Self {
        failure: Some((
          status,
          message.map(str::to_string)
        )),
        ..Self::default()
      }
    }

    fn calls(&self) -> Vec<Call> {
      self.calls.borrow().clone()
    }

    fn respond(
      &self,
      call: Call
    ) -> ApiResult<()> {
      self.calls.borrow_mut().push(call);
      if let Some(scope) = &self.cancel {
        scope.cancel();
      }
      match &self.failure {
        | Some((status, message)) => {
          Err(ApiError::Status {
            status:  *status,
            message: message.clone()
          })
        }
        | None => Ok(())
      }
    }
  }

  #[async_trait(?Send)]
  impl TaskApi for FakeApi {
    async fn list_tasks(
      &self
    ) -> ApiResult<Vec<TaskDto>> {
      Ok(vec![])
    }

    async fn toggle_task(
      &self,
      id: TaskId
    ) -> ApiResult<serde_json::Value> {
      self.respond(Call::Toggle(id))?;
      Ok(serde_json::json!({"id": id}))
    }

    async fn rename_task(
      &self,
      id: TaskId,
      title: &str
    ) -> ApiResult<()> {
      self.respond(Call::Rename(
        id,
        title.to_string()
      ))
    }

    async fn delete_task(
      &self,
      id: TaskId
    ) -> ApiResult<()> {
      self.respond(Call::Delete(id))
    }
  }

  struct Fixture {
    api:      FakeApi,
    list:     SharedTaskList,
    notifier: MemoryNotifier,
    actions:
      RowActions<FakeApi, SharedTaskList, MemoryNotifier>
  }

  fn fixture(
    api: FakeApi,
    tasks: Vec<TaskDto>
  ) -> Fixture {
    let list = SharedTaskList::new(
      TaskCollection::from_remote(tasks)
    );
    let notifier = MemoryNotifier::new();
    let scope = api
      .cancel
      .clone()
      .unwrap_or_default();
    let actions = RowActions::new(
      api.clone(),
      list.clone(),
      notifier.clone(),
      scope,
      Duration::from_millis(3000)
    );
    Fixture {
      api,
      list,
      notifier,
      actions
    }
  }

  #[tokio::test]
  async fn toggle_marks_task_done() {
    let fx = fixture(
      FakeApi::default(),
      vec![task(1, "Buy milk", false)]
    );

    let outcome =
      fx.actions.toggle_completion(1).await;

    assert_eq!(
      outcome,
      ToggleOutcome::Toggled { completed: true }
    );
    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(1, "Buy milk", true)]
    );
    assert_eq!(
      fx.notifier.messages(),
      vec!["Doing task...", "✅ Task is done!"]
    );
  }

  #[tokio::test]
  async fn toggle_back_to_in_progress_leaves_others() {
    let fx = fixture(
      FakeApi::default(),
      vec![
        task(1, "a", true),
        task(2, "b", false),
      ]
    );

    fx.actions.toggle_completion(1).await;

    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(1, "a", false), task(2, "b", false)]
    );
    assert_eq!(
      fx.notifier.messages(),
      vec![
        "Task is back to in-progress state...",
        "↩️ Task is now in progress",
      ]
    );
  }

  #[tokio::test]
  async fn toggle_unknown_id_reports_not_found_without_request()
  {
    let fx = fixture(
      FakeApi::default(),
      vec![task(1, "a", false)]
    );

    let outcome =
      fx.actions.toggle_completion(42).await;

    assert_eq!(outcome, ToggleOutcome::NotFound);
    assert!(fx.api.calls().is_empty());
    let events = fx.notifier.events();
    assert!(matches!(
      events.as_slice(),
      [NotifyEvent::Show(_, toast)]
        if toast.kind == ToastKind::Error
          && toast.message == "🛠️ Task was not found"
    ));
  }

  #[tokio::test]
  async fn toggle_failure_is_silent_and_keeps_state() {
    let fx = fixture(
      FakeApi::failing(500, Some("boom")),
      vec![task(1, "a", false)]
    );

    let outcome =
      fx.actions.toggle_completion(1).await;

    assert_eq!(outcome, ToggleOutcome::Failed);
    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(1, "a", false)]
    );
    assert_eq!(
      fx.notifier.messages(),
      vec!["Doing task..."]
    );
    assert!(matches!(
      fx.notifier.events().last(),
      Some(NotifyEvent::Dismiss(Some(_)))
    ));
  }

  #[tokio::test]
  async fn rename_updates_collection_and_original_title() {
    let fx = fixture(
      FakeApi::default(),
      vec![task(2, "Old", false)]
    );
    let mut row =
      RowItem::new(&task(2, "Old", false));
    row.begin_edit();
    row.set_input("  New  ");

    let outcome = row.commit(&fx.actions).await;

    assert_eq!(
      outcome,
      RenameOutcome::Renamed {
        title: "New".to_string()
      }
    );
    assert_eq!(
      fx.api.calls(),
      vec![Call::Rename(2, "New".to_string())]
    );
    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(2, "New", false)]
    );
    assert_eq!(row.original_title(), "New");
    assert!(!row.is_editing());
    assert_eq!(
      fx.notifier.messages(),
      vec![
        "Renaming task...",
        "✅ Task was successfully renamed!",
      ]
    );
  }

  #[tokio::test]
  async fn rename_to_same_trimmed_title_is_a_noop() {
    let fx = fixture(
      FakeApi::default(),
      vec![task(2, "Old", false)]
    );
    let mut row =
      RowItem::new(&task(2, "Old", false));
    row.begin_edit();

    let outcome =
      row.rename(&fx.actions, " Old ").await;

    assert_eq!(outcome, RenameOutcome::Unchanged);
    assert!(fx.api.calls().is_empty());
    assert!(fx.notifier.is_empty());
    assert!(!row.is_editing());
    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(2, "Old", false)]
    );
  }

  #[tokio::test]
  async fn rename_to_blank_title_is_a_noop() {
    let fx = fixture(
      FakeApi::default(),
      vec![task(2, "Old", false)]
    );
    let mut row =
      RowItem::new(&task(2, "Old", false));
    row.begin_edit();

    let outcome =
      row.rename(&fx.actions, "   ").await;

    assert_eq!(outcome, RenameOutcome::Unchanged);
    assert!(fx.api.calls().is_empty());
  }

  #[tokio::test]
  async fn rename_failure_shows_server_message_and_exits_edit()
  {
    let fx = fixture(
      FakeApi::failing(
        400,
        Some("Title too long")
      ),
      vec![task(2, "Old", false)]
    );
    let mut row =
      RowItem::new(&task(2, "Old", false));
    row.begin_edit();

    let outcome =
      row.rename(&fx.actions, "New").await;

    assert_eq!(
      outcome,
      RenameOutcome::Failed {
        message: Some(
          "Title too long".to_string()
        )
      }
    );
    assert!(!row.is_editing());
    assert_eq!(row.original_title(), "Old");
    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(2, "Old", false)]
    );
    assert!(fx.notifier.events().contains(
      &NotifyEvent::Dismiss(None)
    ));
    assert_eq!(
      fx.notifier.messages().last().map(String::as_str),
      Some("❌ Title too long")
    );
  }

  #[tokio::test]
  async fn rename_failure_without_message_shows_nothing()
  {
    let fx = fixture(
      FakeApi::failing(502, None),
      vec![task(2, "Old", false)]
    );
    let mut row =
      RowItem::new(&task(2, "Old", false));
    row.begin_edit();

    let outcome =
      row.rename(&fx.actions, "New").await;

    assert_eq!(
      outcome,
      RenameOutcome::Failed { message: None }
    );
    assert_eq!(
      fx.notifier.messages(),
      vec!["Renaming task..."]
    );
    assert!(!row.is_editing());
  }

  #[tokio::test]
  async fn delete_removes_only_that_task() {
    let fx = fixture(
      FakeApi::default(),
      vec![task(3, "c", false), task(4, "d", true)]
    );
    let mut row =
      RowItem::new(&task(3, "c", false));

    let outcome = row.delete(&fx.actions).await;

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(4, "d", true)]
    );
    assert_eq!(
      fx.notifier.messages(),
      vec!["✅ Task was successfully deleted!"]
    );
  }

  #[tokio::test]
  async fn delete_while_editing_cancels_edit() {
    let fx = fixture(
      FakeApi::default(),
      vec![task(3, "c", false)]
    );
    let mut row =
      RowItem::new(&task(3, "c", false));
    row.begin_edit();

    let outcome = row.delete(&fx.actions).await;

    assert_eq!(
      outcome,
      DeleteOutcome::CancelledEdit
    );
    assert!(!row.is_editing());
    assert!(fx.api.calls().is_empty());
    assert_eq!(fx.list.snapshot().len(), 1);
  }

  #[tokio::test]
  async fn delete_failure_is_silent() {
    let fx = fixture(
      FakeApi::failing(404, Some("missing")),
      vec![task(3, "c", false)]
    );
    let mut row =
      RowItem::new(&task(3, "c", false));

    let outcome = row.delete(&fx.actions).await;

    assert_eq!(outcome, DeleteOutcome::Failed);
    assert_eq!(fx.list.snapshot().len(), 1);
    assert!(fx.notifier.is_empty());
  }

  #[tokio::test]
  async fn cancelled_scope_discards_responses() {
    let scope = RowScope::new();
    let api = FakeApi {
      cancel: Some(scope.clone()),
      ..FakeApi::default()
    };
    let fx = fixture(
      api,
      vec![task(1, "a", false)]
    );

    assert_eq!(
      fx.actions.toggle_completion(1).await,
      ToggleOutcome::Abandoned
    );
    assert_eq!(
      fx.actions.submit_delete(1).await,
      DeleteOutcome::Abandoned
    );
    assert_eq!(
      fx.actions.submit_rename(1, "b").await,
      RenameOutcome::Abandoned
    );
    assert!(scope.is_cancelled());
    assert_eq!(
      fx.list.snapshot().tasks(),
      &[task(1, "a", false)]
    );
    assert_eq!(fx.api.calls().len(), 3);
  }

  #[test]
  fn keys_drive_the_edit_state_machine() {
    let mut row =
      RowItem::new(&task(5, "Title", false));
    assert_eq!(row.mode(), EditMode::Viewing);
    assert_eq!(
      row.on_key(KEY_CONFIRM),
      KeyAction::Ignored
    );

    row.begin_edit();
    assert_eq!(row.on_key("a"), KeyAction::Ignored);
    assert_eq!(
      row.on_key(KEY_CONFIRM),
      KeyAction::Commit
    );
    assert!(row.is_editing());

    row.set_input("Draft");
    assert_eq!(
      row.on_key(KEY_CANCEL),
      KeyAction::Cancelled
    );
    assert_eq!(row.mode(), EditMode::Viewing);
    assert_eq!(row.input_value(), "Draft");
    assert_eq!(row.original_title(), "Title");

    row.begin_edit();
    assert_eq!(row.input_value(), "Draft");
  }

  #[test]
  fn prepare_delete_outside_edit_submits() {
    let mut row =
      RowItem::new(&task(8, "x", false));
    assert_eq!(
      row.prepare_delete(),
      DeleteStep::Submit { id: 8 }
    );
  }
}

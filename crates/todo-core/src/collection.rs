use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use todo_gui_shared::{
  TaskDto,
  TaskId
};
use tracing::{
  debug,
  warn
};

/// A change to the task collection. Rows
/// never touch the collection directly;
/// they hand one of these to the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
  Replace(Vec<TaskDto>),
  Remove(TaskId),
  Rename { id: TaskId, title: String },
  Toggle(TaskId)
}

/// Ordered tasks with unique ids. Order is
/// display order.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TaskCollection {
  tasks: Vec<TaskDto>
}

impl TaskCollection {
  /// Builds a collection from a remote
  /// payload, keeping the first task for any
  /// repeated id.
  pub fn from_remote(
    tasks: Vec<TaskDto>
  ) -> Self {
    let mut seen = BTreeSet::new();
    let tasks = tasks
      .into_iter()
      .filter(|task| {
        let fresh = seen.insert(task.id);
        if !fresh {
          warn!(
            id = task.id,
            "dropping task with duplicate id"
          );
        }
        fresh
      })
      .collect();
    Self { tasks }
  }

  pub fn tasks(&self) -> &[TaskDto] {
    &self.tasks
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = &TaskDto> {
    self.tasks.iter()
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  pub fn find(
    &self,
    id: TaskId
  ) -> Option<&TaskDto> {
    self
      .tasks
      .iter()
      .find(|task| task.id == id)
  }

  pub fn contains(
    &self,
    id: TaskId
  ) -> bool {
    self.find(id).is_some()
  }

  /// Returns the collection with `change`
  /// applied. A change naming an id that is
  /// not present leaves every task as is.
  pub fn apply(
    &self,
    change: &TaskChange
  ) -> TaskCollection {
    match change {
      | TaskChange::Replace(tasks) => {
        TaskCollection::from_remote(
          tasks.clone()
        )
      }
      | TaskChange::Remove(id) => {
        Self {
          tasks: self
            .tasks
            .iter()
            .filter(|task| task.id != *id)
            .cloned()
            .collect()
        }
      }
      | TaskChange::Rename {
        id,
        title
      } => self.map_task(*id, |task| {
        task.title = title.clone();
      }),
      | TaskChange::Toggle(id) => {
        self.map_task(*id, |task| {
          task.completed = !task.completed;
        })
      }
    }
  }

  fn map_task<F>(
    &self,
    id: TaskId,
    edit: F
  ) -> TaskCollection
  where
    F: Fn(&mut TaskDto)
  {
    Self {
      tasks: self
        .tasks
        .iter()
        .cloned()
        .map(|mut task| {
          if task.id == id {
            edit(&mut task);
          }
          task
        })
        .collect()
    }
  }
}

impl From<Vec<TaskDto>> for TaskCollection {
  fn from(tasks: Vec<TaskDto>) -> Self {
    TaskCollection::from_remote(tasks)
  }
}

/// Read access to the current collection
/// plus the single write path into it.
pub trait TaskListHandle {
  fn find(
    &self,
    id: TaskId
  ) -> Option<TaskDto>;

  fn apply(&self, change: TaskChange);
}

/// In-process owner of a collection for
/// drivers without a UI runtime.
#[derive(Debug, Clone, Default)]
pub struct SharedTaskList {
  inner: Rc<RefCell<TaskCollection>>
}

impl SharedTaskList {
  pub fn new(
    collection: TaskCollection
  ) -> Self {
    Self {
      inner: Rc::new(RefCell::new(
        collection
      ))
    }
  }

  pub fn snapshot(
    &self
  ) -> TaskCollection {
    self.inner.borrow().clone()
  }
}

impl TaskListHandle for SharedTaskList {
  fn find(
    &self,
    id: TaskId
  ) -> Option<TaskDto> {
    self.inner.borrow().find(id).cloned()
  }

  fn apply(&self, change: TaskChange) {
    debug!(?change, "applying task change");
    let next =
      self.inner.borrow().apply(&change);
    *self.inner.borrow_mut() = next;
  }
}

#[cfg(test)]
pub(crate) fn task(
  id: TaskId,
  title: &str,
  completed: bool
) -> TaskDto {
  TaskDto {
    id,
    title: title.to_string(),
    completed,
    created_at: "2024-03-01T10:00:00Z"
      .to_string()
  }
}

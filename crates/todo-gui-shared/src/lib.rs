use serde::{
  Deserialize,
  Serialize
};

pub type TaskId = i64;

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskDto {
  pub id:         TaskId,
  #[serde(default)]
  pub title:      String,
  #[serde(default)]
  pub completed:  bool,
  #[serde(default)]
  pub created_at: String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct RenameTaskRequest {
  pub title: String
}

/// Error body returned by the task API on
/// failed requests.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub error: Option<String>
}

/// `GET tasks` answers either with a bare
/// array or with the array wrapped in an
/// object.
#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum TaskListPayload {
  Bare(Vec<TaskDto>),
  Wrapped { tasks: Vec<TaskDto> }
}

impl TaskListPayload {
  pub fn into_tasks(self) -> Vec<TaskDto> {
    match self {
      | TaskListPayload::Bare(tasks) => tasks,
      | TaskListPayload::Wrapped {
        tasks
      } => tasks
    }
  }
}

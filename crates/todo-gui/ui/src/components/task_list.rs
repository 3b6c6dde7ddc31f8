use std::rc::Rc;

use todo_core::collection::{
  TaskChange,
  TaskCollection,
  TaskListHandle
};
use todo_gui_shared::{
  TaskDto,
  TaskId
};
use yew::{
  Html,
  Properties,
  Reducible,
  UseReducerDispatcher,
  function_component,
  html
};

use super::TaskRow;

/// The canonical collection. Only
/// [`TaskChange`]s reach it.
#[derive(Clone, PartialEq, Default)]
pub struct TaskStore(pub TaskCollection);

impl Reducible for TaskStore {
  type Action = TaskChange;

  fn reduce(
    self: Rc<Self>,
    change: Self::Action
  ) -> Rc<Self> {
    tracing::debug!(?change, "applying task change");
    Rc::new(TaskStore(self.0.apply(&change)))
  }
}

/// Read access to the collection as of this
/// render plus the dispatcher that writes to
/// the latest one.
#[derive(Clone, PartialEq)]
pub struct TaskListContext {
  pub tasks:      Rc<TaskStore>,
  pub dispatcher: UseReducerDispatcher<TaskStore>
}

impl TaskListHandle for TaskListContext {
  fn find(
    &self,
    id: TaskId
  ) -> Option<TaskDto> {
    self.tasks.0.find(id).cloned()
  }

  fn apply(&self, change: TaskChange) {
    self.dispatcher.dispatch(change);
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub list: TaskListContext
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  html! {
      <div class="task-list">
          {
              for props.list.tasks.0.iter().cloned().map(|task| html! {
                  <TaskRow
                      key={task.id.to_string()}
                      task={task}
                      list={props.list.clone()}
                  />
              })
          }
      </div>
  }
}

mod task_list;
mod task_row;
mod toast_stack;

pub use task_list::{
  TaskList,
  TaskListContext,
  TaskStore
};
pub use task_row::TaskRow;
pub use toast_stack::ToastStack;

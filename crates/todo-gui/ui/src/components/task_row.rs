use todo_core::datetime::{
  CreatedAt,
  format_created
};
use todo_core::row::{
  DeleteStep,
  KeyAction,
  RenameOutcome,
  RenameStep,
  RowActions,
  RowItem,
  RowScope
};
use todo_gui_shared::TaskDto;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
  HtmlInputElement,
  InputEvent,
  KeyboardEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html,
  use_context,
  use_effect_with,
  use_force_update,
  use_memo,
  use_mut_ref
};

use super::TaskListContext;
use crate::api::Services;

#[derive(Properties, PartialEq)]
pub struct TaskRowProps {
  pub task: TaskDto,
  pub list: TaskListContext
}

#[function_component(TaskRow)]
pub fn task_row(
  props: &TaskRowProps
) -> Html {
  let services = use_context::<Services>();
  let row =
    use_mut_ref(|| RowItem::new(&props.task));
  let refresh = use_force_update();
  let scope = use_memo((), |_| RowScope::new());

  {
    let scope = scope.clone();
    use_effect_with((), move |_| {
      move || scope.cancel()
    });
  }

  let Some(services) = services else {
    tracing::warn!(
      id = props.task.id,
      "task row rendered without services"
    );
    return html! {};
  };

  let actions = RowActions::new(
    services.api.clone(),
    props.list.clone(),
    services.notifier.clone(),
    (*scope).clone(),
    services.config.toast_duration()
  );
  let id = props.task.id;

  let on_toggle = {
    let actions = actions.clone();
    Callback::from(move |_| {
      let actions = actions.clone();
      spawn_local(async move {
        actions.toggle_completion(id).await;
      });
    })
  };

  let on_begin_edit = {
    let row = row.clone();
    let refresh = refresh.clone();
    Callback::from(move |_| {
      row.borrow_mut().begin_edit();
      refresh.force_update();
    })
  };

  let on_input = {
    let row = row.clone();
    let refresh = refresh.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      row.borrow_mut().set_input(input.value());
      refresh.force_update();
    })
  };

  let commit = {
    let row = row.clone();
    let refresh = refresh.clone();
    let actions = actions.clone();
    Callback::from(move |()| {
      let input =
        row.borrow().input_value().to_string();
      let step =
        row.borrow_mut().prepare_rename(&input);
      match step {
        | RenameStep::Unchanged => {
          refresh.force_update();
        }
        | RenameStep::Submit {
          id,
          title
        } => {
          let row = row.clone();
          let refresh = refresh.clone();
          let actions = actions.clone();
          spawn_local(async move {
            let outcome = actions
              .submit_rename(id, &title)
              .await;
            if outcome
              != RenameOutcome::Abandoned
            {
              row
                .borrow_mut()
                .finish_rename(&outcome);
              refresh.force_update();
            }
          });
        }
      }
    })
  };

  let on_confirm = {
    let commit = commit.clone();
    Callback::from(move |_| commit.emit(()))
  };

  let on_keydown = {
    let row = row.clone();
    let refresh = refresh.clone();
    Callback::from(move |e: KeyboardEvent| {
      let action =
        row.borrow_mut().on_key(&e.key());
      match action {
        | KeyAction::Commit => commit.emit(()),
        | KeyAction::Cancelled => {
          refresh.force_update();
        }
        | KeyAction::Ignored => {}
      }
    })
  };

  // Doubles as "cancel" while editing.
  let on_delete = {
    let row = row.clone();
    let refresh = refresh.clone();
    Callback::from(move |_| {
      let step = row.borrow_mut().prepare_delete();
      match step {
        | DeleteStep::CancelEdit => {
          refresh.force_update();
        }
        | DeleteStep::Submit {
          id
        } => {
          let actions = actions.clone();
          spawn_local(async move {
            actions.submit_delete(id).await;
          });
        }
      }
    })
  };

  let state = row.borrow().clone();
  let editing = state.is_editing();
  let completed = props.task.completed;
  let tooltip = (!editing).then(|| {
    format!(
      "created {}",
      format_created(
        &CreatedAt::from(
          props.task.created_at.as_str()
        ),
        &services.config.invalid_date_label
      )
    )
  });

  html! {
      <div class="task-row" title={tooltip}>
          <button
              class={classes!("task-check", completed.then_some("checked"))}
              onclick={on_toggle}
          >
              { if completed { "✓" } else { "" } }
          </button>
          <div class="task-title">
              {
                  if editing {
                      html! {
                          <input
                              class="task-input"
                              value={state.input_value().to_string()}
                              placeholder="type a new name for this task"
                              oninput={on_input}
                              onkeydown={on_keydown}
                          />
                      }
                  } else {
                      html! { <p>{ &props.task.title }</p> }
                  }
              }
          </div>
          <div class="task-actions">
              {
                  if editing {
                      html! { <button class="btn" title="Save" onclick={on_confirm}>{ "✔" }</button> }
                  } else {
                      html! { <button class="btn" title="Edit" onclick={on_begin_edit}>{ "✎" }</button> }
                  }
              }
              <button
                  class="btn danger"
                  title={if editing { "Cancel" } else { "Delete" }}
                  onclick={on_delete}
              >
                  { "✕" }
              </button>
          </div>
      </div>
  }
}

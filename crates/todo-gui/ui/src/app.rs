use std::cell::Cell;
use std::rc::Rc;

use todo_core::api::{
  HttpTaskApi,
  TaskApi
};
use todo_core::collection::TaskChange;
use todo_core::notify::ToastId;
use wasm_bindgen_futures::spawn_local;
use yew::{
  Callback,
  ContextProvider,
  Html,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_reducer,
  use_state
};

use crate::api::Services;
use crate::components::{
  TaskList,
  TaskListContext,
  TaskStore,
  ToastStack
};
use crate::storage::load_client_config;
use crate::toast::{
  ToastAction,
  ToastNotifier,
  ToastState
};

#[derive(Clone, PartialEq)]
enum LoadState {
  Loading,
  Loaded,
  Failed(String)
}

#[function_component(App)]
pub fn app() -> Html {
  let config = use_memo((), |_| {
    Rc::new(load_client_config())
  });
  let api = {
    let config = config.clone();
    use_memo((), move |_| {
      HttpTaskApi::new(&config)
        .map_err(|err| err.to_string())
    })
  };
  let toasts = use_reducer(ToastState::default);
  let next_toast_id =
    use_memo((), |_| Rc::new(Cell::new(0)));
  let tasks = use_reducer(TaskStore::default);
  let load_state =
    use_state(|| LoadState::Loading);

  {
    let api = api.clone();
    let dispatcher = tasks.dispatcher();
    let load_state = load_state.clone();
    use_effect_with((), move |_| {
      match (*api).clone() {
        | Ok(api) => {
          spawn_local(async move {
            match api.list_tasks().await {
              | Ok(fetched) => {
                tracing::info!(
                  total = fetched.len(),
                  "tasks loaded"
                );
                dispatcher.dispatch(
                  TaskChange::Replace(fetched)
                );
                load_state.set(LoadState::Loaded);
              }
              | Err(err) => {
                tracing::error!(
                  error = %err,
                  "failed to load tasks"
                );
                load_state.set(LoadState::Failed(
                  err.to_string()
                ));
              }
            }
          });
        }
        | Err(reason) => {
          load_state.set(LoadState::Failed(reason));
        }
      }
      || ()
    });
  }

  let on_dismiss = {
    let dispatcher = toasts.dispatcher();
    Callback::from(move |id: ToastId| {
      dispatcher
        .dispatch(ToastAction::Dismiss(Some(id)));
    })
  };

  let toast_stack = html! {
      <ToastStack toasts={toasts.toasts.clone()} on_dismiss={on_dismiss} />
  };

  let Ok(api) = (*api).clone() else {
    return html! {
        <main class="app">
            <p class="load-error">{ "Could not start the HTTP client." }</p>
            { toast_stack }
        </main>
    };
  };

  let services = Services {
    api,
    notifier: ToastNotifier::new(
      toasts.dispatcher(),
      (*next_toast_id).clone()
    ),
    config: (*config).clone()
  };
  let list = TaskListContext {
    tasks:      Rc::new((*tasks).clone()),
    dispatcher: tasks.dispatcher()
  };

  let body = match &*load_state {
    | LoadState::Loading => {
      html! { <p class="muted">{ "Loading tasks..." }</p> }
    }
    | LoadState::Failed(reason) => {
      html! { <p class="load-error">{ format!("Could not load tasks: {reason}") }</p> }
    }
    | LoadState::Loaded if list.tasks.0.is_empty() => {
      html! { <p class="muted">{ "No tasks yet." }</p> }
    }
    | LoadState::Loaded => {
      html! { <TaskList list={list} /> }
    }
  };

  html! {
      <ContextProvider<Services> context={services}>
          <main class="app">
              <h1>{ "Tasks" }</h1>
              { body }
          </main>
          { toast_stack }
      </ContextProvider<Services>>
  }
}

use todo_core::notify::{
  Toast,
  ToastId,
  ToastKind
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ToastStackProps {
  pub toasts:     Vec<(ToastId, Toast)>,
  pub on_dismiss: Callback<ToastId>
}

#[function_component(ToastStack)]
pub fn toast_stack(
  props: &ToastStackProps
) -> Html {
  html! {
      <div class="toast-stack">
          {
              for props.toasts.iter().map(|(id, toast)| {
                  let id = *id;
                  let on_dismiss = props.on_dismiss.clone();
                  let kind_class = match toast.kind {
                      ToastKind::Blank => "toast-blank",
                      ToastKind::Success => "toast-success",
                      ToastKind::Error => "toast-error",
                      ToastKind::Loading => "toast-loading",
                  };
                  html! {
                      <div class={classes!("toast", kind_class)} onclick={move |_| on_dismiss.emit(id)}>
                          {
                              if toast.kind == ToastKind::Loading {
                                  html! { <span class="spinner"></span> }
                              } else {
                                  html! {}
                              }
                          }
                          <span>{ toast.text() }</span>
                      </div>
                  }
              })
          }
      </div>
  }
}

use std::rc::Rc;

use todo_core::api::HttpTaskApi;
use todo_core::config::ClientConfig;

use crate::toast::ToastNotifier;

/// Process-wide collaborators handed to every
/// row through context: one HTTP client, the
/// toast channel and the config.
#[derive(Clone)]
pub struct Services {
  pub api:      HttpTaskApi,
  pub notifier: ToastNotifier,
  pub config:   Rc<ClientConfig>
}

impl PartialEq for Services {
  fn eq(&self, other: &Self) -> bool {
    self.api.base_url()
      == other.api.base_url()
      && self.notifier == other.notifier
      && self.config == other.config
  }
}

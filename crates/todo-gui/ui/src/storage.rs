use todo_core::config::ClientConfig;

const API_BASE_URL_STORAGE_KEY: &str =
  "todo.api_base_url";

/// Defaults, with the API base URL taken from
/// local storage when one was saved there.
pub fn load_client_config() -> ClientConfig
{
  let mut config = ClientConfig::default();

  let stored = web_sys::window()
    .and_then(|window| {
      window
        .local_storage()
        .ok()
        .flatten()
    })
    .and_then(|storage| {
      storage
        .get_item(API_BASE_URL_STORAGE_KEY)
        .ok()
        .flatten()
    });

  if let Some(url) = stored
    .map(|url| url.trim().to_string())
    .filter(|url| !url.is_empty())
  {
    tracing::info!(url = %url, "using stored api base url");
    config.api_base_url = url;
  }

  config
}

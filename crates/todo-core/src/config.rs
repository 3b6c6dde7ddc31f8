use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::debug;
#[cfg(feature = "cli")]
use tracing::info;

pub const DEFAULT_API_BASE_URL: &str =
  "https://api.todo.lucidiusss.lol/api";
pub const DEFAULT_TOAST_DURATION_MS: u64 =
  3000;
pub const DEFAULT_INVALID_DATE_LABEL:
  &str = "Неверная дата";

pub const API_URL_ENV_VAR: &str =
  "TODO_API_URL";
#[cfg(feature = "cli")]
const CONFIG_ENV_VAR: &str =
  "TODO_CONFIG";
#[cfg(feature = "cli")]
const CONFIG_DIR_NAME: &str =
  "todo-client";
#[cfg(feature = "cli")]
const CONFIG_FILE_NAME: &str =
  "config.toml";

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct ClientConfig {
  pub api_base_url:       String,
  pub toast_duration_ms:  u64,
  pub invalid_date_label: String
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_base_url:       DEFAULT_API_BASE_URL
        .to_string(),
      toast_duration_ms:
        DEFAULT_TOAST_DURATION_MS,
      invalid_date_label:
        DEFAULT_INVALID_DATE_LABEL
          .to_string()
    }
  }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
  api:   Option<ApiSection>,
  toast: Option<ToastSection>,
  date:  Option<DateSection>
}

#[derive(Debug, Deserialize)]
struct ApiSection {
  base_url: Option<String>
}

#[derive(Debug, Deserialize)]
struct ToastSection {
  duration_ms: Option<u64>
}

#[derive(Debug, Deserialize)]
struct DateSection {
  invalid_label: Option<String>
}

impl ClientConfig {
  /// Loads defaults, then the config file
  /// (explicit path, `$TODO_CONFIG`, or the
  /// user config dir), then
  /// `$TODO_API_URL`.
  #[cfg(feature = "cli")]
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = ClientConfig::default();

    match resolve_config_path(
      config_override
    ) {
      | Some(path) => {
        info!(config = %path.display(), "loading config file");
        cfg.merge_file(&path)?;
      }
      | None => {
        debug!(
          "no config file found; using \
           defaults"
        );
      }
    }

    if let Ok(url) =
      std::env::var(API_URL_ENV_VAR)
      && !url.trim().is_empty()
    {
      debug!(url = %url, "api url taken from environment");
      cfg.api_base_url =
        url.trim().to_string();
    }

    Ok(cfg)
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg = ClientConfig::default();
    cfg.merge_toml(text)?;
    Ok(cfg)
  }

  #[tracing::instrument(skip(self))]
  pub fn merge_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let text =
      std::fs::read_to_string(path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    self.merge_toml(&text).with_context(
      || {
        format!(
          "invalid config file {}",
          path.display()
        )
      }
    )
  }

  fn merge_toml(
    &mut self,
    text: &str
  ) -> anyhow::Result<()> {
    let file: ConfigFile =
      toml::from_str(text)
        .context("failed to parse TOML")?;

    if let Some(url) = file
      .api
      .and_then(|api| api.base_url)
    {
      self.api_base_url = url;
    }
    if let Some(ms) = file
      .toast
      .and_then(|toast| toast.duration_ms)
    {
      self.toast_duration_ms = ms;
    }
    if let Some(label) = file
      .date
      .and_then(|date| date.invalid_label)
    {
      self.invalid_date_label = label;
    }

    Ok(())
  }

  /// Applies `key=value` overrides such as
  /// `api.base_url=http://localhost/api`. An
  /// optional `rc.` prefix is accepted.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      let value = v.trim().to_string();
      debug!(key = %key, value = %value, "applying override");

      match key.as_str() {
        | "api.base_url" => {
          self.api_base_url = value;
        }
        | "toast.duration_ms" => {
          self.toast_duration_ms = value
            .parse()
            .with_context(|| {
              format!(
                "invalid \
                 toast.duration_ms: \
                 {value}"
              )
            })?;
        }
        | "date.invalid_label" => {
          self.invalid_date_label = value;
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }

    Ok(())
  }

  pub fn toast_duration(
    &self
  ) -> Duration {
    Duration::from_millis(
      self.toast_duration_ms
    )
  }
}

#[cfg(feature = "cli")]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) =
    std::env::var(CONFIG_ENV_VAR)
    && !env_path.trim().is_empty()
  {
    return Some(PathBuf::from(env_path));
  }

  let candidate = dirs::config_dir()?
    .join(CONFIG_DIR_NAME)
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}

use async_trait::async_trait;
use reqwest::{
  Client,
  Response,
  StatusCode
};
use todo_gui_shared::{
  ApiErrorBody,
  RenameTaskRequest,
  TaskDto,
  TaskId,
  TaskListPayload
};
use tracing::{
  debug,
  instrument
};

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("request to {url} failed: {source}")]
  Transport {
    url:    String,
    #[source]
    source: reqwest::Error
  },
  #[error(
    "server responded {status}: {}",
    message.as_deref().unwrap_or("no error message")
  )]
  Status {
    status:  u16,
    message: Option<String>
  },
  #[error("failed to decode response from {url}: {reason}")]
  Decode {
    url:    String,
    reason: String
  }
}

impl ApiError {
  /// The `error` field of a structured
  /// API error body, when the server sent
  /// one.
  pub fn server_message(
    &self
  ) -> Option<&str> {
    match self {
      | ApiError::Status {
        message: Some(message),
        ..
      } => Some(message.as_str()),
      | _ => None
    }
  }
}

pub type ApiResult<T> =
  Result<T, ApiError>;

/// Remote operations on the task
/// service. Futures are not `Send`: every
/// caller runs on a single-threaded event
/// loop.
#[async_trait(?Send)]
pub trait TaskApi {
  async fn list_tasks(
    &self
  ) -> ApiResult<Vec<TaskDto>>;

  async fn toggle_task(
    &self,
    id: TaskId
  ) -> ApiResult<serde_json::Value>;

  async fn rename_task(
    &self,
    id: TaskId,
    title: &str
  ) -> ApiResult<()>;

  async fn delete_task(
    &self,
    id: TaskId
  ) -> ApiResult<()>;
}

/// HTTP implementation of [`TaskApi`].
/// Build one per process and clone it;
/// clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
  client:   Client,
  base_url: String
}

impl HttpTaskApi {
  pub fn new(
    config: &ClientConfig
  ) -> ApiResult<Self> {
    let client = Client::builder()
      .build()
      .map_err(|source| {
        ApiError::Transport {
          url: config
            .api_base_url
            .clone(),
          source
        }
      })?;

    Ok(Self::with_client(
      client,
      &config.api_base_url
    ))
  }

  pub fn with_client(
    client: Client,
    base_url: &str
  ) -> Self {
    Self {
      client,
      base_url: base_url
        .trim_end_matches('/')
        .to_string()
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn endpoint(
    &self,
    path: &str
  ) -> String {
    format!(
      "{}/{}",
      self.base_url,
      path.trim_start_matches('/')
    )
  }
}

#[async_trait(?Send)]
impl TaskApi for HttpTaskApi {
  #[instrument(skip(self))]
  async fn list_tasks(
    &self
  ) -> ApiResult<Vec<TaskDto>> {
    let url = self.endpoint("tasks");
    let response = self
      .client
      .get(&url)
      .send()
      .await
      .map_err(|source| {
        ApiError::Transport {
          url: url.clone(),
          source
        }
      })?;
    let response =
      ensure_success(response).await?;

    let payload = response
      .json::<TaskListPayload>()
      .await
      .map_err(|err| ApiError::Decode {
        url:    url.clone(),
        reason: err.to_string()
      })?;
    let tasks = payload.into_tasks();
    debug!(
      total = tasks.len(),
      "fetched tasks"
    );
    Ok(tasks)
  }

  #[instrument(skip(self))]
  async fn toggle_task(
    &self,
    id: TaskId
  ) -> ApiResult<serde_json::Value> {
    let url = self
      .endpoint(&format!("tasks/{id}/toggle"));
    let response = self
      .client
      .post(&url)
      .send()
      .await
      .map_err(|source| {
        ApiError::Transport {
          url: url.clone(),
          source
        }
      })?;
    let response =
      ensure_success(response).await?;

    let text = response
      .text()
      .await
      .map_err(|source| {
        ApiError::Transport {
          url: url.clone(),
          source
        }
      })?;
    Ok(decode_loose(&text))
  }

  #[instrument(skip(self))]
  async fn rename_task(
    &self,
    id: TaskId,
    title: &str
  ) -> ApiResult<()> {
    let url =
      self.endpoint(&format!("tasks/{id}"));
    let body = RenameTaskRequest {
      title: title.to_string()
    };
    let response = self
      .client
      .put(&url)
      .json(&body)
      .send()
      .await
      .map_err(|source| {
        ApiError::Transport {
          url: url.clone(),
          source
        }
      })?;
    ensure_success(response).await?;
    Ok(())
  }

  #[instrument(skip(self))]
  async fn delete_task(
    &self,
    id: TaskId
  ) -> ApiResult<()> {
    let url =
      self.endpoint(&format!("tasks/{id}"));
    let response = self
      .client
      .delete(&url)
      .send()
      .await
      .map_err(|source| {
        ApiError::Transport {
          url: url.clone(),
          source
        }
      })?;
    ensure_success(response).await?;
    Ok(())
  }
}

async fn ensure_success(
  response: Response
) -> ApiResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  Err(ApiError::Status {
    status:  status.as_u16(),
    message: error_message(
      status, response
    )
    .await
  })
}

async fn error_message(
  status: StatusCode,
  response: Response
) -> Option<String> {
  let text = response.text().await.ok()?;
  match serde_json::from_str::<ApiErrorBody>(
    &text
  ) {
    | Ok(body) => body.error,
    | Err(err) => {
      debug!(
        status = status.as_u16(),
        error = %err,
        "error response carried no structured body"
      );
      None
    }
  }
}

fn decode_loose(
  text: &str
) -> serde_json::Value {
  if text.trim().is_empty() {
    return serde_json::Value::Null;
  }

  serde_json::from_str(text).unwrap_or_else(
    |_| {
      serde_json::Value::String(
        text.to_string()
      )
    }
  )
}

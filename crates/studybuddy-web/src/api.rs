use gloo::net::http::{
  Request,
  Response
};
use serde::de::DeserializeOwned;
use studybuddy_core::{
  ApiError,
  Config,
  TaskApi
};
use studybuddy_shared::{
  TaskCreate,
  TaskDto,
  TaskEdit,
  TaskId,
  TaskStatusPatch
};

/// `TaskApi` over the browser's fetch.
#[derive(Clone, PartialEq)]
pub struct HttpApi {
  collection: String
}

impl HttpApi {
  pub fn new(cfg: &Config) -> Self {
    Self {
      collection: cfg.api_url("tasks/")
    }
  }

  fn item_url(&self, id: &TaskId) -> String {
    format!("{}{}/", self.collection, id)
  }
}

fn transport(
  err: gloo::net::Error
) -> ApiError {
  ApiError::Transport(err.to_string())
}

async fn checked(
  response: Response
) -> Result<Response, ApiError> {
  if response.ok() {
    return Ok(response);
  }
  let status = response.status();
  let body =
    response.text().await.unwrap_or_default();
  tracing::warn!(status, "api request rejected");
  Err(ApiError::Status { status, body })
}

async fn decode<R: DeserializeOwned>(
  response: Response
) -> Result<R, ApiError> {
  response.json::<R>().await.map_err(|e| {
    ApiError::Decode(e.to_string())
  })
}

impl TaskApi for HttpApi {
  async fn list(
    &self
  ) -> Result<Vec<TaskDto>, ApiError> {
    let response =
      Request::get(&self.collection)
        .send()
        .await
        .map_err(transport)?;
    decode(checked(response).await?).await
  }

  async fn create(
    &self,
    body: &TaskCreate
  ) -> Result<TaskDto, ApiError> {
    let response =
      Request::post(&self.collection)
        .json(body)
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    decode(checked(response).await?).await
  }

  async fn edit(
    &self,
    id: &TaskId,
    body: &TaskEdit
  ) -> Result<(), ApiError> {
    let response =
      Request::patch(&self.item_url(id))
        .json(body)
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    checked(response).await.map(|_| ())
  }

  async fn set_status(
    &self,
    id: &TaskId,
    patch: TaskStatusPatch
  ) -> Result<(), ApiError> {
    let response =
      Request::patch(&self.item_url(id))
        .json(&patch)
        .map_err(transport)?
        .send()
        .await
        .map_err(transport)?;
    checked(response).await.map(|_| ())
  }

  async fn delete(
    &self,
    id: &TaskId
  ) -> Result<(), ApiError> {
    let response =
      Request::delete(&self.item_url(id))
        .send()
        .await
        .map_err(transport)?;
    checked(response).await.map(|_| ())
  }
}

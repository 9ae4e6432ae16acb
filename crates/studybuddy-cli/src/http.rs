use std::time::Duration;

use anyhow::Context;
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
use tracing::debug;

const REQUEST_TIMEOUT: Duration =
  Duration::from_secs(15);

/// `TaskApi` over HTTP with reqwest.
pub struct RestApi {
  http:       reqwest::Client,
  collection: String
}

impl RestApi {
  pub fn new(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .context(
        "failed building HTTP client for \
         the task API"
      )?;
    Ok(Self {
      http,
      collection: cfg.api_url("tasks/")
    })
  }

  fn item_url(&self, id: &TaskId) -> String {
    format!("{}{}/", self.collection, id)
  }

  async fn send(
    request: reqwest::RequestBuilder
  ) -> Result<reqwest::Response, ApiError> {
    let response =
      request.send().await.map_err(|e| {
        ApiError::Transport(e.to_string())
      })?;
    let status = response.status();
    if !status.is_success() {
      let body = response
        .text()
        .await
        .unwrap_or_default();
      return Err(ApiError::Status {
        status: status.as_u16(),
        body
      });
    }
    debug!(status = status.as_u16(), "api response");
    Ok(response)
  }

  async fn parse<R: DeserializeOwned>(
    response: reqwest::Response
  ) -> Result<R, ApiError> {
    response.json::<R>().await.map_err(|e| {
      ApiError::Decode(e.to_string())
    })
  }
}

impl TaskApi for RestApi {
  #[tracing::instrument(skip(self))]
  async fn list(
    &self
  ) -> Result<Vec<TaskDto>, ApiError> {
    let response = Self::send(
      self.http.get(&self.collection)
    )
    .await?;
    Self::parse(response).await
  }

  #[tracing::instrument(skip_all)]
  async fn create(
    &self,
    body: &TaskCreate
  ) -> Result<TaskDto, ApiError> {
    let response = Self::send(
      self.http.post(&self.collection).json(body)
    )
    .await?;
    Self::parse(response).await
  }

  // The PATCH responses carry the
  // updated record but the list is
  // refetched anyway.
  #[tracing::instrument(skip_all, fields(id = %id))]
  async fn edit(
    &self,
    id: &TaskId,
    body: &TaskEdit
  ) -> Result<(), ApiError> {
    Self::send(
      self.http.patch(self.item_url(id)).json(body)
    )
    .await?;
    Ok(())
  }

  #[tracing::instrument(skip_all, fields(id = %id))]
  async fn set_status(
    &self,
    id: &TaskId,
    patch: TaskStatusPatch
  ) -> Result<(), ApiError> {
    Self::send(
      self
        .http
        .patch(self.item_url(id))
        .json(&patch)
    )
    .await?;
    Ok(())
  }

  #[tracing::instrument(skip_all, fields(id = %id))]
  async fn delete(
    &self,
    id: &TaskId
  ) -> Result<(), ApiError> {
    Self::send(
      self.http.delete(self.item_url(id))
    )
    .await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn item_urls_end_with_a_slash() {
    let mut cfg = Config::default();
    cfg.api_base_url =
      "http://localhost:8000/api/"
        .to_string();
    let api = RestApi::new(&cfg)
      .expect("client builds");
    assert_eq!(
      api.collection,
      "http://localhost:8000/api/tasks/"
    );
    assert_eq!(
      api.item_url(&TaskId::from("12")),
      "http://localhost:8000/api/tasks/12/"
    );
  }
}

//! Mutations against the remote task
//! API, each one a single round trip
//! with its local compensation.

use chrono::{
  DateTime,
  Utc
};
use studybuddy_shared::{
  TaskCreate,
  TaskDto,
  TaskEdit,
  TaskId,
  TaskStatus,
  TaskStatusPatch
};
use tracing::{
  debug,
  error,
  info
};

use crate::store::{
  StoreAction,
  StoreSink,
  placeholder_for
};

/// Transport-level failures. Server
/// bodies are carried along for the
/// log, never interpreted.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  thiserror::Error,
)]
pub enum ApiError {
  #[error("request failed: {0}")]
  Transport(String),
  #[error(
    "server responded with {status}: \
     {body}"
  )]
  Status { status: u16, body: String },
  #[error("could not decode response: {0}")]
  Decode(String)
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
  #[error("title is required")]
  EmptyTitle,
  #[error("invalid due date: {0}")]
  InvalidDueDate(String),
  #[error(
    "task {0} is still being saved"
  )]
  Unconfirmed(TaskId),
  #[error(transparent)]
  Api(#[from] ApiError)
}

/// The REST resource at `/tasks/`.
#[allow(async_fn_in_trait)]
pub trait TaskApi {
  async fn list(
    &self
  ) -> Result<Vec<TaskDto>, ApiError>;

  async fn create(
    &self,
    body: &TaskCreate
  ) -> Result<TaskDto, ApiError>;

  async fn edit(
    &self,
    id: &TaskId,
    body: &TaskEdit
  ) -> Result<(), ApiError>;

  async fn set_status(
    &self,
    id: &TaskId,
    patch: TaskStatusPatch
  ) -> Result<(), ApiError>;

  async fn delete(
    &self,
    id: &TaskId
  ) -> Result<(), ApiError>;
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum NoticeKind {
  Success,
  Error
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub kind:    NoticeKind,
  pub message: String
}

impl Notice {
  pub fn success(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind:    NoticeKind::Success,
      message: message.into()
    }
  }

  pub fn error(
    message: impl Into<String>
  ) -> Self {
    Self {
      kind:    NoticeKind::Error,
      message: message.into()
    }
  }
}

/// Surfaces outcomes to the user.
pub trait Notifier {
  fn notify(&self, notice: Notice);
}

/// A create whose placeholder is on
/// screen but whose request has not
/// been answered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCreate {
  pub temp_id: TaskId,
  pub body:    TaskCreate
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DeleteOutcome {
  Deleted,
  Declined
}

pub struct MutationGateway<A, S, N> {
  api:      A,
  sink:     S,
  notifier: N
}

impl<A, S, N> MutationGateway<A, S, N>
where
  A: TaskApi,
  S: StoreSink,
  N: Notifier
{
  pub fn new(
    api: A,
    sink: S,
    notifier: N
  ) -> Self {
    Self {
      api,
      sink,
      notifier
    }
  }

  pub fn api(&self) -> &A {
    &self.api
  }

  /// Fetches the full list and swaps
  /// it into the store.
  #[tracing::instrument(skip(self))]
  pub async fn refresh(
    &self
  ) -> Result<usize, MutationError> {
    match self.api.list().await {
      | Ok(tasks) => {
        let count = tasks.len();
        info!(count, "refreshed task list");
        self
          .sink
          .dispatch(StoreAction::Replace(tasks));
        Ok(count)
      }
      | Err(err) => Err(self.report(
        "Failed to load tasks",
        err.into()
      ))
    }
  }

  /// Puts the placeholder at the head
  /// of the list. Nothing is sent yet.
  #[tracing::instrument(skip(self, body), fields(title_len = body.title.len()))]
  pub fn begin_create(
    &self,
    body: TaskCreate,
    now: DateTime<Utc>
  ) -> Result<PendingCreate, MutationError>
  {
    if body.title.trim().is_empty() {
      return Err(self.report(
        "Could not create task",
        MutationError::EmptyTitle
      ));
    }

    let placeholder =
      placeholder_for(&body, now);
    let temp_id = placeholder.id.clone();
    self.sink.dispatch(
      StoreAction::InsertPlaceholder(
        placeholder
      )
    );
    debug!(temp_id = %temp_id, "placeholder inserted");

    Ok(PendingCreate {
      temp_id,
      body
    })
  }

  /// Confirms or rolls back a pending
  /// create with the server's answer.
  #[tracing::instrument(skip(self, pending), fields(temp_id = %pending.temp_id))]
  pub async fn finish_create(
    &self,
    pending: PendingCreate
  ) -> Result<TaskDto, MutationError> {
    match self.api.create(&pending.body).await
    {
      | Ok(task) => {
        info!(id = %task.id, "task created");
        self.sink.dispatch(
          StoreAction::Confirm {
            temp_id: pending.temp_id,
            task:    task.clone()
          }
        );
        self.notifier.notify(
          Notice::success("Task created")
        );
        Ok(task)
      }
      | Err(err) => {
        self.sink.dispatch(
          StoreAction::Rollback {
            temp_id: pending.temp_id
          }
        );
        Err(self.report(
          "Failed to create task",
          err.into()
        ))
      }
    }
  }

  pub async fn create(
    &self,
    body: TaskCreate,
    now: DateTime<Utc>
  ) -> Result<TaskDto, MutationError> {
    let pending =
      self.begin_create(body, now)?;
    self.finish_create(pending).await
  }

  /// Sends the five editable fields.
  /// On error the caller keeps its
  /// draft; on success the list is
  /// refetched for server-computed
  /// fields.
  #[tracing::instrument(skip(self, id, body), fields(id = %id))]
  pub async fn save_edit(
    &self,
    id: &TaskId,
    body: &TaskEdit
  ) -> Result<(), MutationError> {
    self.ensure_confirmed(id)?;
    if body.title.trim().is_empty() {
      return Err(self.report(
        "Could not save task",
        MutationError::EmptyTitle
      ));
    }

    if let Err(err) =
      self.api.edit(id, body).await
    {
      return Err(self.report(
        "Failed to save changes",
        err.into()
      ));
    }

    info!("task edited");
    self
      .notifier
      .notify(Notice::success("Task updated"));
    self.refresh_after("edit").await;
    Ok(())
  }

  #[tracing::instrument(skip(self, id), fields(id = %id))]
  pub async fn set_status(
    &self,
    id: &TaskId,
    status: TaskStatus
  ) -> Result<(), MutationError> {
    self.ensure_confirmed(id)?;

    if let Err(err) = self
      .api
      .set_status(id, TaskStatusPatch {
        status
      })
      .await
    {
      return Err(self.report(
        "Failed to update task",
        err.into()
      ));
    }

    info!(status = status.as_key(), "task status changed");
    let message = match status {
      | TaskStatus::Completed => {
        "Task completed"
      }
      | TaskStatus::InProgress => {
        "Task in progress"
      }
      | TaskStatus::Pending => {
        "Task reopened"
      }
    };
    self
      .notifier
      .notify(Notice::success(message));
    self.refresh_after("status").await;
    Ok(())
  }

  /// `confirm` runs before any request;
  /// a refusal sends nothing.
  #[tracing::instrument(skip(self, id, confirm), fields(id = %id))]
  pub async fn delete<F>(
    &self,
    id: &TaskId,
    confirm: F
  ) -> Result<DeleteOutcome, MutationError>
  where
    F: FnOnce() -> bool
  {
    self.ensure_confirmed(id)?;

    if !confirm() {
      debug!("delete declined");
      return Ok(DeleteOutcome::Declined);
    }

    if let Err(err) =
      self.api.delete(id).await
    {
      return Err(self.report(
        "Failed to delete task",
        err.into()
      ));
    }

    info!("task deleted");
    self
      .notifier
      .notify(Notice::success("Task deleted"));
    self.refresh_after("delete").await;
    Ok(DeleteOutcome::Deleted)
  }

  async fn refresh_after(
    &self,
    mutation: &str
  ) {
    // refresh() has already reported
    // the failure to the user.
    if let Err(err) = self.refresh().await {
      debug!(mutation, error = %err, "refetch after mutation failed");
    }
  }

  fn ensure_confirmed(
    &self,
    id: &TaskId
  ) -> Result<(), MutationError> {
    if id.is_temporary() {
      return Err(self.report(
        "Please wait",
        MutationError::Unconfirmed(
          id.clone()
        )
      ));
    }
    Ok(())
  }

  fn report(
    &self,
    context: &str,
    err: MutationError
  ) -> MutationError {
    error!(error = %err, context, "task mutation failed");
    self.notifier.notify(Notice::error(
      format!("{context}: {err}")
    ));
    err
  }
}

use std::fmt;

use chrono::{
  DateTime,
  Utc
};
use serde::{
  Deserialize,
  Deserializer,
  Serialize
};
use uuid::Uuid;

/// Prefix carried by identifiers the
/// client invents for optimistic
/// placeholders. The server never
/// sees these.
pub const TEMP_ID_PREFIX: &str = "temp-";

#[derive(
  Debug,
  Clone,
  Serialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
  pub fn new(
    value: impl Into<String>
  ) -> Self {
    Self(value.into())
  }

  pub fn temporary() -> Self {
    Self(format!(
      "{TEMP_ID_PREFIX}{}",
      Uuid::new_v4().simple()
    ))
  }

  pub fn is_temporary(&self) -> bool {
    self.0.starts_with(TEMP_ID_PREFIX)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for TaskId {
  fn from(value: &str) -> Self {
    Self(value.to_string())
  }
}

// The API hands out integer primary
// keys; keep them as opaque text.
impl<'de> Deserialize<'de> for TaskId {
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
      Number(u64),
      Text(String)
    }

    match RawId::deserialize(
      deserializer
    )? {
      | RawId::Number(value) => {
        Ok(Self(value.to_string()))
      }
      | RawId::Text(value) => {
        Ok(Self(value))
      }
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  #[default]
  Pending,
  InProgress,
  Completed
}

impl TaskStatus {
  pub const ALL: [TaskStatus; 3] = [
    TaskStatus::Pending,
    TaskStatus::InProgress,
    TaskStatus::Completed
  ];

  pub fn as_key(self) -> &'static str {
    match self {
      | TaskStatus::Pending => "pending",
      | TaskStatus::InProgress => {
        "in_progress"
      }
      | TaskStatus::Completed => {
        "completed"
      }
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | TaskStatus::Pending => "Pending",
      | TaskStatus::InProgress => {
        "In Progress"
      }
      | TaskStatus::Completed => {
        "Completed"
      }
    }
  }

  pub fn parse(
    value: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|status| {
        status.as_key() == value
      })
  }

  /// Moves a card offers from this
  /// status. Completed tasks can only
  /// be reopened.
  pub fn transitions(
    self
  ) -> &'static [TaskStatus] {
    match self {
      | TaskStatus::Completed => {
        &[TaskStatus::Pending]
      }
      | TaskStatus::Pending
      | TaskStatus::InProgress => &[
        TaskStatus::InProgress,
        TaskStatus::Completed
      ]
    }
  }

  pub fn can_move_to(
    self,
    next: TaskStatus
  ) -> bool {
    self.transitions().contains(&next)
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
  Low,
  #[default]
  Medium,
  High
}

impl TaskPriority {
  pub const ALL: [TaskPriority; 3] = [
    TaskPriority::Low,
    TaskPriority::Medium,
    TaskPriority::High
  ];

  pub fn as_key(self) -> &'static str {
    match self {
      | TaskPriority::Low => "low",
      | TaskPriority::Medium => "medium",
      | TaskPriority::High => "high"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | TaskPriority::Low => "Low",
      | TaskPriority::Medium => "Medium",
      | TaskPriority::High => "High"
    }
  }

  pub fn parse(
    value: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|priority| {
        priority.as_key() == value
      })
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
  Assignment,
  Exam,
  Project,
  Reading,
  #[default]
  Other
}

impl TaskCategory {
  pub const ALL: [TaskCategory; 5] = [
    TaskCategory::Assignment,
    TaskCategory::Exam,
    TaskCategory::Project,
    TaskCategory::Reading,
    TaskCategory::Other
  ];

  pub fn as_key(self) -> &'static str {
    match self {
      | TaskCategory::Assignment => {
        "assignment"
      }
      | TaskCategory::Exam => "exam",
      | TaskCategory::Project => {
        "project"
      }
      | TaskCategory::Reading => {
        "reading"
      }
      | TaskCategory::Other => "other"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | TaskCategory::Assignment => {
        "Assignment"
      }
      | TaskCategory::Exam => "Exam",
      | TaskCategory::Project => {
        "Project"
      }
      | TaskCategory::Reading => {
        "Reading"
      }
      | TaskCategory::Other => "Other"
    }
  }

  pub fn parse(
    value: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|category| {
        category.as_key() == value
      })
  }
}

/// A task as the API returns it.
/// `is_overdue` and `days_until_due`
/// are computed server-side and are
/// never recomputed by clients.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskDto {
  pub id:             TaskId,
  #[serde(default)]
  pub title:          String,
  #[serde(default)]
  pub description:    String,
  #[serde(default)]
  pub priority:       TaskPriority,
  #[serde(default)]
  pub category:       TaskCategory,
  #[serde(default)]
  pub status:         TaskStatus,
  #[serde(default)]
  pub due_date:       Option<DateTime<Utc>>,
  #[serde(default)]
  pub created_at:     Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at:     Option<DateTime<Utc>>,
  #[serde(default)]
  pub is_overdue:     bool,
  #[serde(default)]
  pub days_until_due: Option<i64>
}

impl TaskDto {
  pub fn is_completed(&self) -> bool {
    self.status == TaskStatus::Completed
  }

  pub fn is_placeholder(&self) -> bool {
    self.id.is_temporary()
  }
}

/// Body of `POST /tasks/`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskCreate {
  pub title:       String,
  pub description: String,
  pub priority:    TaskPriority,
  pub category:    TaskCategory,
  pub due_date:    Option<DateTime<Utc>>
}

/// Field edit body of
/// `PATCH /tasks/{id}/`. Status is
/// deliberately absent.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskEdit {
  pub title:       String,
  pub description: String,
  pub priority:    TaskPriority,
  pub category:    TaskCategory,
  pub due_date:    Option<DateTime<Utc>>
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskStatusPatch {
  pub status: TaskStatus
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum ViewMode {
  #[default]
  Home,
  Create,
  View
}

impl ViewMode {
  pub const ALL: [ViewMode; 3] = [
    ViewMode::Home,
    ViewMode::Create,
    ViewMode::View
  ];

  pub fn storage_value(
    self
  ) -> &'static str {
    match self {
      | ViewMode::Home => "home",
      | ViewMode::Create => "create",
      | ViewMode::View => "view"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | ViewMode::Home => "Home",
      | ViewMode::Create => "New Task",
      | ViewMode::View => "All Tasks"
    }
  }

  pub fn from_storage(
    value: &str
  ) -> Option<Self> {
    Self::ALL.into_iter().find(|mode| {
      mode.storage_value() == value
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn completed_tasks_only_reopen() {
    assert!(
      TaskStatus::Completed
        .can_move_to(TaskStatus::Pending)
    );
    assert!(
      !TaskStatus::Completed
        .can_move_to(TaskStatus::InProgress)
    );
    assert!(
      TaskStatus::Pending
        .can_move_to(TaskStatus::Completed)
    );
    assert!(
      !TaskStatus::InProgress
        .can_move_to(TaskStatus::Pending)
    );
  }

  #[test]
  fn decodes_api_payload_with_numeric_id()
  {
    let raw = r#"{
      "id": 42,
      "title": "Read Ch.3",
      "description": "",
      "priority": "high",
      "status": "in_progress",
      "category": "reading",
      "due_date": "2026-03-01T09:00:00Z",
      "created_at": "2026-02-20T09:00:00.123456Z",
      "updated_at": "2026-02-20T09:00:00.123456Z",
      "is_overdue": false,
      "days_until_due": 8
    }"#;

    let task: TaskDto =
      serde_json::from_str(raw)
        .expect("decode task");
    assert_eq!(task.id.as_str(), "42");
    assert_eq!(
      task.status,
      TaskStatus::InProgress
    );
    assert_eq!(
      task.priority,
      TaskPriority::High
    );
    assert_eq!(
      task.category,
      TaskCategory::Reading
    );
    assert_eq!(
      task.days_until_due,
      Some(8)
    );
    assert!(!task.is_placeholder());
  }

  #[test]
  fn create_body_sends_null_due_date() {
    let body = TaskCreate {
      title:       "Essay".to_string(),
      description: String::new(),
      priority:    TaskPriority::Medium,
      category:    TaskCategory::Assignment,
      due_date:    None
    };
    let json = serde_json::to_value(&body)
      .expect("encode create");
    assert_eq!(
      json["due_date"],
      serde_json::Value::Null
    );
    assert_eq!(
      json["category"],
      "assignment"
    );
  }

  #[test]
  fn temporary_ids_are_recognised() {
    let temp = TaskId::temporary();
    assert!(temp.is_temporary());
    assert_ne!(temp, TaskId::temporary());
    assert!(
      !TaskId::new("17").is_temporary()
    );
  }

  #[test]
  fn view_mode_rejects_unknown_values()
  {
    assert_eq!(
      ViewMode::from_storage("create"),
      Some(ViewMode::Create)
    );
    assert_eq!(
      ViewMode::from_storage("kanban"),
      None
    );
    assert_eq!(
      ViewMode::default(),
      ViewMode::Home
    );
  }
}

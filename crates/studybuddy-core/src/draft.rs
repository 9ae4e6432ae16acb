//! Form state for creating and editing
//! tasks, and the `datetime-local`
//! text the due-date inputs speak.

use chrono::{
  DateTime,
  NaiveDateTime,
  TimeZone,
  Utc
};
use studybuddy_shared::{
  TaskCategory,
  TaskCreate,
  TaskDto,
  TaskEdit,
  TaskId,
  TaskPriority
};

use crate::gateway::MutationError;

pub const DATETIME_LOCAL_FORMAT: &str =
  "%Y-%m-%dT%H:%M";

const DATETIME_LOCAL_SECONDS_FORMAT:
  &str = "%Y-%m-%dT%H:%M:%S";

pub fn to_datetime_local<Tz>(
  value: Option<DateTime<Utc>>,
  tz: &Tz
) -> String
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display
{
  value
    .map(|dt| {
      dt.with_timezone(tz)
        .format(DATETIME_LOCAL_FORMAT)
        .to_string()
    })
    .unwrap_or_default()
}

/// Empty input means "no due date".
pub fn from_datetime_local<Tz>(
  text: &str,
  tz: &Tz
) -> Result<Option<DateTime<Utc>>, MutationError>
where
  Tz: TimeZone
{
  let text = text.trim();
  if text.is_empty() {
    return Ok(None);
  }

  let naive =
    NaiveDateTime::parse_from_str(
      text,
      DATETIME_LOCAL_FORMAT
    )
    .or_else(|_| {
      NaiveDateTime::parse_from_str(
        text,
        DATETIME_LOCAL_SECONDS_FORMAT
      )
    })
    .map_err(|_| {
      MutationError::InvalidDueDate(
        text.to_string()
      )
    })?;

  // Skipped local times (DST gaps)
  // have no instant to send.
  let local = tz
    .from_local_datetime(&naive)
    .earliest()
    .ok_or_else(|| {
      MutationError::InvalidDueDate(
        text.to_string()
      )
    })?;

  Ok(Some(local.with_timezone(&Utc)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskForm {
  pub title:       String,
  pub description: String,
  pub priority:    TaskPriority,
  pub category:    TaskCategory,
  pub due:         String
}

impl Default for NewTaskForm {
  fn default() -> Self {
    Self {
      title:       String::new(),
      description: String::new(),
      priority:    TaskPriority::Medium,
      category:    TaskCategory::Other,
      due:         String::new()
    }
  }
}

impl NewTaskForm {
  pub fn to_create<Tz>(
    &self,
    tz: &Tz
  ) -> Result<TaskCreate, MutationError>
  where
    Tz: TimeZone
  {
    Ok(TaskCreate {
      title:       self.title.trim().to_string(),
      description: self
        .description
        .trim()
        .to_string(),
      priority:    self.priority,
      category:    self.category,
      due_date:    from_datetime_local(
        &self.due, tz
      )?
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
  pub title:       String,
  pub description: String,
  pub priority:    TaskPriority,
  pub category:    TaskCategory,
  pub due:         String
}

impl EditDraft {
  pub fn from_task<Tz>(
    task: &TaskDto,
    tz: &Tz
  ) -> Self
  where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display
  {
    Self {
      title:       task.title.clone(),
      description: task.description.clone(),
      priority:    task.priority,
      category:    task.category,
      due:         to_datetime_local(
        task.due_date,
        tz
      )
    }
  }

  pub fn to_edit<Tz>(
    &self,
    tz: &Tz
  ) -> Result<TaskEdit, MutationError>
  where
    Tz: TimeZone
  {
    Ok(TaskEdit {
      title:       self.title.trim().to_string(),
      description: self
        .description
        .trim()
        .to_string(),
      priority:    self.priority,
      category:    self.category,
      due_date:    from_datetime_local(
        &self.due, tz
      )?
    })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
  Start {
    id:    TaskId,
    draft: EditDraft
  },
  Update(EditDraft),
  SaveStarted,
  SaveFailed,
  Saved,
  Cancel
}

/// At most one task is edited at a
/// time. The draft only leaves this
/// state through an explicit save.
#[derive(
  Debug, Clone, Default, PartialEq,
)]
pub enum EditState {
  #[default]
  Idle,
  Editing {
    id:     TaskId,
    draft:  EditDraft,
    saving: bool
  }
}

impl EditState {
  pub fn editing_id(&self) -> Option<&TaskId> {
    match self {
      | EditState::Idle => None,
      | EditState::Editing {
        id, ..
      } => Some(id)
    }
  }

  pub fn draft(&self) -> Option<&EditDraft> {
    match self {
      | EditState::Idle => None,
      | EditState::Editing {
        draft,
        ..
      } => Some(draft)
    }
  }

  pub fn is_saving(&self) -> bool {
    matches!(
      self,
      EditState::Editing {
        saving: true,
        ..
      }
    )
  }

  pub fn apply(
    &self,
    action: EditAction
  ) -> EditState {
    match (self, action) {
      | (
        _,
        EditAction::Start {
          id,
          draft
        }
      ) => EditState::Editing {
        id,
        draft,
        saving: false
      },
      | (
        EditState::Editing {
          id,
          saving,
          ..
        },
        EditAction::Update(draft)
      ) => EditState::Editing {
        id: id.clone(),
        draft,
        saving: *saving
      },
      | (
        EditState::Editing {
          id,
          draft,
          saving: false
        },
        EditAction::SaveStarted
      ) => EditState::Editing {
        id:     id.clone(),
        draft:  draft.clone(),
        saving: true
      },
      | (
        EditState::Editing {
          id,
          draft,
          ..
        },
        EditAction::SaveFailed
      ) => EditState::Editing {
        id:     id.clone(),
        draft:  draft.clone(),
        saving: false
      },
      | (
        _,
        EditAction::Saved
          | EditAction::Cancel
      ) => EditState::Idle,
      | (state, _) => state.clone()
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::FixedOffset;

  use super::*;

  fn plus_two() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600)
      .expect("offset")
  }

  fn draft() -> EditDraft {
    EditDraft {
      title:       "Lab report".to_string(),
      description: "Section 2".to_string(),
      priority:    TaskPriority::High,
      category:    TaskCategory::Assignment,
      due:         "2026-03-01T10:30"
        .to_string()
    }
  }

  #[test]
  fn datetime_local_converts_through_the_zone()
  {
    let utc = from_datetime_local(
      "2026-03-01T10:30",
      &plus_two()
    )
    .expect("parse")
    .expect("some");
    assert_eq!(
      utc.to_rfc3339(),
      "2026-03-01T08:30:00+00:00"
    );
    assert_eq!(
      to_datetime_local(
        Some(utc),
        &plus_two()
      ),
      "2026-03-01T10:30"
    );
  }

  #[test]
  fn empty_due_text_is_null() {
    assert_eq!(
      from_datetime_local(
        "  ",
        &plus_two()
      )
      .expect("empty ok"),
      None
    );
    assert_eq!(
      to_datetime_local(None, &plus_two()),
      ""
    );
  }

  #[test]
  fn malformed_due_text_is_rejected() {
    assert!(matches!(
      from_datetime_local(
        "next tuesday",
        &plus_two()
      ),
      Err(MutationError::InvalidDueDate(_))
    ));
  }

  #[test]
  fn form_text_is_trimmed() {
    let form = NewTaskForm {
      title: "  Read Ch.3 ".to_string(),
      description: " notes ".to_string(),
      ..NewTaskForm::default()
    };
    let create = form
      .to_create(&plus_two())
      .expect("valid form");
    assert_eq!(create.title, "Read Ch.3");
    assert_eq!(create.description, "notes");
    assert_eq!(create.due_date, None);
    assert_eq!(
      create.category,
      TaskCategory::Other
    );
  }

  #[test]
  fn failed_save_keeps_the_draft() {
    let started = EditState::Idle.apply(
      EditAction::Start {
        id:    TaskId::new("9"),
        draft: draft()
      }
    );
    let mut changed = draft();
    changed.title = "Lab report v2".to_string();
    let saving = started
      .apply(EditAction::Update(
        changed.clone()
      ))
      .apply(EditAction::SaveStarted);
    assert!(saving.is_saving());

    // second submit while saving is ignored
    assert_eq!(
      saving.apply(EditAction::SaveStarted),
      saving
    );

    let failed =
      saving.apply(EditAction::SaveFailed);
    assert!(!failed.is_saving());
    assert_eq!(failed.draft(), Some(&changed));
    assert_eq!(
      failed.editing_id(),
      Some(&TaskId::new("9"))
    );

    assert_eq!(
      failed
        .apply(EditAction::SaveStarted)
        .apply(EditAction::Saved),
      EditState::Idle
    );
  }

  #[test]
  fn updates_without_an_edit_are_ignored()
  {
    assert_eq!(
      EditState::Idle
        .apply(EditAction::Update(draft())),
      EditState::Idle
    );
  }
}

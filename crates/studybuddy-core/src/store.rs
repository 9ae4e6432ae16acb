use std::cell::RefCell;
use std::rc::Rc;

use chrono::{
  DateTime,
  Utc
};
use studybuddy_shared::{
  TaskCreate,
  TaskDto,
  TaskId,
  TaskStatus
};
use tracing::{
  debug,
  warn
};

/// Every change to the task list goes
/// through one of these. Applying an
/// action never edits the previous
/// list in place.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
  /// A fresh list from the server.
  Replace(Vec<TaskDto>),
  /// Tentative record shown before
  /// the create call resolves.
  InsertPlaceholder(TaskDto),
  /// Server accepted the create.
  Confirm {
    temp_id: TaskId,
    task:    TaskDto
  },
  /// Server rejected the create.
  Rollback { temp_id: TaskId }
}

#[derive(
  Debug, Clone, Default, PartialEq,
)]
pub struct TaskStore {
  tasks: Vec<TaskDto>
}

impl TaskStore {
  pub fn new(tasks: Vec<TaskDto>) -> Self {
    Self { tasks }
  }

  pub fn tasks(&self) -> &[TaskDto] {
    &self.tasks
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  pub fn get(
    &self,
    id: &TaskId
  ) -> Option<&TaskDto> {
    self
      .tasks
      .iter()
      .find(|task| &task.id == id)
  }

  #[tracing::instrument(skip_all)]
  pub fn apply(
    &self,
    action: StoreAction
  ) -> TaskStore {
    let tasks = match action {
      | StoreAction::Replace(tasks) => {
        debug!(
          count = tasks.len(),
          "replacing task list"
        );
        tasks
      }
      | StoreAction::InsertPlaceholder(
        placeholder
      ) => {
        debug!(temp_id = %placeholder.id, "inserting placeholder");
        std::iter::once(placeholder)
          .chain(
            self.tasks.iter().cloned()
          )
          .collect()
      }
      | StoreAction::Confirm {
        temp_id,
        task
      } => self.confirmed(&temp_id, task),
      | StoreAction::Rollback {
        temp_id
      } => {
        debug!(temp_id = %temp_id, "rolling back placeholder");
        self
          .tasks
          .iter()
          .filter(|t| t.id != temp_id)
          .cloned()
          .collect()
      }
    };

    TaskStore { tasks }
  }

  fn confirmed(
    &self,
    temp_id: &TaskId,
    task: TaskDto
  ) -> Vec<TaskDto> {
    // A refetch that landed first may
    // already carry the real record.
    if self.get(&task.id).is_some() {
      warn!(
        temp_id = %temp_id,
        id = %task.id,
        "confirmed task already present; dropping placeholder"
      );
      return self
        .tasks
        .iter()
        .filter(|t| &t.id != temp_id)
        .cloned()
        .collect();
    }

    debug!(temp_id = %temp_id, id = %task.id, "confirming placeholder");
    self
      .tasks
      .iter()
      .map(|t| {
        if &t.id == temp_id {
          task.clone()
        } else {
          t.clone()
        }
      })
      .collect()
  }
}

/// The tentative record for a create
/// request: pending, not overdue, no
/// server-computed due counter.
pub fn placeholder_for(
  create: &TaskCreate,
  now: DateTime<Utc>
) -> TaskDto {
  TaskDto {
    id:             TaskId::temporary(),
    title:          create.title.clone(),
    description:    create
      .description
      .clone(),
    priority:       create.priority,
    category:       create.category,
    status:         TaskStatus::Pending,
    due_date:       create.due_date,
    created_at:     Some(now),
    updated_at:     Some(now),
    is_overdue:     false,
    days_until_due: None
  }
}

/// Receives store actions. The browser
/// routes these into its reducer; the
/// terminal client and tests keep a
/// `RefCell<TaskStore>`.
pub trait StoreSink {
  fn dispatch(&self, action: StoreAction);
}

impl StoreSink for RefCell<TaskStore> {
  fn dispatch(&self, action: StoreAction) {
    let next = self.borrow().apply(action);
    *self.borrow_mut() = next;
  }
}

impl<S> StoreSink for Rc<S>
where
  S: StoreSink + ?Sized
{
  fn dispatch(&self, action: StoreAction) {
    (**self).dispatch(action);
  }
}

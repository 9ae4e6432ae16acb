use studybuddy_shared::TaskDto;

use crate::filter::FilterKey;

/// Headline counts over the whole
/// collection, independent of the
/// active filter.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq,
)]
pub struct TaskStats {
  pub total:         usize,
  pub pending:       usize,
  pub in_progress:   usize,
  pub completed:     usize,
  pub overdue:       usize,
  pub high_priority: usize
}

impl TaskStats {
  pub fn collect(tasks: &[TaskDto]) -> Self {
    let count = |key: FilterKey| {
      tasks
        .iter()
        .filter(|task| key.matches(task))
        .count()
    };

    Self {
      total:         tasks.len(),
      pending:       count(FilterKey::Pending),
      in_progress:   count(
        FilterKey::InProgress
      ),
      completed:     count(
        FilterKey::Completed
      ),
      overdue:       count(FilterKey::Overdue),
      high_priority: count(
        FilterKey::HighPriority
      )
    }
  }

  pub fn count_for(
    &self,
    key: FilterKey
  ) -> usize {
    match key {
      | FilterKey::All => self.total,
      | FilterKey::Pending => self.pending,
      | FilterKey::InProgress => {
        self.in_progress
      }
      | FilterKey::Completed => {
        self.completed
      }
      | FilterKey::Overdue => self.overdue,
      | FilterKey::HighPriority => {
        self.high_priority
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use studybuddy_shared::{
    TaskCategory,
    TaskId,
    TaskPriority,
    TaskStatus
  };

  use super::*;
  use crate::filter::filter_tasks;

  fn task(
    id: &str,
    status: TaskStatus
  ) -> TaskDto {
    TaskDto {
      id: TaskId::new(id),
      title: id.to_string(),
      description: String::new(),
      priority: TaskPriority::Low,
      category: TaskCategory::Other,
      status,
      due_date: None,
      created_at: None,
      updated_at: None,
      is_overdue: false,
      days_until_due: None
    }
  }

  #[test]
  fn counts_agree_with_the_filters() {
    let mut tasks = vec![
      task("1", TaskStatus::Pending),
      task("2", TaskStatus::InProgress),
      task("3", TaskStatus::Completed),
      task("4", TaskStatus::Pending),
    ];
    tasks[0].is_overdue = true;
    tasks[1].priority = TaskPriority::High;

    let stats = TaskStats::collect(&tasks);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.overdue, 1);

    for key in FilterKey::ALL {
      assert_eq!(
        stats.count_for(key),
        filter_tasks(&tasks, key, "").len()
      );
    }
  }
}

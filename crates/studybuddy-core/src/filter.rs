use studybuddy_shared::{
  TaskDto,
  TaskPriority,
  TaskStatus
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum FilterKey {
  #[default]
  All,
  Pending,
  InProgress,
  Completed,
  Overdue,
  HighPriority
}

impl FilterKey {
  pub const ALL: [FilterKey; 6] = [
    FilterKey::All,
    FilterKey::Pending,
    FilterKey::InProgress,
    FilterKey::Completed,
    FilterKey::Overdue,
    FilterKey::HighPriority
  ];

  /// Unknown keys select everything.
  pub fn parse(value: &str) -> Self {
    match value.trim() {
      | "pending" => FilterKey::Pending,
      | "in_progress" => {
        FilterKey::InProgress
      }
      | "completed" => {
        FilterKey::Completed
      }
      | "overdue" => FilterKey::Overdue,
      | "high_priority" => {
        FilterKey::HighPriority
      }
      | _ => FilterKey::All
    }
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | FilterKey::All => "all",
      | FilterKey::Pending => "pending",
      | FilterKey::InProgress => {
        "in_progress"
      }
      | FilterKey::Completed => {
        "completed"
      }
      | FilterKey::Overdue => "overdue",
      | FilterKey::HighPriority => {
        "high_priority"
      }
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | FilterKey::All => "All Tasks",
      | FilterKey::Pending => "Pending",
      | FilterKey::InProgress => {
        "In Progress"
      }
      | FilterKey::Completed => {
        "Completed"
      }
      | FilterKey::Overdue => "Overdue",
      | FilterKey::HighPriority => {
        "High Priority"
      }
    }
  }

  /// What to tell the user when the
  /// visible list comes back empty.
  pub fn empty_message(
    self
  ) -> &'static str {
    match self {
      | FilterKey::All => {
        "Create your first task to get \
         started with StudyBuddy!"
      }
      | FilterKey::Pending => {
        "Nothing is waiting to be \
         started."
      }
      | FilterKey::InProgress => {
        "No tasks are in progress right \
         now."
      }
      | FilterKey::Completed => {
        "No completed tasks yet. Keep \
         going!"
      }
      | FilterKey::Overdue => {
        "Nothing is overdue. Nice work!"
      }
      | FilterKey::HighPriority => {
        "No high priority tasks."
      }
    }
  }

  pub fn matches(
    self,
    task: &TaskDto
  ) -> bool {
    match self {
      | FilterKey::All => true,
      | FilterKey::Pending => {
        task.status == TaskStatus::Pending
      }
      | FilterKey::InProgress => {
        task.status
          == TaskStatus::InProgress
      }
      | FilterKey::Completed => {
        task.status
          == TaskStatus::Completed
      }
      | FilterKey::Overdue => {
        task.is_overdue
      }
      | FilterKey::HighPriority => {
        task.priority
          == TaskPriority::High
      }
    }
  }
}

pub fn normalize_query(
  raw: &str
) -> String {
  raw.trim().to_lowercase()
}

/// `query` must already be normalized.
/// Title, description, category and
/// status are searched; any hit counts.
pub fn matches_query(
  task: &TaskDto,
  query: &str
) -> bool {
  if query.is_empty() {
    return true;
  }

  task
    .title
    .to_lowercase()
    .contains(query)
    || task
      .description
      .to_lowercase()
      .contains(query)
    || task
      .category
      .as_key()
      .contains(query)
    || task.status.as_key().contains(query)
}

/// Applies the filter key, then the
/// search text, keeping the input
/// order.
pub fn filter_tasks(
  tasks: &[TaskDto],
  key: FilterKey,
  query: &str
) -> Vec<TaskDto> {
  let query = normalize_query(query);

  tasks
    .iter()
    .filter(|task| key.matches(task))
    .filter(|task| {
      matches_query(task, &query)
    })
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use studybuddy_shared::{
    TaskCategory,
    TaskId
  };

  use super::*;

  fn task(
    id: &str,
    title: &str
  ) -> TaskDto {
    TaskDto {
      id:             TaskId::new(id),
      title:          title.to_string(),
      description:    String::new(),
      priority:       TaskPriority::Medium,
      category:       TaskCategory::Other,
      status:         TaskStatus::Pending,
      due_date:       None,
      created_at:     None,
      updated_at:     None,
      is_overdue:     false,
      days_until_due: None
    }
  }

  fn scenario() -> Vec<TaskDto> {
    let mut high = task("1", "Lab");
    high.priority = TaskPriority::High;

    let mut done = task("2", "Quiz");
    done.status = TaskStatus::Completed;

    let mut late = task("3", "Essay");
    late.is_overdue = true;

    vec![high, done, late]
  }

  fn ids(tasks: &[TaskDto]) -> Vec<&str> {
    tasks
      .iter()
      .map(|task| task.id.as_str())
      .collect()
  }

  #[test]
  fn each_key_selects_its_task() {
    let tasks = scenario();
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        FilterKey::HighPriority,
        ""
      )),
      vec!["1"]
    );
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        FilterKey::Overdue,
        ""
      )),
      vec!["3"]
    );
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        FilterKey::Completed,
        ""
      )),
      vec!["2"]
    );
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        FilterKey::Pending,
        ""
      )),
      vec!["1", "3"]
    );
  }

  #[test]
  fn unknown_key_falls_back_to_all() {
    assert_eq!(
      FilterKey::parse("someday"),
      FilterKey::All
    );
    assert_eq!(
      FilterKey::parse("high_priority"),
      FilterKey::HighPriority
    );
  }

  #[test]
  fn results_are_ordered_idempotent_subsets()
  {
    let mut tasks = scenario();
    let mut extra = task("4", "Notes");
    extra.status = TaskStatus::InProgress;
    extra.priority = TaskPriority::High;
    tasks.insert(1, extra);

    for key in FilterKey::ALL {
      let once =
        filter_tasks(&tasks, key, "");

      let positions: Vec<usize> = once
        .iter()
        .map(|picked| {
          tasks
            .iter()
            .position(|t| t.id == picked.id)
            .expect("result drawn from input")
        })
        .collect();
      assert!(
        positions
          .windows(2)
          .all(|pair| pair[0] < pair[1]),
        "order broken for {key:?}"
      );

      assert_eq!(
        filter_tasks(&once, key, ""),
        once
      );
    }
  }

  #[test]
  fn search_refines_the_filtered_set() {
    let tasks = scenario();
    for key in FilterKey::ALL {
      let base =
        filter_tasks(&tasks, key, "");
      let narrowed =
        filter_tasks(&tasks, key, "ES");
      assert!(
        narrowed
          .iter()
          .all(|task| base.contains(task))
      );
    }
  }

  #[test]
  fn search_spans_category_and_description()
  {
    let mut midterm =
      task("1", "Midterm");
    midterm.category = TaskCategory::Exam;

    let mut review = task("2", "Chapter 5");
    review.description =
      "Exam review session".to_string();

    let unrelated = task("3", "Groceries");

    let tasks =
      vec![midterm, review, unrelated];
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        FilterKey::All,
        "  exam "
      )),
      vec!["1", "2"]
    );
  }

  #[test]
  fn search_matches_status_keys() {
    let tasks = scenario();
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        FilterKey::All,
        "completed"
      )),
      vec!["2"]
    );
    assert!(
      filter_tasks(
        &tasks,
        FilterKey::Completed,
        "lab"
      )
      .is_empty()
    );
  }
}

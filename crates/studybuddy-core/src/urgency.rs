use chrono::{
  DateTime,
  TimeZone,
  Utc
};
use studybuddy_shared::TaskDto;

/// Tasks due within this many days
/// are flagged as due soon.
pub const DUE_SOON_DAYS: i64 = 7;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum Urgency {
  #[default]
  None,
  DueSoon,
  Overdue
}

impl Urgency {
  pub fn as_class(self) -> &'static str {
    match self {
      | Urgency::None => "",
      | Urgency::DueSoon => "due-soon",
      | Urgency::Overdue => "overdue"
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
  pub urgency:  Urgency,
  pub progress: Option<f64>
}

/// Relies on the server's `is_overdue`
/// and `days_until_due`; completed
/// tasks are never urgent.
pub fn classify(
  task: &TaskDto,
  due_soon_days: i64
) -> Urgency {
  if task.is_completed() {
    return Urgency::None;
  }
  if task.is_overdue {
    return Urgency::Overdue;
  }
  match task.days_until_due {
    | Some(days) if days <= due_soon_days => {
      Urgency::DueSoon
    }
    | _ => Urgency::None
  }
}

/// Share of the created→due window
/// that has elapsed at `now`. Exceeds
/// 1.0 once the due date has passed.
pub fn progress_ratio(
  task: &TaskDto,
  now: DateTime<Utc>
) -> Option<f64> {
  if task.is_completed() {
    return None;
  }
  let due = task.due_date?;
  let created = task.created_at?;
  if due <= created {
    return None;
  }

  let elapsed =
    (now - created).num_milliseconds();
  let window =
    (due - created).num_milliseconds();
  Some(elapsed as f64 / window as f64)
}

pub fn display_progress(
  ratio: f64
) -> f64 {
  ratio.clamp(0.0, 1.0)
}

pub fn assess(
  task: &TaskDto,
  now: DateTime<Utc>,
  due_soon_days: i64
) -> Assessment {
  Assessment {
    urgency:  classify(task, due_soon_days),
    progress: progress_ratio(task, now)
  }
}

pub fn due_label(
  task: &TaskDto
) -> Option<String> {
  if task.is_completed() {
    return None;
  }
  let days = task.days_until_due?;
  Some(match days {
    | d if d < 0 => {
      format!("{} days overdue!", d.abs())
    }
    | 0 => "Due today!".to_string(),
    | d => format!("{d} days remaining")
  })
}

pub fn format_due_date<Tz>(
  due: Option<DateTime<Utc>>,
  tz: &Tz
) -> String
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display
{
  match due {
    | Some(due) => due
      .with_timezone(tz)
      .format("%a, %b %-d, %Y, %I:%M %p")
      .to_string(),
    | None => "No due date".to_string()
  }
}

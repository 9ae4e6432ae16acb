use std::io::{
  self,
  IsTerminal,
  Write
};

use chrono::{
  DateTime,
  Local,
  Utc
};
use studybuddy_core::filter::FilterKey;
use studybuddy_core::stats::TaskStats;
use studybuddy_core::urgency::{
  assess,
  display_progress,
  due_label,
  format_due_date
};
use studybuddy_core::{
  Notice,
  NoticeKind,
  Urgency
};
use studybuddy_shared::{
  TaskDto,
  TaskPriority,
  TaskStatus
};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone)]
pub struct Renderer {
  color:         bool,
  due_soon_days: i64
}

impl Renderer {
  pub fn new(due_soon_days: i64) -> Self {
    Self {
      color: io::stdout().is_terminal(),
      due_soon_days
    }
  }

  #[cfg(test)]
  fn plain(due_soon_days: i64) -> Self {
    Self {
      color: false,
      due_soon_days
    }
  }

  #[tracing::instrument(skip_all, fields(count = tasks.len()))]
  pub fn print_task_table(
    &self,
    tasks: &[TaskDto],
    filter: FilterKey,
    now: DateTime<Utc>
  ) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    self.write_task_table(
      &mut out, tasks, filter, now
    )
  }

  fn write_task_table<W: Write>(
    &self,
    out: &mut W,
    tasks: &[TaskDto],
    filter: FilterKey,
    now: DateTime<Utc>
  ) -> anyhow::Result<()> {
    if tasks.is_empty() {
      writeln!(out, "{}", filter.empty_message())?;
      return Ok(());
    }

    let mut table = Table::new(&[
      "ID", "Status", "Priority",
      "Category", "Due", "Progress",
      "Title"
    ]);
    for task in tasks {
      let report =
        assess(task, now, self.due_soon_days);

      let mut due = format_due_date(
        task.due_date,
        &Local
      );
      if let Some(label) = due_label(task) {
        due = format!("{due} ({label})");
      }
      let due = match report.urgency {
        | Urgency::Overdue => {
          self.paint(&due, "31")
        }
        | Urgency::DueSoon => {
          self.paint(&due, "33")
        }
        | Urgency::None => due
      };

      let progress = report
        .progress
        .map(|ratio| {
          format!(
            "{:.0}%",
            display_progress(ratio) * 100.0
          )
        })
        .unwrap_or_default();

      let status = match task.status {
        | TaskStatus::Completed => self
          .paint(task.status.label(), "32"),
        | TaskStatus::InProgress => self
          .paint(task.status.label(), "36"),
        | TaskStatus::Pending => {
          task.status.label().to_string()
        }
      };
      let priority = match task.priority {
        | TaskPriority::High => self
          .paint(task.priority.label(), "1"),
        | _ => task.priority.label().to_string()
      };
      let id = if task.is_placeholder() {
        self.paint("…", "2")
      } else {
        self.paint(task.id.as_str(), "33")
      };

      table.push(vec![
        id,
        status,
        priority,
        task.category.label().to_string(),
        due,
        progress,
        task.title.clone(),
      ]);
    }

    table.write_to(out)
  }

  pub fn print_stats(
    &self,
    stats: &TaskStats
  ) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    write_stats(&mut out, stats)
  }

  /// Notices go to stderr so table
  /// output stays pipeable.
  pub fn print_notice(&self, notice: &Notice) {
    let text = match notice.kind {
      | NoticeKind::Success => {
        self.paint_err(&notice.message, "32")
      }
      | NoticeKind::Error => {
        self.paint_err(&notice.message, "31")
      }
    };
    eprintln!("{text}");
  }

  fn paint(
    &self,
    text: &str,
    code: &str
  ) -> String {
    if !self.color {
      return text.to_string();
    }
    format!("\x1b[{code}m{text}\x1b[0m")
  }

  fn paint_err(
    &self,
    text: &str,
    code: &str
  ) -> String {
    if !io::stderr().is_terminal() {
      return text.to_string();
    }
    format!("\x1b[{code}m{text}\x1b[0m")
  }
}

fn write_stats<W: Write>(
  out: &mut W,
  stats: &TaskStats
) -> anyhow::Result<()> {
  let mut table =
    Table::new(&["Tasks", "Count"]);
  for key in FilterKey::ALL {
    table.push(vec![
      key.label().to_string(),
      stats.count_for(key).to_string(),
    ]);
  }
  table.write_to(out)
}

/// Column-aligned text; cells may
/// carry colour codes.
struct Table {
  headers: Vec<&'static str>,
  rows:    Vec<Vec<String>>
}

impl Table {
  fn new(headers: &[&'static str]) -> Self {
    Self {
      headers: headers.to_vec(),
      rows:    Vec::new()
    }
  }

  fn push(&mut self, row: Vec<String>) {
    self.rows.push(row);
  }

  fn widths(&self) -> Vec<usize> {
    let mut widths = self
      .headers
      .iter()
      .map(|h| visible_width(h))
      .collect::<Vec<_>>();
    for row in &self.rows {
      for (width, cell) in
        widths.iter_mut().zip(row)
      {
        *width =
          (*width).max(visible_width(cell));
      }
    }
    widths
  }

  fn write_to<W: Write>(
    &self,
    out: &mut W
  ) -> anyhow::Result<()> {
    let widths = self.widths();
    let headers = self
      .headers
      .iter()
      .map(|h| h.to_string())
      .collect::<Vec<_>>();
    let rule = widths
      .iter()
      .map(|w| "-".repeat(*w))
      .collect::<Vec<_>>();

    write_row(out, &headers, &widths)?;
    write_row(out, &rule, &widths)?;
    for row in &self.rows {
      write_row(out, row, &widths)?;
    }
    Ok(())
  }
}

fn write_row<W: Write>(
  out: &mut W,
  cells: &[String],
  widths: &[usize]
) -> io::Result<()> {
  let last = cells.len().saturating_sub(1);
  for (idx, (cell, width)) in
    cells.iter().zip(widths).enumerate()
  {
    out.write_all(cell.as_bytes())?;
    if idx < last {
      let pad = width
        .saturating_sub(visible_width(cell))
        + 2;
      write!(out, "{:pad$}", "")?;
    }
  }
  writeln!(out)
}

/// Display columns, ignoring SGR colour
/// sequences.
fn visible_width(cell: &str) -> usize {
  let mut width = 0;
  let mut chars = cell.chars();
  while let Some(ch) = chars.next() {
    if ch == '\x1b' {
      for end in chars.by_ref() {
        if end == 'm' {
          break;
        }
      }
      continue;
    }
    width += ch.width().unwrap_or(0);
  }
  width
}

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{
  ArgAction,
  Parser,
  Subcommand
};
use studybuddy_shared::{
  TaskCategory,
  TaskPriority
};
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// One `--rc key=value` pair. Keys are
/// config field names; dashes are
/// accepted in place of underscores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverride {
  pub key:   String,
  pub value: String
}

impl ConfigOverride {
  pub fn pair(&self) -> (String, String) {
    (self.key.clone(), self.value.clone())
  }
}

fn parse_override(
  s: &str
) -> Result<ConfigOverride, String> {
  let Some((key, value)) = s.split_once('=')
  else {
    return Err(format!(
      "'{s}' is not key=value"
    ));
  };
  let key = key.trim().replace('-', "_");
  if key.is_empty() {
    return Err(format!(
      "'{s}' has an empty key"
    ));
  }
  Ok(ConfigOverride {
    key,
    value: value.trim().to_string()
  })
}

#[derive(Parser, Debug, Clone)]
#[command(
  name = "studybuddy",
  version,
  about = "StudyBuddy: study task tracker client"
)]
pub struct GlobalCli {
  #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
  pub verbose: u8,

  #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
  pub quiet: u8,

  /// Config file (TOML).
  #[arg(long = "config", global = true)]
  pub config: Option<PathBuf>,

  /// API base, e.g. http://127.0.0.1:8000/api
  #[arg(long = "api", global = true)]
  pub api: Option<String>,

  #[arg(
    long = "rc",
    value_parser = parse_override,
    action = ArgAction::Append,
    global = true
  )]
  pub rc_overrides: Vec<ConfigOverride>,

  #[command(subcommand)]
  pub command: Command
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
  /// Show tasks, optionally narrowed.
  List {
    /// all, pending, in_progress,
    /// completed, overdue or
    /// high_priority.
    #[arg(long, short = 'f', default_value = "all")]
    filter: String,
    #[arg(long, short = 's', default_value = "")]
    search: String
  },
  /// Headline counts.
  Stats,
  /// Create a task.
  Add {
    title:       String,
    #[arg(long, short = 'd', default_value = "")]
    description: String,
    #[arg(long, short = 'p', value_parser = parse_priority, default_value = "medium")]
    priority:    TaskPriority,
    #[arg(long, short = 'c', value_parser = parse_category, default_value = "other")]
    category:    TaskCategory,
    /// Local time, YYYY-MM-DDTHH:MM.
    #[arg(long)]
    due:         Option<String>
  },
  /// Change title, description,
  /// priority, category or due date.
  Edit {
    id:          String,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_priority)]
    priority:    Option<TaskPriority>,
    #[arg(long, value_parser = parse_category)]
    category:    Option<TaskCategory>,
    #[arg(long, conflicts_with = "clear_due")]
    due:         Option<String>,
    #[arg(long)]
    clear_due:   bool
  },
  /// Mark a task in progress.
  Start { id: String },
  /// Mark a task completed.
  Complete { id: String },
  /// Move a completed task back to
  /// pending.
  Reopen { id: String },
  /// Delete a task after confirmation.
  Delete {
    id:  String,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool
  }
}

fn parse_priority(
  s: &str
) -> Result<TaskPriority, String> {
  TaskPriority::parse(s).ok_or_else(|| {
    format!(
      "unknown priority '{s}' (low, \
       medium, high)"
    )
  })
}

fn parse_category(
  s: &str
) -> Result<TaskCategory, String> {
  TaskCategory::parse(s).ok_or_else(|| {
    format!(
      "unknown category '{s}' \
       (assignment, exam, project, \
       reading, other)"
    )
  })
}

/// `-v` and `-q` cancel out; the
/// default sits at warn.
fn level_for(
  verbose: u8,
  quiet: u8
) -> LevelFilter {
  match i16::from(verbose) - i16::from(quiet)
  {
    | ..=-2 => LevelFilter::ERROR,
    | -1 | 0 => LevelFilter::WARN,
    | 1 => LevelFilter::INFO,
    | 2 => LevelFilter::DEBUG,
    | _ => LevelFilter::TRACE
  }
}

/// `RUST_LOG` wins over the flag
/// counts when it is set.
pub fn init_tracing(
  verbose: u8,
  quiet: u8
) -> anyhow::Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(
      level_for(verbose, quiet).into()
    )
    .from_env()
    .context("invalid RUST_LOG filter")?;

  let stderr_tty =
    std::io::stderr().is_terminal();
  if let Err(err) = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(stderr_tty)
    .try_init()
  {
    debug!(error = %err, "subscriber already installed");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::ffi::OsString;

  use super::*;

  fn os(
    args: &[&str]
  ) -> Vec<OsString> {
    args
      .iter()
      .map(OsString::from)
      .collect()
  }

  #[test]
  fn parses_add_with_enums() {
    let cli = GlobalCli::parse_from(os(&[
      "studybuddy",
      "add",
      "Read Ch.3",
      "--category",
      "reading",
      "-p",
      "high"
    ]));
    match cli.command {
      | Command::Add {
        title,
        priority,
        category,
        due,
        ..
      } => {
        assert_eq!(title, "Read Ch.3");
        assert_eq!(
          priority,
          TaskPriority::High
        );
        assert_eq!(
          category,
          TaskCategory::Reading
        );
        assert_eq!(due, None);
      }
      | other => {
        panic!("unexpected {other:?}")
      }
    }
  }

  #[test]
  fn rejects_unknown_category() {
    assert!(
      GlobalCli::try_parse_from(os(&[
        "studybuddy",
        "add",
        "x",
        "--category",
        "chores"
      ]))
      .is_err()
    );
  }

  #[test]
  fn global_overrides_follow_subcommands()
  {
    let cli = GlobalCli::parse_from(os(&[
      "studybuddy",
      "list",
      "--filter",
      "overdue",
      "--rc",
      "due_soon_days=3"
    ]));
    assert_eq!(
      cli.rc_overrides,
      vec![ConfigOverride {
        key:   "due_soon_days".to_string(),
        value: "3".to_string()
      }]
    );
  }

  #[test]
  fn override_keys_accept_dashes() {
    let parsed =
      parse_override(" notice-ms = 500 ")
        .expect("valid pair");
    assert_eq!(parsed.pair(), (
      "notice_ms".to_string(),
      "500".to_string()
    ));
    assert!(parse_override("notice_ms").is_err());
    assert!(parse_override("=5").is_err());
  }

  #[test]
  fn quiet_and_verbose_cancel_out() {
    assert_eq!(level_for(0, 0), LevelFilter::WARN);
    assert_eq!(level_for(2, 2), LevelFilter::WARN);
    assert_eq!(level_for(1, 0), LevelFilter::INFO);
    assert_eq!(level_for(0, 2), LevelFilter::ERROR);
    assert_eq!(level_for(5, 0), LevelFilter::TRACE);
  }

  #[test]
  fn clear_due_conflicts_with_due() {
    assert!(
      GlobalCli::try_parse_from(os(&[
        "studybuddy",
        "edit",
        "4",
        "--due",
        "2026-03-01T10:00",
        "--clear-due"
      ]))
      .is_err()
    );
  }
}

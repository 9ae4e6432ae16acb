use std::cell::RefCell;
use std::io::{
  self,
  BufRead,
  Write
};
use std::rc::Rc;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Local,
  Utc
};
use studybuddy_core::draft::{
  EditDraft,
  NewTaskForm
};
use studybuddy_core::filter::filter_tasks;
use studybuddy_core::gateway::DeleteOutcome;
use studybuddy_core::stats::TaskStats;
use studybuddy_core::{
  Config,
  FilterKey,
  MutationGateway,
  Notice,
  Notifier,
  TaskStore
};
use studybuddy_shared::{
  TaskDto,
  TaskId,
  TaskStatus
};
use tracing::{
  debug,
  info,
  instrument
};

use crate::cli::Command;
use crate::http::RestApi;
use crate::render::Renderer;

const DELETE_PROMPT: &str =
  "Are you sure you want to delete this \
   task?";

/// Prints gateway notices on stderr.
struct ConsoleNotifier {
  renderer: Renderer
}

impl Notifier for ConsoleNotifier {
  fn notify(&self, notice: Notice) {
    self.renderer.print_notice(&notice);
  }
}

type Gateway = MutationGateway<
  RestApi,
  Rc<RefCell<TaskStore>>,
  ConsoleNotifier
>;

#[instrument(skip(cfg, command))]
pub async fn dispatch(
  cfg: &Config,
  command: Command
) -> anyhow::Result<()> {
  let renderer =
    Renderer::new(cfg.due_soon_days);
  let store = Rc::new(RefCell::new(
    TaskStore::default()
  ));
  let gateway = MutationGateway::new(
    RestApi::new(cfg)?,
    store.clone(),
    ConsoleNotifier {
      renderer: renderer.clone()
    }
  );

  match command {
    | Command::List {
      filter,
      search
    } => {
      let key = FilterKey::parse(&filter);
      if key.as_key() != filter {
        debug!(filter = %filter, "unknown filter, showing all");
      }
      gateway.refresh().await?;
      let visible = filter_tasks(
        store.borrow().tasks(),
        key,
        &search
      );
      info!(
        shown = visible.len(),
        total = store.borrow().len(),
        "command list"
      );
      renderer.print_task_table(
        &visible,
        key,
        Utc::now()
      )
    }
    | Command::Stats => {
      gateway.refresh().await?;
      renderer.print_stats(
        &TaskStats::collect(
          store.borrow().tasks()
        )
      )
    }
    | Command::Add {
      title,
      description,
      priority,
      category,
      due
    } => {
      let form = NewTaskForm {
        title,
        description,
        priority,
        category,
        due: due.unwrap_or_default()
      };
      let body = form
        .to_create(&Local)
        .map_err(|e| anyhow!("{e}"))?;
      let task =
        gateway.create(body, Utc::now()).await?;
      println!("Created task {}.", task.id);
      Ok(())
    }
    | Command::Edit {
      id,
      title,
      description,
      priority,
      category,
      due,
      clear_due
    } => {
      let id = TaskId::new(id);
      let task =
        find_task(&gateway, &store, &id)
          .await?;
      let mut draft =
        EditDraft::from_task(&task, &Local);
      if let Some(title) = title {
        draft.title = title;
      }
      if let Some(description) = description
      {
        draft.description = description;
      }
      if let Some(priority) = priority {
        draft.priority = priority;
      }
      if let Some(category) = category {
        draft.category = category;
      }
      if clear_due {
        draft.due.clear();
      } else if let Some(due) = due {
        draft.due = due;
      }
      let body = draft
        .to_edit(&Local)
        .map_err(|e| anyhow!("{e}"))?;
      gateway.save_edit(&id, &body).await?;
      Ok(())
    }
    | Command::Start { id } => {
      move_task(
        &gateway,
        &store,
        TaskId::new(id),
        TaskStatus::InProgress
      )
      .await
    }
    | Command::Complete { id } => {
      move_task(
        &gateway,
        &store,
        TaskId::new(id),
        TaskStatus::Completed
      )
      .await
    }
    | Command::Reopen { id } => {
      move_task(
        &gateway,
        &store,
        TaskId::new(id),
        TaskStatus::Pending
      )
      .await
    }
    | Command::Delete { id, yes } => {
      let id = TaskId::new(id);
      let outcome = gateway
        .delete(&id, || yes || confirm_delete())
        .await?;
      if outcome == DeleteOutcome::Declined {
        println!("Nothing deleted.");
      }
      Ok(())
    }
  }
}

/// Loads the list and looks `id` up
/// in it.
async fn find_task(
  gateway: &Gateway,
  store: &Rc<RefCell<TaskStore>>,
  id: &TaskId
) -> anyhow::Result<TaskDto> {
  gateway.refresh().await?;
  store
    .borrow()
    .get(id)
    .cloned()
    .ok_or_else(|| anyhow!("no task with id {id}"))
}

#[instrument(skip(gateway, store, id), fields(id = %id))]
async fn move_task(
  gateway: &Gateway,
  store: &Rc<RefCell<TaskStore>>,
  id: TaskId,
  next: TaskStatus
) -> anyhow::Result<()> {
  let task =
    find_task(gateway, store, &id).await?;
  if !task.status.can_move_to(next) {
    return Err(anyhow!(
      "task {id} is {} and cannot move to \
       {}",
      task.status.label(),
      next.label()
    ));
  }
  gateway.set_status(&id, next).await?;
  Ok(())
}

fn confirm_delete() -> bool {
  match read_confirmation(
    io::stdin().lock(),
    io::stderr()
  ) {
    | Ok(answer) => answer,
    | Err(err) => {
      debug!(error = %err, "could not read confirmation");
      false
    }
  }
}

fn read_confirmation<R, W>(
  mut input: R,
  mut prompt: W
) -> anyhow::Result<bool>
where
  R: BufRead,
  W: Write
{
  write!(prompt, "{DELETE_PROMPT} [y/N] ")?;
  prompt.flush()?;
  let mut line = String::new();
  input
    .read_line(&mut line)
    .context("failed reading answer")?;
  Ok(matches!(
    line.trim().to_ascii_lowercase().as_str(),
    "y" | "yes"
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn answer(text: &str) -> bool {
    let mut prompt = Vec::new();
    let answer = read_confirmation(
      text.as_bytes(),
      &mut prompt
    )
    .expect("read answer");
    let shown =
      String::from_utf8(prompt).expect("utf8");
    assert!(shown.starts_with(DELETE_PROMPT));
    answer
  }

  #[test]
  fn only_yes_confirms() {
    assert!(answer("y\n"));
    assert!(answer("YES\n"));
    assert!(!answer("\n"));
    assert!(!answer("nope\n"));
    assert!(!answer(""));
  }
}

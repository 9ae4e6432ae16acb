use std::cell::{
  Cell,
  RefCell
};
use std::rc::Rc;

use chrono::{
  DateTime,
  Duration,
  FixedOffset,
  TimeZone,
  Utc
};
use studybuddy_core::draft::{
  EditAction,
  EditDraft,
  EditState,
  NewTaskForm
};
use studybuddy_core::filter::filter_tasks;
use studybuddy_core::stats::TaskStats;
use studybuddy_core::urgency::assess;
use studybuddy_core::{
  ApiError,
  DUE_SOON_DAYS,
  FilterKey,
  MutationGateway,
  Notice,
  Notifier,
  TaskApi,
  TaskStore,
  Urgency
};
use studybuddy_shared::{
  TaskCategory,
  TaskCreate,
  TaskDto,
  TaskEdit,
  TaskId,
  TaskPriority,
  TaskStatus,
  TaskStatusPatch
};

fn t0() -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(
      2026, 2, 16, 9, 0, 0
    )
    .single()
    .expect("valid t0")
}

fn utc() -> FixedOffset {
  FixedOffset::east_opt(0).expect("utc")
}

/// Behaves like the REST API: assigns
/// integer ids and derives the due
/// counters from a fixed clock.
struct MemoryApi {
  now:     DateTime<Utc>,
  tasks:   RefCell<Vec<TaskDto>>,
  next_id: Cell<u64>,
  down:    Cell<bool>
}

impl MemoryApi {
  fn new(now: DateTime<Utc>) -> Self {
    Self {
      now,
      tasks: RefCell::new(vec![]),
      next_id: Cell::new(1),
      down: Cell::new(false)
    }
  }

  fn check(&self) -> Result<(), ApiError> {
    if self.down.get() {
      return Err(ApiError::Status {
        status: 503,
        body:   "maintenance".to_string()
      });
    }
    Ok(())
  }

  fn computed(
    &self,
    mut task: TaskDto
  ) -> TaskDto {
    task.is_overdue = task.status
      != TaskStatus::Completed
      && task
        .due_date
        .is_some_and(|due| due < self.now);
    task.days_until_due = task
      .due_date
      .map(|due| (due - self.now).num_days());
    task
  }

  fn seed(
    &self,
    create: TaskCreate,
    created: DateTime<Utc>
  ) -> TaskDto {
    let id = self.next_id.get();
    self.next_id.set(id + 1);
    let task = TaskDto {
      id:             TaskId::new(
        id.to_string()
      ),
      title:          create.title,
      description:    create.description,
      priority:       create.priority,
      category:       create.category,
      status:         TaskStatus::Pending,
      due_date:       create.due_date,
      created_at:     Some(created),
      updated_at:     Some(created),
      is_overdue:     false,
      days_until_due: None
    };
    self.tasks.borrow_mut().push(task.clone());
    task
  }
}

impl TaskApi for MemoryApi {
  async fn list(
    &self
  ) -> Result<Vec<TaskDto>, ApiError> {
    self.check()?;
    Ok(
      self
        .tasks
        .borrow()
        .iter()
        .cloned()
        .map(|task| self.computed(task))
        .collect()
    )
  }

  async fn create(
    &self,
    body: &TaskCreate
  ) -> Result<TaskDto, ApiError> {
    self.check()?;
    let task =
      self.seed(body.clone(), self.now);
    Ok(self.computed(task))
  }

  async fn edit(
    &self,
    id: &TaskId,
    body: &TaskEdit
  ) -> Result<(), ApiError> {
    self.check()?;
    for task in
      self.tasks.borrow_mut().iter_mut()
    {
      if &task.id == id {
        task.title = body.title.clone();
        task.description =
          body.description.clone();
        task.priority = body.priority;
        task.category = body.category;
        task.due_date = body.due_date;
      }
    }
    Ok(())
  }

  async fn set_status(
    &self,
    id: &TaskId,
    patch: TaskStatusPatch
  ) -> Result<(), ApiError> {
    self.check()?;
    for task in
      self.tasks.borrow_mut().iter_mut()
    {
      if &task.id == id {
        task.status = patch.status;
      }
    }
    Ok(())
  }

  async fn delete(
    &self,
    id: &TaskId
  ) -> Result<(), ApiError> {
    self.check()?;
    self
      .tasks
      .borrow_mut()
      .retain(|task| &task.id != id);
    Ok(())
  }
}

/// Collects notices; clones share one
/// list.
#[derive(Clone, Default)]
struct Log(Rc<RefCell<Vec<Notice>>>);

impl Log {
  fn messages(&self) -> Vec<String> {
    self
      .0
      .borrow()
      .iter()
      .map(|n| n.message.clone())
      .collect()
  }
}

impl Notifier for Log {
  fn notify(&self, notice: Notice) {
    self.0.borrow_mut().push(notice);
  }
}

fn create(
  title: &str,
  category: TaskCategory,
  due: Option<DateTime<Utc>>
) -> TaskCreate {
  TaskCreate {
    title: title.to_string(),
    description: String::new(),
    priority: TaskPriority::Medium,
    category,
    due_date: due
  }
}

#[tokio::test]
async fn study_session_flow() {
  let now = t0() + Duration::days(8);
  let api = MemoryApi::new(now);
  api.seed(
    create(
      "Essay draft",
      TaskCategory::Assignment,
      Some(t0() + Duration::days(10))
    ),
    t0()
  );
  api.seed(
    create(
      "Lab write-up",
      TaskCategory::Project,
      Some(t0() + Duration::days(2))
    ),
    t0()
  );
  api.seed(
    create(
      "Flashcards",
      TaskCategory::Exam,
      None
    ),
    t0()
  );

  let store = Rc::new(RefCell::new(
    TaskStore::default()
  ));
  let log = Log::default();
  let gateway = MutationGateway::new(
    api,
    store.clone(),
    log.clone()
  );

  assert_eq!(
    gateway.refresh().await.expect("load"),
    3
  );

  let overdue = filter_tasks(
    store.borrow().tasks(),
    FilterKey::Overdue,
    ""
  );
  assert_eq!(overdue.len(), 1);
  assert_eq!(overdue[0].title, "Lab write-up");

  let essay = store.borrow().tasks()[0].clone();
  let report =
    assess(&essay, now, DUE_SOON_DAYS);
  assert_eq!(report.urgency, Urgency::DueSoon);
  let ratio =
    report.progress.expect("ratio");
  assert!((ratio - 0.8).abs() < 1e-9);

  let form = NewTaskForm {
    title: "Read Ch.3".to_string(),
    category: TaskCategory::Reading,
    ..NewTaskForm::default()
  };
  let created = gateway
    .create(
      form.to_create(&utc()).expect("form"),
      now
    )
    .await
    .expect("create");
  assert_eq!(store.borrow().len(), 4);
  assert_eq!(
    store.borrow().tasks()[0].id,
    created.id
  );

  gateway
    .set_status(
      &created.id,
      TaskStatus::Completed
    )
    .await
    .expect("complete");
  let stats =
    TaskStats::collect(store.borrow().tasks());
  assert_eq!(stats.completed, 1);
  assert_eq!(stats.total, 4);

  let exam_hits = filter_tasks(
    store.borrow().tasks(),
    FilterKey::All,
    "EXAM"
  );
  assert_eq!(exam_hits.len(), 1);
  assert_eq!(exam_hits[0].title, "Flashcards");

  assert!(
    log
      .messages()
      .iter()
      .any(|m| m == "Task completed")
  );
}

#[tokio::test]
async fn outage_keeps_drafts_and_rolls_back_creates()
{
  let api = MemoryApi::new(t0());
  api.seed(
    create(
      "Problem set",
      TaskCategory::Assignment,
      None
    ),
    t0()
  );
  let store = Rc::new(RefCell::new(
    TaskStore::default()
  ));
  let log = Log::default();
  let gateway = MutationGateway::new(
    api,
    store.clone(),
    log.clone()
  );
  gateway.refresh().await.expect("load");

  gateway.api().down.set(true);

  let before = store.borrow().clone();
  let quiz = create(
    "Quiz prep",
    TaskCategory::Exam,
    None
  );
  assert!(
    gateway.create(quiz, t0()).await.is_err()
  );
  assert_eq!(*store.borrow(), before);

  let task = store.borrow().tasks()[0].clone();
  let mut draft =
    EditDraft::from_task(&task, &utc());
  draft.title =
    "Problem set (revised)".to_string();

  let mut edit = EditState::Idle
    .apply(EditAction::Start {
      id:    task.id.clone(),
      draft: draft.clone()
    })
    .apply(EditAction::SaveStarted);
  let body =
    draft.to_edit(&utc()).expect("draft");
  let outcome =
    gateway.save_edit(&task.id, &body).await;
  edit = edit.apply(match outcome {
    | Ok(()) => EditAction::Saved,
    | Err(_) => EditAction::SaveFailed
  });

  assert_eq!(edit.draft(), Some(&draft));
  assert_eq!(
    store.borrow().tasks()[0].title,
    "Problem set"
  );
  assert_eq!(log.messages().len(), 2);
}

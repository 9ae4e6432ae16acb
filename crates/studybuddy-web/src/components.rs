use chrono::{
  DateTime,
  Local,
  Utc
};
use studybuddy_core::draft::{
  EditDraft,
  NewTaskForm
};
use studybuddy_core::stats::TaskStats;
use studybuddy_core::urgency::{
  assess,
  display_progress,
  due_label,
  format_due_date
};
use studybuddy_core::{
  FilterKey,
  Notice,
  NoticeKind
};
use studybuddy_shared::{
  TaskCategory,
  TaskDto,
  TaskId,
  TaskPriority,
  TaskStatus,
  ViewMode
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html
};

/// Reads the value of whichever form
/// control fired the event.
fn control_value(
  e: &web_sys::Event
) -> Option<String> {
  if let Some(input) = e.target_dyn_into::<
    web_sys::HtmlInputElement
  >() {
    return Some(input.value());
  }
  if let Some(select) = e.target_dyn_into::<
    web_sys::HtmlSelectElement
  >() {
    return Some(select.value());
  }
  if let Some(area) = e.target_dyn_into::<
    web_sys::HtmlTextAreaElement
  >() {
    return Some(area.value());
  }
  tracing::warn!(
    "form event had an unexpected target"
  );
  None
}

fn on_field<T, F>(
  current: T,
  on_change: Callback<T>,
  set: F
) -> Callback<web_sys::Event>
where
  T: Clone + 'static,
  F: Fn(&mut T, String) + 'static
{
  Callback::from(move |e: web_sys::Event| {
    if let Some(value) = control_value(&e) {
      let mut next = current.clone();
      set(&mut next, value);
      on_change.emit(next);
    }
  })
}

fn priority_options(
  selected: TaskPriority
) -> Html {
  html! {
    { for TaskPriority::ALL.into_iter().map(|p| html! {
        <option value={p.as_key()} selected={p == selected}>{ p.label() }</option>
    }) }
  }
}

fn category_options(
  selected: TaskCategory
) -> Html {
  html! {
    { for TaskCategory::ALL.into_iter().map(|c| html! {
        <option value={c.as_key()} selected={c == selected}>{ c.label() }</option>
    }) }
  }
}

#[function_component(Header)]
pub fn header() -> Html {
  html! {
    <div class="app-header">
      <h1 class="app-title">{ "📚 StudyBuddy" }</h1>
      <p class="app-subtitle">{ "Your intelligent task management companion" }</p>
    </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct StatsRowProps {
  pub stats: TaskStats
}

#[function_component(StatsRow)]
pub fn stats_row(
  props: &StatsRowProps
) -> Html {
  let card = |icon: &str,
              count: usize,
              label: &str| {
    html! {
      <div class="stats-card">
        <span class="stats-icon">{ icon.to_string() }</span>
        <h2 class="stats-number">{ count.to_string() }</h2>
        <p class="stats-label">{ label.to_string() }</p>
      </div>
    }
  };
  let stats = props.stats;
  html! {
    <div class="stats-row">
      { card("📋", stats.total, "Total Tasks") }
      { card("✅", stats.completed, "Completed") }
      { card("⏳", stats.in_progress, "In Progress") }
      { card("🚨", stats.overdue, "Overdue") }
    </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct ViewTabsProps {
  pub active:    ViewMode,
  pub on_select: Callback<ViewMode>
}

#[function_component(ViewTabs)]
pub fn view_tabs(
  props: &ViewTabsProps
) -> Html {
  html! {
    <div class="view-tabs">
      { for ViewMode::ALL.into_iter().map(|mode| {
          let on_select = props.on_select.clone();
          let class = classes!(
            "view-tab",
            (mode == props.active).then_some("active")
          );
          html! {
            <button class={class} onclick={move |_| on_select.emit(mode)}>
              { mode.label() }
            </button>
          }
      }) }
    </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct CreateFormProps {
  pub form:      NewTaskForm,
  pub on_change: Callback<NewTaskForm>,
  pub on_submit: Callback<()>
}

#[function_component(CreateForm)]
pub fn create_form(
  props: &CreateFormProps
) -> Html {
  let form = props.form.clone();
  let change = props.on_change.clone();
  let on_submit = {
    let on_submit = props.on_submit.clone();
    Callback::from(
      move |e: web_sys::SubmitEvent| {
        e.prevent_default();
        on_submit.emit(());
      }
    )
  };

  html! {
    <div class="modern-card">
      <div class="card-header-modern">
        <h3>{ "✨ Create New Task" }</h3>
      </div>
      <form class="create-form" onsubmit={on_submit}>
        <input
          class="form-control"
          placeholder="Enter task title *"
          value={form.title.clone()}
          oninput={on_field(form.clone(), change.clone(), |f, v| f.title = v).reform(web_sys::Event::from)}
        />
        <input
          class="form-control"
          placeholder="Task description (optional)"
          value={form.description.clone()}
          oninput={on_field(form.clone(), change.clone(), |f, v| f.description = v).reform(web_sys::Event::from)}
        />
        <select
          class="form-control"
          onchange={on_field(form.clone(), change.clone(), |f, v| {
            f.priority = TaskPriority::parse(&v).unwrap_or_default();
          })}
        >
          { priority_options(form.priority) }
        </select>
        <select
          class="form-control"
          onchange={on_field(form.clone(), change.clone(), |f, v| {
            f.category = TaskCategory::parse(&v).unwrap_or_default();
          })}
        >
          { category_options(form.category) }
        </select>
        <input
          type="datetime-local"
          class="form-control"
          value={form.due.clone()}
          onchange={on_field(form.clone(), change, |f, v| f.due = v)}
        />
        <button type="submit" class="btn btn-primary">{ "➕ Add" }</button>
      </form>
    </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct FilterBarProps {
  pub active:    FilterKey,
  pub stats:     TaskStats,
  pub search:    String,
  pub on_filter: Callback<FilterKey>,
  pub on_search: Callback<String>
}

#[function_component(FilterBar)]
pub fn filter_bar(
  props: &FilterBarProps
) -> Html {
  let on_search = {
    let on_search = props.on_search.clone();
    Callback::from(
      move |e: web_sys::InputEvent| {
        if let Some(value) =
          control_value(&e.into())
        {
          on_search.emit(value);
        }
      }
    )
  };

  html! {
    <div class="filter-bar">
      <input
        class="form-control search-box"
        placeholder="🔍 Search tasks..."
        value={props.search.clone()}
        oninput={on_search}
      />
      <div class="filter-buttons">
        { for FilterKey::ALL.into_iter().map(|key| {
            let on_filter = props.on_filter.clone();
            let class = classes!(
              "filter-btn",
              (key == props.active).then_some("active")
            );
            html! {
              <button class={class} onclick={move |_| on_filter.emit(key)}>
                { format!("{} ({})", key.label(), props.stats.count_for(key)) }
              </button>
            }
        }) }
      </div>
    </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskCardProps {
  pub task:          TaskDto,
  pub now:           DateTime<Utc>,
  pub due_soon_days: i64,
  /// Present while this card is in
  /// edit mode.
  pub draft:         Option<EditDraft>,
  pub saving:        bool,
  pub highlighted:   bool,
  pub on_edit:       Callback<TaskDto>,
  pub on_draft:      Callback<EditDraft>,
  pub on_save:       Callback<()>,
  pub on_cancel:     Callback<()>,
  pub on_status:
    Callback<(TaskId, TaskStatus)>,
  pub on_delete:     Callback<TaskId>
}

#[function_component(TaskCard)]
pub fn task_card(
  props: &TaskCardProps
) -> Html {
  let task = &props.task;
  let report =
    assess(task, props.now, props.due_soon_days);
  let class = classes!(
    "task-card",
    report.urgency.as_class(),
    task.is_placeholder().then_some("placeholder"),
    props.highlighted.then_some("just-completed")
  );

  let body = match &props.draft {
    | Some(draft) => edit_body(props, draft),
    | None => view_body(task, &report)
  };

  html! {
    <div class={class}>
      <div class="card-body">{ body }</div>
      <div class="task-actions">{ actions(props) }</div>
    </div>
  }
}

fn view_body(
  task: &TaskDto,
  report: &studybuddy_core::urgency::Assessment
) -> Html {
  let due_class = classes!(
    "due-date-info",
    report.urgency.as_class()
  );
  let description = if task.description.is_empty() {
    "No description provided".to_string()
  } else {
    task.description.clone()
  };
  let progress = report.progress.map(|ratio| {
    let percent = display_progress(ratio) * 100.0;
    html! {
      <div class="progress">
        <div class="progress-bar" style={format!("width: {percent:.0}%")}></div>
      </div>
    }
  });

  html! {
    <>
      <div class="card-badges">
        <span class={format!("priority-badge priority-{}", task.priority.as_key())}>
          { task.priority.label() }
        </span>
        <span class="category-badge">{ task.category.label() }</span>
      </div>
      <h5 class="card-title">{ &task.title }</h5>
      <p class="card-text">{ description }</p>
      <div class={due_class.clone()}>
        <span>{ "📅" }</span>
        <span>{ format_due_date(task.due_date, &Local) }</span>
      </div>
      {
        match due_label(task) {
          | Some(label) => html! {
              <div class={due_class}>
                <span>{ "⏰" }</span>
                <span>{ label }</span>
              </div>
            },
          | None => html! {}
        }
      }
      { progress.unwrap_or_default() }
      <span class={format!("status-badge status-{}", task.status.as_key())}>
        { task.status.label() }
      </span>
    </>
  }
}

fn edit_body(
  props: &TaskCardProps,
  draft: &EditDraft
) -> Html {
  let change = props.on_draft.clone();
  html! {
    <div class="edit-form">
      <input
        class="form-control"
        placeholder="Task title *"
        value={draft.title.clone()}
        oninput={on_field(draft.clone(), change.clone(), |d, v| d.title = v).reform(web_sys::Event::from)}
      />
      <textarea
        class="form-control"
        placeholder="Description"
        value={draft.description.clone()}
        oninput={on_field(draft.clone(), change.clone(), |d, v| d.description = v).reform(web_sys::Event::from)}
      />
      <select
        class="form-control"
        onchange={on_field(draft.clone(), change.clone(), |d, v| {
          d.priority = TaskPriority::parse(&v).unwrap_or_default();
        })}
      >
        { priority_options(draft.priority) }
      </select>
      <select
        class="form-control"
        onchange={on_field(draft.clone(), change.clone(), |d, v| {
          d.category = TaskCategory::parse(&v).unwrap_or_default();
        })}
      >
        { category_options(draft.category) }
      </select>
      <input
        type="datetime-local"
        class="form-control"
        value={draft.due.clone()}
        onchange={on_field(draft.clone(), change, |d, v| d.due = v)}
      />
    </div>
  }
}

fn actions(props: &TaskCardProps) -> Html {
  if props.draft.is_some() {
    let on_save = props.on_save.clone();
    let on_cancel = props.on_cancel.clone();
    return html! {
      <>
        <button class="btn btn-success" disabled={props.saving} onclick={move |_| on_save.emit(())}>
          { if props.saving { "Saving…" } else { "💾 Save" } }
        </button>
        <button class="btn btn-warning" onclick={move |_| on_cancel.emit(())}>
          { "✖️ Cancel" }
        </button>
      </>
    };
  }

  let task = props.task.clone();
  let id = task.id.clone();
  let status_button = |next: TaskStatus| {
    let on_status = props.on_status.clone();
    let id = id.clone();
    let (class, label) = match next {
      | TaskStatus::InProgress => ("btn btn-info", "⏳ Progress"),
      | TaskStatus::Completed => ("btn btn-success", "✅ Complete"),
      | TaskStatus::Pending => ("btn btn-warning", "🔄 Reopen")
    };
    html! {
      <button class={class} onclick={move |_| on_status.emit((id.clone(), next))}>
        { label }
      </button>
    }
  };
  let on_edit = props.on_edit.clone();
  let on_delete = props.on_delete.clone();
  let delete_id = id.clone();

  html! {
    <>
      <button class="btn btn-secondary" onclick={move |_| on_edit.emit(task.clone())}>
        { "✏️ Edit" }
      </button>
      { for props.task.status.transitions().iter().copied().map(status_button) }
      <button class="btn btn-danger" onclick={move |_| on_delete.emit(delete_id.clone())}>
        { "🗑️ Delete" }
      </button>
    </>
  }
}

#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
  pub notice:     Option<Notice>,
  pub on_dismiss: Callback<()>
}

#[function_component(NoticeBanner)]
pub fn notice_banner(
  props: &NoticeBannerProps
) -> Html {
  let Some(notice) = &props.notice else {
    return html! {};
  };
  let class = match notice.kind {
    | NoticeKind::Success => "notice success",
    | NoticeKind::Error => "notice error"
  };
  let on_dismiss = props.on_dismiss.clone();
  html! {
    <div class={class} role="status" onclick={move |_| on_dismiss.emit(())}>
      { &notice.message }
    </div>
  }
}

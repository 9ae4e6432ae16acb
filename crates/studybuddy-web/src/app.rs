mod state;
mod storage;

use chrono::{
  Local,
  Utc
};
use gloo::console::log;
use gloo::timers::callback::{
  Interval,
  Timeout
};
use studybuddy_core::draft::{
  EditAction,
  EditDraft,
  EditState,
  NewTaskForm
};
use studybuddy_core::filter::filter_tasks;
use studybuddy_core::prefs::AppState;
use studybuddy_core::schedule::Debouncer;
use studybuddy_core::stats::TaskStats;
use studybuddy_core::{
  FilterKey,
  Notice,
  Notifier,
  TaskStore
};
use studybuddy_shared::{
  TaskDto,
  TaskId,
  TaskStatus,
  ViewMode
};
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_state
};

use self::state::{
  NoticeBoard,
  Services,
  use_shared
};
use self::storage::{
  BrowserStorage,
  load_config
};
use crate::api::HttpApi;
use crate::components::{
  CreateForm,
  FilterBar,
  Header,
  NoticeBanner,
  StatsRow,
  TaskCard,
  ViewTabs
};

const DELETE_PROMPT: &str =
  "Are you sure you want to delete this \
   task?";

#[function_component(App)]
pub fn app() -> Html {
  let cfg = use_state(load_config);
  let app_state = use_state(|| {
    AppState::load(&BrowserStorage)
  });

  let store = use_shared(TaskStore::default);
  let notices =
    use_shared(NoticeBoard::default);
  let edit = use_shared(EditState::default);
  let services = Services {
    api:     HttpApi::new(&cfg),
    store:   store.clone(),
    notices: notices.clone()
  };

  let loading = use_state(|| true);
  let form = use_state(NewTaskForm::default);
  let filter = use_state(FilterKey::default);
  let search_input = use_state(String::new);
  let query = use_state(String::new);
  let debouncer = {
    let delay = cfg.search_debounce_ms;
    use_mut_ref(move || {
      Debouncer::<String>::new(delay)
    })
  };
  let search_timer =
    use_mut_ref(|| None::<Timeout>);
  let now = use_state(Utc::now);
  let just_completed =
    use_state(|| None::<TaskId>);

  {
    let services = services.clone();
    let loading = loading.clone();
    use_effect_with((), move |_| {
      wasm_bindgen_futures::spawn_local(
        async move {
          if let Err(err) =
            services.gateway().refresh().await
          {
            ui_debug(
              "tasks.load.failed",
              &err.to_string()
            );
          }
          loading.set(false);
        }
      );
      || ()
    });
  }

  {
    let now = now.clone();
    use_effect_with(
      cfg.tick_interval_ms,
      move |period_ms| {
        let interval =
          Interval::new(*period_ms, move || {
            now.set(Utc::now());
          });
        move || drop(interval)
      }
    );
  }

  {
    let notices = notices.clone();
    let notice_ms = cfg.notice_ms;
    use_effect_with(
      notices.get().seq,
      move |seq| {
        let seq = *seq;
        let timer = notices
          .get()
          .current
          .is_some()
          .then(|| {
            let notices = notices.clone();
            Timeout::new(notice_ms, move || {
              notices.update(|board| {
                board.clear(seq)
              });
            })
          });
        move || drop(timer)
      }
    );
  }

  {
    let just_completed =
      just_completed.clone();
    let highlight_ms = cfg.highlight_ms;
    use_effect_with(
      (*just_completed).clone(),
      move |id| {
        let timer = id.is_some().then(|| {
          Timeout::new(highlight_ms, move || {
            just_completed.set(None);
          })
        });
        move || drop(timer)
      }
    );
  }

  let on_view = {
    let app_state = app_state.clone();
    Callback::from(move |mode: ViewMode| {
      let mut next = *app_state;
      if let Err(err) =
        next.set_view_mode(mode, &BrowserStorage)
      {
        tracing::warn!(
          error = %format!("{err:#}"),
          "could not persist view mode"
        );
      }
      app_state.set(next);
    })
  };

  let on_form_change = {
    let form = form.clone();
    Callback::from(move |next: NewTaskForm| {
      form.set(next);
    })
  };

  let on_create = {
    let form = form.clone();
    let services = services.clone();
    Callback::from(move |_: ()| {
      let body = match form.to_create(&Local) {
        | Ok(body) => body,
        | Err(err) => {
          services.notices.notify(
            Notice::error(format!(
              "Could not create task: {err}"
            ))
          );
          return;
        }
      };
      let gateway = services.gateway();
      let Ok(pending) =
        gateway.begin_create(body, Utc::now())
      else {
        return;
      };
      form.set(NewTaskForm::default());
      ui_debug(
        "action.create",
        pending.temp_id.as_str()
      );
      wasm_bindgen_futures::spawn_local(
        async move {
          // Outcome already reported.
          let _ =
            gateway.finish_create(pending).await;
        }
      );
    })
  };

  let on_edit = {
    let edit = edit.clone();
    Callback::from(move |task: TaskDto| {
      let draft =
        EditDraft::from_task(&task, &Local);
      edit.update(|state| {
        state.apply(EditAction::Start {
          id: task.id.clone(),
          draft
        })
      });
    })
  };

  let on_draft = {
    let edit = edit.clone();
    Callback::from(move |draft: EditDraft| {
      edit.update(|state| {
        state.apply(EditAction::Update(draft))
      });
    })
  };

  let on_cancel = {
    let edit = edit.clone();
    Callback::from(move |_: ()| {
      edit.update(|state| {
        state.apply(EditAction::Cancel)
      });
    })
  };

  let on_save = {
    let edit = edit.clone();
    let services = services.clone();
    Callback::from(move |_: ()| {
      let EditState::Editing {
        id,
        draft,
        saving: false
      } = edit.current()
      else {
        return;
      };
      let body = match draft.to_edit(&Local) {
        | Ok(body) => body,
        | Err(err) => {
          services.notices.notify(
            Notice::error(format!(
              "Could not save task: {err}"
            ))
          );
          return;
        }
      };
      edit.update(|state| {
        state.apply(EditAction::SaveStarted)
      });

      let edit = edit.clone();
      let gateway = services.gateway();
      wasm_bindgen_futures::spawn_local(
        async move {
          let next = match gateway
            .save_edit(&id, &body)
            .await
          {
            | Ok(()) => EditAction::Saved,
            | Err(_) => EditAction::SaveFailed
          };
          edit.update(|state| state.apply(next));
        }
      );
    })
  };

  let on_status = {
    let services = services.clone();
    let just_completed =
      just_completed.clone();
    Callback::from(
      move |(id, status): (TaskId, TaskStatus)| {
        let gateway = services.gateway();
        let just_completed =
          just_completed.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let moved = gateway
              .set_status(&id, status)
              .await
              .is_ok();
            if moved
              && status == TaskStatus::Completed
            {
              just_completed.set(Some(id));
            }
          }
        );
      }
    )
  };

  let on_delete = {
    let services = services.clone();
    Callback::from(move |id: TaskId| {
      let gateway = services.gateway();
      wasm_bindgen_futures::spawn_local(
        async move {
          let _ = gateway
            .delete(&id, confirm_delete)
            .await;
        }
      );
    })
  };

  let on_search = {
    let search_input = search_input.clone();
    let query = query.clone();
    let debouncer = debouncer.clone();
    let search_timer = search_timer.clone();
    Callback::from(move |value: String| {
      search_input.set(value.clone());
      let (ticket, delay) = {
        let mut debouncer =
          debouncer.borrow_mut();
        (debouncer.schedule(value), debouncer.delay_ms())
      };
      let query = query.clone();
      let debouncer = debouncer.clone();
      // Replacing the timer drops and
      // cancels the previous one.
      *search_timer.borrow_mut() =
        Some(Timeout::new(delay, move || {
          if let Some(text) =
            debouncer.borrow_mut().fire(ticket)
          {
            query.set(text);
          }
        }));
    })
  };

  let on_filter = {
    let filter = filter.clone();
    Callback::from(move |key: FilterKey| {
      ui_debug("action.filter", key.as_key());
      filter.set(key);
    })
  };

  let on_dismiss = {
    let notices = notices.clone();
    Callback::from(move |_: ()| {
      let seq = notices.get().seq;
      notices.update(|board| board.clear(seq));
    })
  };

  let tasks = store.get().tasks();
  let stats = TaskStats::collect(tasks);
  let visible =
    filter_tasks(tasks, *filter, &query);
  let view_mode = app_state.view_mode();

  let create_form = html! {
    <CreateForm
      form={(*form).clone()}
      on_change={on_form_change}
      on_submit={on_create}
    />
  };

  let filter_bar = html! {
    <FilterBar
      active={*filter}
      stats={stats}
      search={(*search_input).clone()}
      on_filter={on_filter}
      on_search={on_search}
    />
  };

  let task_list = if *loading {
    html! {
      <div class="empty-state">
        <div class="loading-spinner"></div>
        <h4>{ "Loading tasks..." }</h4>
      </div>
    }
  } else if visible.is_empty() {
    html! {
      <div class="empty-state">
        <div class="empty-state-icon">{ "📝" }</div>
        <h4>{ "No tasks found" }</h4>
        <p>{ filter.empty_message() }</p>
      </div>
    }
  } else {
    let edit_state = edit.get();
    html! {
      <div class="task-grid">
        { for visible.into_iter().map(|task| {
            let editing = edit_state.editing_id() == Some(&task.id);
            let draft = editing.then(|| edit_state.draft().cloned()).flatten();
            let highlighted = (*just_completed).as_ref() == Some(&task.id);
            let key = task.id.to_string();
            html! {
              <TaskCard
                key={key}
                task={task}
                now={*now}
                due_soon_days={cfg.due_soon_days}
                draft={draft}
                saving={editing && edit_state.is_saving()}
                highlighted={highlighted}
                on_edit={on_edit.clone()}
                on_draft={on_draft.clone()}
                on_save={on_save.clone()}
                on_cancel={on_cancel.clone()}
                on_status={on_status.clone()}
                on_delete={on_delete.clone()}
              />
            }
        }) }
      </div>
    }
  };

  let body = match view_mode {
    | ViewMode::Home => html! {
      <>
        <StatsRow stats={stats} />
        { create_form }
        { filter_bar }
        { task_list }
      </>
    },
    | ViewMode::Create => create_form,
    | ViewMode::View => html! {
      <>
        <StatsRow stats={stats} />
        { filter_bar }
        { task_list }
      </>
    }
  };

  html! {
    <div class="modern-container">
      <Header />
      <div class="container">
        <ViewTabs active={view_mode} on_select={on_view} />
        <NoticeBanner
          notice={notices.get().current.clone()}
          on_dismiss={on_dismiss}
        />
        { body }
      </div>
    </div>
  }
}

fn confirm_delete() -> bool {
  web_sys::window()
    .and_then(|window| {
      window
        .confirm_with_message(DELETE_PROMPT)
        .ok()
    })
    .unwrap_or(false)
}

fn ui_debug(event: &str, detail: &str) {
  tracing::debug!(event, detail, "ui-debug");
  log!(format!("[ui-debug] {event}: {detail}"));
}

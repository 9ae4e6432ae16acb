use std::cell::RefCell;
use std::rc::Rc;

use studybuddy_core::{
  MutationGateway,
  Notice,
  Notifier,
  StoreAction,
  StoreSink,
  TaskStore
};
use yew::{
  UseStateHandle,
  hook,
  use_mut_ref,
  use_state
};

use crate::api::HttpApi;

/// State that async continuations
/// update after an await. The cell is
/// always current; the handle drives
/// re-rendering.
pub struct SharedState<T> {
  cell: Rc<RefCell<T>>,
  view: UseStateHandle<T>
}

impl<T> Clone for SharedState<T> {
  fn clone(&self) -> Self {
    Self {
      cell: self.cell.clone(),
      view: self.view.clone()
    }
  }
}

impl<T: Clone + 'static> SharedState<T> {
  /// The snapshot this render sees.
  pub fn get(&self) -> &T {
    &self.view
  }

  /// The latest value, including
  /// updates this render has not
  /// seen yet.
  pub fn current(&self) -> T {
    self.cell.borrow().clone()
  }

  pub fn update<F>(&self, f: F)
  where
    F: FnOnce(&T) -> T
  {
    let next = {
      let current = self.cell.borrow();
      f(&current)
    };
    *self.cell.borrow_mut() = next.clone();
    self.view.set(next);
  }
}

#[hook]
pub fn use_shared<T, F>(
  init: F
) -> SharedState<T>
where
  T: Clone + 'static,
  F: FnOnce() -> T
{
  let cell = use_mut_ref(init);
  let view = {
    let cell = cell.clone();
    use_state(move || cell.borrow().clone())
  };
  SharedState { cell, view }
}

impl StoreSink for SharedState<TaskStore> {
  fn dispatch(&self, action: StoreAction) {
    self.update(|store| store.apply(action));
  }
}

/// The notification currently on
/// screen. `seq` tells a stale
/// auto-clear timer apart from the
/// current one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeBoard {
  pub seq:     u64,
  pub current: Option<Notice>
}

impl NoticeBoard {
  pub fn show(&self, notice: Notice) -> Self {
    Self {
      seq:     self.seq.wrapping_add(1),
      current: Some(notice)
    }
  }

  pub fn clear(&self, seq: u64) -> Self {
    if seq != self.seq {
      return self.clone();
    }
    Self {
      seq:     self.seq,
      current: None
    }
  }
}

impl Notifier for SharedState<NoticeBoard> {
  fn notify(&self, notice: Notice) {
    self.update(|board| board.show(notice));
  }
}

pub type WebGateway = MutationGateway<
  HttpApi,
  SharedState<TaskStore>,
  SharedState<NoticeBoard>
>;

/// Everything a mutation needs,
/// cloned into each callback.
#[derive(Clone)]
pub struct Services {
  pub api:     HttpApi,
  pub store:   SharedState<TaskStore>,
  pub notices: SharedState<NoticeBoard>
}

impl Services {
  pub fn gateway(&self) -> WebGateway {
    MutationGateway::new(
      self.api.clone(),
      self.store.clone(),
      self.notices.clone()
    )
  }
}

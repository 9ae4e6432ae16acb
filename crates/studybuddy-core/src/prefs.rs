use anyhow::Context;
use studybuddy_shared::ViewMode;
use tracing::{
  debug,
  warn
};

pub const VIEW_MODE_STORAGE_KEY: &str =
  "studybuddy.view_mode";

/// A small string key/value store that
/// outlives the session, such as the
/// browser's local storage.
pub trait PreferenceStore {
  fn get(&self, key: &str) -> Option<String>;

  fn set(
    &self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()>;
}

/// Application-wide state that is
/// persisted between sessions.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq,
)]
pub struct AppState {
  view_mode: ViewMode
}

impl AppState {
  /// Reads the stored view mode once.
  /// Anything outside the allowed set
  /// falls back to home.
  pub fn load<P>(prefs: &P) -> Self
  where
    P: PreferenceStore + ?Sized
  {
    let stored =
      prefs.get(VIEW_MODE_STORAGE_KEY);
    let view_mode = match stored.as_deref() {
      | Some(raw) => {
        ViewMode::from_storage(raw)
          .unwrap_or_else(|| {
            warn!(
              stored = raw,
              "ignoring unknown view mode"
            );
            ViewMode::Home
          })
      }
      | None => ViewMode::Home
    };

    debug!(
      view_mode = view_mode.storage_value(),
      "loaded view mode"
    );
    Self { view_mode }
  }

  pub fn view_mode(&self) -> ViewMode {
    self.view_mode
  }

  /// Switches the mode and persists it
  /// only when it actually changes. The
  /// switch holds even if the write
  /// fails.
  pub fn set_view_mode<P>(
    &mut self,
    mode: ViewMode,
    prefs: &P
  ) -> anyhow::Result<()>
  where
    P: PreferenceStore + ?Sized
  {
    if self.view_mode == mode {
      return Ok(());
    }
    self.view_mode = mode;
    prefs
      .set(
        VIEW_MODE_STORAGE_KEY,
        mode.storage_value()
      )
      .with_context(|| {
        format!(
          "failed to store view mode {}",
          mode.storage_value()
        )
      })?;
    debug!(
      view_mode = mode.storage_value(),
      "persisted view mode"
    );
    Ok(())
  }
}

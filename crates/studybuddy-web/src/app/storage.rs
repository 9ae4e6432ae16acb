use anyhow::anyhow;
use studybuddy_core::Config;
use studybuddy_core::prefs::PreferenceStore;

const CONFIG_TOML: &str =
  include_str!("../../studybuddy.toml");

/// `window.localStorage`.
pub struct BrowserStorage;

fn local_storage() -> Option<web_sys::Storage>
{
  web_sys::window().and_then(|window| {
    window
      .local_storage()
      .ok()
      .flatten()
  })
}

impl PreferenceStore for BrowserStorage {
  fn get(&self, key: &str) -> Option<String> {
    local_storage().and_then(|storage| {
      storage
        .get_item(key)
        .ok()
        .flatten()
    })
  }

  fn set(
    &self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    let storage = local_storage()
      .ok_or_else(|| {
        anyhow!("local storage unavailable")
      })?;
    storage.set_item(key, value).map_err(
      |err| {
        anyhow!(
          "failed writing {key}: {err:?}"
        )
      }
    )
  }
}

pub fn load_config() -> Config {
  match Config::from_toml_str(CONFIG_TOML) {
    | Ok(cfg) => {
      tracing::info!(
        api = %cfg.api_base_url,
        due_soon_days = cfg.due_soon_days,
        "loaded frontend config"
      );
      cfg
    }
    | Err(err) => {
      tracing::warn!(
        error = %format!("{err:#}"),
        "invalid embedded config; using defaults"
      );
      Config::default()
    }
  }
}

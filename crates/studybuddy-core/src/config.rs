use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info
};

use crate::urgency::DUE_SOON_DAYS;

pub const API_URL_ENV: &str =
  "STUDYBUDDY_API_URL";

pub const DEFAULT_API_BASE_URL: &str =
  "http://127.0.0.1:8000/api";

/// Client settings shared by the
/// terminal and browser front ends.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Config {
  pub api_base_url:       String,
  pub due_soon_days:      i64,
  pub search_debounce_ms: u32,
  pub tick_interval_ms:   u32,
  pub highlight_ms:       u32,
  pub notice_ms:          u32,
  #[serde(skip)]
  pub loaded_files:       Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_base_url:       DEFAULT_API_BASE_URL
        .to_string(),
      due_soon_days:      DUE_SOON_DAYS,
      search_debounce_ms: 300,
      tick_interval_ms:   60_000,
      highlight_ms:       1_800,
      notice_ms:          3_000,
      loaded_files:       vec![]
    }
  }
}

impl Config {
  /// Defaults, then the config file
  /// (explicit path or the per-user
  /// one when present), then the API
  /// URL from the environment.
  #[tracing::instrument(skip(
    path_override
  ))]
  pub fn load(
    path_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = match resolve_config_path(
      path_override
    ) {
      | Some(path) => {
        info!(config = %path.display(), "loading config file");
        Self::load_file(&path)?
      }
      | None => {
        debug!(
          "no config file found; \
           using defaults"
        );
        Self::default()
      }
    };

    if let Ok(url) =
      std::env::var(API_URL_ENV)
    {
      debug!(url = %url, "api url taken from environment");
      cfg.api_base_url = url;
    }

    cfg.validate()?;
    Ok(cfg)
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let cfg: Config = toml::from_str(text)
      .context(
        "failed to parse config toml"
      )?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let mut cfg = Self::from_toml_str(
      &text
    )
    .with_context(|| {
      format!(
        "invalid config file {}",
        path.display()
      )
    })?;
    cfg.loaded_files.push(path.to_path_buf());
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      match key.trim() {
        | "api_base_url" => {
          self.api_base_url = value
        }
        | "due_soon_days" => {
          self.due_soon_days =
            parse_number(&key, &value)?
        }
        | "search_debounce_ms" => {
          self.search_debounce_ms =
            parse_number(&key, &value)?
        }
        | "tick_interval_ms" => {
          self.tick_interval_ms =
            parse_number(&key, &value)?
        }
        | "highlight_ms" => {
          self.highlight_ms =
            parse_number(&key, &value)?
        }
        | "notice_ms" => {
          self.notice_ms =
            parse_number(&key, &value)?
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }

    self.validate()
  }

  /// Joins the API base with a
  /// resource path, tolerating
  /// slashes on either side.
  pub fn api_url(
    &self,
    path: &str
  ) -> String {
    format!(
      "{}/{}",
      self.api_base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  fn validate(&self) -> anyhow::Result<()> {
    if self.api_base_url.trim().is_empty()
    {
      return Err(anyhow!(
        "api_base_url cannot be empty"
      ));
    }
    if self.due_soon_days < 0 {
      return Err(anyhow!(
        "due_soon_days must not be \
         negative"
      ));
    }
    if self.tick_interval_ms == 0 {
      return Err(anyhow!(
        "tick_interval_ms must be \
         positive"
      ));
    }
    Ok(())
  }
}

fn parse_number<T>(
  key: &str,
  value: &str
) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display
{
  value.trim().parse::<T>().map_err(
    |err| {
      anyhow!(
        "invalid value for {key}: \
         {value} ({err})"
      )
    }
  )
}

fn resolve_config_path(
  path_override: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = path_override {
    return Some(path.to_path_buf());
  }

  let candidate = dirs::config_dir()?
    .join("studybuddy")
    .join("config.toml");
  if candidate.exists() {
    Some(candidate)
  } else {
    debug!(
      candidate = %candidate.display(),
      "per-user config not found"
    );
    None
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tempfile::NamedTempFile;

  use super::*;

  #[test]
  fn file_values_override_defaults() {
    let mut file = NamedTempFile::new()
      .expect("temp config");
    writeln!(
      file,
      "api_base_url = \"https://study.example/api/\"\n\
       due_soon_days = 3"
    )
    .expect("write config");

    let cfg =
      Config::load(Some(file.path()))
        .expect("load config");
    assert_eq!(cfg.due_soon_days, 3);
    assert_eq!(
      cfg.search_debounce_ms,
      300
    );
    assert_eq!(
      cfg.loaded_files,
      vec![file.path().to_path_buf()]
    );
  }

  #[test]
  fn api_url_joins_cleanly() {
    let cfg = Config {
      api_base_url: "http://host/api/"
        .to_string(),
      ..Config::default()
    };
    assert_eq!(
      cfg.api_url("/tasks/"),
      "http://host/api/tasks/"
    );
  }

  #[test]
  fn overrides_are_validated() {
    let mut cfg = Config::default();
    cfg
      .apply_overrides([(
        "highlight_ms".to_string(),
        "900".to_string()
      )])
      .expect("known key");
    assert_eq!(cfg.highlight_ms, 900);

    assert!(
      cfg
        .apply_overrides([(
          "theme".to_string(),
          "night".to_string()
        )])
        .is_err()
    );
    assert!(
      cfg
        .apply_overrides([(
          "due_soon_days".to_string(),
          "soon".to_string()
        )])
        .is_err()
    );
  }

  #[test]
  fn missing_explicit_file_is_an_error()
  {
    let dir = tempfile::tempdir()
      .expect("temp dir");
    let missing =
      dir.path().join("absent.toml");
    assert!(
      Config::load(Some(&missing))
        .is_err()
    );
  }
}

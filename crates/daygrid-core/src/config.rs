use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::error::{
  LayoutError,
  LayoutResult
};
use crate::geometry::{
  DEFAULT_MINUTES_PER_STEP,
  DEFAULT_PIXELS_PER_STEP,
  TimeGeometry
};
use crate::model::MINUTES_PER_DAY;
use crate::window::WindowPolicy;

const CONFIG_FILE: &str = "daygrid.toml";
const HOME_CONFIG_FILE: &str =
  ".daygrid.toml";
const CONFIG_ENV_VAR: &str =
  "DAYGRID_CONFIG";
const MAX_PADDING_MINUTES: u32 = 720;

#[derive(
  Debug, Clone, PartialEq, Deserialize,
)]
pub struct GridConfig {
  #[serde(
    default = "default_minutes_per_step"
  )]
  pub minutes_per_step: u32,
  #[serde(
    default = "default_pixels_per_step"
  )]
  pub pixels_per_step:  u32
}

impl Default for GridConfig {
  fn default() -> Self {
    Self {
      minutes_per_step:
        default_minutes_per_step(),
      pixels_per_step:
        default_pixels_per_step()
    }
  }
}

fn default_minutes_per_step() -> u32 {
  DEFAULT_MINUTES_PER_STEP
}

fn default_pixels_per_step() -> u32 {
  DEFAULT_PIXELS_PER_STEP
}

#[derive(
  Debug, Clone, Default, PartialEq, Deserialize,
)]
pub struct LayoutConfig {
  #[serde(default)]
  pub timezone: Option<String>,
  #[serde(default)]
  pub window:   WindowPolicy,
  #[serde(default)]
  pub grid:     GridConfig,
  #[serde(skip)]
  pub source:   Option<PathBuf>
}

impl LayoutConfig {
  /// Loads the first config file found, or the defaults when there is
  /// none. A file that exists but does not parse is an error.
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(config_override)
    else {
      debug!(
        "no config file found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    if !path.exists() {
      if config_override.is_some() {
        anyhow::bail!(
          "config file {} does not exist",
          path.display()
        );
      }
      warn!(file = %path.display(), "config file missing; using defaults");
      return Ok(Self::default());
    }

    info!(file = %path.display(), "loading layout config");
    let raw = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let mut cfg = Self::parse(&raw)
      .with_context(|| {
        format!(
          "failed to parse {}",
          path.display()
        )
      })?;
    cfg.source = Some(path);
    Ok(cfg)
  }

  pub fn parse(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut cfg =
      toml::from_str::<LayoutConfig>(raw)?;
    cfg.sanitize();
    Ok(cfg)
  }

  /// Pulls out-of-range values back to something drawable.
  pub fn sanitize(&mut self) {
    if self.grid.minutes_per_step == 0
      || self.grid.minutes_per_step
        > MINUTES_PER_DAY
    {
      warn!(
        value = self.grid.minutes_per_step,
        "unusable grid.minutes_per_step; \
         using default"
      );
      self.grid.minutes_per_step =
        default_minutes_per_step();
    }

    if self.grid.pixels_per_step == 0 {
      warn!(
        "grid.pixels_per_step was zero; \
         using default"
      );
      self.grid.pixels_per_step =
        default_pixels_per_step();
    }

    if self.window.padding_minutes
      > MAX_PADDING_MINUTES
    {
      self.window.padding_minutes =
        MAX_PADDING_MINUTES;
    }

    self.window.min_minutes = self
      .window
      .min_minutes
      .clamp(
        self.grid.minutes_per_step,
        MINUTES_PER_DAY
      );

    if self
      .timezone
      .as_deref()
      .is_some_and(|tz| tz.trim().is_empty())
    {
      self.timezone = None;
    }
  }

  /// Applies `key=value` overrides, e.g. `grid.minutes_per_step=15`.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> LayoutResult<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      let invalid = |reason: &str| {
        LayoutError::InvalidOverride {
          key:    key.clone(),
          value:  value.clone(),
          reason: reason.to_string()
        }
      };
      let number = || {
        value
          .trim()
          .parse::<u32>()
          .map_err(|_| {
            invalid("expected a whole number")
          })
      };
      match key.trim() {
        | "timezone" => {
          self.timezone =
            Some(value.trim().to_string());
        }
        | "window.padding_minutes" => {
          self.window.padding_minutes =
            number()?;
        }
        | "window.min_minutes" => {
          self.window.min_minutes =
            number()?;
        }
        | "grid.minutes_per_step" => {
          self.grid.minutes_per_step =
            number()?;
        }
        | "grid.pixels_per_step" => {
          self.grid.pixels_per_step =
            number()?;
        }
        | _ => {
          return Err(invalid("unknown key"));
        }
      }
    }
    self.sanitize();
    Ok(())
  }

  #[must_use]
  pub fn geometry(&self) -> TimeGeometry {
    TimeGeometry::new(
      self.grid.minutes_per_step,
      self.grid.pixels_per_step
    )
  }

  #[must_use]
  pub fn window_policy(
    &self
  ) -> WindowPolicy {
    self.window
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(expand_tilde(path));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(expand_tilde(
        Path::new(trimmed)
      ));
    }
  }

  if let Ok(dir) = std::env::current_dir() {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.exists() {
      return Some(candidate);
    }
  }

  dirs::home_dir()
    .map(|home| home.join(HOME_CONFIG_FILE))
    .filter(|candidate| candidate.exists())
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

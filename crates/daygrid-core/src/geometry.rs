//! Minute to pixel conversion on a fixed, quantized vertical grid.

use serde::Serialize;

use crate::model::{
  MINUTES_PER_DAY,
  Window
};

pub const DEFAULT_MINUTES_PER_STEP: u32 =
  5;
pub const DEFAULT_PIXELS_PER_STEP: u32 =
  25;

/// Largest multiple of `step` that is `<= minutes`.
#[must_use]
pub fn snap_down(
  minutes: u32,
  step: u32
) -> u32 {
  let step = step.max(1);
  minutes - minutes % step
}

/// Smallest multiple of `step` that is `>= minutes`.
#[must_use]
pub fn snap_up(
  minutes: u32,
  step: u32
) -> u32 {
  let step = step.max(1);
  minutes
    .div_ceil(step)
    .saturating_mul(step)
}

/// Nearest multiple of `step`; halfway rounds up.
#[must_use]
pub fn snap_to_step(
  minutes: u32,
  step: u32
) -> u32 {
  let step = step.max(1);
  let down = snap_down(minutes, step);
  if u64::from(minutes - down) * 2
    >= u64::from(step)
  {
    down.saturating_add(step)
  } else {
    down
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGeometry {
  minutes_per_step: u32,
  pixels_per_step:  u32
}

#[derive(
  Debug, Clone, PartialEq, Serialize,
)]
pub struct HourLine {
  pub hour:   u32,
  pub minute: u32,
  pub top_px: f64,
  pub label:  String
}

impl Default for TimeGeometry {
  fn default() -> Self {
    Self {
      minutes_per_step:
        DEFAULT_MINUTES_PER_STEP,
      pixels_per_step:
        DEFAULT_PIXELS_PER_STEP
    }
  }
}

impl TimeGeometry {
  /// Zero values fall back to the defaults; a step never exceeds one day.
  #[must_use]
  pub fn new(
    minutes_per_step: u32,
    pixels_per_step: u32
  ) -> Self {
    let defaults = Self::default();
    let or_default =
      |value: u32, fallback: u32| {
        if value == 0 { fallback } else { value }
      };
    Self {
      minutes_per_step: or_default(
        minutes_per_step,
        defaults.minutes_per_step
      )
      .min(MINUTES_PER_DAY),
      pixels_per_step:  or_default(
        pixels_per_step,
        defaults.pixels_per_step
      )
    }
  }

  #[must_use]
  pub fn minutes_per_step(&self) -> u32 {
    self.minutes_per_step
  }

  #[must_use]
  pub fn pixels_per_step(&self) -> u32 {
    self.pixels_per_step
  }

  #[must_use]
  pub fn px_per_minute(&self) -> f64 {
    f64::from(self.pixels_per_step)
      / f64::from(self.minutes_per_step)
  }

  #[must_use]
  pub fn snap_down(
    &self,
    minutes: u32
  ) -> u32 {
    snap_down(
      minutes,
      self.minutes_per_step
    )
  }

  #[must_use]
  pub fn snap_up(
    &self,
    minutes: u32
  ) -> u32 {
    snap_up(minutes, self.minutes_per_step)
  }

  #[must_use]
  pub fn snap_to_step(
    &self,
    minutes: u32
  ) -> u32 {
    snap_to_step(
      minutes,
      self.minutes_per_step
    )
  }

  #[must_use]
  pub fn window_height_px(
    &self,
    window: Window
  ) -> f64 {
    self.duration_px(window.len_minutes())
  }

  #[must_use]
  pub fn duration_px(
    &self,
    minutes: u32
  ) -> f64 {
    f64::from(minutes)
      / f64::from(self.minutes_per_step)
      * f64::from(self.pixels_per_step)
  }

  /// Offset from the top of the window. Minutes before the window start
  /// give a negative offset.
  #[must_use]
  pub fn minutes_to_px(
    &self,
    minutes: u32,
    window: Window
  ) -> f64 {
    (f64::from(minutes)
      - f64::from(window.start()))
      / f64::from(self.minutes_per_step)
      * f64::from(self.pixels_per_step)
  }

  /// Inverse of [`Self::minutes_to_px`], snapped to the nearest step and
  /// clamped into the window. Handy for hit-testing a click.
  #[must_use]
  pub fn px_to_minutes(
    &self,
    px: f64,
    window: Window
  ) -> u32 {
    let offset = (px / self.px_per_minute())
      .round()
      .max(0.0);
    let raw = f64::from(window.start())
      + offset;
    let raw = raw
      .min(f64::from(window.end()))
      as u32;
    window.clamp(self.snap_to_step(raw))
  }

  /// One line per whole hour inside the window, both edges included.
  #[must_use]
  pub fn hour_lines(
    &self,
    window: Window
  ) -> Vec<HourLine> {
    let first =
      snap_up(window.start(), 60) / 60;
    let last = window.end() / 60;
    (first..=last)
      .map(|hour| {
        let minute = hour * 60;
        HourLine {
          hour,
          minute,
          top_px: self
            .minutes_to_px(minute, window),
          label: format!("{hour:02}:00")
        }
      })
      .collect()
  }
}

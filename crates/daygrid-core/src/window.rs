//! Picks the visible slice of the day from the events being shown.

use serde::Deserialize;
use tracing::{
  debug,
  trace
};

use crate::model::{
  Event,
  MINUTES_PER_DAY,
  TimeInterval,
  Window
};

pub const DEFAULT_PADDING_MINUTES: u32 =
  30;
pub const DEFAULT_MIN_WINDOW_MINUTES: u32 =
  120;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Deserialize,
)]
#[serde(default)]
pub struct WindowPolicy {
  pub padding_minutes: u32,
  pub min_minutes:     u32
}

impl Default for WindowPolicy {
  fn default() -> Self {
    Self {
      padding_minutes:
        DEFAULT_PADDING_MINUTES,
      min_minutes:
        DEFAULT_MIN_WINDOW_MINUTES
    }
  }
}

/// Window with the default padding and fallback length.
#[must_use]
pub fn compute_window<I>(
  intervals: I
) -> Window
where
  I: IntoIterator<Item = TimeInterval>
{
  WindowPolicy::default()
    .compute(intervals)
}

#[must_use]
pub fn compute_window_for_events<P>(
  events: &[Event<P>],
  policy: &WindowPolicy
) -> Window {
  policy.compute(
    events.iter().map(|e| e.interval)
  )
}

impl WindowPolicy {
  /// Unpadded `(min start, max end)` over the intervals, or `None` when
  /// there are none.
  #[must_use]
  pub fn bounds<I>(
    intervals: I
  ) -> Option<(u32, u32)>
  where
    I: IntoIterator<Item = TimeInterval>
  {
    intervals.into_iter().fold(
      None,
      |acc, interval| {
        let start = interval.start_minute();
        let end = interval.end_minute();
        Some(match acc {
          | None => (start, end),
          | Some((lo, hi)) => {
            (lo.min(start), hi.max(end))
          }
        })
      }
    )
  }

  #[tracing::instrument(
    level = "debug",
    skip(self, intervals)
  )]
  pub fn compute<I>(
    &self,
    intervals: I
  ) -> Window
  where
    I: IntoIterator<Item = TimeInterval>
  {
    let Some((min_start, max_end)) =
      Self::bounds(intervals)
    else {
      debug!(
        "no events; showing the full day"
      );
      return Window::FULL_DAY;
    };

    let start = min_start
      .saturating_sub(self.padding_minutes);
    let end = max_end
      .saturating_add(self.padding_minutes)
      .min(MINUTES_PER_DAY);
    trace!(
      min_start,
      max_end,
      start,
      end,
      "padded event bounds"
    );

    if let Ok(window) =
      Window::new(start, end)
    {
      debug!(
        start = window.start(),
        end = window.end(),
        "computed window"
      );
      return window;
    }

    let start = start.min(MINUTES_PER_DAY - 1);
    let end = start
      .saturating_add(self.min_minutes.max(1))
      .min(MINUTES_PER_DAY);
    debug!(
      start,
      end,
      "degenerate event bounds; using \
       minimum window"
    );
    Window::new(start, end)
      .unwrap_or(Window::FULL_DAY)
  }
}

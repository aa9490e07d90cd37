use chrono::{
  NaiveDate,
  NaiveDateTime
};
use tracing::trace;

use crate::geometry::TimeGeometry;
use crate::model::{
  Window,
  minutes_since_midnight
};

/// Pixel offset of the "now" marker, or `None` when `now` is on a
/// different day than the one displayed.
///
/// A `now` outside the window is pinned to the bottom edge rather than
/// hidden.
#[must_use]
pub fn now_indicator_px(
  now: NaiveDateTime,
  day: NaiveDate,
  window: Window
) -> Option<f64> {
  now_indicator_px_with(
    now,
    day,
    window,
    &TimeGeometry::default()
  )
}

#[must_use]
pub fn now_indicator_px_with(
  now: NaiveDateTime,
  day: NaiveDate,
  window: Window,
  geometry: &TimeGeometry
) -> Option<f64> {
  if now.date() != day {
    trace!(%now, %day, "now is on another day");
    return None;
  }

  let mut minutes =
    minutes_since_midnight(now);
  if !window.contains(minutes) {
    trace!(
      minutes,
      end = window.end(),
      "now outside window; pinning to end"
    );
    minutes = window.end();
  }

  let snapped = geometry
    .snap_down(minutes)
    .max(window.start());
  Some(geometry.minutes_to_px(snapped, window))
}

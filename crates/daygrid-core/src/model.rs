use chrono::{
  NaiveDateTime,
  Timelike
};
use uuid::Uuid;

use crate::error::{
  LayoutError,
  LayoutResult
};

pub const MINUTES_PER_DAY: u32 = 1440;

/// Minutes elapsed since local midnight, always in `[0, 1440)`.
#[must_use]
pub fn minutes_since_midnight(
  instant: NaiveDateTime
) -> u32 {
  instant.hour() * 60 + instant.minute()
}

/// Like [`minutes_since_midnight`], but an instant sitting exactly on
/// midnight reads as the end of the day (1440) instead of its start.
#[must_use]
pub fn end_minutes_since_midnight(
  instant: NaiveDateTime
) -> u32 {
  match minutes_since_midnight(instant)
  {
    | 0 => MINUTES_PER_DAY,
    | minutes => minutes
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct TimeInterval {
  pub start: NaiveDateTime,
  pub end:   NaiveDateTime
}

impl TimeInterval {
  #[must_use]
  pub fn new(
    start: NaiveDateTime,
    end: NaiveDateTime
  ) -> Self {
    Self { start, end }
  }

  #[must_use]
  pub fn start_minute(&self) -> u32 {
    minutes_since_midnight(self.start)
  }

  /// End minute with the midnight sentinel applied.
  #[must_use]
  pub fn end_minute(&self) -> u32 {
    end_minutes_since_midnight(self.end)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event<P> {
  pub id:       Uuid,
  pub interval: TimeInterval,
  pub payload:  P
}

impl<P> Event<P> {
  pub fn new(
    id: Uuid,
    interval: TimeInterval,
    payload: P
  ) -> Self {
    Self {
      id,
      interval,
      payload
    }
  }
}

/// The rendered sub-range of one day, in minutes since midnight.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub struct Window {
  start: u32,
  end:   u32
}

impl Window {
  pub const FULL_DAY: Window = Window {
    start: 0,
    end:   MINUTES_PER_DAY
  };

  pub fn new(
    start: u32,
    end: u32
  ) -> LayoutResult<Self> {
    if start >= end
      || end > MINUTES_PER_DAY
    {
      return Err(
        LayoutError::InvalidWindow {
          start,
          end
        }
      );
    }
    Ok(Self { start, end })
  }

  #[must_use]
  pub fn start(&self) -> u32 {
    self.start
  }

  #[must_use]
  pub fn end(&self) -> u32 {
    self.end
  }

  #[must_use]
  pub fn len_minutes(&self) -> u32 {
    self.end - self.start
  }

  #[must_use]
  pub fn contains(
    &self,
    minutes: u32
  ) -> bool {
    (self.start..=self.end)
      .contains(&minutes)
  }

  #[must_use]
  pub fn clamp(
    &self,
    minutes: u32
  ) -> u32 {
    minutes.clamp(self.start, self.end)
  }
}

impl Default for Window {
  fn default() -> Self {
    Self::FULL_DAY
  }
}

/// One input event plus the geometry it should be painted with.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutEvent<'a, P> {
  pub event:         &'a Event<P>,
  /// Start minute after clamping into the window.
  pub clamped_start: u32,
  /// End minute after clamping; overlap and clustering use this span.
  pub clamped_end:   u32,
  /// Snapped start minute the box was placed with.
  pub start_minute:  u32,
  /// Snapped end minute the box was placed with.
  pub end_minute:    u32,
  pub top_px:        f64,
  pub height_px:     f64,
  pub column_index:  usize,
  pub columns_count: usize,
  /// Ordinal of the overlap cluster, in chronological order.
  pub cluster:       usize
}

impl<P> LaidOutEvent<'_, P> {
  /// Whether the clamped spans intersect. Touching spans do not.
  #[must_use]
  pub fn overlaps(
    &self,
    other: &Self
  ) -> bool {
    self.clamped_start < other.clamped_end
      && other.clamped_start
        < self.clamped_end
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn at(
    day: u32,
    hour: u32,
    minute: u32
  ) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(
      2026, 3, day
    )
    .and_then(|d| {
      d.and_hms_opt(hour, minute, 0)
    })
    .expect("valid instant")
  }

  #[test]
  fn midnight_end_reads_as_end_of_day()
  {
    let interval = TimeInterval::new(
      at(2, 23, 0),
      at(3, 0, 0)
    );
    assert_eq!(
      interval.start_minute(),
      1380
    );
    assert_eq!(interval.end_minute(), 1440);
  }

  #[test]
  fn minutes_ignore_seconds() {
    let instant = at(2, 9, 41)
      .with_second(59)
      .expect("seconds");
    assert_eq!(
      minutes_since_midnight(instant),
      581
    );
  }

  #[test]
  fn window_rejects_inverted_or_oversized_bounds()
  {
    assert!(Window::new(600, 600).is_err());
    assert!(Window::new(700, 600).is_err());
    assert_eq!(
      Window::new(0, 1441),
      Err(LayoutError::InvalidWindow {
        start: 0,
        end:   1441
      })
    );
    let window = Window::new(570, 690)
      .expect("valid window");
    assert_eq!(window.len_minutes(), 120);
    assert!(window.contains(690));
    assert_eq!(window.clamp(10), 570);
  }
}

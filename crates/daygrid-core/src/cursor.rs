//! Which day is on screen, and which events belong to it.
//!
//! The engine keeps no navigation state: callers hold a [`DayCursor`] and
//! pass the day it points at into every call.

use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  NaiveDateTime,
  Weekday
};
use tracing::trace;

use crate::model::{
  Event,
  TimeInterval
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
)]
pub struct DayCursor {
  day: NaiveDate
}

impl DayCursor {
  #[must_use]
  pub fn new(day: NaiveDate) -> Self {
    Self { day }
  }

  #[must_use]
  pub fn today(now: NaiveDateTime) -> Self {
    Self { day: now.date() }
  }

  #[must_use]
  pub fn day(&self) -> NaiveDate {
    self.day
  }

  /// Moves by `days`; saturates at chrono's representable range.
  #[must_use]
  pub fn shift_days(
    &self,
    days: i64
  ) -> Self {
    let day = self
      .day
      .checked_add_signed(Duration::days(
        days
      ))
      .unwrap_or(self.day);
    Self { day }
  }

  #[must_use]
  pub fn next_day(&self) -> Self {
    self.shift_days(1)
  }

  #[must_use]
  pub fn prev_day(&self) -> Self {
    self.shift_days(-1)
  }

  #[must_use]
  pub fn next_week(&self) -> Self {
    self.shift_days(7)
  }

  #[must_use]
  pub fn prev_week(&self) -> Self {
    self.shift_days(-7)
  }

  /// First day of the week containing the cursor.
  #[must_use]
  pub fn week_start(
    &self,
    first: Weekday
  ) -> NaiveDate {
    let back = (7
      + self.day.weekday().num_days_from_monday()
      - first.num_days_from_monday())
      % 7;
    self.day - Duration::days(i64::from(back))
  }

  #[must_use]
  pub fn day_start(&self) -> NaiveDateTime {
    self.day.and_time(chrono::NaiveTime::MIN)
  }

  /// Midnight that closes the day, i.e. the start of the next one.
  #[must_use]
  pub fn day_end(&self) -> NaiveDateTime {
    self.day_start() + Duration::days(1)
  }

  #[must_use]
  pub fn contains(
    &self,
    instant: NaiveDateTime
  ) -> bool {
    instant.date() == self.day
  }
}

/// Clips an interval to one calendar day.
///
/// Anything running past midnight is cut at the next midnight, which the
/// layout reads as minute 1440. Intervals that never touch the day give
/// `None`. A malformed interval (`end < start`) is kept as long as it
/// starts on the day.
#[must_use]
pub fn slice_to_day(
  interval: TimeInterval,
  day: NaiveDate
) -> Option<TimeInterval> {
  let cursor = DayCursor::new(day);
  let day_start = cursor.day_start();
  let day_end = cursor.day_end();

  if cursor.contains(interval.start) {
    return Some(TimeInterval::new(
      interval.start,
      interval.end.min(day_end)
    ));
  }

  if interval.start < day_start
    && interval.end > day_start
  {
    return Some(TimeInterval::new(
      day_start,
      interval.end.min(day_end)
    ));
  }

  None
}

/// The events that touch `day`, each sliced to it. Payloads are borrowed,
/// input order is kept.
#[must_use]
pub fn events_for_day<P>(
  events: &[Event<P>],
  day: NaiveDate
) -> Vec<Event<&P>> {
  let sliced = events
    .iter()
    .filter_map(|event| {
      slice_to_day(event.interval, day).map(
        |interval| {
          Event::new(
            event.id,
            interval,
            &event.payload
          )
        }
      )
    })
    .collect::<Vec<_>>();
  trace!(
    %day,
    total = events.len(),
    kept = sliced.len(),
    "filtered events to day"
  );
  sliced
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day)
      .expect("valid day")
  }

  fn at(
    day: u32,
    hour: u32,
    minute: u32
  ) -> NaiveDateTime {
    date(day)
      .and_hms_opt(hour, minute, 0)
      .expect("valid instant")
  }

  #[test]
  fn cursor_moves_by_days_and_weeks() {
    let cursor = DayCursor::new(date(2));
    assert_eq!(cursor.next_day().day(), date(3));
    assert_eq!(
      cursor.prev_day().day(),
      date(1)
    );
    assert_eq!(
      cursor.next_week().day(),
      date(9)
    );
    assert_eq!(
      cursor.prev_week().prev_day().day(),
      NaiveDate::from_ymd_opt(2026, 2, 22)
        .expect("valid day")
    );
  }

  #[test]
  fn week_start_respects_first_weekday() {
    // 2026-03-04 is a Wednesday
    let cursor = DayCursor::new(date(4));
    assert_eq!(
      cursor.week_start(Weekday::Mon),
      date(2)
    );
    assert_eq!(
      cursor.week_start(Weekday::Sun),
      date(1)
    );
    assert_eq!(
      cursor.week_start(Weekday::Wed),
      date(4)
    );
  }

  #[test]
  fn slicing_cuts_overnight_events_at_midnight()
  {
    let overnight = TimeInterval::new(
      at(2, 22, 0),
      at(3, 2, 0)
    );
    assert_eq!(
      slice_to_day(overnight, date(2)),
      Some(TimeInterval::new(
        at(2, 22, 0),
        at(3, 0, 0)
      ))
    );
    assert_eq!(
      slice_to_day(overnight, date(3)),
      Some(TimeInterval::new(
        at(3, 0, 0),
        at(3, 2, 0)
      ))
    );
    assert_eq!(
      slice_to_day(overnight, date(4)),
      None
    );
  }

  #[test]
  fn event_ending_at_midnight_does_not_leak_into_next_day()
  {
    let evening = TimeInterval::new(
      at(2, 20, 0),
      at(3, 0, 0)
    );
    assert_eq!(
      slice_to_day(evening, date(3)),
      None
    );
  }

  #[test]
  fn events_for_day_borrows_payloads() {
    let events = vec![
      Event::new(
        Uuid::new_v4(),
        TimeInterval::new(
          at(2, 9, 0),
          at(2, 10, 0)
        ),
        "checkup".to_string()
      ),
      Event::new(
        Uuid::new_v4(),
        TimeInterval::new(
          at(3, 9, 0),
          at(3, 10, 0)
        ),
        "surgery".to_string()
      ),
    ];
    let today = events_for_day(&events, date(2));
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].payload, "checkup");
    assert_eq!(today[0].id, events[0].id);
  }
}

use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;

use crate::error::{
  LayoutError,
  LayoutResult
};
use crate::model::{
  MINUTES_PER_DAY,
  Window
};

const TIMEZONE_ENV_VAR: &str =
  "DAYGRID_TIMEZONE";

const INSTANT_FORMATS: [&str; 3] = [
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M"
];

/// Picks the zone used to turn the system clock into wall-clock time:
/// the configured name, then `DAYGRID_TIMEZONE`, then UTC.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  tracing::debug!(
    "no timezone configured; using UTC"
  );
  chrono_tz::UTC
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "resolved timezone"
      );
      Some(tz)
    }
    | Err(error) => {
      tracing::warn!(
        source,
        timezone = %trimmed,
        %error,
        "invalid timezone; ignoring"
      );
      None
    }
  }
}

/// Wall-clock "now" in `tz`.
#[must_use]
pub fn local_now(tz: &Tz) -> NaiveDateTime {
  to_local(Utc::now(), tz)
}

#[must_use]
pub fn to_local(
  instant: DateTime<Utc>,
  tz: &Tz
) -> NaiveDateTime {
  instant.with_timezone(tz).naive_local()
}

pub fn parse_day(
  raw: &str
) -> LayoutResult<NaiveDate> {
  NaiveDate::parse_from_str(
    raw.trim(),
    "%Y-%m-%d"
  )
  .map_err(|_| {
    LayoutError::InvalidDate(
      raw.to_string()
    )
  })
}

/// Parses a local wall-clock instant such as `2026-03-02T09:30`.
pub fn parse_instant(
  raw: &str
) -> LayoutResult<NaiveDateTime> {
  let trimmed = raw.trim();
  INSTANT_FORMATS
    .iter()
    .find_map(|format| {
      NaiveDateTime::parse_from_str(
        trimmed, format
      )
      .ok()
    })
    .ok_or_else(|| {
      LayoutError::InvalidDate(
        raw.to_string()
      )
    })
}

/// `HH:MM` to minutes since midnight. `24:00` is accepted and means the
/// end of the day.
pub fn parse_clock(
  raw: &str
) -> LayoutResult<u32> {
  let trimmed = raw.trim();
  let invalid = || {
    LayoutError::InvalidClock(
      trimmed.to_string()
    )
  };
  let clock_re = Regex::new(
    r"^(?P<hour>\d{1,2}):(?P<minute>\d{2})$"
  )
  .map_err(|_| invalid())?;
  let caps = clock_re
    .captures(trimmed)
    .ok_or_else(invalid)?;
  let hour = caps["hour"]
    .parse::<u32>()
    .map_err(|_| invalid())?;
  let minute = caps["minute"]
    .parse::<u32>()
    .map_err(|_| invalid())?;
  if minute >= 60 {
    return Err(invalid());
  }
  let total = hour * 60 + minute;
  if total > MINUTES_PER_DAY {
    return Err(invalid());
  }
  Ok(total)
}

/// `HH:MM-HH:MM` to a [`Window`].
pub fn parse_window(
  raw: &str
) -> LayoutResult<Window> {
  let (start, end) = raw
    .split_once('-')
    .ok_or_else(|| {
      LayoutError::InvalidWindowText(
        raw.to_string()
      )
    })?;
  let start = parse_clock(start)?;
  let end = parse_clock(end)?;
  Window::new(start, end)
}

#[must_use]
pub fn format_minutes(
  minutes: u32
) -> String {
  format!(
    "{:02}:{:02}",
    minutes / 60,
    minutes % 60
  )
}

#[must_use]
pub fn format_window(
  window: Window
) -> String {
  format!(
    "{}-{}",
    format_minutes(window.start()),
    format_minutes(window.end())
  )
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn parses_clock_times() {
    assert_eq!(parse_clock("09:30"), Ok(570));
    assert_eq!(parse_clock("7:05"), Ok(425));
    assert_eq!(parse_clock("24:00"), Ok(1440));
    assert!(parse_clock("24:01").is_err());
    assert!(parse_clock("10:60").is_err());
    assert!(parse_clock("noon").is_err());
  }

  #[test]
  fn parses_and_formats_windows() {
    let window = parse_window("08:00-21:00")
      .expect("parse window");
    assert_eq!(window.start(), 480);
    assert_eq!(window.end(), 1260);
    assert_eq!(
      format_window(window),
      "08:00-21:00"
    );
    assert!(matches!(
      parse_window("21:00-08:00"),
      Err(LayoutError::InvalidWindow { .. })
    ));
    assert!(matches!(
      parse_window("0800"),
      Err(LayoutError::InvalidWindowText(_))
    ));
  }

  #[test]
  fn parses_instants_with_or_without_seconds()
  {
    let short = parse_instant(
      "2026-03-02T09:30"
    )
    .expect("short form");
    let long = parse_instant(
      "2026-03-02T09:30:00"
    )
    .expect("long form");
    assert_eq!(short, long);
    assert!(parse_instant("yesterday").is_err());
  }

  #[test]
  fn converts_utc_to_wall_clock() {
    let instant = Utc
      .with_ymd_and_hms(2026, 1, 15, 18, 0, 0)
      .single()
      .expect("valid instant");
    let tz: Tz = "America/Mexico_City"
      .parse()
      .expect("valid zone");
    assert_eq!(
      to_local(instant, &tz)
        .format("%H:%M")
        .to_string(),
      "12:00"
    );
  }

  #[test]
  fn configured_timezone_wins() {
    assert_eq!(
      resolve_timezone(Some("Europe/Madrid")),
      chrono_tz::Europe::Madrid
    );
  }
}

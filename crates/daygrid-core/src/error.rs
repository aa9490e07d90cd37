use thiserror::Error;

pub type LayoutResult<T> =
  Result<T, LayoutError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
  #[error(
    "invalid window: start={start}, \
     end={end} (need start < end <= \
     1440)"
  )]
  InvalidWindow { start: u32, end: u32 },

  #[error("invalid clock time: {0}")]
  InvalidClock(String),

  #[error("invalid window text: {0}")]
  InvalidWindowText(String),

  #[error("invalid date: {0}")]
  InvalidDate(String),

  #[error(
    "invalid config override \
     {key}={value}: {reason}"
  )]
  InvalidOverride {
    key:    String,
    value:  String,
    reason: String
  }
}

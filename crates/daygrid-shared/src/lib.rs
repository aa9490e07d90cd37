//! Wire types exchanged between the day-view engine and whatever paints it.
//!
//! Times travel as local wall-clock strings (`YYYY-MM-DDTHH:MM[:SS]`); the
//! engine parses them, nothing here does.

use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct EventDto {
  #[serde(default)]
  pub id:    Option<Uuid>,
  #[serde(default)]
  pub title: String,
  pub start: String,
  pub end:   String
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct WindowDto {
  pub start: u32,
  pub end:   u32
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct LaidOutEventDto {
  pub id:            Uuid,
  pub title:         String,
  pub start_minute:  u32,
  pub end_minute:    u32,
  pub top_px:        f64,
  pub height_px:     f64,
  pub column_index:  usize,
  pub columns_count: usize
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct DayLayoutDto {
  pub day:       String,
  pub window:    WindowDto,
  pub height_px: f64,
  pub now_px:    Option<f64>,
  pub events:    Vec<LaidOutEventDto>
}

impl LaidOutEventDto {
  /// Horizontal placement as fractions of the day column width:
  /// `(left, width)`.
  #[must_use]
  pub fn horizontal_fraction(
    &self
  ) -> (f64, f64) {
    let count =
      self.columns_count.max(1) as f64;
    (
      self.column_index as f64 / count,
      1.0 / count
    )
  }
}

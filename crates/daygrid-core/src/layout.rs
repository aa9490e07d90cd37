//! Column and cluster assignment for overlapping events in a day column.
//!
//! Events are clamped into the window and swept in start order; snapping
//! to the grid only shapes the painted box. Each event takes the lowest column not held by an event
//! that is still running (first fit). A cluster closes whenever the sweep
//! finds nothing running, and every member of a cluster is told how many
//! columns the cluster ended up using so siblings share the width evenly.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{
  debug,
  trace,
  warn
};

use crate::geometry::TimeGeometry;
use crate::model::{
  Event,
  LaidOutEvent,
  Window
};

/// Half-open minute span `[start, end)`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct Span {
  pub start: u32,
  pub end:   u32
}

/// Where one event sits before any column is chosen: `clamped` drives
/// overlap and clustering, `snapped` is the box that gets painted.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct Placement {
  pub clamped: Span,
  pub snapped: Span
}

/// Clamps the event into the window and snaps it to the grid. The snapped
/// box is never empty.
#[must_use]
pub fn placement_span<P>(
  event: &Event<P>,
  window: Window,
  geometry: &TimeGeometry
) -> Placement {
  let step = geometry.minutes_per_step();
  let raw_start =
    event.interval.start_minute();
  let raw_end = event.interval.end_minute();

  let start = window.clamp(raw_start);
  let mut end = window.clamp(raw_end);
  if end <= start {
    if raw_end < raw_start {
      warn!(
        id = %event.id,
        raw_start,
        raw_end,
        "event ends before it starts; \
         drawing a single step"
      );
    }
    end = start
      .saturating_add(step)
      .min(window.end());
  }

  // snapped start stays below the window end and never reorders events
  let snapped_start = geometry
    .snap_down(start.min(window.end() - 1))
    .max(window.start());
  let mut snapped_end = geometry
    .snap_up(end)
    .min(window.end());
  if snapped_end <= snapped_start {
    snapped_end = snapped_start
      .saturating_add(step)
      .min(window.end());
  }

  Placement {
    clamped: Span { start, end },
    snapped: Span {
      start: snapped_start,
      end:   snapped_end
    }
  }
}

/// First-fit column allocator for one cluster at a time.
#[derive(Debug, Default)]
struct ColumnSweep {
  /// Running events as `(end, column)`, earliest end on top.
  active:      BinaryHeap<Reverse<(u32, usize)>>,
  /// Columns released while their cluster is still open.
  free:        BinaryHeap<Reverse<usize>>,
  next_column: usize
}

impl ColumnSweep {
  /// Releases every column whose event ended at or before `start`.
  /// Returns `true` when nothing is left running.
  fn release_until(
    &mut self,
    start: u32
  ) -> bool {
    while let Some(Reverse((end, column))) =
      self.active.peek().copied()
    {
      if end > start {
        break;
      }
      self.active.pop();
      self.free.push(Reverse(column));
    }

    if self.active.is_empty() {
      self.free.clear();
      self.next_column = 0;
      true
    } else {
      false
    }
  }

  fn claim(&mut self, end: u32) -> usize {
    let column = match self.free.pop() {
      | Some(Reverse(column)) => column,
      | None => {
        let column = self.next_column;
        self.next_column += 1;
        column
      }
    };
    self.active.push(Reverse((end, column)));
    column
  }
}

/// Lays out events with the default grid density.
#[must_use]
pub fn layout_events<P>(
  events: &[Event<P>],
  window: Window
) -> Vec<LaidOutEvent<'_, P>> {
  layout_events_with(
    events,
    window,
    &TimeGeometry::default()
  )
}

/// Returns one entry per input event, ordered chronologically by the
/// original start instant (ties keep input order).
#[tracing::instrument(
  level = "debug",
  skip(events, geometry),
  fields(event_count = events.len())
)]
pub fn layout_events_with<'a, P>(
  events: &'a [Event<P>],
  window: Window,
  geometry: &TimeGeometry
) -> Vec<LaidOutEvent<'a, P>> {
  let mut order = (0..events.len())
    .collect::<Vec<_>>();
  order.sort_by_key(|&idx| {
    events[idx].interval.start
  });

  let mut sweep = ColumnSweep::default();
  let mut placed: Vec<LaidOutEvent<'a, P>> =
    Vec::with_capacity(events.len());
  let mut cluster_widths: Vec<usize> =
    Vec::new();

  for idx in order {
    let event = &events[idx];
    let Placement { clamped, snapped } =
      placement_span(event, window, geometry);

    if sweep.release_until(clamped.start) {
      cluster_widths.push(0);
      trace!(
        cluster = cluster_widths.len() - 1,
        start = clamped.start,
        "opened cluster"
      );
    }
    let cluster = cluster_widths.len() - 1;
    let column = sweep.claim(clamped.end);
    cluster_widths[cluster] =
      cluster_widths[cluster].max(column + 1);

    placed.push(LaidOutEvent {
      event,
      clamped_start: clamped.start,
      clamped_end: clamped.end,
      start_minute: snapped.start,
      end_minute: snapped.end,
      top_px: geometry
        .minutes_to_px(snapped.start, window),
      height_px: geometry
        .duration_px(snapped.end - snapped.start),
      column_index: column,
      columns_count: 0,
      cluster
    });
  }

  for entry in &mut placed {
    entry.columns_count =
      cluster_widths[entry.cluster];
  }

  debug!(
    clusters = cluster_widths.len(),
    widest = cluster_widths
      .iter()
      .copied()
      .max()
      .unwrap_or(0),
    "laid out events"
  );
  placed
}

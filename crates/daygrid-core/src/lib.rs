pub mod cli;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod datetime;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod now;
pub mod render;
pub mod window;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use crate::cursor::{
  DayCursor,
  events_for_day,
  slice_to_day
};
pub use crate::error::{
  LayoutError,
  LayoutResult
};
pub use crate::geometry::{
  HourLine,
  TimeGeometry,
  snap_down,
  snap_to_step,
  snap_up
};
pub use crate::layout::{
  layout_events,
  layout_events_with
};
pub use crate::model::{
  Event,
  LaidOutEvent,
  TimeInterval,
  Window,
  minutes_since_midnight
};
pub use crate::now::{
  now_indicator_px,
  now_indicator_px_with
};
pub use crate::window::{
  WindowPolicy,
  compute_window,
  compute_window_for_events
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = cli::GlobalCli::parse_from(
    raw_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting daygrid"
  );

  let mut cfg = config::LayoutConfig::load(
    cli.config.as_deref()
  )?;
  cfg
    .apply_overrides(
      cli
        .overrides
        .into_iter()
        .map(|entry| (entry.key, entry.value))
    )
    .context(
      "failed to apply --set overrides"
    )?;
  debug!(?cfg, "effective layout config");

  let renderer =
    render::Renderer::detect();
  commands::dispatch(
    &cfg,
    &renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}

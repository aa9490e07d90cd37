use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// One `--set section.key=value` config override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverride {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for ConfigOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Self {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }),
            Some(_) => Err(anyhow!("override key is empty: {s}")),
            None => Err(anyhow!("expected section.key=value, got: {s}")),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "daygrid",
    version,
    about = "Day-view calendar layout: visible window, columns and the now marker"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Layout config file (TOML).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Override a config key, e.g. `--set grid.minutes_per_step=15`.
    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<ConfigOverride>()),
        action = ArgAction::Append,
        global = true
    )]
    pub overrides: Vec<ConfigOverride>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the window that fits a set of events.
    Window(EventsArgs),
    /// Lay out one day of events into columns.
    Layout(LayoutArgs),
    /// Print the pixel offset of the "now" marker.
    Now(NowArgs),
    /// Print the hour gridlines for a window.
    Grid(GridArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EventsArgs {
    /// JSON array of events; `-` reads stdin.
    #[arg(short = 'i', long = "input", default_value = "-")]
    pub input: String,

    /// Only consider events touching this day (YYYY-MM-DD).
    #[arg(long = "day")]
    pub day: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub events: EventsArgs,

    /// Pin the window instead of fitting it (HH:MM-HH:MM).
    #[arg(short = 'w', long = "window")]
    pub window: Option<String>,

    /// Emit JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,

    /// Reference time for the now marker (YYYY-MM-DDTHH:MM, local).
    #[arg(long = "at")]
    pub at: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct NowArgs {
    /// Displayed day (YYYY-MM-DD); defaults to today.
    #[arg(long = "day")]
    pub day: Option<String>,

    #[arg(short = 'w', long = "window")]
    pub window: Option<String>,

    /// Fit the window to these events when `--window` is absent.
    #[arg(short = 'i', long = "input")]
    pub input: Option<String>,

    #[arg(long = "at")]
    pub at: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    #[arg(short = 'w', long = "window")]
    pub window: Option<String>,
}

/// `-q` wins over `-v`; with neither flag only warnings are shown.
pub fn default_level(verbose: u8, quiet: u8) -> LevelFilter {
    match (quiet, verbose) {
        (2.., _) => LevelFilter::ERROR,
        (1, _) => LevelFilter::WARN,
        (0, 0) => LevelFilter::WARN,
        (0, 1) => LevelFilter::INFO,
        (0, 2) => LevelFilter::DEBUG,
        (0, _) => LevelFilter::TRACE,
    }
}

/// Logs go to stderr so stdout stays clean for tables and JSON.
/// `RUST_LOG` directives take precedence over the flag-derived level.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, quiet).into())
        .from_env()
        .map_err(|e| anyhow!("invalid RUST_LOG filter: {e}"))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .try_init();

    if let Err(err) = installed {
        debug!(error = %err, "global subscriber already installed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layout_with_global_flags_after_subcommand() {
        let cli = GlobalCli::try_parse_from([
            "daygrid",
            "layout",
            "--input",
            "events.json",
            "--day",
            "2026-03-02",
            "-vv",
            "--set",
            "grid.minutes_per_step=15",
            "--json",
        ])
        .expect("parse cli");

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.overrides.len(), 1);
        assert_eq!(cli.overrides[0].key, "grid.minutes_per_step");
        assert_eq!(cli.overrides[0].value, "15");
        match cli.command {
            Command::Layout(args) => {
                assert!(args.json);
                assert_eq!(args.events.input, "events.json");
                assert_eq!(args.events.day.as_deref(), Some("2026-03-02"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_override_without_equals() {
        assert!(GlobalCli::try_parse_from(["daygrid", "--set", "oops", "grid"]).is_err());
    }

    #[test]
    fn rejects_override_with_empty_key() {
        assert!("=15".parse::<ConfigOverride>().is_err());
        assert_eq!(
            " grid.pixels_per_step = 30 ".parse::<ConfigOverride>().expect("parse"),
            ConfigOverride {
                key: "grid.pixels_per_step".to_string(),
                value: "30".to_string(),
            }
        );
    }

    #[test]
    fn quiet_beats_verbose() {
        assert_eq!(default_level(0, 0), LevelFilter::WARN);
        assert_eq!(default_level(1, 0), LevelFilter::INFO);
        assert_eq!(default_level(5, 0), LevelFilter::TRACE);
        assert_eq!(default_level(3, 1), LevelFilter::WARN);
        assert_eq!(default_level(3, 2), LevelFilter::ERROR);
    }

    #[test]
    fn input_defaults_to_stdin() {
        let cli = GlobalCli::try_parse_from(["daygrid", "window"]).expect("parse cli");
        match cli.command {
            Command::Window(args) => assert_eq!(args.input, "-"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

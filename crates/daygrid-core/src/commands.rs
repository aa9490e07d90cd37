use std::fs;
use std::io::{self, Read, Write};

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use daygrid_shared::{DayLayoutDto, EventDto, LaidOutEventDto, WindowDto};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::cli::{Command, EventsArgs, GridArgs, LayoutArgs, NowArgs};
use crate::config::LayoutConfig;
use crate::cursor::{DayCursor, events_for_day};
use crate::datetime::{format_window, local_now, parse_day, parse_instant, parse_window, resolve_timezone};
use crate::layout::layout_events_with;
use crate::model::{Event, LaidOutEvent, TimeInterval, Window};
use crate::now::now_indicator_px_with;
use crate::render::Renderer;
use crate::window::compute_window_for_events;

#[instrument(skip(cfg, renderer, command))]
pub fn dispatch(cfg: &LayoutConfig, renderer: &Renderer, command: Command) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match command {
        Command::Window(args) => cmd_window(cfg, &mut out, &args),
        Command::Layout(args) => cmd_layout(cfg, renderer, &mut out, &args),
        Command::Now(args) => cmd_now(cfg, &mut out, &args),
        Command::Grid(args) => cmd_grid(cfg, renderer, &mut out, &args),
    }
}

/// Reads a JSON array of events from a file, or stdin for `-`.
#[instrument]
pub fn load_events(input: &str) -> anyhow::Result<Vec<Event<String>>> {
    let raw = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read events from stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
    };

    let dtos: Vec<EventDto> =
        serde_json::from_str(&raw).with_context(|| format!("invalid event json in {input}"))?;
    let events = dtos
        .into_iter()
        .enumerate()
        .map(|(idx, dto)| event_from_dto(dto).with_context(|| format!("event #{idx}")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    info!(count = events.len(), "loaded events");
    Ok(events)
}

pub fn event_from_dto(dto: EventDto) -> anyhow::Result<Event<String>> {
    let start = parse_instant(&dto.start)?;
    let end = parse_instant(&dto.end)?;
    Ok(Event::new(
        dto.id.unwrap_or_else(Uuid::new_v4),
        TimeInterval::new(start, end),
        dto.title,
    ))
}

/// Builds the JSON view of one laid-out day.
pub fn day_layout_dto<P: AsRef<str>>(
    day: NaiveDate,
    window: Window,
    height_px: f64,
    now_px: Option<f64>,
    laid: &[LaidOutEvent<'_, P>],
) -> DayLayoutDto {
    DayLayoutDto {
        day: day.format("%Y-%m-%d").to_string(),
        window: WindowDto {
            start: window.start(),
            end: window.end(),
        },
        height_px,
        now_px,
        events: laid
            .iter()
            .map(|entry| LaidOutEventDto {
                id: entry.event.id,
                title: entry.event.payload.as_ref().to_string(),
                start_minute: entry.start_minute,
                end_minute: entry.end_minute,
                top_px: entry.top_px,
                height_px: entry.height_px,
                column_index: entry.column_index,
                columns_count: entry.columns_count,
            })
            .collect(),
    }
}

fn reference_now(cfg: &LayoutConfig, at: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    match at {
        Some(raw) => Ok(parse_instant(raw)?),
        None => Ok(local_now(&resolve_timezone(cfg.timezone.as_deref()))),
    }
}

fn pinned_window(raw: Option<&str>) -> anyhow::Result<Option<Window>> {
    raw.map(parse_window)
        .transpose()
        .context("failed to parse --window")
}

fn cmd_window<W: Write>(cfg: &LayoutConfig, out: &mut W, args: &EventsArgs) -> anyhow::Result<()> {
    let events = load_events(&args.input)?;
    let window = match args.day.as_deref() {
        Some(raw) => {
            let day = parse_day(raw)?;
            compute_window_for_events(&events_for_day(&events, day), &cfg.window_policy())
        }
        None => compute_window_for_events(&events, &cfg.window_policy()),
    };
    writeln!(
        out,
        "{} ({}-{})",
        format_window(window),
        window.start(),
        window.end()
    )?;
    Ok(())
}

fn cmd_layout<W: Write>(
    cfg: &LayoutConfig,
    renderer: &Renderer,
    out: &mut W,
    args: &LayoutArgs,
) -> anyhow::Result<()> {
    let events = load_events(&args.events.input)?;
    let now = reference_now(cfg, args.at.as_deref())?;
    let day = match args.events.day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => DayCursor::today(now).day(),
    };

    let day_events = events_for_day(&events, day);
    let window = match pinned_window(args.window.as_deref())? {
        Some(window) => window,
        None => compute_window_for_events(&day_events, &cfg.window_policy()),
    };
    let geometry = cfg.geometry();
    let laid = layout_events_with(&day_events, window, &geometry);
    let now_px = now_indicator_px_with(now, day, window, &geometry);
    debug!(%day, events = laid.len(), ?now_px, "laid out day");

    if args.json {
        let dto = day_layout_dto(day, window, geometry.window_height_px(window), now_px, &laid);
        serde_json::to_writer_pretty(&mut *out, &dto).context("failed to write layout json")?;
        writeln!(out)?;
        return Ok(());
    }

    renderer.write_layout(out, window, &geometry, &laid, now_px)
}

fn cmd_now<W: Write>(cfg: &LayoutConfig, out: &mut W, args: &NowArgs) -> anyhow::Result<()> {
    let now = reference_now(cfg, args.at.as_deref())?;
    let day = match args.day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => DayCursor::today(now).day(),
    };

    let window = match (pinned_window(args.window.as_deref())?, args.input.as_deref()) {
        (Some(window), _) => window,
        (None, Some(input)) => {
            let events = load_events(input)?;
            compute_window_for_events(&events_for_day(&events, day), &cfg.window_policy())
        }
        (None, None) => Window::FULL_DAY,
    };

    match now_indicator_px_with(now, day, window, &cfg.geometry()) {
        Some(px) => writeln!(out, "{px}")?,
        None => writeln!(out, "none")?,
    }
    Ok(())
}

fn cmd_grid<W: Write>(
    cfg: &LayoutConfig,
    renderer: &Renderer,
    out: &mut W,
    args: &GridArgs,
) -> anyhow::Result<()> {
    let window = pinned_window(args.window.as_deref())?.unwrap_or_default();
    let lines = cfg.geometry().hour_lines(window);
    renderer.write_hour_lines(out, &lines)
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    const EVENTS: &str = r#"[
        {"title": "Vaccination", "start": "2026-03-02T10:00", "end": "2026-03-02T11:00"},
        {"title": "Nail trim", "start": "2026-03-02T10:30", "end": "2026-03-02T11:30"},
        {"title": "Tomorrow", "start": "2026-03-03T08:00", "end": "2026-03-03T09:00"}
    ]"#;

    fn events_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(EVENTS.as_bytes()).expect("write events");
        file
    }

    fn path_of(file: &NamedTempFile) -> String {
        file.path().to_string_lossy().to_string()
    }

    #[test]
    fn dto_without_id_gets_a_fresh_one() {
        let event = event_from_dto(EventDto {
            id: None,
            title: "Checkup".to_string(),
            start: "2026-03-02T09:00".to_string(),
            end: "2026-03-02T09:20".to_string(),
        })
        .expect("convert");
        assert!(!event.id.is_nil());
        assert_eq!(event.interval.start_minute(), 540);
        assert_eq!(event.interval.end_minute(), 560);
    }

    #[test]
    fn bad_timestamp_names_the_event() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(br#"[{"start": "soon", "end": "later"}]"#)
            .expect("write");
        let err = load_events(&path_of(&file)).expect_err("should fail");
        assert!(format!("{err:#}").contains("event #0"));
    }

    #[test]
    fn window_command_respects_day_filter() {
        let file = events_file();
        let mut out = Vec::new();
        cmd_window(
            &LayoutConfig::default(),
            &mut out,
            &EventsArgs {
                input: path_of(&file),
                day: Some("2026-03-02".to_string()),
            },
        )
        .expect("window");
        assert_eq!(String::from_utf8(out).expect("utf8"), "09:30-12:00 (570-720)\n");
    }

    #[test]
    fn layout_command_emits_json() {
        let file = events_file();
        let mut out = Vec::new();
        cmd_layout(
            &LayoutConfig::default(),
            &Renderer::new(false),
            &mut out,
            &LayoutArgs {
                events: EventsArgs {
                    input: path_of(&file),
                    day: Some("2026-03-02".to_string()),
                },
                window: None,
                json: true,
                at: Some("2026-03-02T23:50".to_string()),
            },
        )
        .expect("layout");
        let dto: DayLayoutDto = serde_json::from_slice(&out).expect("json");
        assert_eq!(dto.events.len(), 2);
        assert_eq!(dto.window, WindowDto { start: 570, end: 720 });
        assert!(dto.events.iter().all(|e| e.columns_count == 2));
        assert_eq!(dto.now_px, Some(dto.height_px));
    }

    #[test]
    fn now_command_prints_none_for_other_days() {
        let mut out = Vec::new();
        cmd_now(
            &LayoutConfig::default(),
            &mut out,
            &NowArgs {
                day: Some("2026-03-02".to_string()),
                window: Some("08:00-21:00".to_string()),
                input: None,
                at: Some("2026-03-05T10:00".to_string()),
            },
        )
        .expect("now");
        assert_eq!(String::from_utf8(out).expect("utf8"), "none\n");
    }

    #[test]
    fn now_command_pins_late_marker_to_window_end() {
        let mut out = Vec::new();
        cmd_now(
            &LayoutConfig::default(),
            &mut out,
            &NowArgs {
                day: None,
                window: Some("08:00-21:00".to_string()),
                input: None,
                at: Some("2026-03-02T23:50".to_string()),
            },
        )
        .expect("now");
        assert_eq!(String::from_utf8(out).expect("utf8"), "3900\n");
    }
}

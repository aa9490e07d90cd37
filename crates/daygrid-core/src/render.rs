use std::io::{self, IsTerminal, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::datetime::{format_minutes, format_window};
use crate::geometry::{HourLine, TimeGeometry};
use crate::model::{LaidOutEvent, Window};

const COLUMN_PALETTE: [&str; 4] = ["36", "33", "35", "32"];

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colour on when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    #[tracing::instrument(skip(self, out, events, geometry))]
    pub fn write_layout<W: Write, P: AsRef<str>>(
        &self,
        mut out: W,
        window: Window,
        geometry: &TimeGeometry,
        events: &[LaidOutEvent<'_, P>],
        now_px: Option<f64>,
    ) -> anyhow::Result<()> {
        writeln!(
            out,
            "window {}  height {}px",
            format_window(window),
            geometry.window_height_px(window)
        )?;
        match now_px {
            Some(px) => writeln!(out, "now    {px}px")?,
            None => writeln!(out, "now    none")?,
        }
        writeln!(out)?;

        let mut table = Table::new(vec![
            ("Time", Align::Left),
            ("Top", Align::Right),
            ("Height", Align::Right),
            ("Col", Align::Right),
            ("Title", Align::Left),
        ]);

        for entry in events {
            let time = format!(
                "{}-{}",
                format_minutes(entry.start_minute),
                format_minutes(entry.end_minute)
            );
            let column = format!("{}/{}", entry.column_index + 1, entry.columns_count);
            let code = COLUMN_PALETTE[entry.column_index % COLUMN_PALETTE.len()];
            table.push(vec![
                time,
                entry.top_px.to_string(),
                entry.height_px.to_string(),
                self.paint(&column, code),
                entry.event.payload.as_ref().to_string(),
            ]);
        }

        table.write(out)
    }

    pub fn write_hour_lines<W: Write>(&self, out: W, lines: &[HourLine]) -> anyhow::Result<()> {
        let mut table = Table::new(vec![("Hour", Align::Left), ("Top", Align::Right)]);
        for line in lines {
            table.push(vec![self.paint(&line.label, "2"), line.top_px.to_string()]);
        }
        table.write(out)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Plain-text table whose column widths ignore colour escapes.
#[derive(Debug)]
struct Table {
    headers: Vec<(&'static str, Align)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: Vec<(&'static str, Align)>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, (title, _))| {
                self.rows
                    .iter()
                    .map(|row| visible_width(&row[idx]))
                    .fold(title.width(), usize::max)
            })
            .collect()
    }

    fn write<W: Write>(&self, mut out: W) -> anyhow::Result<()> {
        let widths = self.widths();
        let header_cells = self
            .headers
            .iter()
            .map(|(title, _)| (*title).to_string())
            .collect::<Vec<_>>();
        self.write_line(&mut out, &header_cells, &widths)?;
        let rule = widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>();
        self.write_line(&mut out, &rule, &widths)?;
        for row in &self.rows {
            self.write_line(&mut out, row, &widths)?;
        }
        Ok(())
    }

    fn write_line<W: Write>(&self, out: &mut W, cells: &[String], widths: &[usize]) -> anyhow::Result<()> {
        let mut line = String::new();
        for ((cell, &width), (_, align)) in cells.iter().zip(widths).zip(&self.headers) {
            if !line.is_empty() {
                line.push(' ');
            }
            let pad = " ".repeat(width.saturating_sub(visible_width(cell)));
            match align {
                Align::Left => {
                    line.push_str(cell);
                    line.push_str(&pad);
                }
                Align::Right => {
                    line.push_str(&pad);
                    line.push_str(cell);
                }
            }
        }
        writeln!(out, "{}", line.trim_end())?;
        Ok(())
    }
}

/// Characters that reach the screen, skipping `ESC ... m` colour codes.
fn visible_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    let mut in_escape = false;
    text.chars().filter(move |&ch| match (in_escape, ch) {
        (true, 'm') => {
            in_escape = false;
            false
        }
        (true, _) => false,
        (false, '\x1b') => {
            in_escape = true;
            false
        }
        (false, _) => true,
    })
}

fn visible_width(text: &str) -> usize {
    visible_chars(text).map(|ch| ch.width().unwrap_or(0)).sum()
}

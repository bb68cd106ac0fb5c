use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::event::Event;
use crate::grid::{DAYS_PER_WEEK, GridCell};
use crate::index::EventsByDate;

const CELL_WIDTH: usize = 6;
const WEEKDAY_HEADERS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    /// Prints the 6-week month grid. Each cell shows the day number plus an
    /// event count marker; today is highlighted, out-of-month days dimmed.
    #[tracing::instrument(skip(self, grid, index))]
    pub fn print_month(
        &mut self,
        year: i32,
        month: u32,
        grid: &[GridCell],
        index: &EventsByDate,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let month_name = MONTH_NAMES
            .get(month as usize)
            .ok_or_else(|| anyhow!("month index out of range: {month}"))?;
        let title = format!("{month_name} {year}");
        let total_width = CELL_WIDTH * DAYS_PER_WEEK;
        let pad = total_width.saturating_sub(title.len()) / 2;
        writeln!(out, "{}{title}", " ".repeat(pad))?;

        for header in WEEKDAY_HEADERS {
            write!(out, "{header:>4}{}", " ".repeat(CELL_WIDTH - 4))?;
        }
        writeln!(out)?;

        for week in grid.chunks(DAYS_PER_WEEK) {
            for cell in week {
                let count = index.get(&cell.date.date_key()).map_or(0, Vec::len);
                let marker = if count > 0 {
                    format!(":{count}")
                } else {
                    String::new()
                };

                let text = format!("{:>4}{marker}", cell.date.day);
                let painted = if cell.is_today {
                    self.paint(&text, "7")
                } else if !cell.is_current_month {
                    self.paint(&text, "2")
                } else if count > 0 {
                    self.paint(&text, "36")
                } else {
                    text.clone()
                };

                let padding = CELL_WIDTH.saturating_sub(text.len());
                write!(out, "{painted}{}", " ".repeat(padding))?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    /// Prints an agenda table, one row per event, grouped by the index's
    /// date order.
    #[tracing::instrument(skip(self, index))]
    pub fn print_agenda(&mut self, index: &EventsByDate) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if index.is_empty() {
            writeln!(out, "No events.")?;
            return Ok(());
        }

        let headers = vec![
            "Date".to_string(),
            "Time".to_string(),
            "Type".to_string(),
            "Title".to_string(),
            "Location".to_string(),
            "Attendees".to_string(),
        ];

        let mut rows = Vec::new();
        for (date_key, bucket) in index {
            for event in bucket {
                rows.push(vec![
                    self.paint(date_key, "33"),
                    format!(
                        "{}+{}m",
                        event.start_time.format("%H:%M"),
                        event.duration_minutes
                    ),
                    event.kind.to_string(),
                    event.title.clone(),
                    event.location.clone().unwrap_or_default(),
                    event.attendees.join(", "),
                ]);
            }
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, event))]
    pub fn print_event_created(&mut self, event: &Event) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "Created {} '{}' on {} at {} ({})",
            event.kind,
            event.title,
            event.date,
            event.start_time.format("%H:%M"),
            event.id
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self, event))]
    pub fn print_event_removed(&mut self, event: &Event) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "Removed {} '{}' on {} ({})",
            event.kind, event.title, event.date, event.id
        )?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|h| UnicodeWidthStr::width(h.as_str()))
        .collect();

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            if visible > widths[idx] {
                widths[idx] = visible;
            }
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "", width = width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible);
            write!(writer, "{cell}{} ", " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{strip_ansi, write_table};

    #[test]
    fn strips_ansi_color_codes() {
        assert_eq!(strip_ansi("\x1b[33m2025-04-20\x1b[0m"), "2025-04-20");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn table_columns_align_on_visible_width() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let rows = vec![
            vec!["\x1b[33mxx\x1b[0m".to_string(), "yyyy".to_string()],
            vec!["x".to_string(), "y".to_string()],
        ];

        let mut buf = Vec::new();
        write_table(&mut buf, headers, rows).expect("write table");
        let text = String::from_utf8(buf).expect("utf8");

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("A"));
        assert!(lines[1].starts_with("--"));
        // The colored cell still pads to the two-character column.
        assert!(strip_ansi(lines[2]).starts_with("xx yyyy"));
    }
}

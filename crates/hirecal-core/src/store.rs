use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info};

use crate::calendar::CalendarDate;
use crate::event::Event;

/// Flat-file event store: one JSON event per line in `events.data`.
/// File order is insertion order, which is what the index relies on for
/// stable bucket ordering.
#[derive(Debug)]
pub struct EventStore {
    pub data_dir: PathBuf,
    pub events_path: PathBuf,
}

impl EventStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let events_path = data_dir.join("events.data");
        if !events_path.exists() {
            fs::write(&events_path, "")?;
        }

        info!(
            data_dir = %data_dir.display(),
            events = %events_path.display(),
            "opened event store"
        );

        Ok(Self {
            data_dir,
            events_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_events(&self) -> anyhow::Result<Vec<Event>> {
        load_jsonl(&self.events_path).context("failed to load events.data")
    }

    #[tracing::instrument(skip(self, events))]
    pub fn save_events(&self, events: &[Event]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.events_path, events).context("failed to save events.data")
    }

    #[tracing::instrument(skip(self, event), fields(id = %event.id, date = %event.date))]
    pub fn add_event(&self, event: Event) -> anyhow::Result<Vec<Event>> {
        let mut events = self.load_events()?;
        events.push(event);
        self.save_events(&events)?;
        Ok(events)
    }

    /// Removes the event whose uuid matches `id_prefix` exactly or as a
    /// unique prefix, returning the removed event.
    #[tracing::instrument(skip(self))]
    pub fn remove_event(&self, id_prefix: &str) -> anyhow::Result<Event> {
        let mut events = self.load_events()?;

        let matches: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.id.to_string().starts_with(id_prefix))
            .map(|(idx, _)| idx)
            .collect();

        let idx = match matches.as_slice() {
            [] => return Err(anyhow!("no event matches id: {id_prefix}")),
            [only] => *only,
            _ => {
                return Err(anyhow!(
                    "ambiguous id prefix {id_prefix}: matches {} events",
                    matches.len()
                ));
            }
        };

        let removed = events.remove(idx);
        self.save_events(&events)?;
        Ok(removed)
    }

    /// Loads events restricted to an optional inclusive date range, the
    /// `listEvents(dateRangeHint)` shape a rendering layer wants.
    #[tracing::instrument(skip(self))]
    pub fn list_events(
        &self,
        from: Option<CalendarDate>,
        to: Option<CalendarDate>,
    ) -> anyhow::Result<Vec<Event>> {
        let events = self.load_events()?;
        Ok(events
            .into_iter()
            .filter(|event| from.is_none_or(|bound| event.date >= bound))
            .filter(|event| to.is_none_or(|bound| event.date <= bound))
            .collect())
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Vec<Event>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: Event = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(event);
    }

    debug!(count = out.len(), "loaded events from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, events))]
fn save_jsonl_atomic(path: &Path, events: &[Event]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = events.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    for event in events {
        let serialized = serde_json::to_string(event)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

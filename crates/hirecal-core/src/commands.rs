use anyhow::Context;
use chrono::NaiveTime;
use tracing::{debug, info};

use crate::calendar::{CalendarDate, days_in_month};
use crate::cli::Command;
use crate::datetime::{parse_date_arg, parse_month_arg};
use crate::event::Event;
use crate::filter::FilterSelection;
use crate::grid::build_grid;
use crate::index::index_events;
use crate::render::Renderer;
use crate::store::EventStore;

#[tracing::instrument(skip(store, renderer, command))]
pub fn dispatch(
    store: &EventStore,
    renderer: &mut Renderer,
    command: Command,
    today: CalendarDate,
) -> anyhow::Result<()> {
    match command {
        Command::Show { month } => cmd_show(store, renderer, month.as_deref(), today),
        Command::Add {
            title,
            date,
            kind,
            time,
            duration,
            location,
            attendees,
            description,
        } => cmd_add(
            store,
            renderer,
            today,
            AddArgs {
                title,
                date,
                kind,
                time,
                duration,
                location,
                attendees,
                description,
            },
        ),
        Command::List { terms } => cmd_list(store, renderer, &terms, today),
        Command::Remove { id } => cmd_remove(store, renderer, &id),
    }
}

#[derive(Debug)]
struct AddArgs {
    title: String,
    date: String,
    kind: String,
    time: String,
    duration: u32,
    location: Option<String>,
    attendees: Vec<String>,
    description: Option<String>,
}

#[tracing::instrument(skip(store, renderer))]
fn cmd_show(
    store: &EventStore,
    renderer: &mut Renderer,
    month_arg: Option<&str>,
    today: CalendarDate,
) -> anyhow::Result<()> {
    let (year, month) = match month_arg {
        Some(arg) => parse_month_arg(arg, today)?,
        None => (today.year, today.month),
    };
    debug!(year, month, "showing month");

    let grid = build_grid(year, month, today)?;
    let events = store.load_events()?;
    let index = index_events(&events, None);
    renderer.print_month(year, month, &grid, &index)?;

    // Agenda for the visible month only; the grid already marks spillover
    // days from adjacent months.
    let month_range = FilterSelection {
        from: Some(CalendarDate::new(year, month, 1)?),
        to: Some(CalendarDate::new(year, month, days_in_month(year, month)?)?),
        ..FilterSelection::default()
    };
    let month_index = index_events(&events, Some(&month_range));
    if !month_index.is_empty() {
        renderer.print_agenda(&month_index)?;
    }

    Ok(())
}

#[tracing::instrument(skip(store, renderer, args))]
fn cmd_add(
    store: &EventStore,
    renderer: &mut Renderer,
    today: CalendarDate,
    args: AddArgs,
) -> anyhow::Result<()> {
    let date = parse_date_arg(&args.date, today)?;
    let kind = args.kind.parse()?;
    let start_time = NaiveTime::parse_from_str(args.time.trim(), "%H:%M")
        .with_context(|| format!("expected HH:MM start time, got: {}", args.time))?;

    let mut event = Event::new(args.title, kind, date, start_time, args.duration);
    event.location = args.location;
    event.attendees = args.attendees;
    event.description = args.description;

    info!(id = %event.id, date = %event.date, kind = %event.kind, "adding event");
    store.add_event(event.clone())?;
    renderer.print_event_created(&event)?;
    Ok(())
}

#[tracing::instrument(skip(store, renderer, terms))]
fn cmd_list(
    store: &EventStore,
    renderer: &mut Renderer,
    terms: &[String],
    today: CalendarDate,
) -> anyhow::Result<()> {
    let selection = FilterSelection::parse(terms, today)?;
    debug!(?selection, "listing events");

    let events = store.load_events()?;
    let filter = if selection.is_unrestricted() {
        None
    } else {
        Some(&selection)
    };
    let index = index_events(&events, filter);
    renderer.print_agenda(&index)?;
    Ok(())
}

#[tracing::instrument(skip(store, renderer))]
fn cmd_remove(store: &EventStore, renderer: &mut Renderer, id: &str) -> anyhow::Result<()> {
    let removed = store.remove_event(id.trim())?;
    info!(id = %removed.id, "removed event");
    renderer.print_event_removed(&removed)?;
    Ok(())
}

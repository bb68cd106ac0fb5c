use std::collections::BTreeMap;

use tracing::debug;

use crate::event::Event;
use crate::filter::FilterSelection;

/// Events grouped by canonical `YYYY-MM-DD` key. Within a bucket the
/// original list order is preserved; buckets are deliberately not sorted
/// by start time (see DESIGN.md). ISO keys sort chronologically, so the
/// map iterates in date order for free.
pub type EventsByDate = BTreeMap<String, Vec<Event>>;

/// Buckets `events` by date, applying `filter` if one is given.
///
/// The index is rebuilt wholesale on every call rather than patched
/// incrementally; event volumes are small and a fresh map sidesteps
/// stale-bucket bugs entirely. The input slice is never mutated.
#[tracing::instrument(skip(events, filter), fields(count = events.len()))]
pub fn index_events(events: &[Event], filter: Option<&FilterSelection>) -> EventsByDate {
    let mut index = EventsByDate::new();

    for event in events {
        if let Some(selection) = filter
            && !selection.matches(event)
        {
            continue;
        }
        index
            .entry(event.date.date_key())
            .or_default()
            .push(event.clone());
    }

    debug!(
        buckets = index.len(),
        kept = index.values().map(Vec::len).sum::<usize>(),
        "indexed events by date"
    );
    index
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::index_events;
    use crate::calendar::CalendarDate;
    use crate::event::{Event, EventKind};
    use crate::filter::FilterSelection;

    fn event(title: &str, kind: EventKind, key: &str) -> Event {
        Event::new(
            title.to_string(),
            kind,
            key.parse().expect("valid date"),
            NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
            30,
        )
    }

    fn sample_events() -> Vec<Event> {
        vec![
            event("Onsite loop", EventKind::Interview, "2025-04-20"),
            event("Offer debrief", EventKind::Meeting, "2025-04-20"),
            event("Phone screen", EventKind::Screening, "2025-04-21"),
        ]
    }

    #[test]
    fn groups_by_date_key_preserving_insertion_order() {
        let events = sample_events();
        let index = index_events(&events, None);

        assert_eq!(index.len(), 2);
        let bucket = index.get("2025-04-20").expect("bucket exists");
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].title, "Onsite loop");
        assert_eq!(bucket[1].title, "Offer debrief");
    }

    #[test]
    fn empty_kind_set_equals_no_filter_at_all() {
        let events = sample_events();
        let unfiltered = index_events(&events, None);
        let empty_selection = index_events(&events, Some(&FilterSelection::default()));

        let keys: Vec<_> = unfiltered.keys().collect();
        assert_eq!(keys, empty_selection.keys().collect::<Vec<_>>());
        for key in keys {
            let a: Vec<_> = unfiltered[key].iter().map(|e| e.id).collect();
            let b: Vec<_> = empty_selection[key].iter().map(|e| e.id).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn kind_filter_drops_whole_buckets_when_emptied() {
        let events = sample_events();
        let today = CalendarDate::new(2025, 3, 20).expect("valid date");
        let terms = vec!["type:interview".to_string(), "type:meeting".to_string()];
        let selection = FilterSelection::parse(&terms, today).expect("parse");

        let index = index_events(&events, Some(&selection));
        assert_eq!(index.len(), 1);
        let bucket = index.get("2025-04-20").expect("bucket exists");
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].kind, EventKind::Interview);
        assert_eq!(bucket[1].kind, EventKind::Meeting);
        assert!(!index.contains_key("2025-04-21"));
    }

    #[test]
    fn indexing_is_idempotent_and_leaves_input_untouched() {
        let events = sample_events();
        let snapshot: Vec<_> = events.iter().map(|e| e.id).collect();

        let first = index_events(&events, None);
        let second = index_events(&events, None);

        assert_eq!(first.keys().collect::<Vec<_>>(), second.keys().collect::<Vec<_>>());
        for (key, bucket) in &first {
            let other: Vec<_> = second[key].iter().map(|e| e.id).collect();
            assert_eq!(bucket.iter().map(|e| e.id).collect::<Vec<_>>(), other);
        }
        assert_eq!(events.iter().map(|e| e.id).collect::<Vec<_>>(), snapshot);
    }

    #[test]
    fn iteration_order_is_chronological() {
        let events = vec![
            event("late", EventKind::Call, "2025-12-01"),
            event("early", EventKind::Call, "2025-01-15"),
            event("mid", EventKind::Call, "2025-06-30"),
        ];
        let index = index_events(&events, None);
        let keys: Vec<_> = index.keys().cloned().collect();
        assert_eq!(keys, vec!["2025-01-15", "2025-06-30", "2025-12-01"]);
    }
}

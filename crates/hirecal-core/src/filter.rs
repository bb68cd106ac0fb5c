use std::collections::BTreeSet;

use tracing::trace;

use crate::calendar::CalendarDate;
use crate::datetime::parse_date_arg;
use crate::event::{Event, EventKind};

/// The active filter set: event kinds plus an optional date range.
///
/// An empty kind set matches everything; that mirrors the multi-select
/// chip behavior of the dashboards this replaces, where clearing all
/// chips shows the full calendar rather than nothing. Neither bound of
/// the date range is required, and `from <= to` is not enforced here
/// (see DESIGN.md).
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub kinds: BTreeSet<EventKind>,
    pub from: Option<CalendarDate>,
    pub to: Option<CalendarDate>,
    pub text_terms: Vec<String>,
}

impl FilterSelection {
    /// Parses CLI filter terms: `type:interview`, `from:<date>`, `to:<date>`,
    /// and bare words matched case-insensitively against event titles.
    /// Date values accept everything `parse_date_arg` does, resolved against
    /// the supplied `today`.
    #[tracing::instrument(skip(terms, today))]
    pub fn parse(terms: &[String], today: CalendarDate) -> anyhow::Result<Self> {
        let mut selection = Self::default();

        for term in terms {
            if let Some(value) = term.strip_prefix("type:") {
                selection.kinds.insert(value.parse()?);
                continue;
            }
            if let Some(value) = term.strip_prefix("from:") {
                selection.from = Some(parse_date_arg(value, today)?);
                continue;
            }
            if let Some(value) = term.strip_prefix("to:") {
                selection.to = Some(parse_date_arg(value, today)?);
                continue;
            }
            selection.text_terms.push(term.clone());
        }

        Ok(selection)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.kinds.is_empty()
            && self.from.is_none()
            && self.to.is_none()
            && self.text_terms.is_empty()
    }

    pub fn matches(&self, event: &Event) -> bool {
        let ok = self.matches_kind(event)
            && self.matches_range(event)
            && self.matches_text(event);
        trace!(id = %event.id, kind = %event.kind, date = %event.date, ok, "filter evaluation");
        ok
    }

    fn matches_kind(&self, event: &Event) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind)
    }

    fn matches_range(&self, event: &Event) -> bool {
        if let Some(from) = self.from
            && event.date < from
        {
            return false;
        }
        if let Some(to) = self.to
            && event.date > to
        {
            return false;
        }
        true
    }

    fn matches_text(&self, event: &Event) -> bool {
        let title = event.title.to_ascii_lowercase();
        self.text_terms
            .iter()
            .all(|term| title.contains(&term.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::FilterSelection;
    use crate::calendar::CalendarDate;
    use crate::event::{Event, EventKind};

    fn today() -> CalendarDate {
        CalendarDate::new(2025, 3, 20).expect("valid date")
    }

    fn event(title: &str, kind: EventKind, date: CalendarDate) -> Event {
        Event::new(
            title.to_string(),
            kind,
            date,
            NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            30,
        )
    }

    #[test]
    fn empty_selection_matches_everything() {
        let selection = FilterSelection::default();
        assert!(selection.is_unrestricted());
        assert!(selection.matches(&event("Phone screen", EventKind::Screening, today())));
    }

    #[test]
    fn kind_terms_accumulate_into_a_set() {
        let terms = vec!["type:interview".to_string(), "type:meeting".to_string()];
        let selection = FilterSelection::parse(&terms, today()).expect("parse");

        assert!(selection.matches(&event("a", EventKind::Interview, today())));
        assert!(selection.matches(&event("b", EventKind::Meeting, today())));
        assert!(!selection.matches(&event("c", EventKind::Screening, today())));
    }

    #[test]
    fn open_ended_from_bound_is_unbounded_above() {
        let terms = vec!["from:2025-04-20".to_string()];
        let selection = FilterSelection::parse(&terms, today()).expect("parse");

        let far_future = CalendarDate::new(2031, 0, 1).expect("valid date");
        assert!(selection.matches(&event("a", EventKind::Call, far_future)));

        let before = CalendarDate::new(2025, 3, 19).expect("valid date");
        assert!(!selection.matches(&event("b", EventKind::Call, before)));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let terms = vec!["from:2025-04-10".to_string(), "to:2025-04-20".to_string()];
        let selection = FilterSelection::parse(&terms, today()).expect("parse");

        let on_from = CalendarDate::new(2025, 3, 10).expect("valid date");
        let on_to = CalendarDate::new(2025, 3, 20).expect("valid date");
        let after = CalendarDate::new(2025, 3, 21).expect("valid date");
        assert!(selection.matches(&event("a", EventKind::Task, on_from)));
        assert!(selection.matches(&event("b", EventKind::Task, on_to)));
        assert!(!selection.matches(&event("c", EventKind::Task, after)));
    }

    #[test]
    fn text_terms_match_titles_case_insensitively() {
        let terms = vec!["reyes".to_string()];
        let selection = FilterSelection::parse(&terms, today()).expect("parse");

        assert!(selection.matches(&event("Onsite: Dana Reyes", EventKind::Interview, today())));
        assert!(!selection.matches(&event("Weekly sync", EventKind::Internal, today())));
    }

    #[test]
    fn relative_date_values_resolve_against_today() {
        let terms = vec!["from:today".to_string(), "to:+7d".to_string()];
        let selection = FilterSelection::parse(&terms, today()).expect("parse");
        assert_eq!(selection.from, Some(today()));
        assert_eq!(
            selection.to.map(|d| d.date_key()),
            Some("2025-04-27".to_string())
        );
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let terms = vec!["type:standup".to_string()];
        assert!(FilterSelection::parse(&terms, today()).is_err());
    }
}

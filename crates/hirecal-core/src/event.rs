use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarDate;

/// Canonical event kinds. The upstream dashboards used two overlapping
/// enums; this is their union, with `followup` covering both "follow-up"
/// and "follow up" spellings on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Interview,
    Screening,
    Meeting,
    Call,
    Followup,
    Internal,
    Task,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Interview,
        EventKind::Screening,
        EventKind::Meeting,
        EventKind::Call,
        EventKind::Followup,
        EventKind::Internal,
        EventKind::Task,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventKind::Interview => "interview",
            EventKind::Screening => "screening",
            EventKind::Meeting => "meeting",
            EventKind::Call => "call",
            EventKind::Followup => "followup",
            EventKind::Internal => "internal",
            EventKind::Task => "task",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EventKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interview" => Ok(EventKind::Interview),
            "screening" | "screen" => Ok(EventKind::Screening),
            "meeting" => Ok(EventKind::Meeting),
            "call" => Ok(EventKind::Call),
            "followup" | "follow-up" | "follow_up" => Ok(EventKind::Followup),
            "internal" => Ok(EventKind::Internal),
            "task" => Ok(EventKind::Task),
            other => Err(anyhow!(
                "unknown event type: {other} (expected one of interview, screening, \
                 meeting, call, followup, internal, task)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,

    pub title: String,

    #[serde(rename = "type")]
    pub kind: EventKind,

    pub date: CalendarDate,

    #[serde(with = "clock_time_serde")]
    pub start_time: NaiveTime,

    pub duration_minutes: u32,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub attendees: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Event {
    pub fn new(
        title: String,
        kind: EventKind,
        date: CalendarDate,
        start_time: NaiveTime,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            kind,
            date,
            start_time,
            duration_minutes,
            location: None,
            attendees: vec![],
            description: None,
        }
    }
}

/// Serializes times in the `HH:MM` form the event files use.
pub mod clock_time_serde {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

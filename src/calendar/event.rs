use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single calendar entry, stored exactly as the editor produced it.
///
/// Times are naive wall-clock values, matching what the form collects.
/// An absent `end` marks the event as all-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub organizer: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub status: EventStatus,
    pub categories: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: u8,
    pub url: Option<String>,
}

pub(crate) fn default_priority() -> u8 {
    5
}

impl Event {
    pub fn is_all_day(&self) -> bool {
        self.end.is_none()
    }

    /// Whether the event touches the given date. Events with an end spanning
    /// several days show up on each of them. An end falling exactly on a
    /// midnight is exclusive, so the event stops the night before.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        let first = self.start.date();
        let last = match self.end {
            Some(end) if end > self.start && end.time() == NaiveTime::MIN => {
                end.date().pred_opt().unwrap_or(first)
            }
            Some(end) => end.date(),
            None => first,
        };
        date == first || (first <= date && date <= last)
    }

    pub fn time_display(&self) -> String {
        match self.end {
            None => "All day".to_string(),
            Some(end) if end.date() == self.start.date() => {
                format!("{} - {}", self.start.format("%H:%M"), end.format("%H:%M"))
            }
            Some(end) => format!(
                "{} - {}",
                self.start.format("%H:%M"),
                end.format("%b %d %H:%M")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Tentative => "TENTATIVE",
            EventStatus::Cancelled => "CANCELLED",
        }
    }

    /// Cycle order used by the form's status field.
    pub fn next(self) -> Self {
        match self {
            EventStatus::Confirmed => EventStatus::Tentative,
            EventStatus::Tentative => EventStatus::Cancelled,
            EventStatus::Cancelled => EventStatus::Confirmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn missing_optional_fields_deserialize_with_defaults() {
        let json = r#"{
            "id": "a1",
            "summary": "Standup",
            "description": null,
            "location": null,
            "start": "2026-04-07T09:00:00",
            "end": null,
            "organizer": null,
            "categories": null,
            "url": null
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.status, EventStatus::Confirmed);
        assert_eq!(event.priority, 5);
        assert!(event.attendees.is_empty());
        assert!(event.is_all_day());
    }

    #[test]
    fn status_serializes_as_uppercase_words() {
        let json = serde_json::to_string(&EventStatus::Tentative).unwrap();
        assert_eq!(json, "\"TENTATIVE\"");
        let back: EventStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, EventStatus::Cancelled);
    }

    #[test]
    fn multi_day_event_occurs_on_every_spanned_date() {
        let event = Event {
            id: "a2".into(),
            summary: "Offsite".into(),
            description: None,
            location: None,
            start: dt(2026, 5, 4, 9, 0),
            end: Some(dt(2026, 5, 6, 17, 0)),
            organizer: None,
            attendees: Vec::new(),
            status: EventStatus::Confirmed,
            categories: None,
            priority: 5,
            url: None,
        };
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 5, 5).unwrap()));
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 5, 6).unwrap()));
        assert!(!event.occurs_on(NaiveDate::from_ymd_opt(2026, 5, 7).unwrap()));
    }

    #[test]
    fn event_ending_at_midnight_excludes_that_date() {
        let mut event = Event {
            id: "a4".into(),
            summary: "Conference".into(),
            description: None,
            location: None,
            start: dt(2026, 7, 4, 0, 0),
            end: Some(dt(2026, 7, 6, 0, 0)),
            organizer: None,
            attendees: Vec::new(),
            status: EventStatus::Confirmed,
            categories: None,
            priority: 5,
            url: None,
        };
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 7, 4).unwrap()));
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 7, 5).unwrap()));
        assert!(!event.occurs_on(NaiveDate::from_ymd_opt(2026, 7, 6).unwrap()));

        // A late evening ending on the stroke of midnight stays on its day.
        event.start = dt(2026, 7, 4, 20, 0);
        event.end = Some(dt(2026, 7, 5, 0, 0));
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 7, 4).unwrap()));
        assert!(!event.occurs_on(NaiveDate::from_ymd_opt(2026, 7, 5).unwrap()));
    }

    #[test]
    fn all_day_event_occurs_only_on_its_start_date() {
        let event = Event {
            id: "a3".into(),
            summary: "Birthday".into(),
            description: None,
            location: None,
            start: dt(2026, 5, 4, 0, 0),
            end: None,
            organizer: None,
            attendees: Vec::new(),
            status: EventStatus::Confirmed,
            categories: None,
            priority: 5,
            url: None,
        };
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
        assert!(!event.occurs_on(NaiveDate::from_ymd_opt(2026, 5, 5).unwrap()));
        assert_eq!(event.time_display(), "All day");
    }
}

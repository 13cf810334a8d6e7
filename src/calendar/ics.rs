//! Mapping between the event list and iCalendar text.
//!
//! Export renders every stored record as a `VEVENT` inside one `VCALENDAR`;
//! parse is the reverse, tolerant of documents written by other programs.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use icalendar::parser::{self, read_calendar, unfold};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};
use thiserror::Error;

use super::event::{default_priority, Event, EventStatus};

/// The single fixed file name both export and import use.
pub const CALENDAR_FILE: &str = "calendar.ics";

const DATE_FORMAT: &str = "%Y%m%d";
const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Raised when the event list cannot be carried in iCalendar text.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("event \"{summary}\" ends before it starts")]
    EndBeforeStart { summary: String },
    #[error("event \"{summary}\" falls outside the year range the format can hold")]
    YearOutOfRange { summary: String },
    #[error("not an iCalendar document: {0}")]
    Parse(String),
}

/// Render the whole event list as a single iCalendar document.
pub fn export_calendar(events: &[Event]) -> Result<String, FormatError> {
    let mut cal = Calendar::new();
    for event in events {
        cal.push(to_vevent(event)?);
    }
    let cal = cal.done();
    Ok(tidy_output(&cal.to_string()))
}

fn to_vevent(event: &Event) -> Result<icalendar::Event, FormatError> {
    check_encodable(event)?;

    let mut vevent = icalendar::Event::new();
    vevent.uid(&event.id);
    vevent.summary(&event.summary);

    // DTSTAMP is required by RFC 5545.
    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    vevent.add_property("DTSTAMP", dtstamp);

    match event.end {
        // All-day events carry a bare date and no DTEND.
        None => add_date_property(&mut vevent, "DTSTART", event.start.date()),
        Some(end) => {
            vevent.add_property("DTSTART", event.start.format(DATETIME_FORMAT).to_string());
            vevent.add_property("DTEND", end.format(DATETIME_FORMAT).to_string());
        }
    }

    if let Some(ref description) = event.description {
        vevent.description(description);
    }
    if let Some(ref location) = event.location {
        vevent.location(location);
    }

    // CONFIRMED is the implied default; only deviations are written.
    match event.status {
        EventStatus::Confirmed => {}
        status => {
            vevent.add_property("STATUS", status.as_str());
        }
    }

    if let Some(ref organizer) = event.organizer {
        vevent.append_property(Property::new("ORGANIZER", format!("mailto:{}", organizer)));
    }
    for attendee in &event.attendees {
        vevent.append_multi_property(Property::new("ATTENDEE", format!("mailto:{}", attendee)));
    }

    if let Some(ref categories) = event.categories {
        vevent.add_property("CATEGORIES", categories.as_str());
    }
    if event.priority != default_priority() {
        vevent.add_property("PRIORITY", event.priority.to_string());
    }
    if let Some(ref url) = event.url {
        vevent.add_property("URL", url.as_str());
    }

    Ok(vevent.done())
}

fn check_encodable(event: &Event) -> Result<(), FormatError> {
    if let Some(end) = event.end {
        if end < event.start {
            return Err(FormatError::EndBeforeStart {
                summary: event.summary.clone(),
            });
        }
        if !(0..=9999).contains(&end.year()) {
            return Err(FormatError::YearOutOfRange {
                summary: event.summary.clone(),
            });
        }
    }
    if !(0..=9999).contains(&event.start.year()) {
        return Err(FormatError::YearOutOfRange {
            summary: event.summary.clone(),
        });
    }
    Ok(())
}

fn add_date_property(vevent: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format(DATE_FORMAT).to_string());
    prop.append_parameter(ValueType::Date);
    vevent.append_property(prop);
}

/// The icalendar crate stamps its own PRODID and a default CALSCALE; swap in
/// ours and drop the redundant line.
fn tidy_output(ics: &str) -> String {
    let mut out = String::with_capacity(ics.len());
    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            out.push_str("PRODID:DATEBOOK\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}

/// Read events back out of iCalendar text.
pub fn parse_calendar(content: &str) -> Result<Vec<Event>, FormatError> {
    let unfolded = unfold(content);
    let document =
        read_calendar(&unfolded).map_err(|err| FormatError::Parse(err.to_string()))?;
    // The parser reads stray text as an empty document; without the calendar
    // wrapper that is garbage, not an empty calendar.
    if document.components.is_empty() && !unfolded.contains("BEGIN:VCALENDAR") {
        return Err(FormatError::Parse("no BEGIN:VCALENDAR block".to_string()));
    }

    let mut events = Vec::new();
    for component in &document.components {
        if component.name == "VEVENT" {
            if let Some(event) = parse_vevent(component) {
                events.push(event);
            }
        }
    }
    Ok(events)
}

/// Pull one event out of a VEVENT block. Blocks without a UID or a readable
/// DTSTART are skipped, matching the store's tolerance for partial state.
fn parse_vevent(vevent: &parser::Component) -> Option<Event> {
    let id = vevent.find_prop("UID")?.val.to_string();
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| "(untitled)".to_string());

    let (start, mut end) = match parse_ics_time(vevent.find_prop("DTSTART")?.val.as_ref())? {
        IcsTime::Date(d) => (d.and_hms_opt(0, 0, 0)?, None),
        IcsTime::DateTime(dt) => (dt, None),
    };
    if let Some(prop) = vevent.find_prop("DTEND") {
        match parse_ics_time(prop.val.as_ref()) {
            Some(IcsTime::DateTime(dt)) => end = Some(dt),
            // A bare-date DTEND is exclusive; a span of exactly one day is
            // this model's all-day event and keeps its end absent.
            Some(IcsTime::Date(d)) => {
                if start.date().succ_opt() != Some(d) {
                    end = d.and_hms_opt(0, 0, 0);
                }
            }
            None => {}
        }
    }

    let status = vevent
        .find_prop("STATUS")
        .map(|p| match p.val.as_ref() {
            "TENTATIVE" => EventStatus::Tentative,
            "CANCELLED" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        })
        .unwrap_or_default();

    let attendees = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .map(|p| strip_mailto(p.val.as_ref()).to_string())
        .collect();

    Some(Event {
        id,
        summary,
        description: vevent.find_prop("DESCRIPTION").map(|p| p.val.to_string()),
        location: vevent.find_prop("LOCATION").map(|p| p.val.to_string()),
        start,
        end,
        organizer: vevent
            .find_prop("ORGANIZER")
            .map(|p| strip_mailto(p.val.as_ref()).to_string()),
        attendees,
        status,
        categories: vevent.find_prop("CATEGORIES").map(|p| p.val.to_string()),
        priority: vevent
            .find_prop("PRIORITY")
            .and_then(|p| p.val.as_ref().parse().ok())
            .unwrap_or_else(default_priority),
        url: vevent.find_prop("URL").map(|p| p.val.to_string()),
    })
}

enum IcsTime {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// DATE values are eight digits; DATE-TIME adds a time part and possibly a
/// UTC marker. Zoned and UTC times are read as wall-clock values.
fn parse_ics_time(raw: &str) -> Option<IcsTime> {
    let raw = raw.trim_end_matches('Z');
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
        return Some(IcsTime::DateTime(dt));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(IcsTime::Date)
}

fn strip_mailto(value: &str) -> &str {
    value
        .strip_prefix("mailto:")
        .or_else(|| value.strip_prefix("MAILTO:"))
        .unwrap_or(value)
}

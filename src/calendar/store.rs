use std::fs;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use color_eyre::Result;

use super::event::Event;

const STORE_FILE: &str = "events.json";

/// The persistent event collection: an ordered list of records mirrored to a
/// JSON file. Every mutation rewrites the file before returning, so the store
/// on disk always matches the store in memory.
pub struct EventStore {
    path: PathBuf,
    events: Vec<Event>,
}

impl EventStore {
    /// Open the store at the per-user default location.
    pub fn open_default() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datebook");
        Self::open(dir.join(STORE_FILE))
    }

    /// Open a store backed by the given file. Missing or unreadable state
    /// yields an empty store, never a startup failure.
    pub fn open(path: PathBuf) -> Self {
        let events = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(events) => events,
                Err(err) => {
                    eprintln!(
                        "warning: ignoring unreadable event data in {}: {}",
                        path.display(),
                        err
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Insert the event, or replace the record sharing its id in place.
    /// Other records keep their relative order.
    pub fn upsert(&mut self, event: Event) -> Result<()> {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => *slot = event,
            None => self.events.push(event),
        }
        self.persist()
    }

    pub fn remove(&mut self, id: &str) -> Result<Option<Event>> {
        let removed = self
            .events
            .iter()
            .position(|e| e.id == id)
            .map(|i| self.events.remove(i));
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.occurs_on(date))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    pub fn has_events_on(&self, date: NaiveDate) -> bool {
        self.events.iter().any(|e| e.occurs_on(date))
    }

    pub fn events_in_year(&self, year: i32) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.start.date().year() == year)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    /// Rewrite the backing file with the current record list.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.events)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::EventStatus;
    use chrono::NaiveDate;

    fn sample(id: &str, summary: &str, y: i32, m: u32, d: u32) -> Event {
        Event {
            id: id.to_string(),
            summary: summary.to_string(),
            description: None,
            location: None,
            start: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            end: None,
            organizer: None,
            attendees: Vec::new(),
            status: EventStatus::Confirmed,
            categories: None,
            priority: 5,
            url: None,
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> EventStore {
        EventStore::open(dir.path().join("events.json"))
    }

    #[test]
    fn upsert_inserts_then_replaces_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        store.upsert(sample("a", "First", 2026, 3, 1)).unwrap();
        store.upsert(sample("b", "Second", 2026, 3, 2)).unwrap();
        let mut replacement = sample("a", "First, renamed", 2026, 3, 1);
        replacement.priority = 1;
        store.upsert(replacement).unwrap();

        let events = store.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "a");
        assert_eq!(events[0].summary, "First, renamed");
        assert_eq!(events[0].priority, 1);
        assert_eq!(events[1].id, "b");
    }

    #[test]
    fn persisted_store_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let mut full = sample("a", "Planning", 2026, 6, 15);
        full.description = Some("Quarterly planning".into());
        full.location = Some("Room 2".into());
        full.end = Some(full.start + chrono::Duration::hours(2));
        full.organizer = Some("lead@example.com".into());
        full.attendees = vec!["a@example.com".into(), "b@example.com".into()];
        full.status = EventStatus::Tentative;
        full.categories = Some("work".into());
        full.priority = 2;
        full.url = Some("https://example.com/agenda".into());

        let mut store = EventStore::open(path.clone());
        store.upsert(full.clone()).unwrap();
        store.upsert(sample("b", "Dentist", 2026, 6, 16)).unwrap();
        let saved = store.events().to_vec();

        let reloaded = EventStore::open(path);
        assert_eq!(reloaded.events(), saved.as_slice());
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.events().is_empty());
    }

    #[test]
    fn garbage_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "{ this is not an event array").unwrap();
        let store = EventStore::open(path);
        assert!(store.events().is_empty());
    }

    #[test]
    fn remove_deletes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let mut store = EventStore::open(path.clone());
        store.upsert(sample("a", "Keep", 2026, 3, 1)).unwrap();
        store.upsert(sample("b", "Drop", 2026, 3, 2)).unwrap();

        let removed = store.remove("b").unwrap();
        assert_eq!(removed.map(|e| e.summary), Some("Drop".to_string()));
        assert!(store.remove("missing").unwrap().is_none());

        let reloaded = EventStore::open(path);
        assert_eq!(reloaded.events().len(), 1);
        assert_eq!(reloaded.events()[0].id, "a");
    }

    #[test]
    fn range_queries_filter_and_sort_by_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        store.upsert(sample("late", "Late", 2026, 3, 10)).unwrap();
        store.upsert(sample("early", "Early", 2026, 3, 10)).unwrap();
        store.upsert(sample("april", "April", 2026, 4, 1)).unwrap();
        store.upsert(sample("other", "Other year", 2025, 3, 10)).unwrap();

        // Same day, earlier hour.
        let mut early = store.get("early").unwrap().clone();
        early.start = early.start.date().and_hms_opt(7, 30, 0).unwrap();
        store.upsert(early).unwrap();

        let day = store.events_on(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(
            day.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["early", "late"]
        );
        assert!(store.has_events_on(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()));
        assert!(!store.has_events_on(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()));

        let year = store.events_in_year(2026);
        assert_eq!(year.len(), 3);
    }
}

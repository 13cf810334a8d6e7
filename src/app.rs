use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};
use uuid::Uuid;

use crate::calendar::{export_calendar, parse_calendar, Event, EventStore, CALENDAR_FILE};
use crate::components::{EventFormState, FormMode, GridSignal};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Year,
    Month,
    Day,
}

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub focused_date: NaiveDate,
    pub today: NaiveDate,
    pub day_events: Vec<Event>,
    pub days_with_events: HashSet<u32>,
    pub month_counts: [usize; 12],
    pub event_cursor: Option<usize>,
    pub form: Option<EventFormState>,
    pub status_message: Option<String>,
    pub show_help: bool,
    store: EventStore,
}

impl App {
    pub fn new() -> Self {
        Self::with_store(EventStore::open_default())
    }

    pub fn with_store(store: EventStore) -> Self {
        let today = Local::now().date_naive();

        let mut app = Self {
            running: true,
            view_mode: ViewMode::Year,
            focused_date: today,
            today,
            day_events: Vec::new(),
            days_with_events: HashSet::new(),
            month_counts: [0; 12],
            event_cursor: None,
            form: None,
            status_message: None,
            show_help: false,
            store,
        };
        app.refresh();
        app
    }

    pub fn refresh(&mut self) {
        let year = self.focused_date.year();
        let month = self.focused_date.month();

        self.day_events = self.store.events_on(self.focused_date);
        // All-day entries sort ahead of timed ones in the day panel.
        self.day_events.sort_by_key(|e| (!e.is_all_day(), e.start));

        self.days_with_events.clear();
        for day in 1..=days_in_month(year, month) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                if self.store.has_events_on(date) {
                    self.days_with_events.insert(day);
                }
            }
        }

        self.month_counts = [0; 12];
        for event in self.store.events_in_year(year) {
            self.month_counts[event.start.month0() as usize] += 1;
        }

        self.event_cursor = match self.event_cursor {
            Some(i) if !self.day_events.is_empty() => Some(i.min(self.day_events.len() - 1)),
            _ => None,
        };
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.refresh();
    }

    /// Leave the year grid for the month holding the focused cell, landing
    /// on the first of that month.
    pub fn to_month_view(&mut self) {
        let first = NaiveDate::from_ymd_opt(self.focused_date.year(), self.focused_date.month(), 1);
        self.focused_date = first.unwrap_or(self.focused_date);
        self.view_mode = ViewMode::Month;
        self.refresh();
    }

    pub fn next_day(&mut self) {
        self.focused_date = self.focused_date.succ_opt().unwrap_or(self.focused_date);
        self.refresh();
    }

    pub fn prev_day(&mut self) {
        self.focused_date = self.focused_date.pred_opt().unwrap_or(self.focused_date);
        self.refresh();
    }

    pub fn next_month(&mut self) {
        let month = self.focused_date.month();
        let year = self.focused_date.year();
        let (new_year, new_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let day = self.focused_date.day().min(days_in_month(new_year, new_month));
        self.focused_date =
            NaiveDate::from_ymd_opt(new_year, new_month, day).unwrap_or(self.focused_date);
        self.refresh();
    }

    pub fn prev_month(&mut self) {
        let month = self.focused_date.month();
        let year = self.focused_date.year();
        let (new_year, new_month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        let day = self.focused_date.day().min(days_in_month(new_year, new_month));
        self.focused_date =
            NaiveDate::from_ymd_opt(new_year, new_month, day).unwrap_or(self.focused_date);
        self.refresh();
    }

    pub fn next_year(&mut self) {
        let year = self.focused_date.year() + 1;
        let month = self.focused_date.month();
        let day = self.focused_date.day().min(days_in_month(year, month));
        self.focused_date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(self.focused_date);
        self.refresh();
    }

    pub fn prev_year(&mut self) {
        let year = self.focused_date.year() - 1;
        let month = self.focused_date.month();
        let day = self.focused_date.day().min(days_in_month(year, month));
        self.focused_date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(self.focused_date);
        self.refresh();
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.focused_date = self.today;
        self.refresh();
    }

    pub fn select_next(&mut self) {
        if self.day_events.is_empty() {
            self.event_cursor = None;
            return;
        }
        self.event_cursor = Some(match self.event_cursor {
            None => 0,
            Some(i) => (i + 1).min(self.day_events.len() - 1),
        });
    }

    /// Stepping above the first event returns the cursor to date focus.
    pub fn select_prev(&mut self) {
        self.event_cursor = match self.event_cursor {
            None | Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.event_cursor.and_then(|i| self.day_events.get(i))
    }

    /// Enter. In the year grid this activates the month cell; elsewhere it
    /// activates the event under the cursor, or the focused date itself.
    pub fn activate(&mut self) {
        match self.view_mode {
            ViewMode::Year => self.to_month_view(),
            ViewMode::Month | ViewMode::Day => {
                let signal = match self.selected_event() {
                    Some(event) => GridSignal::EventActivated(event.id.clone()),
                    None => GridSignal::DateActivated(self.focused_date),
                };
                self.handle_grid_signal(signal);
            }
        }
    }

    pub fn open_event_form(&mut self) {
        self.handle_grid_signal(GridSignal::DateActivated(self.focused_date));
    }

    pub fn edit_selected(&mut self) {
        let id = match self.selected_event() {
            Some(event) => event.id.clone(),
            None => return,
        };
        self.handle_grid_signal(GridSignal::EventActivated(id));
    }

    pub fn handle_grid_signal(&mut self, signal: GridSignal) {
        match signal {
            GridSignal::DateActivated(date) => {
                self.focused_date = date;
                self.refresh();
                self.form = Some(EventFormState::for_date(date));
            }
            GridSignal::EventActivated(id) => {
                let form = self.store.get(&id).map(EventFormState::from_event);
                if let Some(form) = form {
                    self.form = Some(form);
                }
            }
        }
    }

    pub fn close_event_form(&mut self) {
        self.form = None;
    }

    pub fn submit_event_form(&mut self) {
        let form = match self.form.take() {
            Some(form) => form,
            None => return,
        };

        let id = match form.mode {
            FormMode::Edit(ref id) => id.clone(),
            FormMode::Create => Uuid::new_v4().to_string(),
        };

        match form.build_event(id) {
            Some(event) => {
                let summary = event.summary.clone();
                let date = event.start.date();
                match self.store.upsert(event) {
                    Ok(()) => {
                        self.status_message = Some(format!("Saved \"{}\"", summary));
                        self.focused_date = date;
                    }
                    Err(err) => self.status_message = Some(format!("Save failed: {}", err)),
                }
                self.refresh();
            }
            None => {
                // Keep the form open so the input can be fixed.
                self.status_message = Some("Event needs a summary and readable dates".to_string());
                self.form = Some(form);
            }
        }
    }

    pub fn form_tab(&mut self) {
        if let Some(ref mut form) = self.form {
            form.active_field = form.active_field.next();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(ref mut form) = self.form {
            form.active_field = form.active_field.prev();
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(ref mut form) = self.form {
            form.backspace();
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(ref mut form) = self.form {
            form.input_char(c);
        }
    }

    pub fn delete_selected(&mut self) {
        let id = match self.selected_event() {
            Some(event) => event.id.clone(),
            None => return,
        };
        match self.store.remove(&id) {
            Ok(Some(event)) => {
                self.status_message = Some(format!("Deleted \"{}\"", event.summary));
            }
            Ok(None) => {}
            Err(err) => self.status_message = Some(format!("Delete failed: {}", err)),
        }
        self.refresh();
    }

    pub fn export_ics(&mut self) {
        let path = download_path();
        self.export_to(&path);
    }

    pub fn import_ics(&mut self) {
        let path = download_path();
        self.import_from(&path);
    }

    fn export_to(&mut self, path: &Path) {
        let count = self.store.events().len();
        let ics = match export_calendar(self.store.events()) {
            Ok(ics) => ics,
            Err(err) => {
                self.status_message = Some(format!("Export failed: {}", err));
                return;
            }
        };
        match fs::write(path, ics) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Exported {} event{} to {}",
                    count,
                    if count == 1 { "" } else { "s" },
                    path.display()
                ));
            }
            Err(err) => self.status_message = Some(format!("Export failed: {}", err)),
        }
    }

    fn import_from(&mut self, path: &Path) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                self.status_message = Some(format!("Nothing to import at {}", path.display()));
                return;
            }
        };
        let events = match parse_calendar(&content) {
            Ok(events) => events,
            Err(err) => {
                self.status_message = Some(format!("Import failed: {}", err));
                return;
            }
        };

        let count = events.len();
        for event in events {
            if let Err(err) = self.store.upsert(event) {
                self.status_message = Some(format!("Import failed: {}", err));
                self.refresh();
                return;
            }
        }
        self.status_message = Some(format!(
            "Imported {} event{}",
            count,
            if count == 1 { "" } else { "s" }
        ));
        self.refresh();
    }
}

fn download_path() -> PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CALENDAR_FILE)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::EventStatus;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path().join("events.json"));
        (App::with_store(store), dir)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timed(id: &str, summary: &str, day: NaiveDate) -> Event {
        Event {
            id: id.to_string(),
            summary: summary.to_string(),
            description: None,
            location: None,
            start: day.and_hms_opt(9, 0, 0).unwrap(),
            end: day.and_hms_opt(10, 0, 0),
            organizer: None,
            attendees: Vec::new(),
            status: EventStatus::Confirmed,
            categories: None,
            priority: 5,
            url: None,
        }
    }

    fn type_into(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form_input_char(c);
        }
    }

    #[test]
    fn starts_in_year_view_focused_on_today() {
        let (app, _dir) = test_app();
        assert_eq!(app.view_mode, ViewMode::Year);
        assert_eq!(app.focused_date, app.today);
        assert!(app.form.is_none());
    }

    #[test]
    fn month_forward_then_back_returns_to_the_same_month() {
        let (mut app, _dir) = test_app();

        app.focused_date = date(2026, 3, 15);
        app.next_month();
        assert_eq!(app.focused_date, date(2026, 4, 15));
        app.prev_month();
        assert_eq!(app.focused_date, date(2026, 3, 15));

        // Short months clamp the day but keep the month round trip intact.
        app.focused_date = date(2026, 1, 31);
        app.next_month();
        assert_eq!(app.focused_date, date(2026, 2, 28));
        app.prev_month();
        assert_eq!(app.focused_date.month(), 1);
        assert_eq!(app.focused_date.year(), 2026);
    }

    #[test]
    fn december_to_january_crosses_the_year() {
        let (mut app, _dir) = test_app();
        app.focused_date = date(2026, 12, 10);
        app.next_month();
        assert_eq!(app.focused_date, date(2027, 1, 10));
        app.prev_month();
        assert_eq!(app.focused_date, date(2026, 12, 10));
    }

    #[test]
    fn month_cell_activation_lands_on_the_first_of_month() {
        let (mut app, _dir) = test_app();
        app.focused_date = date(2026, 7, 15);
        assert_eq!(app.view_mode, ViewMode::Year);

        app.activate();
        assert_eq!(app.view_mode, ViewMode::Month);
        assert_eq!(app.focused_date, date(2026, 7, 1));
    }

    #[test]
    fn date_activation_then_save_creates_exactly_one_event() {
        let (mut app, _dir) = test_app();

        app.handle_grid_signal(GridSignal::DateActivated(date(2026, 3, 9)));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.mode, FormMode::Create);
        assert_eq!(form.start_date, "2026-03-09");

        type_into(&mut app, "Meeting");
        app.submit_event_form();

        assert!(app.form.is_none());
        assert_eq!(app.store.events().len(), 1);
        let saved = &app.store.events()[0];
        assert_eq!(saved.summary, "Meeting");
        assert_eq!(saved.start.date(), date(2026, 3, 9));
        assert!(saved.is_all_day());

        assert_eq!(app.focused_date, date(2026, 3, 9));
        assert_eq!(app.day_events.len(), 1);
        assert!(app.days_with_events.contains(&9));
    }

    #[test]
    fn saving_an_edit_updates_instead_of_duplicating() {
        let (mut app, _dir) = test_app();
        app.handle_grid_signal(GridSignal::DateActivated(date(2026, 3, 9)));
        type_into(&mut app, "Meeting");
        app.submit_event_form();
        let id = app.store.events()[0].id.clone();

        app.handle_grid_signal(GridSignal::EventActivated(id.clone()));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.mode, FormMode::Edit(id.clone()));
        assert_eq!(form.summary, "Meeting");

        type_into(&mut app, " v2");
        app.submit_event_form();

        assert_eq!(app.store.events().len(), 1);
        assert_eq!(app.store.events()[0].summary, "Meeting v2");
        assert_eq!(app.store.events()[0].id, id);
    }

    #[test]
    fn cursor_walks_the_day_list_and_back_to_date_focus() {
        let (mut app, _dir) = test_app();
        let day = date(2026, 3, 9);
        app.store.upsert(timed("a", "First", day)).unwrap();
        app.store.upsert(timed("b", "Second", day)).unwrap();
        app.focused_date = day;
        app.refresh();

        assert_eq!(app.event_cursor, None);
        app.select_next();
        assert_eq!(app.selected_event().unwrap().id, "a");
        app.select_next();
        assert_eq!(app.selected_event().unwrap().id, "b");
        app.select_next();
        assert_eq!(app.selected_event().unwrap().id, "b");
        app.select_prev();
        app.select_prev();
        assert_eq!(app.event_cursor, None);
    }

    #[test]
    fn deleting_the_selected_event_empties_the_day() {
        let (mut app, _dir) = test_app();
        let day = date(2026, 3, 9);
        app.store.upsert(timed("a", "Meeting", day)).unwrap();
        app.focused_date = day;
        app.refresh();

        app.select_next();
        app.delete_selected();

        assert!(app.store.events().is_empty());
        assert!(app.day_events.is_empty());
        assert_eq!(app.event_cursor, None);
        assert!(app.status_message.as_deref().unwrap().starts_with("Deleted"));
    }

    #[test]
    fn invalid_form_stays_open_for_fixing() {
        let (mut app, _dir) = test_app();
        app.open_event_form();
        app.submit_event_form();

        assert!(app.form.is_some(), "form should survive a refused save");
        assert!(app.store.events().is_empty());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn export_failure_writes_no_file() {
        let (mut app, dir) = test_app();
        let mut bad = timed("a", "Backwards", date(2026, 3, 9));
        bad.end = date(2026, 3, 9).and_hms_opt(8, 0, 0);
        app.store.upsert(bad).unwrap();

        let path = dir.path().join("calendar.ics");
        app.export_to(&path);

        assert!(!path.exists(), "failed export must not leave a file behind");
        assert!(app.status_message.as_deref().unwrap().starts_with("Export failed"));
    }

    #[test]
    fn export_then_import_round_trips_between_stores() {
        let (mut app, dir) = test_app();
        app.store.upsert(timed("a", "One", date(2026, 3, 9))).unwrap();
        app.store.upsert(timed("b", "Two", date(2026, 4, 1))).unwrap();

        let path = dir.path().join("calendar.ics");
        app.export_to(&path);
        assert!(path.exists());

        let (mut other, _dir2) = test_app();
        other.import_from(&path);
        assert_eq!(other.store.events().len(), 2);
        assert!(other.status_message.as_deref().unwrap().starts_with("Imported 2"));
    }

    #[test]
    fn importing_a_missing_file_only_sets_a_message() {
        let (mut app, dir) = test_app();
        app.import_from(&dir.path().join("nothing-here.ics"));
        assert!(app.store.events().is_empty());
        assert!(app.status_message.is_some());
    }
}

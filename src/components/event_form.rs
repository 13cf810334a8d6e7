use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::calendar::event::default_priority;
use crate::calendar::{Event, EventStatus};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Summary,
    Description,
    Location,
    StartDate,
    StartTime,
    EndDate,
    EndTime,
    Organizer,
    Attendees,
    Status,
    Categories,
    Priority,
    Url,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Summary => FormField::Description,
            FormField::Description => FormField::Location,
            FormField::Location => FormField::StartDate,
            FormField::StartDate => FormField::StartTime,
            FormField::StartTime => FormField::EndDate,
            FormField::EndDate => FormField::EndTime,
            FormField::EndTime => FormField::Organizer,
            FormField::Organizer => FormField::Attendees,
            FormField::Attendees => FormField::Status,
            FormField::Status => FormField::Categories,
            FormField::Categories => FormField::Priority,
            FormField::Priority => FormField::Url,
            FormField::Url => FormField::Summary,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Summary => FormField::Url,
            FormField::Description => FormField::Summary,
            FormField::Location => FormField::Description,
            FormField::StartDate => FormField::Location,
            FormField::StartTime => FormField::StartDate,
            FormField::EndDate => FormField::StartTime,
            FormField::EndTime => FormField::EndDate,
            FormField::Organizer => FormField::EndTime,
            FormField::Attendees => FormField::Organizer,
            FormField::Status => FormField::Attendees,
            FormField::Categories => FormField::Status,
            FormField::Priority => FormField::Categories,
            FormField::Url => FormField::Priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(String),
}

#[derive(Debug, Clone)]
pub struct EventFormState {
    pub mode: FormMode,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub organizer: String,
    pub attendees: String,
    pub status: EventStatus,
    pub categories: String,
    pub priority: String,
    pub url: String,
    pub active_field: FormField,
}

impl EventFormState {
    /// Blank form for a new event on the given day. Only the start date is
    /// filled in; leaving the end fields empty saves an all-day event.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            mode: FormMode::Create,
            summary: String::new(),
            description: String::new(),
            location: String::new(),
            start_date: date.format("%Y-%m-%d").to_string(),
            start_time: String::new(),
            end_date: String::new(),
            end_time: String::new(),
            organizer: String::new(),
            attendees: String::new(),
            status: EventStatus::default(),
            categories: String::new(),
            priority: default_priority().to_string(),
            url: String::new(),
            active_field: FormField::Summary,
        }
    }

    /// Form prefilled from an existing event, keeping its id on save.
    pub fn from_event(event: &Event) -> Self {
        let start_time = if event.is_all_day() && event.start.time() == NaiveTime::MIN {
            String::new()
        } else {
            event.start.format("%H:%M").to_string()
        };
        let (end_date, end_time) = match event.end {
            Some(end) => (
                end.format("%Y-%m-%d").to_string(),
                end.format("%H:%M").to_string(),
            ),
            None => (String::new(), String::new()),
        };

        Self {
            mode: FormMode::Edit(event.id.clone()),
            summary: event.summary.clone(),
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
            start_date: event.start.format("%Y-%m-%d").to_string(),
            start_time,
            end_date,
            end_time,
            organizer: event.organizer.clone().unwrap_or_default(),
            attendees: event.attendees.join(", "),
            status: event.status,
            categories: event.categories.clone().unwrap_or_default(),
            priority: event.priority.to_string(),
            url: event.url.clone().unwrap_or_default(),
            active_field: FormField::Summary,
        }
    }

    pub fn parsed_start(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").ok()?;
        Some(date.and_time(parse_time_or_midnight(&self.start_time)?))
    }

    /// The end fields are optional as a pair; both blank means all-day.
    pub fn wants_end(&self) -> bool {
        !self.end_date.trim().is_empty() || !self.end_time.trim().is_empty()
    }

    /// An end time with no end date falls on the start date.
    pub fn parsed_end(&self) -> Option<NaiveDateTime> {
        let raw_date = if self.end_date.trim().is_empty() {
            self.start_date.trim()
        } else {
            self.end_date.trim()
        };
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").ok()?;
        Some(date.and_time(parse_time_or_midnight(&self.end_time)?))
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Summary => self.summary.push(c),
            FormField::Description => self.description.push(c),
            FormField::Location => self.location.push(c),
            FormField::StartDate => self.start_date.push(c),
            FormField::StartTime => self.start_time.push(c),
            FormField::EndDate => self.end_date.push(c),
            FormField::EndTime => self.end_time.push(c),
            FormField::Organizer => self.organizer.push(c),
            FormField::Attendees => self.attendees.push(c),
            FormField::Categories => self.categories.push(c),
            FormField::Url => self.url.push(c),
            FormField::Priority => {
                // Single digit, 1 (highest) through 9 (lowest).
                if ('1'..='9').contains(&c) {
                    self.priority.clear();
                    self.priority.push(c);
                }
            }
            FormField::Status => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Summary => {
                self.summary.pop();
            }
            FormField::Description => {
                self.description.pop();
            }
            FormField::Location => {
                self.location.pop();
            }
            FormField::StartDate => {
                self.start_date.pop();
            }
            FormField::StartTime => {
                self.start_time.pop();
            }
            FormField::EndDate => {
                self.end_date.pop();
            }
            FormField::EndTime => {
                self.end_time.pop();
            }
            FormField::Organizer => {
                self.organizer.pop();
            }
            FormField::Attendees => {
                self.attendees.pop();
            }
            FormField::Categories => {
                self.categories.pop();
            }
            FormField::Priority => {
                self.priority.pop();
            }
            FormField::Url => {
                self.url.pop();
            }
            FormField::Status => {}
        }
    }

    pub fn cycle_status(&mut self) {
        self.status = self.status.next();
    }

    pub fn is_valid(&self) -> bool {
        let start = match self.parsed_start() {
            Some(start) => start,
            None => return false,
        };
        if self.summary.trim().is_empty() {
            return false;
        }
        if !self.wants_end() {
            return true;
        }
        match self.parsed_end() {
            Some(end) => end >= start,
            None => false,
        }
    }

    /// Turn the buffers into an event, or None while the form is not valid.
    pub fn build_event(&self, id: String) -> Option<Event> {
        if !self.is_valid() {
            return None;
        }
        let start = self.parsed_start()?;
        let end = if self.wants_end() {
            Some(self.parsed_end()?)
        } else {
            None
        };
        let attendees = self
            .attendees
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        Some(Event {
            id,
            summary: self.summary.trim().to_string(),
            description: opt(&self.description),
            location: opt(&self.location),
            start,
            end,
            organizer: opt(&self.organizer),
            attendees,
            status: self.status,
            categories: opt(&self.categories),
            priority: self.priority.trim().parse().unwrap_or_else(|_| default_priority()),
            url: opt(&self.url),
        })
    }
}

fn opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_time_or_midnight(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(NaiveTime::MIN);
    }
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

pub struct EventForm;

impl EventForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &EventFormState) {
        // Center the form popup
        let form_w = area.width.min(56).max(34);
        let form_h = area.height.min(17).max(12);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        // Clear background
        frame.render_widget(Clear, form_area);

        let title = match state.mode {
            FormMode::Create => " New Event ",
            FormMode::Edit(_) => " Edit Event ",
        };
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(ratatui::style::Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ratatui::style::Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let mut constraints = vec![Constraint::Length(1); 13];
        constraints.push(Constraint::Length(1)); // spacer
        constraints.push(Constraint::Length(1)); // help
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(inner);

        let active = state.active_field;
        render_field(frame, rows[0], "Summary:", &state.summary, active == FormField::Summary);
        render_field(frame, rows[1], "Details:", &state.description, active == FormField::Description);
        render_field(frame, rows[2], "Location:", &state.location, active == FormField::Location);
        render_field(frame, rows[3], "Start date:", &state.start_date, active == FormField::StartDate);
        render_field(frame, rows[4], "Start time:", &state.start_time, active == FormField::StartTime);
        render_field(frame, rows[5], "End date:", &state.end_date, active == FormField::EndDate);
        render_field(frame, rows[6], "End time:", &state.end_time, active == FormField::EndTime);
        render_field(frame, rows[7], "Organizer:", &state.organizer, active == FormField::Organizer);
        render_field(frame, rows[8], "Attendees:", &state.attendees, active == FormField::Attendees);

        let status_val = format!("{} (Space cycles)", state.status.as_str());
        render_field(frame, rows[9], "Status:", &status_val, active == FormField::Status);

        render_field(frame, rows[10], "Categories:", &state.categories, active == FormField::Categories);
        render_field(frame, rows[11], "Priority:", &state.priority, active == FormField::Priority);
        render_field(frame, rows[12], "URL:", &state.url, active == FormField::Url);

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[14]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<12}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

use chrono::NaiveDate;

pub mod day_view;
pub mod event_form;
pub mod month_view;
pub mod year_view;

pub use day_view::DayView;
pub use event_form::{EventForm, EventFormState, FormField, FormMode};
pub use month_view::MonthView;
pub use year_view::YearView;

/// Notification raised by a calendar grid. The grids only report what was
/// activated; the app decides what that means.
#[derive(Debug, Clone, PartialEq)]
pub enum GridSignal {
    /// A day cell was activated with no event under the cursor.
    DateActivated(NaiveDate),
    /// A listed event was activated, identified by its id.
    EventActivated(String),
}

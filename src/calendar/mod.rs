pub mod event;
pub mod ics;
pub mod store;

pub use event::{Event, EventStatus};
pub use ics::{export_calendar, parse_calendar, CALENDAR_FILE};
pub use store::EventStore;

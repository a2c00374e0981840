use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SLOT_MINUTES: i64 = 30;
pub const DEFAULT_MEETING_MINUTES: i64 = 30;
// Tool arguments come from the model, so the duration needs a sane
// upper bound before it reaches the time arithmetic.
pub const MAX_MEETING_MINUTES: i64 = 24 * 60;

// Constructed per call, never persisted here; the external calendar owns
// the durable copy.
#[derive(Debug, Clone)]
pub struct MeetingRequest {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    // Strict overlap: a boundary touch does not count.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Free,
    Busy { conflicts: Vec<CalendarEvent> },
}

// What the calendar accessor hands back after an insert. Conflicts are
// flagged, not blocked; the front-end decides what to tell the user.
#[derive(Debug, Clone)]
pub struct ScheduleConfirmation {
    pub event: CalendarEvent,
    pub conflicts: Vec<CalendarEvent>,
}

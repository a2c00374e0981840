use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use meetingBot::clients::calendar_client::CalendarApi;
use meetingBot::models::contact::ContactDirectory;
use meetingBot::models::meeting::{Availability, CalendarEvent};
use meetingBot::service::calendar_service::CalendarService;

struct FakeCalendarApi {
    events: Vec<CalendarEvent>,
}

#[async_trait]
impl CalendarApi for FakeCalendarApi {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.start < end && event.end > start)
            .cloned()
            .collect())
    }

    async fn insert_event(
        &self,
        _summary: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _attendee_emails: &[String],
    ) -> Result<CalendarEvent, Box<dyn std::error::Error + Send + Sync>> {
        unreachable!("availability checks must not create events");
    }
}

fn event(id: &str, start: (u32, u32), end: (u32, u32)) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: format!("event {}", id),
        start: Utc.with_ymd_and_hms(2026, 3, 2, start.0, start.1, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 2, end.0, end.1, 0).unwrap(),
    }
}

fn service(events: Vec<CalendarEvent>) -> CalendarService {
    CalendarService::new(
        Arc::new(FakeCalendarApi { events }),
        Arc::new(ContactDirectory::default()),
        chrono_tz::UTC,
    )
}

fn date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn time(hour: u32, minute: u32) -> chrono::NaiveTime {
    chrono::NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[tokio::test]
async fn empty_slot_is_free() {
    let calendar = service(vec![event("e1", (9, 0), (10, 0))]);
    let availability = calendar
        .check_availability(date(), time(14, 0))
        .await
        .unwrap();
    assert_eq!(availability, Availability::Free);
}

#[tokio::test]
async fn overlapping_event_is_busy() {
    let calendar = service(vec![event("e1", (10, 0), (11, 0))]);
    let availability = calendar
        .check_availability(date(), time(10, 15))
        .await
        .unwrap();
    match availability {
        Availability::Busy { conflicts } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].id, "e1");
        }
        Availability::Free => panic!("expected busy"),
    }
}

#[tokio::test]
async fn boundary_touch_is_free() {
    // Existing event ends exactly when the requested slot starts.
    let calendar = service(vec![event("e1", (9, 30), (10, 0))]);
    let availability = calendar
        .check_availability(date(), time(10, 0))
        .await
        .unwrap();
    assert_eq!(availability, Availability::Free);
}

#[tokio::test]
async fn schedule_is_ordered_by_start() {
    let calendar = service(vec![
        event("late", (15, 0), (16, 0)),
        event("early", (9, 0), (9, 30)),
        event("mid", (11, 0), (12, 0)),
    ]);
    let events = calendar.get_schedule(date()).await.unwrap();
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "mid", "late"]);
}

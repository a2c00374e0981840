use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use meetingBot::clients::calendar_client::CalendarApi;
use meetingBot::models::contact::ContactDirectory;
use meetingBot::models::meeting::{CalendarEvent, MeetingRequest};
use meetingBot::service::calendar_service::CalendarService;

#[derive(Debug, Clone)]
struct InsertedEvent {
    summary: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    attendees: Vec<String>,
}

struct RecordingCalendarApi {
    existing: Vec<CalendarEvent>,
    inserted: Mutex<Vec<InsertedEvent>>,
}

impl RecordingCalendarApi {
    fn new(existing: Vec<CalendarEvent>) -> Self {
        Self {
            existing,
            inserted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CalendarApi for RecordingCalendarApi {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .existing
            .iter()
            .filter(|event| event.start < end && event.end > start)
            .cloned()
            .collect())
    }

    async fn insert_event(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attendee_emails: &[String],
    ) -> Result<CalendarEvent, Box<dyn std::error::Error + Send + Sync>> {
        let mut inserted = self.inserted.lock().await;
        inserted.push(InsertedEvent {
            summary: summary.to_string(),
            start,
            end,
            attendees: attendee_emails.to_vec(),
        });
        Ok(CalendarEvent {
            id: format!("created-{}", inserted.len()),
            summary: summary.to_string(),
            start,
            end,
        })
    }
}

fn request(hour: u32, minute: u32, attendees: Vec<&str>) -> MeetingRequest {
    MeetingRequest {
        title: "Project Sync".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        time: chrono::NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        duration_minutes: 30,
        attendees: attendees.into_iter().map(String::from).collect(),
    }
}

fn contacts() -> Arc<ContactDirectory> {
    Arc::new(ContactDirectory::parse("arun=arun@example.com\n"))
}

#[tokio::test]
async fn meeting_created_with_resolved_attendees() {
    let api = Arc::new(RecordingCalendarApi::new(vec![]));
    let calendar = CalendarService::new(api.clone(), contacts(), chrono_tz::UTC);

    let confirmation = calendar
        .schedule_meeting(&request(10, 0, vec!["arun", "guest@example.com"]))
        .await
        .unwrap();

    assert!(confirmation.conflicts.is_empty());
    assert_eq!(confirmation.event.summary, "Project Sync");
    assert_eq!(
        confirmation.event.end - confirmation.event.start,
        Duration::minutes(30)
    );

    let inserted = api.inserted.lock().await;
    assert_eq!(inserted.len(), 1);
    assert_eq!(
        inserted[0].attendees,
        vec!["arun@example.com", "guest@example.com"]
    );
}

#[tokio::test]
async fn overlapping_meeting_is_recorded_and_flagged() {
    let existing = CalendarEvent {
        id: "standup".to_string(),
        summary: "standup".to_string(),
        start: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap(),
    };
    let api = Arc::new(RecordingCalendarApi::new(vec![existing]));
    let calendar = CalendarService::new(api.clone(), contacts(), chrono_tz::UTC);

    let confirmation = calendar
        .schedule_meeting(&request(10, 15, vec![]))
        .await
        .unwrap();

    // The meeting is still created; the conflict is flagged for the user.
    assert_eq!(confirmation.conflicts.len(), 1);
    assert_eq!(confirmation.conflicts[0].id, "standup");
    assert_eq!(api.inserted.lock().await.len(), 1);
}

#[tokio::test]
async fn unknown_attendee_rejected_before_insert() {
    let api = Arc::new(RecordingCalendarApi::new(vec![]));
    let calendar = CalendarService::new(api.clone(), contacts(), chrono_tz::UTC);

    let err = calendar
        .schedule_meeting(&request(10, 0, vec!["nobody"]))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Unknown contact 'nobody'"));
    assert!(err.to_string().contains("arun"));
    assert!(api.inserted.lock().await.is_empty());
}

#[tokio::test]
async fn nonpositive_duration_rejected() {
    let api = Arc::new(RecordingCalendarApi::new(vec![]));
    let calendar = CalendarService::new(api.clone(), contacts(), chrono_tz::UTC);

    let mut bad = request(10, 0, vec![]);
    bad.duration_minutes = 0;
    let err = calendar.schedule_meeting(&bad).await.unwrap_err();
    assert!(err.to_string().contains("duration"));
    assert!(api.inserted.lock().await.is_empty());
}

#[tokio::test]
async fn oversized_duration_rejected() {
    let api = Arc::new(RecordingCalendarApi::new(vec![]));
    let calendar = CalendarService::new(api.clone(), contacts(), chrono_tz::UTC);

    // Durations come straight from tool arguments, so even i64::MAX must
    // come back as an error rather than blowing up the time arithmetic.
    let mut bad = request(10, 0, vec![]);
    bad.duration_minutes = i64::MAX;
    let err = calendar.schedule_meeting(&bad).await.unwrap_err();
    assert!(err.to_string().contains("at most"));
    assert!(api.inserted.lock().await.is_empty());
}

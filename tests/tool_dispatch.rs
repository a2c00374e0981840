use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;

use meetingBot::clients::calendar_client::CalendarApi;
use meetingBot::clients::gmail_client::{MailApi, SendReceipt};
use meetingBot::models::contact::ContactDirectory;
use meetingBot::models::meeting::CalendarEvent;
use meetingBot::service::calendar_service::CalendarService;
use meetingBot::service::groq_service::GroqClient;
use meetingBot::service::mail_service::MailService;
use meetingBot::service::mom_service::MomService;
use meetingBot::service::tools::{ToolCall, ToolDispatcher};

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
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _attendee_emails: &[String],
    ) -> Result<CalendarEvent, Box<dyn std::error::Error + Send + Sync>> {
        Ok(CalendarEvent {
            id: "created-1".to_string(),
            summary: summary.to_string(),
            start,
            end,
        })
    }
}

struct FakeMailApi {
    sent: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl MailApi for FakeMailApi {
    async fn send(
        &self,
        to: &[String],
        _subject: &str,
        _body: &str,
    ) -> Result<SendReceipt, Box<dyn std::error::Error + Send + Sync>> {
        self.sent.lock().await.push(to.to_vec());
        Ok(SendReceipt {
            message_id: "msg-1".to_string(),
            to: to.to_vec(),
        })
    }
}

struct FakeGroq;

#[async_trait]
impl GroqClient for FakeGroq {
    async fn generate_prompt(
        &self,
        _prompt: &str,
        _prompt_type: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok("Agenda\nKey Points\nDecisions\nAction Items".to_string())
    }
}

fn dispatcher(events: Vec<CalendarEvent>) -> (ToolDispatcher, Arc<FakeMailApi>) {
    let contacts = Arc::new(ContactDirectory::parse("arun=arun@example.com\n"));
    let calendar = Arc::new(CalendarService::new(
        Arc::new(FakeCalendarApi { events }),
        contacts.clone(),
        chrono_tz::UTC,
    ));
    let mail_api = Arc::new(FakeMailApi {
        sent: Mutex::new(Vec::new()),
    });
    let mail = Arc::new(MailService::new(mail_api.clone(), contacts));
    let mom = Arc::new(MomService::new(Arc::new(FakeGroq), mail.clone()));
    (ToolDispatcher::new(calendar, mail, mom), mail_api)
}

fn call(name: &str, arguments: Value) -> ToolCall {
    serde_json::from_value(json!({ "name": name, "arguments": arguments })).unwrap()
}

#[tokio::test]
async fn check_availability_reports_free_and_busy() {
    let busy_event = CalendarEvent {
        id: "e1".to_string(),
        summary: "standup".to_string(),
        start: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
    };
    let (tools, _) = dispatcher(vec![busy_event]);

    let free = tools
        .dispatch(&call(
            "check_availability",
            json!({ "date": "2026-03-02", "time": "14:00" }),
        ))
        .await
        .unwrap();
    let free: Value = serde_json::from_str(&free).unwrap();
    assert_eq!(free["status"], "free");

    let busy = tools
        .dispatch(&call(
            "check_availability",
            json!({ "date": "2026-03-02", "time": "10:15" }),
        ))
        .await
        .unwrap();
    let busy: Value = serde_json::from_str(&busy).unwrap();
    assert_eq!(busy["status"], "busy");
    assert_eq!(busy["conflicts"][0]["id"], "e1");
}

#[tokio::test]
async fn schedule_meeting_returns_created_event() {
    let (tools, _) = dispatcher(vec![]);
    let result = tools
        .dispatch(&call(
            "schedule_meeting",
            json!({
                "title": "Planning",
                "date": "2026-03-02",
                "time": "10:00",
                "duration_minutes": 45,
                "attendees": ["arun"],
            }),
        ))
        .await
        .unwrap();
    let result: Value = serde_json::from_str(&result).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["event"]["summary"], "Planning");
    assert_eq!(result["conflicts"], json!([]));
}

#[tokio::test]
async fn send_mom_generates_then_mails() {
    let (tools, mail_api) = dispatcher(vec![]);
    let result = tools
        .dispatch(&call(
            "send_mom",
            json!({ "names": "arun", "transcript": "we agreed on Friday" }),
        ))
        .await
        .unwrap();
    let result: Value = serde_json::from_str(&result).unwrap();
    assert_eq!(result["success"], true);
    assert!(result["mom"].as_str().unwrap().contains("Agenda"));
    assert_eq!(
        *mail_api.sent.lock().await,
        vec![vec!["arun@example.com".to_string()]]
    );
}

#[tokio::test]
async fn unknown_tool_is_an_error() {
    let (tools, _) = dispatcher(vec![]);
    let err = tools
        .dispatch(&call("book_flight", json!({})))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown tool 'book_flight'"));
}

#[tokio::test]
async fn malformed_arguments_are_an_error() {
    let (tools, _) = dispatcher(vec![]);
    let err = tools
        .dispatch(&call("check_availability", json!({ "date": "2026-03-02" })))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid arguments"));

    let bad_date = tools
        .dispatch(&call(
            "check_availability",
            json!({ "date": "March 2nd", "time": "10:00" }),
        ))
        .await
        .unwrap_err();
    assert!(bad_date.to_string().contains("expected YYYY-MM-DD"));
}

#[tokio::test]
async fn absurd_duration_is_an_error_not_a_panic() {
    let (tools, _) = dispatcher(vec![]);
    let err = tools
        .dispatch(&call(
            "schedule_meeting",
            json!({
                "date": "2026-03-02",
                "time": "10:00",
                "duration_minutes": i64::MAX,
            }),
        ))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("at most"));
}

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::clients::google_auth::GoogleAuth;
use crate::models::meeting::CalendarEvent;

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, Box<dyn std::error::Error + Send + Sync>>;

    async fn insert_event(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attendee_emails: &[String],
    ) -> Result<CalendarEvent, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct GoogleCalendarClient {
    auth: Arc<GoogleAuth>,
    http: reqwest::Client,
    timezone: Tz,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: Option<RawEventTime>,
    end: Option<RawEventTime>,
}

#[derive(Debug, Deserialize)]
struct RawEventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<Utc>>,
    // All-day events carry a bare date instead of a dateTime.
    date: Option<chrono::NaiveDate>,
}

impl GoogleCalendarClient {
    pub fn new(auth: Arc<GoogleAuth>, timezone: Tz) -> Self {
        Self {
            auth,
            http: reqwest::Client::new(),
            timezone,
        }
    }

    fn convert(&self, raw: RawEvent) -> Option<CalendarEvent> {
        let start = self.event_instant(raw.start?)?;
        let end = self.event_instant(raw.end?)?;
        Some(CalendarEvent {
            id: raw.id,
            summary: raw.summary.unwrap_or_else(|| "(no title)".to_string()),
            start,
            end,
        })
    }

    fn event_instant(&self, raw: RawEventTime) -> Option<DateTime<Utc>> {
        if let Some(instant) = raw.date_time {
            return Some(instant);
        }
        let date = raw.date?;
        self.timezone
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single()
            .map(|local| local.with_timezone(&Utc))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let token = self.auth.bearer_token().await?;
        let response = self
            .http
            .get(EVENTS_URL)
            .bearer_auth(&token)
            .query(&[
                ("timeMin", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("timeMax", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(format!("Calendar list failed with status {}: {}", status, text).into());
        }

        let parsed: EventList = serde_json::from_str(&text)?;
        Ok(parsed
            .items
            .into_iter()
            .filter_map(|raw| self.convert(raw))
            .collect())
    }

    async fn insert_event(
        &self,
        summary: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attendee_emails: &[String],
    ) -> Result<CalendarEvent, Box<dyn std::error::Error + Send + Sync>> {
        let token = self.auth.bearer_token().await?;
        let attendees: Vec<serde_json::Value> = attendee_emails
            .iter()
            .map(|email| json!({ "email": email }))
            .collect();
        let body = json!({
            "summary": summary,
            "start": { "dateTime": start.to_rfc3339_opts(SecondsFormat::Secs, true) },
            "end": { "dateTime": end.to_rfc3339_opts(SecondsFormat::Secs, true) },
            "attendees": attendees,
        });

        let response = self
            .http
            .post(EVENTS_URL)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(format!("Calendar insert failed with status {}: {}", status, text).into());
        }

        let raw: RawEvent = serde_json::from_str(&text)?;
        self.convert(raw)
            .ok_or_else(|| "Calendar insert response is missing event times".into())
    }
}

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::models::meeting::{
    Availability, CalendarEvent, DEFAULT_MEETING_MINUTES, MeetingRequest,
};
use crate::service::calendar_service::CalendarService;
use crate::service::mail_service::MailService;
use crate::service::mom_service::MomService;

// One call selected by the agent per step: a tool name plus a JSON
// argument object matching that tool's parameter struct.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

pub struct ToolDispatcher {
    calendar: Arc<CalendarService>,
    mail: Arc<MailService>,
    mom: Arc<MomService>,
}

#[derive(Debug, Deserialize)]
struct CheckAvailabilityArgs {
    date: String,
    time: String,
}

#[derive(Debug, Deserialize)]
struct GetScheduleArgs {
    date: String,
}

#[derive(Debug, Deserialize)]
struct ScheduleMeetingArgs {
    #[serde(default = "default_title")]
    title: String,
    date: String,
    time: String,
    #[serde(default = "default_duration")]
    duration_minutes: i64,
    #[serde(default)]
    attendees: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScheduleRelativeArgs {
    #[serde(default = "default_title")]
    title: String,
    time: String,
    #[serde(default = "default_duration")]
    duration_minutes: i64,
    #[serde(default)]
    attendees: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SendEmailArgs {
    to: Vec<String>,
    subject: String,
    body: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailToPersonArgs {
    name: String,
    #[serde(default = "default_subject")]
    subject: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct GenerateMomArgs {
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct SendMomArgs {
    names: String,
    transcript: String,
}

fn default_title() -> String {
    "Meeting".to_string()
}

fn default_duration() -> i64 {
    DEFAULT_MEETING_MINUTES
}

fn default_subject() -> String {
    "Meeting Invitation".to_string()
}

impl ToolDispatcher {
    pub fn new(
        calendar: Arc<CalendarService>,
        mail: Arc<MailService>,
        mom: Arc<MomService>,
    ) -> Self {
        Self {
            calendar,
            mail,
            mom,
        }
    }

    // Rendered into the tool-selection prompt; the agent may only pick
    // from this list.
    pub fn catalog() -> &'static str {
        "Available tools (call each at most once per user request):\n\
         - check_availability(date: \"YYYY-MM-DD\", time: \"HH:MM\"): report free or busy for a 30-minute slot\n\
         - get_schedule(date: \"YYYY-MM-DD\"): list the day's events in start order\n\
         - schedule_meeting(title, date: \"YYYY-MM-DD\", time: \"HH:MM\", duration_minutes, attendees: [names or emails]): create a calendar event\n\
         - schedule_meeting_today(title, time: \"HH:MM\", duration_minutes, attendees): create an event today\n\
         - schedule_meeting_tomorrow(title, time: \"HH:MM\", duration_minutes, attendees): create an event tomorrow\n\
         - send_email(to: [emails or names], subject, body): send an email\n\
         - send_email_to_person(name, subject, body): send an email, looking the address up in the contact directory\n\
         - generate_mom(transcript): turn a meeting transcript into Minutes of Meeting\n\
         - send_mom(names: \"comma,separated\", transcript): generate the MoM and email it to the participants"
    }

    pub async fn dispatch(
        &self,
        call: &ToolCall,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        match call.name.as_str() {
            "check_availability" => {
                let args: CheckAvailabilityArgs = parse_args(&call.arguments)?;
                let availability = self
                    .calendar
                    .check_availability(parse_date(&args.date)?, parse_time(&args.time)?)
                    .await?;
                Ok(availability_json(&availability))
            }
            "get_schedule" => {
                let args: GetScheduleArgs = parse_args(&call.arguments)?;
                let events = self.calendar.get_schedule(parse_date(&args.date)?).await?;
                Ok(json!({
                    "date": args.date,
                    "events": events.iter().map(event_json).collect::<Vec<Value>>(),
                })
                .to_string())
            }
            "schedule_meeting" => {
                let args: ScheduleMeetingArgs = parse_args(&call.arguments)?;
                let request = MeetingRequest {
                    title: args.title,
                    date: parse_date(&args.date)?,
                    time: parse_time(&args.time)?,
                    duration_minutes: args.duration_minutes,
                    attendees: args.attendees,
                };
                self.schedule(&request).await
            }
            "schedule_meeting_today" => {
                let args: ScheduleRelativeArgs = parse_args(&call.arguments)?;
                let request = MeetingRequest {
                    title: args.title,
                    date: self.calendar.today(),
                    time: parse_time(&args.time)?,
                    duration_minutes: args.duration_minutes,
                    attendees: args.attendees,
                };
                self.schedule(&request).await
            }
            "schedule_meeting_tomorrow" => {
                let args: ScheduleRelativeArgs = parse_args(&call.arguments)?;
                let request = MeetingRequest {
                    title: args.title,
                    date: self.calendar.tomorrow(),
                    time: parse_time(&args.time)?,
                    duration_minutes: args.duration_minutes,
                    attendees: args.attendees,
                };
                self.schedule(&request).await
            }
            "send_email" => {
                let args: SendEmailArgs = parse_args(&call.arguments)?;
                let receipt = self
                    .mail
                    .send_email(&args.to, &args.subject, &args.body)
                    .await?;
                Ok(json!({
                    "success": true,
                    "message": format!("Email sent to {}", receipt.to.join(", ")),
                    "id": receipt.message_id,
                })
                .to_string())
            }
            "send_email_to_person" => {
                let args: SendEmailToPersonArgs = parse_args(&call.arguments)?;
                let receipt = self
                    .mail
                    .send_email_to_person(&args.name, &args.subject, &args.body)
                    .await?;
                Ok(json!({
                    "success": true,
                    "message": format!("Email sent to {}", receipt.to.join(", ")),
                    "id": receipt.message_id,
                })
                .to_string())
            }
            "generate_mom" => {
                let args: GenerateMomArgs = parse_args(&call.arguments)?;
                let mom = self.mom.generate_mom(&args.transcript).await?;
                Ok(json!({ "success": true, "mom": mom }).to_string())
            }
            "send_mom" => {
                let args: SendMomArgs = parse_args(&call.arguments)?;
                let delivery = self.mom.send_mom(&args.names, &args.transcript).await?;
                Ok(json!({
                    "success": true,
                    "mom": delivery.mom,
                    "message": format!("MoM sent to {}", delivery.receipt.to.join(", ")),
                })
                .to_string())
            }
            other => Err(format!("Unknown tool '{}'", other).into()),
        }
    }

    async fn schedule(
        &self,
        request: &MeetingRequest,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let confirmation = self.calendar.schedule_meeting(request).await?;
        Ok(json!({
            "success": true,
            "event": event_json(&confirmation.event),
            "conflicts": confirmation.conflicts.iter().map(event_json).collect::<Vec<Value>>(),
        })
        .to_string())
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    arguments: &Value,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    serde_json::from_value(arguments.clone()).map_err(|e| format!("Invalid arguments: {}", e).into())
}

fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error + Send + Sync>> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", raw).into())
}

fn parse_time(raw: &str) -> Result<NaiveTime, Box<dyn std::error::Error + Send + Sync>> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| format!("Invalid time '{}', expected HH:MM", raw).into())
}

fn event_json(event: &CalendarEvent) -> Value {
    json!({
        "id": event.id,
        "summary": event.summary,
        "start": event.start.to_rfc3339(),
        "end": event.end.to_rfc3339(),
    })
}

fn availability_json(availability: &Availability) -> String {
    match availability {
        Availability::Free => json!({ "status": "free" }).to_string(),
        Availability::Busy { conflicts } => json!({
            "status": "busy",
            "conflicts": conflicts.iter().map(event_json).collect::<Vec<Value>>(),
        })
        .to_string(),
    }
}

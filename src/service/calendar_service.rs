use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

use crate::clients::calendar_client::CalendarApi;
use crate::models::contact::ContactDirectory;
use crate::models::meeting::{
    Availability, CalendarEvent, DEFAULT_SLOT_MINUTES, MAX_MEETING_MINUTES, MeetingRequest,
    ScheduleConfirmation,
};

pub struct CalendarService {
    api: Arc<dyn CalendarApi>,
    contacts: Arc<ContactDirectory>,
    timezone: Tz,
}

impl CalendarService {
    pub fn new(api: Arc<dyn CalendarApi>, contacts: Arc<ContactDirectory>, timezone: Tz) -> Self {
        Self {
            api,
            contacts,
            timezone,
        }
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    pub fn tomorrow(&self) -> NaiveDate {
        self.today() + Duration::days(1)
    }

    // Availability is a linear scan over the day's events against a fixed
    // slot window starting at the requested time.
    pub async fn check_availability(
        &self,
        date: NaiveDate,
        time: chrono::NaiveTime,
    ) -> Result<Availability, Box<dyn std::error::Error + Send + Sync>> {
        let start = self.local_instant(date, time)?;
        let end = start + Duration::minutes(DEFAULT_SLOT_MINUTES);
        let events = self.api.list_events(start, end).await?;
        let conflicts: Vec<CalendarEvent> = events
            .into_iter()
            .filter(|event| event.overlaps(start, end))
            .collect();
        if conflicts.is_empty() {
            Ok(Availability::Free)
        } else {
            Ok(Availability::Busy { conflicts })
        }
    }

    pub async fn get_schedule(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let (day_start, day_end) = self.day_bounds(date)?;
        let mut events = self.api.list_events(day_start, day_end).await?;
        // The range query already orders by start time; keep the guarantee
        // even for fake backends.
        events.sort_by_key(|event| event.start);
        Ok(events)
    }

    // Inserts the event and reports any overlap with what was already on
    // the calendar. Double-booking is flagged, not blocked.
    pub async fn schedule_meeting(
        &self,
        request: &MeetingRequest,
    ) -> Result<ScheduleConfirmation, Box<dyn std::error::Error + Send + Sync>> {
        if request.duration_minutes <= 0 {
            return Err("Meeting duration must be positive".into());
        }
        if request.duration_minutes > MAX_MEETING_MINUTES {
            return Err(format!(
                "Meeting duration must be at most {} minutes",
                MAX_MEETING_MINUTES
            )
            .into());
        }

        let start = self.local_instant(request.date, request.time)?;
        let end = start + Duration::minutes(request.duration_minutes);

        let attendee_emails = self.resolve_attendees(&request.attendees)?;

        let existing = self.api.list_events(start, end).await?;
        let conflicts: Vec<CalendarEvent> = existing
            .into_iter()
            .filter(|event| event.overlaps(start, end))
            .collect();

        let event = self
            .api
            .insert_event(&request.title, start, end, &attendee_emails)
            .await?;

        Ok(ScheduleConfirmation { event, conflicts })
    }

    fn resolve_attendees(
        &self,
        attendees: &[String],
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let mut emails = Vec::with_capacity(attendees.len());
        for attendee in attendees {
            match self.contacts.resolve(attendee) {
                Some(email) => emails.push(email),
                None => {
                    return Err(format!(
                        "Unknown contact '{}'. Known contacts: {}",
                        attendee,
                        self.contacts.known_names().join(", ")
                    )
                    .into());
                }
            }
        }
        Ok(emails)
    }

    fn local_instant(
        &self,
        date: NaiveDate,
        time: chrono::NaiveTime,
    ) -> Result<DateTime<Utc>, Box<dyn std::error::Error + Send + Sync>> {
        self.timezone
            .from_local_datetime(&date.and_time(time))
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                format!("{} {} is not a valid local time in {}", date, time, self.timezone).into()
            })
    }

    fn day_bounds(
        &self,
        date: NaiveDate,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), Box<dyn std::error::Error + Send + Sync>> {
        let midnight = chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let start = self.local_instant(date, midnight)?;
        Ok((start, start + Duration::days(1)))
    }
}

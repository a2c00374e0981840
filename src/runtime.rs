use chrono_tz::Tz;
use std::sync::Arc;

use crate::config::Settings;
use crate::clients::calendar_client::GoogleCalendarClient;
use crate::clients::gmail_client::GmailClient;
use crate::clients::google_auth::GoogleAuth;
use crate::events::queue::EventBus;
use crate::events::worker::run_event_worker;
use crate::handlers::responder::CompositeResponder;
use crate::handlers::telegram::{TelegramClient, run_telegram_poller};
use crate::handlers::whatsapp::{WhatsAppClient, run_whatsapp_webhook};
use crate::models::contact::ContactDirectory;
use crate::service::agent::MeetingAgent;
use crate::service::calendar_service::CalendarService;
use crate::service::groq_service::GroqService;
use crate::service::mail_service::MailService;
use crate::service::mom_service::MomService;
use crate::tasks::task_runner::TaskRunner;

pub struct Services {
    pub agent: Arc<MeetingAgent>,
    pub mom: Arc<MomService>,
}

// Wires the vendor clients into the agent. Shared by the bot runtime and
// the CLI.
pub fn build_services(
    settings: &Settings,
) -> Result<Services, Box<dyn std::error::Error + Send + Sync>> {
    let timezone: Tz = settings
        .timezone
        .parse()
        .map_err(|_| format!("Unknown timezone '{}'", settings.timezone))?;

    let contacts = Arc::new(match ContactDirectory::from_file(&settings.contacts_file) {
        Ok(directory) => directory,
        Err(err) => {
            // Raw email addresses still work without a directory.
            eprintln!("{} (name lookups disabled)", err);
            ContactDirectory::default()
        }
    });
    if contacts.is_empty() {
        eprintln!(
            "Contact directory {} has no entries; only raw email addresses will resolve",
            settings.contacts_file
        );
    }

    let calendar_auth = Arc::new(GoogleAuth::new(&settings.calendar_token_file));
    let gmail_auth = Arc::new(GoogleAuth::new(&settings.gmail_token_file));

    let calendar = Arc::new(CalendarService::new(
        Arc::new(GoogleCalendarClient::new(calendar_auth, timezone)),
        contacts.clone(),
        timezone,
    ));
    let mail = Arc::new(MailService::new(
        Arc::new(GmailClient::new(gmail_auth)),
        contacts,
    ));
    let groq = Arc::new(GroqService::new(settings.groq_api_key.clone()));
    let mom = Arc::new(MomService::new(groq.clone(), mail.clone()));

    let dispatcher = Arc::new(crate::service::tools::ToolDispatcher::new(
        calendar,
        mail,
        mom.clone(),
    ));
    Ok(Services {
        agent: Arc::new(MeetingAgent::new(groq, dispatcher)),
        mom,
    })
}

pub async fn run_api(settings: Settings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if settings.telegram_api_key.is_none() && settings.whatsapp.is_none() {
        return Err(
            "Bot mode needs TELEGRAM_API_KEY or the WHATSAPP_* settings to be configured".into(),
        );
    }

    let services = build_services(&settings)?;
    let (bus, rx) = EventBus::new(16);

    let telegram_client = settings
        .telegram_api_key
        .as_deref()
        .map(|token| Arc::new(TelegramClient::new(token)));
    let whatsapp_client = settings
        .whatsapp
        .as_ref()
        .map(|wa| Arc::new(WhatsAppClient::new(wa)));

    let responder = Arc::new(CompositeResponder::new(
        telegram_client.clone(),
        whatsapp_client.clone(),
    ));

    let mut task_runner = TaskRunner::new();
    if let Some(client) = telegram_client {
        let bus = bus.clone();
        task_runner.add_task(move || {
            tokio::spawn(async move {
                run_telegram_poller(client, bus).await;
            });
        });
    }
    if let (Some(client), Some(wa_settings)) = (whatsapp_client, settings.whatsapp.clone()) {
        let bus = bus.clone();
        task_runner.add_task(move || {
            tokio::spawn(async move {
                run_whatsapp_webhook(wa_settings, client, bus).await;
            });
        });
    }
    task_runner.start_all();

    run_event_worker(rx, services.agent, responder).await;
    Ok(())
}

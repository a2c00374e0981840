use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::events::queue::{ChatTarget, Event, EventBus};
use crate::service::routing;

const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub from: Option<Sender>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub username: Option<String>,
}

pub struct TelegramClient {
    base_url: String,
    http: reqwest::Client,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            base_url: format!("https://api.telegram.org/bot{}", token),
            http: reqwest::Client::new(),
        }
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .post(format!("{}/sendMessage", self.base_url))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("sendMessage failed with status {}: {}", status, body).into());
        }
        Ok(())
    }

    pub async fn send_typing(&self, chat_id: i64) {
        let _ = self
            .http
            .post(format!("{}/sendChatAction", self.base_url))
            .json(&json!({ "chat_id": chat_id, "action": "typing" }))
            .send()
            .await;
    }

    async fn get_updates(
        &self,
        offset: i64,
    ) -> Result<Vec<Update>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .http
            .get(format!("{}/getUpdates", self.base_url))
            .query(&[
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(format!("getUpdates failed with status {}: {}", status, text).into());
        }
        let parsed: UpdatesResponse = serde_json::from_str(&text)?;
        if !parsed.ok {
            return Err("Telegram returned ok=false for getUpdates".into());
        }
        Ok(parsed.result)
    }
}

// What the poller should do with one update, separated from the network
// loop so it can be tested against fixture payloads.
#[derive(Debug, PartialEq)]
pub enum UpdateDisposition {
    ReplyHelp { chat_id: i64 },
    Forward { chat_id: i64, sender: String, text: String },
    Ignore,
}

pub fn classify_update(update: &Update) -> UpdateDisposition {
    let Some(message) = &update.message else {
        return UpdateDisposition::Ignore;
    };
    let Some(text) = message.text.as_deref() else {
        return UpdateDisposition::Ignore;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return UpdateDisposition::Ignore;
    }

    let chat_id = message.chat.id;
    if trimmed == "/start" || trimmed == "/help" {
        return UpdateDisposition::ReplyHelp { chat_id };
    }

    let sender = message
        .from
        .as_ref()
        .and_then(|s| s.username.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    UpdateDisposition::Forward {
        chat_id,
        sender,
        text: trimmed.to_string(),
    }
}

pub async fn run_telegram_poller(client: Arc<TelegramClient>, bus: EventBus) {
    println!("Telegram poller started");
    let mut offset: i64 = 0;

    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                eprintln!("Telegram poll failed: {}", err);
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            match classify_update(&update) {
                UpdateDisposition::ReplyHelp { chat_id } => {
                    if let Err(err) = client.send_message(chat_id, &routing::help_message()).await {
                        eprintln!("Failed to send help message: {}", err);
                    }
                }
                UpdateDisposition::Forward {
                    chat_id,
                    sender,
                    text,
                } => {
                    client.send_typing(chat_id).await;
                    bus.emit(Event::MessageReceived {
                        target: ChatTarget::Telegram { chat_id },
                        sender,
                        text,
                    })
                    .await;
                }
                UpdateDisposition::Ignore => {}
            }
        }
    }
}

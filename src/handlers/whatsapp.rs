use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use crate::config::WhatsAppSettings;
use crate::events::queue::{ChatTarget, Event, EventBus};

pub struct WhatsAppClient {
    http: reqwest::Client,
    access_token: String,
    messages_url: String,
}

impl WhatsAppClient {
    pub fn new(settings: &WhatsAppSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: settings.access_token.clone(),
            messages_url: format!(
                "https://graph.facebook.com/{}/{}/messages",
                settings.graph_version, settings.phone_number_id
            ),
        }
    }

    pub async fn send_message(
        &self,
        wa_id: &str,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let body = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": wa_id,
            "type": "text",
            "text": { "preview_url": false, "body": process_text_for_whatsapp(text) },
        });
        let response = self
            .http
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("WhatsApp send failed with status {}: {}", status, text).into());
        }
        Ok(())
    }
}

// Model output uses markdown bold and sometimes citation brackets;
// WhatsApp wants single asterisks and no brackets.
pub fn process_text_for_whatsapp(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut in_citation = false;
    for c in text.chars() {
        match c {
            '【' => in_citation = true,
            '】' => in_citation = false,
            _ if !in_citation => stripped.push(c),
            _ => {}
        }
    }
    stripped.trim().replace("**", "*")
}

pub fn is_status_update(body: &Value) -> bool {
    body.pointer("/entry/0/changes/0/value/statuses")
        .is_some_and(|statuses| !statuses.is_null())
}

pub fn is_valid_whatsapp_message(body: &Value) -> bool {
    body.get("object").is_some()
        && body
            .pointer("/entry/0/changes/0/value/messages/0")
            .is_some()
}

#[derive(Debug, PartialEq)]
pub enum IncomingWhatsApp {
    Text {
        wa_id: String,
        name: String,
        body: String,
    },
    Unsupported {
        wa_id: String,
        message_type: String,
    },
}

pub fn extract_message(body: &Value) -> Option<IncomingWhatsApp> {
    let value = body.pointer("/entry/0/changes/0/value")?;
    let wa_id = value
        .pointer("/contacts/0/wa_id")?
        .as_str()?
        .to_string();
    let name = value
        .pointer("/contacts/0/profile/name")
        .and_then(|n| n.as_str())
        .unwrap_or("Unknown")
        .to_string();
    let message = value.pointer("/messages/0")?;
    let message_type = message
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("unknown")
        .to_string();

    if message_type != "text" {
        return Some(IncomingWhatsApp::Unsupported {
            wa_id,
            message_type,
        });
    }

    let text = message.pointer("/text/body")?.as_str()?.to_string();
    Some(IncomingWhatsApp::Text {
        wa_id,
        name,
        body: text,
    })
}

async fn handle_webhook_post(
    body: Value,
    bus: EventBus,
    client: Arc<WhatsAppClient>,
) -> Result<impl warp::Reply, std::convert::Infallible> {
    // Every send triggers delivery/read status callbacks; acknowledge and
    // drop them.
    if is_status_update(&body) {
        return Ok(warp::reply::with_status(
            warp::reply::json(&json!({ "status": "ok" })),
            StatusCode::OK,
        ));
    }

    if !is_valid_whatsapp_message(&body) {
        return Ok(warp::reply::with_status(
            warp::reply::json(&json!({ "status": "error", "message": "Not a WhatsApp API event" })),
            StatusCode::NOT_FOUND,
        ));
    }

    match extract_message(&body) {
        Some(IncomingWhatsApp::Text { wa_id, name, body }) => {
            println!("WhatsApp message from {} ({}): {}", name, wa_id, body);
            bus.emit(Event::MessageReceived {
                target: ChatTarget::WhatsApp { wa_id },
                sender: name,
                text: body,
            })
            .await;
        }
        Some(IncomingWhatsApp::Unsupported {
            wa_id,
            message_type,
        }) => {
            let notice = format!(
                "I can only process text messages. You sent a {} message.",
                message_type
            );
            if let Err(err) = client.send_message(&wa_id, &notice).await {
                eprintln!("Failed to send unsupported-type notice: {}", err);
            }
        }
        None => {
            eprintln!("WhatsApp payload passed validation but could not be extracted");
        }
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "status": "ok" })),
        StatusCode::OK,
    ))
}

// GET verification handshake plus POST message intake.
pub async fn run_whatsapp_webhook(
    settings: WhatsAppSettings,
    client: Arc<WhatsAppClient>,
    bus: EventBus,
) {
    let verify_token = settings.verify_token.clone();
    let verify = warp::get()
        .and(warp::path("webhook"))
        .and(warp::query::<HashMap<String, String>>())
        .map(move |params: HashMap<String, String>| {
            let mode = params.get("hub.mode").map(String::as_str);
            let token = params.get("hub.verify_token").map(String::as_str);
            let challenge = params.get("hub.challenge").cloned().unwrap_or_default();
            if mode == Some("subscribe") && token == Some(verify_token.as_str()) {
                warp::reply::with_status(challenge, StatusCode::OK)
            } else {
                warp::reply::with_status(
                    "Verification failed".to_string(),
                    StatusCode::FORBIDDEN,
                )
            }
        });

    let receive = warp::post()
        .and(warp::path("webhook"))
        .and(warp::body::json())
        .and(warp::any().map(move || bus.clone()))
        .and(warp::any().map(move || client.clone()))
        .and_then(handle_webhook_post);

    // Boxed so the combined filter stays nameable when the server future
    // is spawned onto the runtime.
    let routes = verify.or(receive).boxed();

    println!("WhatsApp webhook listening on port {}", settings.webhook_port);
    warp::serve(routes)
        .run(([0, 0, 0, 0], settings.webhook_port))
        .await;
}

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::clients::google_auth::GoogleAuth;

const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message_id: String,
    pub to: Vec<String>,
}

#[async_trait]
pub trait MailApi: Send + Sync {
    async fn send(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct GmailClient {
    auth: Arc<GoogleAuth>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl GmailClient {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            auth,
            http: reqwest::Client::new(),
        }
    }
}

// Minimal RFC 2822 text message; Gmail wants it base64url encoded in the
// "raw" field.
pub fn encode_message(to: &[String], subject: &str, body: &str) -> String {
    let raw = format!(
        "To: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        to.join(", "),
        subject,
        body
    );
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

#[async_trait]
impl MailApi for GmailClient {
    async fn send(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, Box<dyn std::error::Error + Send + Sync>> {
        if to.is_empty() {
            return Err("No recipients given".into());
        }

        let token = self.auth.bearer_token().await?;
        let payload = json!({ "raw": encode_message(to, subject, body) });
        let response = self
            .http
            .post(SEND_URL)
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(format!("Gmail send failed with status {}: {}", status, text).into());
        }

        let parsed: SendResponse = serde_json::from_str(&text)?;
        Ok(SendReceipt {
            message_id: parsed.id,
            to: to.to_vec(),
        })
    }
}

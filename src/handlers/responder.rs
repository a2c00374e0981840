use async_trait::async_trait;
use std::sync::Arc;

use crate::events::queue::ChatTarget;
use crate::handlers::telegram::TelegramClient;
use crate::handlers::whatsapp::WhatsAppClient;

#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

// Routes replies back to whichever front-end the message came from.
// Either side may be absent when that front-end is not configured.
pub struct CompositeResponder {
    telegram: Option<Arc<TelegramClient>>,
    whatsapp: Option<Arc<WhatsAppClient>>,
}

impl CompositeResponder {
    pub fn new(
        telegram: Option<Arc<TelegramClient>>,
        whatsapp: Option<Arc<WhatsAppClient>>,
    ) -> Self {
        Self { telegram, whatsapp }
    }
}

#[async_trait]
impl ChatResponder for CompositeResponder {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match target {
            ChatTarget::Telegram { chat_id } => match &self.telegram {
                Some(client) => client.send_message(*chat_id, text).await,
                None => Err("Telegram front-end is not configured".into()),
            },
            ChatTarget::WhatsApp { wa_id } => match &self.whatsapp {
                Some(client) => client.send_message(wa_id, text).await,
                None => Err("WhatsApp front-end is not configured".into()),
            },
        }
    }
}

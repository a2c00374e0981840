use std::sync::Arc;

use crate::clients::gmail_client::{MailApi, SendReceipt};
use crate::models::contact::ContactDirectory;

pub struct MailService {
    mail: Arc<dyn MailApi>,
    contacts: Arc<ContactDirectory>,
}

impl MailService {
    pub fn new(mail: Arc<dyn MailApi>, contacts: Arc<ContactDirectory>) -> Self {
        Self { mail, contacts }
    }

    // Recipients may be raw addresses or contact names; an unknown name
    // fails the whole send so nothing goes out half-addressed.
    pub async fn send_email(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, Box<dyn std::error::Error + Send + Sync>> {
        let resolved = self.resolve_recipients(to)?;
        self.mail.send(&resolved, subject, body).await
    }

    pub async fn send_email_to_person(
        &self,
        name: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendReceipt, Box<dyn std::error::Error + Send + Sync>> {
        self.send_email(&[name.to_string()], subject, body).await
    }

    pub fn resolve_recipients(
        &self,
        to: &[String],
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        if to.is_empty() {
            return Err("No recipients given".into());
        }
        let mut resolved = Vec::with_capacity(to.len());
        for identifier in to {
            match self.contacts.resolve(identifier) {
                Some(email) => resolved.push(email),
                None => {
                    return Err(format!(
                        "Unknown contact '{}'. Known contacts: {}",
                        identifier,
                        self.contacts.known_names().join(", ")
                    )
                    .into());
                }
            }
        }
        Ok(resolved)
    }
}

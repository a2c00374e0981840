use std::sync::Arc;

use crate::clients::gmail_client::SendReceipt;
use crate::service::groq_service::GroqClient;
use crate::service::mail_service::MailService;

pub const MOM_SUBJECT: &str = "Minutes of Meeting (MoM)";

pub struct MomService {
    groq: Arc<dyn GroqClient>,
    mail: Arc<MailService>,
}

#[derive(Debug)]
pub struct MomDelivery {
    pub mom: String,
    pub receipt: SendReceipt,
}

impl MomService {
    pub fn new(groq: Arc<dyn GroqClient>, mail: Arc<MailService>) -> Self {
        Self { groq, mail }
    }

    // One prompt, one response. The returned structure is whatever the
    // model produced; it is not validated here.
    pub async fn generate_mom(
        &self,
        transcript: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        if transcript.trim().is_empty() {
            return Err("Transcript is empty".into());
        }
        let mom = self.groq.generate_prompt(transcript, "mom").await?;
        if mom.trim().is_empty() {
            return Err("Model returned empty minutes".into());
        }
        Ok(mom)
    }

    // Generate first, send second; the mail never goes out with an empty
    // body if generation fails.
    pub async fn send_mom(
        &self,
        names: &str,
        transcript: &str,
    ) -> Result<MomDelivery, Box<dyn std::error::Error + Send + Sync>> {
        let recipients: Vec<String> = names
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err("No participants given for the MoM".into());
        }

        let mom = self.generate_mom(transcript).await?;
        let receipt = self.mail.send_email(&recipients, MOM_SUBJECT, &mom).await?;
        Ok(MomDelivery { mom, receipt })
    }
}

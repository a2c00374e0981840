use async_trait::async_trait;

use crate::clients::groq_client;

#[async_trait]
pub trait GroqClient: Send + Sync {
    async fn generate_prompt(
        &self,
        prompt: &str,
        prompt_type: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct GroqService {
    api_key: String,
}

impl GroqService {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl GroqClient for GroqService {
    async fn generate_prompt(
        &self,
        prompt: &str,
        prompt_type: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        groq_client::generate_groq_prompt(prompt, prompt_type, &self.api_key).await
    }
}

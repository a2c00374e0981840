use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

// Serialized shape of the authorized-user token files the OAuth setup
// flow writes (token_calendar.json / token_gmail.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

// One token file per Google scope. Refreshes are serialized behind the
// mutex and written back so the next process start reuses them.
pub struct GoogleAuth {
    token_path: String,
    http: reqwest::Client,
    cached: Mutex<Option<StoredToken>>,
}

impl GoogleAuth {
    pub fn new(token_path: &str) -> Self {
        Self {
            token_path: token_path.to_string(),
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    pub async fn bearer_token(
        &self,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut cached = self.cached.lock().await;
        if cached.is_none() {
            let content = tokio::fs::read_to_string(&self.token_path).await.map_err(|e| {
                format!("Unable to read token file {}: {}", self.token_path, e)
            })?;
            *cached = Some(serde_json::from_str::<StoredToken>(&content)?);
        }

        let token = cached.as_mut().unwrap();
        if !token_expired(token) {
            return Ok(token.token.clone());
        }

        let refreshed = self.refresh(token).await?;
        token.token = refreshed.access_token;
        token.expiry = Some(Utc::now() + Duration::seconds(refreshed.expires_in));

        // Best effort; an unwritable token file should not fail the call.
        if let Ok(serialized) = serde_json::to_string_pretty(&*token) {
            if let Err(e) = tokio::fs::write(&self.token_path, serialized).await {
                eprintln!("Failed to persist refreshed token to {}: {}", self.token_path, e);
            }
        }

        Ok(token.token.clone())
    }

    async fn refresh(
        &self,
        token: &StoredToken,
    ) -> Result<RefreshResponse, Box<dyn std::error::Error + Send + Sync>> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or("Access token expired and no refresh token is available")?;
        let client_id = token
            .client_id
            .as_deref()
            .ok_or("Token file is missing client_id")?;
        let client_secret = token
            .client_secret
            .as_deref()
            .ok_or("Token file is missing client_secret")?;

        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(format!("Token refresh failed with status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str(&text)?)
    }
}

// A missing expiry means the setup flow never recorded one; treat the
// token as expired so the first call refreshes it.
fn token_expired(token: &StoredToken) -> bool {
    match token.expiry {
        Some(expiry) => expiry <= Utc::now() + Duration::seconds(60),
        None => token.refresh_token.is_some(),
    }
}

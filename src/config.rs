use std::collections::HashMap;
use std::env;
use std::fs;

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_CONTACTS_FILE: &str = "./contacts.txt";
pub const DEFAULT_CALENDAR_TOKEN_FILE: &str = "./token_calendar.json";
pub const DEFAULT_GMAIL_TOKEN_FILE: &str = "./token_gmail.json";
pub const DEFAULT_WEBHOOK_PORT: u16 = 8000;
pub const DEFAULT_GRAPH_VERSION: &str = "v18.0";

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("Invalid config line {}: {}", idx + 1, line));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    // Config file wins, process environment is the fallback.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| env::var(key).ok())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn require(&self, key: &str) -> Result<String, String> {
        self.get(key)
            .ok_or_else(|| format!("{} must be set in the config file or environment", key))
    }
}

// Everything the runtime needs, resolved up front so missing keys fail
// at startup rather than mid-conversation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub groq_api_key: String,
    pub telegram_api_key: Option<String>,
    pub whatsapp: Option<WhatsAppSettings>,
    pub contacts_file: String,
    pub calendar_token_file: String,
    pub gmail_token_file: String,
    pub timezone: String,
}

#[derive(Debug, Clone)]
pub struct WhatsAppSettings {
    pub access_token: String,
    pub phone_number_id: String,
    pub verify_token: String,
    pub graph_version: String,
    pub webhook_port: u16,
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let whatsapp = match config.get("WHATSAPP_ACCESS_TOKEN") {
            Some(access_token) => Some(WhatsAppSettings {
                access_token,
                phone_number_id: config.require("WHATSAPP_PHONE_NUMBER_ID")?,
                verify_token: config.require("WHATSAPP_VERIFY_TOKEN")?,
                graph_version: config.get_or("WHATSAPP_GRAPH_VERSION", DEFAULT_GRAPH_VERSION),
                webhook_port: config
                    .get("WEBHOOK_PORT")
                    .map(|p| p.parse::<u16>().map_err(|e| format!("WEBHOOK_PORT: {}", e)))
                    .transpose()?
                    .unwrap_or(DEFAULT_WEBHOOK_PORT),
            }),
            None => None,
        };

        Ok(Self {
            groq_api_key: config.require("GROQ_API_KEY")?,
            telegram_api_key: config.get("TELEGRAM_API_KEY"),
            whatsapp,
            contacts_file: config.get_or("CONTACTS_FILE", DEFAULT_CONTACTS_FILE),
            calendar_token_file: config
                .get_or("CALENDAR_TOKEN_FILE", DEFAULT_CALENDAR_TOKEN_FILE),
            gmail_token_file: config.get_or("GMAIL_TOKEN_FILE", DEFAULT_GMAIL_TOKEN_FILE),
            timezone: config.get_or("TIMEZONE", DEFAULT_TIMEZONE),
        })
    }
}

pub mod calendar_client;
pub mod gmail_client;
pub mod google_auth;
pub mod groq_client;

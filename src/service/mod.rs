pub mod agent;
pub mod calendar_service;
pub mod groq_service;
pub mod mail_service;
pub mod mom_service;
pub mod routing;
pub mod tools;

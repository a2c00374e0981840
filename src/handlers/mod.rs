pub mod responder;
pub mod telegram;
pub mod whatsapp;

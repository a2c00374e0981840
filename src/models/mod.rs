pub mod contact;
pub mod meeting;

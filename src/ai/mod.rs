pub mod chat;
pub mod models;
pub mod request;
pub mod tools;

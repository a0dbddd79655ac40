pub mod ai;
pub mod bot;
pub mod chat;
pub mod cli;
pub mod core;
pub mod google;
pub mod openai;
pub mod telegram;

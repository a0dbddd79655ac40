pub mod commands;
mod dispatcher;
mod handlers;
pub mod keyboards;
pub mod templates;

pub use dispatcher::Bot;

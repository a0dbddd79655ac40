pub mod core;
pub use self::core::*;

pub mod models;
pub use models::Transcript;

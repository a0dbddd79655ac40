pub mod core;
pub use self::core::*;

pub mod images;
pub use images::{GeneratedImage, generate_image};

pub mod custom_search;
pub use custom_search::{SearchItem, search_google};

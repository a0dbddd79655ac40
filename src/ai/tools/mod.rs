pub mod web_search;
pub use web_search::WebSearchTool;

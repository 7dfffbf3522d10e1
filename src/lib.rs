pub mod api;
pub mod config;
pub mod error;
pub mod formatter;
pub mod locator;
pub mod mode;
pub mod printer;
pub mod quote;
pub mod report;
pub mod resolver;
pub mod source;
pub mod sql;
pub mod verbs;

// Re-export the main public API
pub use api::{format_source, format_source_with, get_matching_paths, run};
pub use config::load_config;
pub use mode::Mode;

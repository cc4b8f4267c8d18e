pub mod confirmation;
pub mod error;
pub mod json;
pub mod types;
pub mod version;

pub use json::extract_first_json;

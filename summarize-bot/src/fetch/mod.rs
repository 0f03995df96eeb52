//! Outbound page fetching through the configured proxy.

pub mod page;
pub mod user_agent;

pub use page::{FetchError, PageFetcher};

//! Retrieval of country documents over HTTP.

mod progress;
mod provider;
mod resilient_http;

pub use progress::{NoProgress, Progress};
pub use provider::{FetchResult, Provider};
pub use resilient_http::{Recovery, RetryPolicy, classify, resilient_get};

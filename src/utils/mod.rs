//! Utility modules shared by sources and backends.
//!
//! - [`HttpClient`]: reqwest client with the crate user agent and a configurable timeout

mod http;

pub use http::{HttpClient, USER_AGENT};

//! Lookup transport abstraction and concrete implementations.

pub mod http;

use serde_json::Value;

/// Interface implemented by transports that fetch JSON metadata documents.
///
/// Any non-success status, transport error, or undecodable body is an `Err`
/// with a human-readable reason.
pub trait LookupTransport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<Value, String>;
}

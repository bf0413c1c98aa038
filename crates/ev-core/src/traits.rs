//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use serde_json::Value;

/// Request payload encodings understood by an [`HttpTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` pairs, in order.
    Form(Vec<(String, String)>),
    /// `application/json`
    Json(Value),
}

impl RequestBody {
    pub fn content_type(&self) -> &'static str {
        match self {
            RequestBody::Form(_) => "application/x-www-form-urlencoded",
            RequestBody::Json(_) => "application/json",
        }
    }
}

/// A fully-read HTTP response. Transports buffer the body so callers can
/// inspect status, headers and payload without holding a connection.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase (e.g., "Unauthorized")
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parses the body as JSON. Empty or malformed bodies yield `None`.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Outbound HTTP contract. Errors mean the request never completed
/// (connection, DNS, TLS); any received status is an `Ok` response.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, url: &str, body: RequestBody) -> anyhow::Result<HttpResponse>;

    /// Issues a GET with the given extra headers (e.g., Authorization).
    async fn get(&self, url: &str, headers: Vec<(String, String)>) -> anyhow::Result<HttpResponse>;
}

/// Durable string key-value storage (the browser's `localStorage` contract).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

/// Wall-clock source in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let res = HttpResponse {
            status: 200,
            headers: vec![("authorization".into(), "Bearer xyz".into())],
            ..Default::default()
        };
        assert_eq!(res.header("Authorization"), Some("Bearer xyz"));
        assert!(res.header("X-Missing").is_none());
    }

    #[test]
    fn malformed_body_is_not_json() {
        let res = HttpResponse { status: 500, body: "<html>oops".into(), ..Default::default() };
        assert!(res.json().is_none());
        assert!(!res.is_success());
    }
}

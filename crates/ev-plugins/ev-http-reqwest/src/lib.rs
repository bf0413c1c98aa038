//! # ev-http-reqwest
//!
//! `reqwest`-based implementation of `HttpTransport`, plus the thin REST
//! clients built on top of any transport: the Eventra backend list
//! endpoints and the GitHub contributors API.

pub mod backend;
pub mod github;

pub use backend::BackendClient;
pub use github::GithubClient;

use async_trait::async_trait;
use ev_core::traits::{HttpResponse, HttpTransport, RequestBody};

const USER_AGENT: &str = concat!("eventra/", env!("CARGO_PKG_VERSION"));

/// Shares one connection pool across all requests. No request timeout is
/// configured beyond reqwest's defaults.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        // GitHub rejects requests without a User-Agent.
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, url: &str, body: RequestBody) -> anyhow::Result<HttpResponse> {
        let request = match body {
            RequestBody::Form(pairs) => self.client.post(url).form(&pairs),
            RequestBody::Json(value) => self.client.post(url).json(&value),
        };
        log::debug!("POST {url}");
        buffer(request.send().await?).await
    }

    async fn get(&self, url: &str, headers: Vec<(String, String)>) -> anyhow::Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        log::debug!("GET {url}");
        buffer(request.send().await?).await
    }
}

/// Reads the whole response so the caller owns status, headers and body.
async fn buffer(response: reqwest::Response) -> anyhow::Result<HttpResponse> {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response.text().await?;

    Ok(HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
    })
}

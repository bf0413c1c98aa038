//! Client for the Eventra backend's public list endpoints and signup.

use ev_core::error::{AppError, Result};
use ev_core::models::{Project, ALL};
use ev_core::traits::{HttpTransport, RequestBody};
use ev_core::validation::SignupForm;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub struct BackendClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl BackendClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { transport, base_url }
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        self.list("/api/projects/public").await
    }

    /// Submits a validated signup form. Rejections are reported as a single
    /// message: joined `validationErrors`, else `message`, else the status.
    pub async fn register(&self, form: &SignupForm) -> Result<Value> {
        let url = format!("{}/api/auth/signup", self.base_url);
        let body = serde_json::to_value(form).map_err(|e| AppError::Internal(e.to_string()))?;
        let response = self
            .transport
            .post(&url, RequestBody::Json(body))
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let payload = response.json();
        if response.is_success() {
            return Ok(payload.unwrap_or(Value::Null));
        }

        let joined = payload
            .as_ref()
            .and_then(|p| p.get("validationErrors"))
            .and_then(Value::as_array)
            .map(|errs| {
                errs.iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|m| !m.is_empty());
        let message = joined
            .or_else(|| {
                payload
                    .as_ref()
                    .and_then(|p| p.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Registration failed with status: {}", response.status));
        Err(AppError::field("general", message))
    }

    /// Project categories, led by the `"all"` pseudo-category.
    pub async fn categories(&self) -> Result<Vec<String>> {
        let names: Vec<String> = self
            .fetch("/api/projects/categories")
            .await?
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        Ok(std::iter::once(ALL.to_string()).chain(names).collect())
    }

    /// Fetches a JSON array and decodes each element, skipping entries
    /// that are not records instead of failing the whole list.
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let items = self.fetch(path).await?;
        let total = items.len();
        let records: Vec<T> = items.into_iter().filter_map(|v| serde_json::from_value(v).ok()).collect();
        if records.len() < total {
            log::warn!("{path}: skipped {} malformed record(s)", total - records.len());
        }
        Ok(records)
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Value>> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .transport
            .get(&url, Vec::new())
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(AppError::Network(format!(
                "GET {path} returned {} {}",
                response.status, response.status_text
            )));
        }

        match response.json() {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AppError::Network(format!("GET {path} did not return a JSON array"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::traits::{HttpResponse, MockHttpTransport};

    fn ok(body: &str) -> HttpResponse {
        HttpResponse { status: 200, status_text: "OK".into(), headers: Vec::new(), body: body.into() }
    }

    #[tokio::test]
    async fn projects_skip_malformed_entries() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .withf(|url, headers| url == "http://api.test/api/projects/public" && headers.is_empty())
            .times(1)
            .returning(|_, _| Ok(ok(r#"[{"id":1,"title":"Eventra","stars":3},"garbage",{"id":2}]"#)));

        let client = BackendClient::new(Arc::new(mock), "http://api.test/");
        let projects = client.projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].stars, 3);
    }

    #[tokio::test]
    async fn register_joins_validation_errors() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post()
            .withf(|url, body| {
                url == "http://api.test/api/auth/signup"
                    && matches!(body, RequestBody::Json(v) if v["role"] == "USER")
            })
            .times(1)
            .returning(|_, _| {
                Ok(HttpResponse {
                    status: 400,
                    body: r#"{"validationErrors":[{"message":"email taken"},{"message":"weak password"}]}"#.into(),
                    ..Default::default()
                })
            });

        let form = SignupForm { email: "a@b.com".into(), role: "USER".into(), ..Default::default() };
        let client = BackendClient::new(Arc::new(mock), "http://api.test");
        match client.register(&form).await.unwrap_err() {
            AppError::Validation(fields) => assert_eq!(fields["general"], "email taken, weak password"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_success_returns_payload() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post()
            .withf(|_, body| matches!(body, RequestBody::Json(v) if v["role"] == "USER" && v["lastName"] == "Liddell"))
            .times(1)
            .returning(|_, _| Ok(ok(r#"{"id":7,"email":"alice@example.com"}"#)));

        let form = SignupForm {
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            email: "alice@example.com".into(),
            password: "Password1!".into(),
            confirm_password: "Password1!".into(),
            role: String::new(),
        }
        .validate()
        .unwrap();
        let client = BackendClient::new(Arc::new(mock), "http://api.test");
        let payload = client.register(&form).await.unwrap();
        assert_eq!(payload["id"], 7);
    }

    #[tokio::test]
    async fn register_uses_message_without_validation_errors() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post().returning(|_, _| {
            Ok(HttpResponse {
                status: 400,
                body: r#"{"validationErrors":[],"message":"Email already registered"}"#.into(),
                ..Default::default()
            })
        });

        let client = BackendClient::new(Arc::new(mock), "http://api.test");
        match client.register(&SignupForm::default()).await.unwrap_err() {
            AppError::Validation(fields) => assert_eq!(fields["general"], "Email already registered"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_falls_back_to_status() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post()
            .returning(|_, _| Ok(HttpResponse { status: 409, body: "conflict".into(), ..Default::default() }));

        let client = BackendClient::new(Arc::new(mock), "http://api.test");
        let err = client.register(&SignupForm::default()).await.unwrap_err();
        assert!(err.to_string().contains("Registration failed with status: 409"));
    }

    #[tokio::test]
    async fn categories_are_prefixed_with_all() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(|_, _| Ok(ok(r#"["AI","Web"]"#)));

        let client = BackendClient::new(Arc::new(mock), "http://api.test");
        assert_eq!(client.categories().await.unwrap(), vec!["all", "AI", "Web"]);
    }

    #[tokio::test]
    async fn upstream_failure_is_a_network_error() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(|_, _| {
            Ok(HttpResponse { status: 503, status_text: "Service Unavailable".into(), ..Default::default() })
        });

        let client = BackendClient::new(Arc::new(mock), "http://api.test");
        let err = client.projects().await.unwrap_err();
        assert!(matches!(err, AppError::Network(ref m) if m.contains("503")));
    }
}

//! # Auth Negotiator
//!
//! The login endpoint's expected request shape is not fixed, so login
//! probes a fixed, ordered list of encodings against the one endpoint and
//! keeps the first that yields a 2xx response with an extractable token.
//! This is shape-probing, not transient-failure retry: attempts run strictly
//! one after another and a transport error aborts immediately.

use crate::error::{AppError, Result};
use crate::session::{Session, SessionManager, User};
use crate::traits::{HttpTransport, HttpResponse, RequestBody};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";
const MISSING_TOKEN: &str = "missing token in body or Authorization header";

/// One request shape, in probing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// form-urlencoded `email` + `password`
    FormEmail,
    /// form-urlencoded `username` (the email) + `password`
    FormUsername,
    /// JSON `{ email, password }`
    Json,
}

impl Attempt {
    pub const ORDER: [Attempt; 3] = [Attempt::FormEmail, Attempt::FormUsername, Attempt::Json];

    pub fn tag(self) -> &'static str {
        match self {
            Attempt::FormEmail => "form-email",
            Attempt::FormUsername => "form-username",
            Attempt::Json => "json",
        }
    }

    pub fn body(self, email: &str, password: &str) -> RequestBody {
        let pair = |k: &str, v: &str| (k.to_string(), v.to_string());
        match self {
            Attempt::FormEmail => RequestBody::Form(vec![pair("email", email), pair("password", password)]),
            Attempt::FormUsername => RequestBody::Form(vec![pair("username", email), pair("password", password)]),
            Attempt::Json => RequestBody::Json(json!({ "email": email, "password": password })),
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub struct AuthNegotiator {
    transport: Arc<dyn HttpTransport>,
    login_url: String,
    session: Arc<SessionManager>,
}

impl AuthNegotiator {
    pub fn new(transport: Arc<dyn HttpTransport>, login_url: impl Into<String>, session: Arc<SessionManager>) -> Self {
        Self { transport, login_url: login_url.into(), session }
    }

    /// Logs in and hands the resulting session to the session manager.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let mut last_reason: Option<String> = None;

        for attempt in Attempt::ORDER {
            let response = self
                .transport
                .post(&self.login_url, attempt.body(email, password))
                .await
                .map_err(|e| AppError::Network(e.to_string()))?;

            match evaluate(&response, email) {
                Ok(session) => {
                    log::info!("login succeeded with `{attempt}` request shape");
                    self.session.establish(session.clone()).await?;
                    return Ok(session);
                }
                Err(reason) => {
                    log::debug!("login attempt `{attempt}` rejected: {reason}");
                    last_reason = Some(format!("[{attempt}] {reason}"));
                }
            }
        }

        Err(AppError::Authentication(
            last_reason.unwrap_or_else(|| "unexpected response".to_string()),
        ))
    }
}

/// Decides one attempt: the session on success, else the reason it failed.
fn evaluate(response: &HttpResponse, email: &str) -> std::result::Result<Session, String> {
    let body = response.json();

    if !response.is_success() {
        return Err(failure_reason(response, body.as_ref()));
    }

    let token = body
        .as_ref()
        .and_then(body_token)
        .or_else(|| header_token(response))
        .ok_or_else(|| MISSING_TOKEN.to_string())?;

    let profile = body.as_ref().and_then(|b| non_null(b.get("user")).or_else(|| non_null(b.get("data"))));
    Ok(Session { token, user: User::from_profile(profile, email) })
}

/// `token`, falling back to `accessToken` only when `token` is absent or null.
/// Numeric tokens are accepted in their decimal form.
fn body_token(body: &Value) -> Option<String> {
    let candidate = non_null(body.get("token")).or_else(|| non_null(body.get("accessToken")))?;
    match candidate {
        Value::String(t) if !t.is_empty() => Some(t.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn header_token(response: &HttpResponse) -> Option<String> {
    response
        .header("Authorization")
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .map(str::to_string)
}

fn failure_reason(response: &HttpResponse, body: Option<&Value>) -> String {
    match body.filter(|b| truthy(b)) {
        Some(b) => [b.get("message"), b.get("error")]
            .into_iter()
            .flatten()
            .find(|v| truthy(v))
            .map(display)
            .unwrap_or_else(|| b.to_string()),
        None => format!("{} {}", response.status, response.status_text),
    }
}

fn non_null(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TOKEN_KEY;
    use crate::store::MemoryStore;
    use crate::traits::{KeyValueStore, MockHttpTransport};
    use mockall::Sequence;

    const URL: &str = "https://backend.test/api/auth/login";

    fn response(status: u16, status_text: &str, body: &str) -> HttpResponse {
        HttpResponse { status, status_text: status_text.into(), headers: Vec::new(), body: body.into() }
    }

    fn negotiator(transport: MockHttpTransport) -> (AuthNegotiator, Arc<dyn KeyValueStore>, Arc<SessionManager>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = Arc::new(SessionManager::new(store.clone()));
        (AuthNegotiator::new(Arc::new(transport), URL, session.clone()), store, session)
    }

    fn expect_attempt(
        mock: &mut MockHttpTransport,
        seq: &mut Sequence,
        attempt: Attempt,
        reply: HttpResponse,
    ) {
        let expected = attempt.body("a@b.com", "secret123");
        mock.expect_post()
            .times(1)
            .in_sequence(seq)
            .withf(move |url, body| url == URL && *body == expected)
            .return_once(move |_, _| Ok(reply));
    }

    #[tokio::test]
    async fn falls_through_to_json_and_fills_profile_defaults() {
        let mut mock = MockHttpTransport::new();
        let mut seq = Sequence::new();
        expect_attempt(&mut mock, &mut seq, Attempt::FormEmail, response(415, "Unsupported Media Type", ""));
        expect_attempt(&mut mock, &mut seq, Attempt::FormUsername, response(400, "Bad Request", r#"{"error":"bad shape"}"#));
        expect_attempt(
            &mut mock,
            &mut seq,
            Attempt::Json,
            response(200, "OK", r#"{"token":"abc","user":{"email":"a@b.com"}}"#),
        );

        let (auth, store, session) = negotiator(mock);
        let result = auth.login("a@b.com", "secret123").await.unwrap();

        assert_eq!(result.token, "abc");
        assert_eq!(
            serde_json::to_value(&result.user).unwrap(),
            json!({ "email": "a@b.com", "roles": [], "permissions": [] })
        );
        assert_eq!(store.get_item("token").await.unwrap().as_deref(), Some("abc"));
        let stored_user: Value = serde_json::from_str(&store.get_item("user").await.unwrap().unwrap()).unwrap();
        assert_eq!(stored_user["email"], "a@b.com");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn bearer_header_wins_on_first_attempt() {
        let mut mock = MockHttpTransport::new();
        let mut reply = response(200, "OK", r#"{"message":"welcome"}"#);
        reply.headers.push(("authorization".into(), "Bearer xyz".into()));
        mock.expect_post()
            .times(1)
            .withf(|_, body| *body == Attempt::FormEmail.body("a@b.com", "secret123"))
            .return_once(move |_, _| Ok(reply));

        let (auth, _, _) = negotiator(mock);
        let result = auth.login("a@b.com", "secret123").await.unwrap();
        assert_eq!(result.token, "xyz");
        assert_eq!(result.user.email, "a@b.com");
    }

    #[tokio::test]
    async fn access_token_and_data_fallbacks() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post().times(1).return_once(|_, _| {
            Ok(response(
                200,
                "OK",
                r#"{"token":null,"accessToken":"acc","data":{"email":"srv@b.com","roles":["ADMIN"],"id":9}}"#,
            ))
        });

        let (auth, _, session) = negotiator(mock);
        let result = auth.login("a@b.com", "secret123").await.unwrap();
        assert_eq!(result.token, "acc");
        assert_eq!(result.user.email, "srv@b.com");
        assert_eq!(result.user.roles, vec!["ADMIN"]);
        assert_eq!(result.user.extra["id"], 9);
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn all_attempts_rejected_reports_last_reason() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post()
            .times(3)
            .returning(|_, _| Ok(response(401, "Unauthorized", r#"{"message":"bad creds"}"#)));

        let (auth, store, session) = negotiator(mock);
        let err = auth.login("a@b.com", "secret123").await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, AppError::Authentication(_)));
        assert!(message.starts_with("Login failed: "));
        assert!(message.contains("[json]"));
        assert!(message.contains("bad creds"));
        assert!(store.get_item("token").await.unwrap().is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn success_without_token_keeps_probing() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post().times(3).returning(|_, _| Ok(response(200, "OK", r#"{"ok":true}"#)));

        let (auth, _, _) = negotiator(mock);
        let err = auth.login("a@b.com", "secret123").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Login failed: [json] missing token in body or Authorization header"
        );
    }

    #[tokio::test]
    async fn numeric_token_is_accepted_on_first_attempt() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post().times(1).returning(|_, _| Ok(response(200, "OK", r#"{"token":12345}"#)));

        let (auth, store, session) = negotiator(mock);
        let established = auth.login("a@b.com", "secret123").await.unwrap();
        assert_eq!(established.token, "12345");
        assert_eq!(store.get_item(TOKEN_KEY).await.unwrap().as_deref(), Some("12345"));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn transport_failure_aborts_without_further_attempts() {
        let mut mock = MockHttpTransport::new();
        mock.expect_post().times(1).returning(|_, _| Err(anyhow::anyhow!("connection refused")));

        let (auth, _, _) = negotiator(mock);
        let err = auth.login("a@b.com", "secret123").await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[test]
    fn failure_reason_precedence() {
        let res = response(500, "Internal Server Error", "");
        assert_eq!(failure_reason(&res, None), "500 Internal Server Error");
        assert_eq!(failure_reason(&res, Some(&json!(null))), "500 Internal Server Error");
        assert_eq!(failure_reason(&res, Some(&json!({"error": "nope"}))), "nope");
        assert_eq!(failure_reason(&res, Some(&json!({"message": "", "error": "e"}))), "e");
        assert_eq!(failure_reason(&res, Some(&json!({"code": 7}))), r#"{"code":7}"#);
    }

    #[test]
    fn raw_body_reason_keeps_server_key_order() {
        let res = response(400, "Bad Request", "");
        let body: Value = serde_json::from_str(r#"{"status":"fail","code":7}"#).unwrap();
        assert_eq!(failure_reason(&res, Some(&body)), r#"{"status":"fail","code":7}"#);
    }

    #[test]
    fn header_must_be_bearer() {
        let mut res = response(200, "OK", "");
        res.headers.push(("Authorization".into(), "Basic abc".into()));
        assert!(header_token(&res).is_none());
    }
}

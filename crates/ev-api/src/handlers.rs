//! # ev-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core:
//! query strings become a `QuerySpec`, credentials go through validation
//! and the auth negotiator, and every failure leaves as one JSON message.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use ev_core::error::AppError;
use ev_core::models::ALL;
use ev_core::query::{QuerySpec, SortKey};
use ev_core::session::{Access, AccessRequirement, Session, SessionManager, ROLE_ADMIN};
use ev_core::validation::{password_strength, validate_login, SignupForm};
use ev_core::{filter, AuthNegotiator};
use ev_http_reqwest::{BackendClient, GithubClient};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;

use crate::catalog::Catalog;

const NETWORK_MESSAGE: &str = "Unable to reach the server. Please check your connection.";

/// State shared across all Actix-web workers.
pub struct AppState {
    pub catalog: Catalog,
    pub backend: BackendClient,
    pub auth: AuthNegotiator,
    pub session: Arc<SessionManager>,
    pub github: GithubClient,
}

/// HTTP rendering of core errors.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    /// Body or query string that could not be decoded
    BadRequest(String),
    /// Authenticated but lacking a role/permission
    Forbidden,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::App(err) => fmt::Display::fmt(err, f),
            ApiError::BadRequest(msg) => f.write_str(msg),
            ApiError::Forbidden => f.write_str("forbidden"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::App(err) => match err {
                AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::Network(_) => StatusCode::BAD_GATEWAY,
                AppError::Authentication(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::App(AppError::Validation(fields)) => json!({
                "error": fields.get("general").map(String::as_str).unwrap_or("Please correct the highlighted fields"),
                "fields": fields,
            }),
            ApiError::App(AppError::Network(detail)) => {
                log::warn!("upstream request failed: {detail}");
                json!({ "error": NETWORK_MESSAGE })
            }
            ApiError::App(AppError::Internal(detail)) => {
                log::error!("internal error: {detail}");
                json!({ "error": "Something went wrong. Please try again." })
            }
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid request body: {err}")).into()
}

pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid query string: {err}")).into()
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
    pub q: Option<String>,
    /// "all", "upcoming", "past", or an event type
    pub filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HackathonsParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub difficulty: Option<String>,
    pub prize: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectsParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Lists seed events through the filter engine.
pub async fn list_events(data: web::Data<AppState>, params: web::Query<EventsParams>) -> impl Responder {
    let params = params.into_inner();
    let query = QuerySpec {
        search_text: params.q.unwrap_or_default(),
        category_filter: params.filter.unwrap_or_else(|| ALL.to_string()),
        ..Default::default()
    };
    HttpResponse::Ok().json(filter(&data.catalog.events, &query))
}

/// Lists seed hackathons by status tab plus the filter panel refinements.
pub async fn list_hackathons(
    data: web::Data<AppState>,
    params: web::Query<HackathonsParams>,
) -> impl Responder {
    let params = params.into_inner();
    let query = QuerySpec {
        search_text: params.q.unwrap_or_default(),
        status_filter: params.status.unwrap_or_else(|| ALL.to_string()),
        difficulty: params.difficulty,
        prize: params.prize,
        location: params.location,
        ..Default::default()
    };
    HttpResponse::Ok().json(filter(&data.catalog.hackathons, &query))
}

/// Fetches public projects from the backend, then filters and sorts them.
/// Sort defaults to most recently updated; an unknown key keeps backend order.
pub async fn list_projects(
    data: web::Data<AppState>,
    params: web::Query<ProjectsParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let projects = data.backend.projects().await?;
    let query = QuerySpec {
        search_text: params.q.unwrap_or_default(),
        category_filter: params.category.unwrap_or_else(|| ALL.to_string()),
        sort_key: match params.sort {
            None => Some(SortKey::Recent),
            Some(raw) => raw.parse().ok(),
        },
        ..Default::default()
    };
    Ok(HttpResponse::Ok().json(filter(&projects, &query)))
}

pub async fn project_categories(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.backend.categories().await?))
}

/// Validates credentials locally, then negotiates the login with the backend.
pub async fn login(data: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse, ApiError> {
    let LoginRequest { email, password } = body.into_inner();
    validate_login(&email, &password)?;
    let session = data.auth.login(&email, &password).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[derive(Debug, Deserialize)]
pub struct StrengthRequest {
    #[serde(default)]
    pub password: String,
}

/// Live strength hint for the signup form's password field.
pub async fn check_password_strength(body: web::Json<StrengthRequest>) -> impl Responder {
    let strength = password_strength(&body.password);
    HttpResponse::Ok().json(json!({
        "score": strength.score,
        "feedback": strength.feedback,
        "strong": strength.is_strong(),
    }))
}

pub async fn signup(data: web::Data<AppState>, body: web::Json<SignupForm>) -> Result<HttpResponse, ApiError> {
    let form = body.into_inner().validate()?;
    data.backend.register(&form).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Account created successfully! Please login to continue."
    })))
}

pub async fn logout(data: web::Data<AppState>) -> impl Responder {
    data.session.logout().await;
    HttpResponse::NoContent().finish()
}

pub async fn current_session(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session = guard(&data.session, &AccessRequirement::authenticated())?;
    Ok(HttpResponse::Ok().json(session))
}

/// The user dashboard: any logged-in user.
pub async fn dashboard(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session = guard(&data.session, &AccessRequirement::authenticated())?;
    Ok(HttpResponse::Ok().json(json!({
        "user": session.user,
        "isAdmin": data.session.is_admin(),
        "isEventManager": data.session.is_event_manager(),
    })))
}

/// The admin dashboard: requires the ADMIN role.
pub async fn admin_dashboard(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session = guard(&data.session, &AccessRequirement::authenticated().with_roles([ROLE_ADMIN]))?;
    Ok(HttpResponse::Ok().json(json!({
        "user": session.user,
        "permissions": session.user.permissions,
    })))
}

pub async fn contributors(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.github.contributors().await)
}

fn guard(session: &SessionManager, requirement: &AccessRequirement) -> Result<Session, ApiError> {
    let login_required = || ApiError::App(AppError::Unauthorized("login required".into()));
    match session.authorize(requirement) {
        Access::Granted => session.current().ok_or_else(login_required),
        Access::RequireLogin => Err(login_required()),
        Access::Forbidden => Err(ApiError::Forbidden),
    }
}

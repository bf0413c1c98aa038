//! # AppError
//!
//! Centralized error handling for the Eventra workspace.
//! Maps client-side failures to the categories surfaced to the user.

use std::collections::BTreeMap;
use thiserror::Error;

/// Field name -> message, one message per offending form field.
pub type FieldErrors = BTreeMap<String, String>;

/// The primary error type for all ev-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Form input rejected before any request was made (e.g., bad email format)
    #[error("validation error: {}", summarize(.0))]
    Validation(FieldErrors),

    /// The request could not be completed (connection refused, DNS, upstream 5xx)
    #[error("network error: {0}")]
    Network(String),

    /// Every login shape was tried and none yielded a token.
    /// The payload is the last recorded attempt reason.
    #[error("Login failed: {0}")]
    Authentication(String),

    /// Session missing or lacking the required role/permission
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., storage write failed)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds a single-field validation error.
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(name.to_string(), message.into());
        AppError::Validation(fields)
    }
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A specialized Result type for Eventra logic.
pub type Result<T> = std::result::Result<T, AppError>;

//! Client-side form validation for the login and signup forms.
//!
//! Everything here runs before any request is made; failures are reported
//! per field and never reach the network.

use crate::error::{AppError, FieldErrors, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const MIN_PASSWORD_LEN: usize = 8;
pub const SPECIAL_CHARS: &str = "@$!%*?&";
pub const DEFAULT_ROLE: &str = "USER";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Checks the login form. Email and password are required; the password
/// must be at least eight characters.
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    let mut errors = FieldErrors::new();

    if email.is_empty() {
        errors.insert("email".into(), "Email is required".into());
    } else if !is_valid_email(email) {
        errors.insert("email".into(), "Enter a valid email".into());
    }

    if password.is_empty() {
        errors.insert("password".into(), "Password is required".into());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password".into(), "Password must be at least 8 characters".into());
    }

    into_result(errors)
}

/// Five-point password strength score with a human hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub feedback: String,
}

impl PasswordStrength {
    /// Four of five checks passing counts as strong.
    pub fn is_strong(&self) -> bool {
        self.score >= 4
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let checks: [(bool, &str); 5] = [
        (password.chars().count() >= MIN_PASSWORD_LEN, "at least 8 characters"),
        (password.chars().any(|c| c.is_ascii_lowercase()), "one lowercase letter"),
        (password.chars().any(|c| c.is_ascii_uppercase()), "one uppercase letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "one number"),
        (password.chars().any(|c| SPECIAL_CHARS.contains(c)), "one special character (@$!%*?&)"),
    ];

    let score = checks.iter().filter(|(ok, _)| *ok).count() as u8;
    let missing: Vec<&str> = checks.iter().filter(|(ok, _)| !ok).map(|(_, hint)| *hint).collect();
    let feedback = if missing.is_empty() {
        "Strong password!".to_string()
    } else {
        format!("Needs: {}", missing.join(", "))
    };

    PasswordStrength { score, feedback }
}

/// Payload of the signup form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

impl SignupForm {
    /// Validates every field and fills in the default role.
    pub fn validate(mut self) -> Result<Self> {
        let mut errors = FieldErrors::new();

        if let Some(msg) = name_error("First name", &self.first_name) {
            errors.insert("firstName".into(), msg);
        }
        if let Some(msg) = name_error("Last name", &self.last_name) {
            errors.insert("lastName".into(), msg);
        }
        if !is_valid_email(&self.email) {
            errors.insert("email".into(), "Please enter a valid email address".into());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("password".into(), "Password must be at least 8 characters".into());
        }
        if self.password != self.confirm_password {
            errors.insert("confirm_password".into(), "Passwords do not match".into());
        }

        into_result(errors)?;
        if self.role.trim().is_empty() {
            self.role = DEFAULT_ROLE.to_string();
        }
        Ok(self)
    }
}

fn name_error(label: &str, value: &str) -> Option<String> {
    let len = value.chars().count();
    if value.trim().is_empty() {
        Some(format!("{label} is required"))
    } else if len < 3 {
        Some(format!("{label} must be at least 3 characters long"))
    } else if len > 20 {
        Some(format!("{label} must be less than 20 characters"))
    } else {
        None
    }
}

fn into_result(errors: FieldErrors) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

//! Login form validation
//!
//! Both fields are required. A submit with either one blank is stopped on the
//! client and the error line is shown; otherwise the form goes through and
//! the error line is hidden again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Login credentials, exactly as typed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Why a login form was stopped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("Email and password are required")]
    MissingBoth,
}

/// Result of checking a login form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCheck {
    /// Let the form submit
    Allow(Credentials),
    /// Cancel the submission and show the error line
    Prevent(LoginError),
}

impl LoginCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LoginCheck::Allow(_))
    }
}

/// Check the raw field values of the login form.
///
/// Blank means empty after trimming; an allowed submit still carries the
/// values untouched.
pub fn check_login(email: &str, password: &str) -> LoginCheck {
    match (email.trim().is_empty(), password.trim().is_empty()) {
        (true, true) => LoginCheck::Prevent(LoginError::MissingBoth),
        (true, false) => LoginCheck::Prevent(LoginError::MissingEmail),
        (false, true) => LoginCheck::Prevent(LoginError::MissingPassword),
        (false, false) => LoginCheck::Allow(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }),
    }
}

/// Login form state across submits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Whether `#error-msg` is displayed
    pub error_visible: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a submit; the error line follows the outcome
    pub fn on_submit(&mut self, email: &str, password: &str) -> LoginCheck {
        let check = check_login(email, password);
        self.error_visible = !check.is_allowed();
        check
    }
}

//! Authentication error types.

use serde::Deserialize;
use thiserror::Error;

use sukoon_core::CredentialError;

/// Shown when sign-in or sign-up fails without a more specific reason.
pub const SIGN_IN_FAILED: &str = "Authentication failed. Check your credentials.";

/// Shown when a password reset email could not be sent.
pub const RESET_FAILED: &str = "Failed to send reset email.";

/// Errors that can occur during authentication operations.
///
/// Provider rejections display as sentences fit for the sign-in form.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password failed local validation.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("There is no account with this email address.")]
    EmailNotFound,

    #[error("The password is incorrect.")]
    InvalidPassword,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("An account with this email address already exists.")]
    EmailExists,

    /// The provider's explanation is kept when it sends one.
    #[error("{0}")]
    WeakPassword(String),

    #[error("The email address is badly formatted.")]
    InvalidEmail,

    #[error("This account has been disabled.")]
    UserDisabled,

    #[error("Too many attempts. Please try again later.")]
    TooManyAttempts,

    #[error("Email and password sign-in is not enabled for this shop.")]
    OperationNotAllowed,

    /// An error code this client does not know.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// Non-success status without a parsable error body.
    #[error("identity provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identity provider URL is misconfigured.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl AuthError {
    /// Map an Identity Toolkit error message such as `EMAIL_NOT_FOUND` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    #[must_use]
    pub fn from_provider_message(message: &str) -> Self {
        let (code, detail) = message
            .split_once(':')
            .map_or((message.trim(), None), |(code, detail)| {
                (code.trim(), Some(detail.trim()))
            });

        match code {
            "EMAIL_NOT_FOUND" => Self::EmailNotFound,
            "INVALID_PASSWORD" => Self::InvalidPassword,
            "INVALID_LOGIN_CREDENTIALS" => Self::InvalidCredentials,
            "EMAIL_EXISTS" => Self::EmailExists,
            "WEAK_PASSWORD" => Self::WeakPassword(
                detail
                    .filter(|d| !d.is_empty())
                    .unwrap_or("Password should be at least 6 characters.")
                    .to_string(),
            ),
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => Self::OperationNotAllowed,
            _ => Self::Provider(message.to_string()),
        }
    }

    /// Whether the provider (or local validation) gave a reason the user can act on.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        !matches!(
            self,
            Self::Provider(_) | Self::Status { .. } | Self::Http(_) | Self::Endpoint(_)
        )
    }

    /// Message for the sign-in form, using `fallback` when there is no
    /// readable reason.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        if self.is_readable() {
            self.to_string()
        } else {
            fallback.to_string()
        }
    }
}

/// Identity Toolkit error envelope: `{"error": {"code": 400, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert!(matches!(
            AuthError::from_provider_message("EMAIL_NOT_FOUND"),
            AuthError::EmailNotFound
        ));
        assert!(matches!(
            AuthError::from_provider_message("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert_eq!(
            AuthError::from_provider_message("EMAIL_EXISTS").to_string(),
            "An account with this email address already exists."
        );
    }

    #[test]
    fn test_weak_password_keeps_detail() {
        let err = AuthError::from_provider_message(
            "WEAK_PASSWORD : Password should be at least 6 characters",
        );
        assert_eq!(err.to_string(), "Password should be at least 6 characters");
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let err = AuthError::from_provider_message("QUOTA_EXCEEDED");
        assert!(!err.is_readable());
        assert_eq!(err.user_message(SIGN_IN_FAILED), SIGN_IN_FAILED);
        assert_eq!(err.user_message(RESET_FAILED), RESET_FAILED);
    }

    #[test]
    fn test_credential_errors_are_readable() {
        let err = AuthError::from(CredentialError::EmptyPassword);
        assert!(err.is_readable());
        assert_eq!(err.user_message(SIGN_IN_FAILED), CredentialError::EmptyPassword.to_string());
    }
}

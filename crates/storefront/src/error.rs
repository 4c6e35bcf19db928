//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the storefront facade. Front ends
//! show [`AppError::user_message`] and call [`AppError::report`] so that
//! provider and internal faults reach Sentry while input mistakes do not.

use thiserror::Error;

use crate::admin::AdminError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::controller::ControllerError;
use crate::services::auth::{AuthError, SIGN_IN_FAILED};
use crate::shop::CheckoutError;
use crate::state::StateError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Both catalog backends failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Identity provider operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Admin panel operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Screen transition was refused.
    #[error("View error: {0}")]
    View(#[from] ControllerError),

    /// Buy Now on an item without a destination.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Provider clients could not be built.
    #[error("Startup error: {0}")]
    Startup(#[from] StateError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Message safe to show next to the form or screen that failed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Catalog(_) | Self::Startup(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            Self::Auth(err) => err.user_message(SIGN_IN_FAILED),
            Self::Admin(err) => err.user_message(),
            Self::View(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Whether this error indicates a fault on our side or a provider's.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        match self {
            Self::Catalog(_) | Self::Config(_) | Self::Startup(_) => true,
            Self::Admin(err) => err.is_fault(),
            Self::Auth(err) => !err.is_readable(),
            Self::View(_) | Self::Checkout(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Log the error, capturing faults to Sentry.
    pub fn report(&self) {
        if self.is_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Rejected user action");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful sign-in to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("navigation", "Opened admin panel", Some(&[("from", "shop")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product kT9x2".to_string());
        assert_eq!(err.to_string(), "Not found: product kT9x2");

        let err = AppError::BadRequest("price must be a number".to_string());
        assert_eq!(err.to_string(), "Bad request: price must be a number");
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::from(CatalogError::Malformed("slot /tmp/x: bad json".to_string()));
        assert!(err.is_fault());
        assert!(!err.user_message().contains("/tmp/x"));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = AppError::NotFound("Product kT9x2".to_string());
        assert!(!err.is_fault());
        assert_eq!(err.user_message(), "Product kT9x2 not found");
    }

    #[test]
    fn test_admin_validation_is_not_a_fault() {
        let err = AppError::from(AdminError::MissingImage);
        assert!(!err.is_fault());
        assert_eq!(err.user_message(), "Please select an image");
    }

    #[test]
    fn test_controller_errors_are_not_faults() {
        let err = AppError::from(ControllerError::InvalidPin);
        assert!(!err.is_fault());
        assert_eq!(err.user_message(), "Invalid Access PIN. Please try again.");
    }
}

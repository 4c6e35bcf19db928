//! Customer sign-in screen.
//!
//! Three steps: enter the email, then the password (signing in, or signing up
//! when toggled), or request a reset link and land on a "check your email"
//! screen.

use tracing::debug;

use crate::services::auth::{AuthGateway, RESET_FAILED, SIGN_IN_FAILED, UserSession};

/// Shown when "forgot password" is pressed with no email entered.
pub const EMAIL_REQUIRED: &str = "Please enter your email address first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignInStep {
    #[default]
    Email,
    Password,
    ResetSent,
}

/// Result of submitting the current step.
#[derive(Debug, Clone)]
pub enum SignInOutcome {
    /// Moved from the email step to the password step.
    AwaitingPassword,
    /// Signed in (or signed up); the screen should close.
    SignedIn(UserSession),
    /// The attempt failed; [`SignInFlow::error`] holds the message.
    Failed,
}

/// State of the sign-in screen.
#[derive(Debug, Clone, Default)]
pub struct SignInFlow {
    pub email: String,
    pub password: String,
    step: SignInStep,
    sign_up: bool,
    error: Option<String>,
}

impl SignInFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> SignInStep {
        self.step
    }

    #[must_use]
    pub const fn is_sign_up(&self) -> bool {
        self.sign_up
    }

    /// Message from the last failed action.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Screen heading.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match (self.step, self.sign_up) {
            (SignInStep::ResetSent, _) => "Check your email",
            (_, true) => "Create account",
            (_, false) => "Sign in",
        }
    }

    /// Switch between signing in and creating an account.
    pub fn toggle_sign_up(&mut self) {
        self.sign_up = !self.sign_up;
        self.error = None;
    }

    /// Go back to the email step.
    pub fn back(&mut self) {
        self.step = SignInStep::Email;
        self.error = None;
    }

    /// Submit the current step.
    ///
    /// On the email step this only advances; on the password step it calls the
    /// identity provider.
    pub async fn submit(&mut self, auth: &AuthGateway) -> SignInOutcome {
        self.error = None;

        if self.step == SignInStep::Email {
            self.step = SignInStep::Password;
            return SignInOutcome::AwaitingPassword;
        }

        let result = if self.sign_up {
            auth.sign_up(&self.email, &self.password).await
        } else {
            auth.sign_in(&self.email, &self.password).await
        };

        match result {
            Ok(session) => {
                self.password.clear();
                SignInOutcome::SignedIn(session)
            }
            Err(e) => {
                debug!(error = %e, "Sign-in attempt failed");
                self.error = Some(e.user_message(SIGN_IN_FAILED));
                SignInOutcome::Failed
            }
        }
    }

    /// "Forgot password": send a reset email for the entered address.
    pub async fn forgot_password(&mut self, auth: &AuthGateway) {
        if self.email.trim().is_empty() {
            self.error = Some(EMAIL_REQUIRED.to_string());
            self.step = SignInStep::Email;
            return;
        }

        match auth.send_password_reset(&self.email).await {
            Ok(()) => {
                self.error = None;
                self.step = SignInStep::ResetSent;
            }
            Err(e) => {
                debug!(error = %e, "Password reset failed");
                self.error = Some(e.user_message(RESET_FAILED));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::FirebaseConfig;

    fn offline_auth() -> AuthGateway {
        AuthGateway::new(
            &FirebaseConfig {
                api_key: SecretString::from("k"),
                project_id: "p".to_string(),
                firestore_base_url: "http://127.0.0.1:9".to_string(),
                identity_base_url: "http://127.0.0.1:9/v1".to_string(),
            },
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_email_step_only_advances() {
        let auth = offline_auth();
        let mut flow = SignInFlow::new();
        flow.email = "shopper@example.com".into();

        assert!(matches!(
            flow.submit(&auth).await,
            SignInOutcome::AwaitingPassword
        ));
        assert_eq!(flow.step(), SignInStep::Password);
        assert!(flow.error().is_none());
    }

    #[tokio::test]
    async fn test_forgot_password_without_email() {
        let auth = offline_auth();
        let mut flow = SignInFlow::new();
        flow.submit(&auth).await;
        assert_eq!(flow.step(), SignInStep::Password);

        flow.forgot_password(&auth).await;
        assert_eq!(flow.error(), Some(EMAIL_REQUIRED));
        assert_eq!(flow.step(), SignInStep::Email);
    }

    #[tokio::test]
    async fn test_unreachable_provider_uses_fallback_messages() {
        let auth = offline_auth();
        let mut flow = SignInFlow::new();
        flow.email = "shopper@example.com".into();
        flow.password = "hunter22".into();
        flow.submit(&auth).await;

        assert!(matches!(flow.submit(&auth).await, SignInOutcome::Failed));
        assert_eq!(flow.error(), Some(SIGN_IN_FAILED));
        assert_eq!(flow.step(), SignInStep::Password);

        flow.forgot_password(&auth).await;
        assert_eq!(flow.error(), Some(RESET_FAILED));
        assert_eq!(flow.step(), SignInStep::Password);
    }

    #[test]
    fn test_titles() {
        let mut flow = SignInFlow::new();
        assert_eq!(flow.title(), "Sign in");
        flow.toggle_sign_up();
        assert!(flow.is_sign_up());
        assert_eq!(flow.title(), "Create account");
    }
}

//! Customer authentication against the Identity Toolkit REST API.
//!
//! Email/password sign-in, sign-up and password reset are thin pass-throughs;
//! the provider is the authority and nothing is retried. Sign-out is local.
//!
//! The signed-in state is published on a [`tokio::sync::watch`] channel. A
//! subscriber sees the current state first and then each later change; rapid
//! successive changes may be coalesced into the latest one.

mod error;

pub use error::{AuthError, RESET_FAILED, SIGN_IN_FAILED};

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument};
use url::Url;

use sukoon_core::{Email, Password, UserId};

use crate::config::FirebaseConfig;
use crate::error::{clear_sentry_user, set_sentry_user};
use error::ErrorEnvelope;

/// A signed-in customer.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: UserId,
    pub email: String,
    pub id_token: SecretString,
    pub refresh_token: SecretString,
}

/// Whether a customer is signed in.
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(UserSession),
}

impl AuthState {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    #[must_use]
    pub const fn session(&self) -> Option<&UserSession> {
        match self {
            Self::SignedIn(session) => Some(session),
            Self::SignedOut => None,
        }
    }
}

/// Identity provider client and holder of the current auth state.
#[derive(Clone)]
pub struct AuthGateway {
    inner: Arc<AuthGatewayInner>,
}

struct AuthGatewayInner {
    client: reqwest::Client,
    base: Url,
    api_key: SecretString,
    state: watch::Sender<AuthState>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

impl AuthGateway {
    /// Create a new gateway. Starts signed out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Endpoint` if the Identity Toolkit base URL is invalid.
    pub fn new(config: &FirebaseConfig, client: reqwest::Client) -> Result<Self, AuthError> {
        let base = Url::parse(&config.identity_base_url)?;
        if base.cannot_be_a_base() {
            return Err(AuthError::Endpoint(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let (state, _) = watch::channel(AuthState::SignedOut);
        Ok(Self {
            inner: Arc::new(AuthGatewayInner {
                client,
                base,
                api_key: config.api_key.clone(),
                state,
            }),
        })
    }

    fn endpoint(&self, method: &str) -> Url {
        let mut url = self.inner.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(method);
        }
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        url
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => Err(AuthError::from_provider_message(&envelope.error.message)),
            Err(_) => Err(AuthError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            }),
        }
    }

    async fn start_session(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<UserSession, AuthError> {
        let email = Email::parse(email)?;
        let password = Password::new(password)?;

        let response = self
            .call(
                method,
                &PasswordRequest {
                    email: email.as_str(),
                    password: password.expose(),
                    return_secure_token: true,
                },
            )
            .await?;
        let body: SessionResponse = response.json().await?;

        let session = UserSession {
            user_id: UserId::new(body.local_id),
            email: if body.email.is_empty() {
                email.as_str().to_string()
            } else {
                body.email
            },
            id_token: SecretString::from(body.id_token),
            refresh_token: SecretString::from(body.refresh_token),
        };

        set_sentry_user(&session.user_id);
        info!(user_id = %session.user_id, "Customer signed in");
        self.inner
            .state
            .send_replace(AuthState::SignedIn(session.clone()));
        Ok(session)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Credentials` for input that cannot be valid, or the
    /// provider's rejection mapped to a readable variant.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AuthError> {
        self.start_session("accounts:signInWithPassword", email, password)
            .await
    }

    /// Create an account and sign in to it.
    ///
    /// # Errors
    ///
    /// Same as [`sign_in`](Self::sign_in); `EmailExists` and `WeakPassword`
    /// are the usual rejections.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<UserSession, AuthError> {
        self.start_session("accounts:signUp", email, password).await
    }

    /// Ask the provider to email a password reset link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the email is invalid or the provider refuses.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.call(
            "accounts:sendOobCode",
            &OobCodeRequest {
                request_type: "PASSWORD_RESET",
                email: email.as_str(),
            },
        )
        .await?;
        info!("Password reset email requested");
        Ok(())
    }

    /// Forget the current session.
    pub fn sign_out(&self) {
        let previous = self.inner.state.send_replace(AuthState::SignedOut);
        if previous.is_signed_in() {
            clear_sentry_user();
            info!("Customer signed out");
        }
    }

    /// Whether a customer is currently signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_signed_in()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to auth state changes.
    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.inner.state.subscribe(),
            primed: false,
        }
    }

    /// Run `callback` with the current state now and on every later change,
    /// until the returned listener is dropped.
    ///
    /// Must be called inside a tokio runtime.
    pub fn on_auth_state_changed<F>(&self, mut callback: F) -> AuthListener
    where
        F: FnMut(&AuthState) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let task = tokio::spawn(async move {
            while let Some(state) = subscription.next().await {
                callback(&state);
            }
        });
        AuthListener { task }
    }
}

/// Stream of auth states; the first call to [`next`](Self::next) yields the
/// state at subscription time.
pub struct AuthSubscription {
    rx: watch::Receiver<AuthState>,
    primed: bool,
}

impl AuthSubscription {
    /// Next state, or `None` once the gateway is gone.
    pub async fn next(&mut self) -> Option<AuthState> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Handle for a callback registered with
/// [`AuthGateway::on_auth_state_changed`]. Dropping it unsubscribes.
#[must_use = "dropping the listener unsubscribes immediately"]
pub struct AuthListener {
    task: JoinHandle<()>,
}

impl Drop for AuthListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! Customer account commands.
//!
//! # Usage
//!
//! ```bash
//! sukoon account sign-in --email shopper@example.com
//! sukoon account sign-up --email shopper@example.com
//! sukoon account reset --email shopper@example.com
//! ```

use dialoguer::Password;

use sukoon_storefront::Storefront;
use sukoon_storefront::account::{SignInFlow, SignInOutcome, SignInStep};
use sukoon_storefront::services::auth::{RESET_FAILED, SIGN_IN_FAILED};

use super::CliError;

/// Sign in, or create an account when `sign_up` is set. The password is
/// prompted.
///
/// # Errors
///
/// Returns the provider's message if the attempt is refused.
#[allow(clippy::print_stdout)]
pub async fn sign_in(shop: &mut Storefront, email: String, sign_up: bool) -> Result<(), CliError> {
    shop.toggle_user_auth(|_| false).await;

    let mut flow = SignInFlow::new();
    if sign_up {
        flow.toggle_sign_up();
    }
    flow.email = email;
    shop.submit_sign_in(&mut flow).await;

    flow.password = password_prompt(&flow)?;
    match shop.submit_sign_in(&mut flow).await {
        SignInOutcome::SignedIn(session) => {
            println!("Signed in as {}", session.email);
            Ok(())
        }
        SignInOutcome::AwaitingPassword | SignInOutcome::Failed => Err(CliError::Rejected(
            flow.error().unwrap_or(SIGN_IN_FAILED).to_string(),
        )),
    }
}

/// Send a password reset email.
///
/// # Errors
///
/// Returns the provider's message if no email could be sent.
#[allow(clippy::print_stdout)]
pub async fn reset(shop: &Storefront, email: String) -> Result<(), CliError> {
    let mut flow = SignInFlow::new();
    flow.email = email;
    shop.forgot_password(&mut flow).await;

    if flow.step() == SignInStep::ResetSent {
        println!("{}: a reset link was sent to {}", flow.title(), flow.email);
        Ok(())
    } else {
        Err(CliError::Rejected(
            flow.error().unwrap_or(RESET_FAILED).to_string(),
        ))
    }
}

/// Prompt for the password on the password step.
///
/// # Errors
///
/// Returns `CliError::Prompt` if the terminal cannot be read.
pub fn password_prompt(flow: &SignInFlow) -> Result<String, CliError> {
    let prompt = Password::new().with_prompt("Password");
    let password = if flow.is_sign_up() {
        prompt
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?
    } else {
        prompt.interact()?
    };
    Ok(password)
}

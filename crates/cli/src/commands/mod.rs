//! CLI subcommands.

use dialoguer::Confirm;
use thiserror::Error;

use sukoon_storefront::AppError;
use sukoon_storefront::services::media::MediaError;
use sukoon_storefront::services::transcription::TranscriptionError;

pub mod account;
pub mod admin;
pub mod interactive;
pub mod shop;
pub mod transcribe;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A storefront operation failed. Displays the user-facing message.
    #[error("{}", .0.user_message())]
    App(AppError),

    /// A prompt could not be shown or read.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// An image file could not be read.
    #[error("Could not read image: {0}")]
    Image(#[from] MediaError),

    /// An audio file could not be read.
    #[error("Could not read audio: {0}")]
    Audio(#[from] TranscriptionError),

    /// The provider refused the request; holds its readable message.
    #[error("{0}")]
    Rejected(String),
}

impl From<AppError> for CliError {
    fn from(err: AppError) -> Self {
        err.report();
        Self::App(err)
    }
}

/// Ask a yes/no question, defaulting to no.
///
/// A prompt that cannot be shown counts as a no.
pub fn confirm(question: &str) -> bool {
    Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Report a storefront error and show its message without ending the session.
#[allow(clippy::print_stdout)]
pub fn show_error(err: &AppError) {
    err.report();
    println!("{}", err.user_message());
}

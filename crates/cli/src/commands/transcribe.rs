//! Voice search from an audio file.
//!
//! # Usage
//!
//! ```bash
//! SHOP_TRANSCRIPTION_ENABLED=true sukoon transcribe query.ogg
//! ```
//!
//! # Environment Variables
//!
//! - `GEMINI_API_KEY` - Required for transcription
//! - `SHOP_TRANSCRIPTION_ENABLED` - Transcription is off unless set to `true`

use std::path::Path;

use sukoon_storefront::Storefront;
use sukoon_storefront::services::transcription::AudioClip;

use super::CliError;

/// Transcribe `path` and print the text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or transcription is
/// unavailable.
#[allow(clippy::print_stdout)]
pub async fn run(shop: &Storefront, path: &Path) -> Result<(), CliError> {
    let clip = AudioClip::from_path(path).await?;
    tracing::debug!(mime_type = %clip.mime_type, "Transcribing audio file");
    let text = shop.transcribe(&clip).await?;
    println!("{text}");
    Ok(())
}

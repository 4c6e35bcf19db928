//! Voice search against the fake Gemini.
//!
//! Run with: cargo test -p sukoon-integration-tests --test transcription

use tempfile::TempDir;

use sukoon_integration_tests::FakeProviders;
use sukoon_storefront::services::transcription::{
    AudioClip, NO_TRANSCRIPT, TRANSCRIPTION_FAILED, TRANSCRIPTION_PROMPT,
};
use sukoon_storefront::{AppState, Storefront};

async fn setup(enabled: &str) -> (FakeProviders, TempDir, Storefront) {
    let providers = FakeProviders::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = providers.config(dir.path(), &[("SHOP_TRANSCRIPTION_ENABLED", enabled)]);
    let state = AppState::new(config).expect("Failed to build app state");
    (providers, dir, Storefront::new(state))
}

#[tokio::test]
async fn test_transcribes_audio_file() {
    let (providers, dir, shop) = setup("true").await;
    providers.set_transcript("show me oud perfumes");
    assert!(shop.shop_page().transcription_enabled);

    let path = dir.path().join("query.ogg");
    tokio::fs::write(&path, b"OggS fake audio")
        .await
        .expect("Failed to write audio");
    let clip = AudioClip::from_path(&path).await.expect("Failed to read audio");

    let text = shop.transcribe(&clip).await.expect("Transcription unavailable");
    assert_eq!(text, "show me oud perfumes");

    let requests = providers.audio_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].mime_type, "audio/ogg");
    assert_eq!(requests[0].data, "T2dnUyBmYWtlIGF1ZGlv");
    assert_eq!(requests[0].prompt, TRANSCRIPTION_PROMPT);
}

#[tokio::test]
async fn test_provider_faults_become_placeholders() {
    let (providers, _dir, shop) = setup("true").await;
    let clip = AudioClip::from_bytes(b"audio", "audio/webm");

    providers.set_transcript("   ");
    assert_eq!(
        shop.transcribe(&clip).await.expect("Transcription unavailable"),
        NO_TRANSCRIPT
    );

    providers.set_gemini_down(true);
    assert_eq!(
        shop.transcribe(&clip).await.expect("Transcription unavailable"),
        TRANSCRIPTION_FAILED
    );
}

#[tokio::test]
async fn test_disabled_in_settings() {
    let (providers, _dir, shop) = setup("false").await;
    assert!(!shop.shop_page().transcription_enabled);

    let err = shop
        .transcribe(&AudioClip::from_bytes(b"audio", "audio/webm"))
        .await
        .expect_err("Transcription should be off");
    assert_eq!(err.user_message(), "Voice transcription is turned off.");
    assert!(providers.audio_requests().is_empty());
}

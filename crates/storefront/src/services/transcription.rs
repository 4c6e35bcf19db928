//! Voice transcription through Gemini `generateContent`.
//!
//! [`Transcriber::transcribe`] never fails: faults are logged and collapse to
//! [`TRANSCRIPTION_FAILED`], an empty answer to [`NO_TRANSCRIPT`].

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};
use url::Url;

use crate::config::GeminiConfig;

/// Instruction sent alongside the audio.
pub const TRANSCRIPTION_PROMPT: &str = "Please transcribe the audio accurately into text. Provide only the transcription without any extra comments.";

/// Returned when the model answers with no text.
pub const NO_TRANSCRIPT: &str = "Could not transcribe audio.";

/// Returned when the request fails.
pub const TRANSCRIPTION_FAILED: &str = "Error during transcription.";

/// MIME type assumed for audio of unknown format.
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// Errors inside a transcription attempt. Logged, never returned to callers
/// of [`Transcriber::transcribe`].
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("could not read audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Base64 audio with its MIME type.
#[derive(Clone)]
pub struct AudioClip {
    pub data: String,
    pub mime_type: String,
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl AudioClip {
    /// Encode raw audio bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Read and encode an audio file, inferring the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// Returns `TranscriptionError::Io` if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, TranscriptionError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(&bytes, audio_mime_type(path)))
    }
}

/// MIME type for an audio file name.
#[must_use]
pub fn audio_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("ogg" | "oga" | "opus") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a" | "mp4") => "audio/mp4",
        _ => DEFAULT_AUDIO_MIME,
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, joined.
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Gemini speech-to-text client.
#[derive(Clone)]
pub struct Transcriber {
    inner: Arc<TranscriberInner>,
}

struct TranscriberInner {
    client: reqwest::Client,
    endpoint: Url,
    api_key: SecretString,
}

impl Transcriber {
    /// Create a new transcriber.
    ///
    /// # Errors
    ///
    /// Returns `TranscriptionError::Endpoint` if the base URL is invalid.
    pub fn new(config: &GeminiConfig, client: reqwest::Client) -> Result<Self, TranscriptionError> {
        let method = format!("{}:generateContent", config.model);
        let mut endpoint = Url::parse(&config.base_url)?;
        endpoint
            .path_segments_mut()
            .map_err(|()| {
                TranscriptionError::Endpoint(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(["v1beta", "models", method.as_str()]);

        Ok(Self {
            inner: Arc::new(TranscriberInner {
                client,
                endpoint,
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Transcribe base64 audio. Returns a placeholder sentence instead of
    /// failing.
    #[instrument(skip(self, base64_audio), fields(audio_len = base64_audio.len()))]
    pub async fn transcribe(&self, base64_audio: &str, mime_type: &str) -> String {
        match self.request(base64_audio, mime_type).await {
            Ok(text) if text.trim().is_empty() => NO_TRANSCRIPT.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Transcription failed");
                TRANSCRIPTION_FAILED.to_string()
            }
        }
    }

    /// Transcribe an encoded clip.
    pub async fn transcribe_clip(&self, clip: &AudioClip) -> String {
        self.transcribe(&clip.data, &clip.mime_type).await
    }

    async fn request(
        &self,
        base64_audio: &str,
        mime_type: &str,
    ) -> Result<String, TranscriptionError> {
        let mut url = self.inner.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());

        let body = GenerateContentRequest {
            contents: [Content {
                parts: [
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: base64_audio,
                        },
                    },
                    Part::Text {
                        text: TRANSCRIPTION_PROMPT,
                    },
                ],
            }],
        };

        let response = self.inner.client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Ok(parsed.text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(audio_mime_type(Path::new("memo.webm")), "audio/webm");
        assert_eq!(audio_mime_type(Path::new("memo.OGG")), "audio/ogg");
        assert_eq!(audio_mime_type(Path::new("memo.mp3")), "audio/mpeg");
        assert_eq!(audio_mime_type(Path::new("memo.wav")), "audio/wav");
        assert_eq!(audio_mime_type(Path::new("memo.m4a")), "audio/mp4");
        assert_eq!(audio_mime_type(Path::new("memo")), DEFAULT_AUDIO_MIME);
        assert_eq!(audio_mime_type(Path::new("memo.flac")), DEFAULT_AUDIO_MIME);
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "audio/webm",
                            data: "AAAA",
                        },
                    },
                    Part::Text {
                        text: TRANSCRIPTION_PROMPT,
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "audio/webm");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], TRANSCRIPTION_PROMPT);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"salam "},{"text":"sukoon"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), "salam sukoon");

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_endpoint() {
        let transcriber = Transcriber::new(
            &GeminiConfig {
                api_key: SecretString::from("gm"),
                model: "gemini-3-flash-preview".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
            },
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(
            transcriber.inner.endpoint.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[tokio::test]
    async fn test_clip_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.ogg");
        std::fs::write(&path, b"OggS").unwrap();

        let clip = AudioClip::from_path(&path).await.unwrap();
        assert_eq!(clip.mime_type, "audio/ogg");
        assert_eq!(clip.data, "T2dnUw==");
    }

    #[tokio::test]
    async fn test_unreachable_service_yields_placeholder() {
        let transcriber = Transcriber::new(
            &GeminiConfig {
                api_key: SecretString::from("gm"),
                model: "m".to_string(),
                base_url: "http://127.0.0.1:9".to_string(),
            },
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(
            transcriber.transcribe("AAAA", "audio/webm").await,
            TRANSCRIPTION_FAILED
        );
    }
}

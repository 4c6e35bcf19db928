//! Product image hosting via Cloudinary unsigned uploads.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::config::CloudinaryConfig;

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cloudinary rejected the upload.
    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The success response carried no URL.
    #[error("upload response missing secure_url")]
    MissingUrl,

    /// The image file could not be read.
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),

    /// The Cloudinary endpoint is misconfigured.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// An image ready for upload.
#[derive(Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, MediaError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            mime_type: image_mime_type(path),
            file_name,
            bytes,
        })
    }
}

fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Deserialize)]
struct UploadErrorResponse {
    error: UploadErrorBody,
}

#[derive(Deserialize)]
struct UploadErrorBody {
    message: String,
}

/// Cloudinary client for product images.
#[derive(Clone)]
pub struct ImageHost {
    inner: Arc<ImageHostInner>,
}

struct ImageHostInner {
    client: reqwest::Client,
    endpoint: Url,
    upload_preset: String,
}

impl ImageHost {
    /// Create a new image host client.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Endpoint` if the base URL is invalid.
    pub fn new(config: &CloudinaryConfig, client: reqwest::Client) -> Result<Self, MediaError> {
        let mut endpoint = Url::parse(&config.base_url)?;
        endpoint
            .path_segments_mut()
            .map_err(|()| MediaError::Endpoint(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["v1_1", config.cloud_name.as_str(), "image", "upload"]);

        Ok(Self {
            inner: Arc::new(ImageHostInner {
                client,
                endpoint,
                upload_preset: config.upload_preset.clone(),
            }),
        })
    }

    /// Upload an image and return its public HTTPS URL.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` if the request fails or Cloudinary rejects it.
    #[instrument(skip(self, image), fields(file = %image.file_name, len = image.bytes.len()))]
    pub async fn upload(&self, image: ImageFile) -> Result<String, MediaError> {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.inner.upload_preset.clone());

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UploadErrorResponse>(&text)
                .map_or_else(|_| text.chars().take(200).collect(), |e| e.error.message);
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        let url = body.secure_url.ok_or(MediaError::MissingUrl)?;
        info!(%url, "Image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let host = ImageHost::new(
            &CloudinaryConfig {
                cloud_name: "sukoon".to_string(),
                upload_preset: "unsigned_products".to_string(),
                base_url: "https://api.cloudinary.com".to_string(),
            },
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(
            host.inner.endpoint.as_str(),
            "https://api.cloudinary.com/v1_1/sukoon/image/upload"
        );
    }

    #[tokio::test]
    async fn test_image_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oud.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let image = ImageFile::from_path(&path).await.unwrap();
        assert_eq!(image.file_name, "oud.PNG");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_image_file() {
        let err = ImageFile::from_path(Path::new("/definitely/not/here.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
    }
}

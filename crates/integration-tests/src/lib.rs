//! Integration tests for Sukoon Shop.
//!
//! The storefront talks to four hosted providers. [`FakeProviders`] stands in
//! for all of them with one in-process `axum` server on `127.0.0.1:0`, so the
//! tests exercise the real HTTP clients, URL building and wire formats.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sukoon-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Firestore listing, local fallback
//! - `accounts` - Identity Toolkit sign-in, sign-up, password reset
//! - `admin` - Publishing with Cloudinary uploads
//! - `transcription` - Gemini voice search
//!
//! # Routes
//!
//! | Provider | Base URL given to the storefront |
//! |----------|----------------------------------|
//! | Firestore | `{server}/firestore/v1` |
//! | Identity Toolkit | `{server}/identity/v1` |
//! | Cloudinary | `{server}/cloudinary` |
//! | Gemini | `{server}/gemini` |

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use sukoon_storefront::ShopConfig;

/// API key every fake provider accepts.
pub const FAKE_API_KEY: &str = "test-key";
/// Firebase project the fake Firestore serves.
pub const FAKE_PROJECT: &str = "sukoon-test";
/// Cloudinary cloud name the fake accepts uploads for.
pub const FAKE_CLOUD: &str = "sukoon";
/// Cloudinary unsigned upload preset the fake accepts.
pub const FAKE_PRESET: &str = "unsigned_products";
/// Gemini model the fake answers for.
pub const FAKE_MODEL: &str = "gemini-test";

/// A product document as stored by the fake Firestore.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Value,
}

impl StoredDocument {
    fn created_at(&self) -> i64 {
        self.fields["createdAt"]["integerValue"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// A string field's value, or `""`.
    #[must_use]
    pub fn string(&self, field: &str) -> &str {
        self.fields[field]["stringValue"].as_str().unwrap_or_default()
    }
}

/// A file received by the fake Cloudinary.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub upload_preset: String,
    pub len: usize,
}

/// A `generateContent` call received by the fake Gemini.
#[derive(Debug, Clone)]
pub struct AudioRequest {
    pub mime_type: String,
    pub data: String,
    pub prompt: String,
}

#[derive(Default)]
struct Recorded {
    documents: Vec<StoredDocument>,
    next_document: u64,
    accounts: HashMap<String, (String, String)>,
    reset_requests: Vec<String>,
    uploads: Vec<Upload>,
    audio: Vec<AudioRequest>,
    transcript: String,
    firestore_down: bool,
    cloudinary_down: bool,
    gemini_down: bool,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Recorded>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process stand-in for Firestore, Identity Toolkit, Cloudinary and Gemini.
///
/// The server stops when this value is dropped.
pub struct FakeProviders {
    addr: SocketAddr,
    shared: Shared,
    task: JoinHandle<()>,
}

impl FakeProviders {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let shared = Shared::default();
        let router = Router::new()
            .route("/cloudinary/v1_1/{cloud}/image/upload", post(cloudinary_upload))
            .fallback(dispatch)
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake provider server");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake provider address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, shared, task }
    }

    /// Absolute URL on the fake server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Storefront configuration pointing every provider at this server,
    /// keeping the local slot in `data_dir`. `extra` adds or overrides
    /// variables.
    ///
    /// # Panics
    ///
    /// Panics if `extra` makes the configuration invalid.
    #[must_use]
    pub fn config(&self, data_dir: &Path, extra: &[(&str, &str)]) -> ShopConfig {
        let mut vars: HashMap<String, String> = [
            ("FIREBASE_API_KEY", FAKE_API_KEY.to_string()),
            ("FIREBASE_PROJECT_ID", FAKE_PROJECT.to_string()),
            ("FIRESTORE_BASE_URL", self.url("/firestore/v1")),
            ("IDENTITY_TOOLKIT_BASE_URL", self.url("/identity/v1")),
            ("CLOUDINARY_CLOUD_NAME", FAKE_CLOUD.to_string()),
            ("CLOUDINARY_UPLOAD_PRESET", FAKE_PRESET.to_string()),
            ("CLOUDINARY_BASE_URL", self.url("/cloudinary")),
            ("GEMINI_API_KEY", FAKE_API_KEY.to_string()),
            ("GEMINI_MODEL", FAKE_MODEL.to_string()),
            ("GEMINI_BASE_URL", self.url("/gemini")),
            ("SHOP_DATA_DIR", data_dir.display().to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        vars.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        ShopConfig::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test configuration")
    }

    // -------------------------------------------------------------------------
    // Scenario controls
    // -------------------------------------------------------------------------

    /// Make every Firestore call answer 503.
    pub fn set_firestore_down(&self, down: bool) {
        self.shared.lock().firestore_down = down;
    }

    /// Make every Cloudinary upload answer 500.
    pub fn set_cloudinary_down(&self, down: bool) {
        self.shared.lock().cloudinary_down = down;
    }

    /// Make every Gemini call answer 500.
    pub fn set_gemini_down(&self, down: bool) {
        self.shared.lock().gemini_down = down;
    }

    /// Text the fake Gemini answers with.
    pub fn set_transcript(&self, text: &str) {
        self.shared.lock().transcript = text.to_string();
    }

    /// Put a product straight into Firestore. `price` is a Firestore value
    /// such as `json!({"integerValue": "15"})`.
    pub fn seed_product(&self, id: &str, name: &str, price: Value, created_at: i64) {
        self.shared.lock().documents.push(StoredDocument {
            id: id.to_string(),
            fields: json!({
                "name": {"stringValue": name},
                "description": {"stringValue": format!("{name} description")},
                "itemCode": {"stringValue": format!("SKN-{id}")},
                "price": price,
                "imageUrl": {"stringValue": format!("https://img.example/{id}.jpg")},
                "destinationUrl": {"stringValue": format!("https://pay.example/{id}")},
                "createdAt": {"integerValue": created_at.to_string()},
            }),
        });
    }

    /// Register a customer account.
    pub fn add_account(&self, email: &str, password: &str) {
        let mut recorded = self.shared.lock();
        let uid = format!("uid-{}", recorded.accounts.len() + 1);
        recorded
            .accounts
            .insert(email.to_string(), (uid, password.to_string()));
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Documents in the fake `products` collection, in insertion order.
    #[must_use]
    pub fn stored_products(&self) -> Vec<StoredDocument> {
        self.shared.lock().documents.clone()
    }

    /// Emails a password reset was requested for.
    #[must_use]
    pub fn reset_requests(&self) -> Vec<String> {
        self.shared.lock().reset_requests.clone()
    }

    #[must_use]
    pub fn uploads(&self) -> Vec<Upload> {
        self.shared.lock().uploads.clone()
    }

    #[must_use]
    pub fn audio_requests(&self) -> Vec<AudioRequest> {
        self.shared.lock().audio.clone()
    }
}

impl Drop for FakeProviders {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn provider_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": {"code": status.as_u16(), "message": message}})),
    )
        .into_response()
}

fn has_key(uri: &Uri) -> bool {
    uri.query()
        .is_some_and(|q| q.split('&').any(|pair| pair == format!("key={FAKE_API_KEY}")))
}

async fn dispatch(State(shared): State<Shared>, method: Method, uri: Uri, body: Bytes) -> Response {
    if !has_key(&uri) {
        return provider_error(StatusCode::FORBIDDEN, "API_KEY_INVALID");
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path();

    let firestore_root = format!("/firestore/v1/projects/{FAKE_PROJECT}/databases/(default)/");
    if let Some(rest) = path.strip_prefix(&firestore_root) {
        return firestore(&shared, &method, rest, &body);
    }
    if let Some(rest) = path.strip_prefix("/identity/v1/") {
        return identity(&shared, rest, &body);
    }
    if path == format!("/gemini/v1beta/models/{FAKE_MODEL}:generateContent") {
        return gemini(&shared, &body);
    }
    provider_error(StatusCode::NOT_FOUND, "NOT_FOUND")
}

fn firestore(shared: &Shared, method: &Method, rest: &str, body: &Value) -> Response {
    let mut recorded = shared.lock();
    if recorded.firestore_down {
        return provider_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "The service is currently unavailable.",
        );
    }

    let collection = "documents/products";
    let name =
        |id: &str| format!("projects/{FAKE_PROJECT}/databases/(default)/documents/products/{id}");

    let is_post = *method == Method::POST;
    match rest {
        "documents:runQuery" if is_post => {
            let from = &body["structuredQuery"]["from"][0]["collectionId"];
            let order = &body["structuredQuery"]["orderBy"][0];
            if from != "products"
                || order["field"]["fieldPath"] != "createdAt"
                || order["direction"] != "DESCENDING"
            {
                return provider_error(StatusCode::BAD_REQUEST, "unexpected query");
            }

            let mut documents = recorded.documents.clone();
            documents.sort_by_key(|d| std::cmp::Reverse(d.created_at()));
            let read_time = "2026-01-01T00:00:00Z";
            let items: Vec<Value> = if documents.is_empty() {
                vec![json!({"readTime": read_time})]
            } else {
                documents
                    .iter()
                    .map(|d| {
                        json!({
                            "document": {"name": name(&d.id), "fields": d.fields},
                            "readTime": read_time,
                        })
                    })
                    .collect()
            };
            Json(Value::Array(items)).into_response()
        }
        path if is_post && path == collection => {
            recorded.next_document += 1;
            let id = format!("doc{}", recorded.next_document);
            let fields = body["fields"].clone();
            recorded.documents.push(StoredDocument {
                id: id.clone(),
                fields: fields.clone(),
            });
            Json(json!({"name": name(&id), "fields": fields})).into_response()
        }
        path if *method == Method::DELETE => match path.strip_prefix("documents/products/") {
            Some(id) => {
                recorded.documents.retain(|d| d.id != id);
                Json(json!({})).into_response()
            }
            None => provider_error(StatusCode::NOT_FOUND, "NOT_FOUND"),
        },
        _ => provider_error(StatusCode::NOT_FOUND, "NOT_FOUND"),
    }
}

fn session(uid: &str, email: &str) -> Response {
    Json(json!({
        "localId": uid,
        "email": email,
        "idToken": format!("id-token-{uid}"),
        "refreshToken": format!("refresh-token-{uid}"),
        "expiresIn": "3600",
    }))
    .into_response()
}

fn identity(shared: &Shared, method: &str, body: &Value) -> Response {
    let mut recorded = shared.lock();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    match method {
        "accounts:signUp" => {
            if recorded.accounts.contains_key(&email) {
                return provider_error(StatusCode::BAD_REQUEST, "EMAIL_EXISTS");
            }
            if password.len() < 6 {
                return provider_error(
                    StatusCode::BAD_REQUEST,
                    "WEAK_PASSWORD : Password should be at least 6 characters",
                );
            }
            let uid = format!("uid-{}", recorded.accounts.len() + 1);
            recorded
                .accounts
                .insert(email.clone(), (uid.clone(), password.to_string()));
            session(&uid, &email)
        }
        "accounts:signInWithPassword" => match recorded.accounts.get(&email) {
            Some((uid, stored)) if stored == password => session(uid, &email),
            _ => provider_error(StatusCode::BAD_REQUEST, "INVALID_LOGIN_CREDENTIALS"),
        },
        "accounts:sendOobCode" => {
            if body["requestType"] != "PASSWORD_RESET" {
                return provider_error(StatusCode::BAD_REQUEST, "INVALID_REQ_TYPE");
            }
            if !recorded.accounts.contains_key(&email) {
                return provider_error(StatusCode::BAD_REQUEST, "EMAIL_NOT_FOUND");
            }
            recorded.reset_requests.push(email.clone());
            Json(json!({"email": email})).into_response()
        }
        _ => provider_error(StatusCode::NOT_FOUND, "NOT_FOUND"),
    }
}

fn gemini(shared: &Shared, body: &Value) -> Response {
    let mut recorded = shared.lock();
    if recorded.gemini_down {
        return provider_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error encountered.");
    }

    let parts = &body["contents"][0]["parts"];
    let inline = &parts[0]["inlineData"];
    recorded.audio.push(AudioRequest {
        mime_type: inline["mimeType"].as_str().unwrap_or_default().to_string(),
        data: inline["data"].as_str().unwrap_or_default().to_string(),
        prompt: parts[1]["text"].as_str().unwrap_or_default().to_string(),
    });

    Json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": recorded.transcript}]},
            "finishReason": "STOP",
        }]
    }))
    .into_response()
}

async fn cloudinary_upload(
    State(shared): State<Shared>,
    UrlPath(cloud): UrlPath<String>,
    mut multipart: Multipart,
) -> Response {
    let mut upload = Upload {
        file_name: String::new(),
        content_type: String::new(),
        upload_preset: String::new(),
        len: 0,
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().unwrap_or_default().to_string();
                upload.content_type = field.content_type().unwrap_or_default().to_string();
                upload.len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
            }
            "upload_preset" => {
                upload.upload_preset = field.text().await.unwrap_or_default();
            }
            _ => {}
        }
    }

    let mut recorded = shared.lock();
    if recorded.cloudinary_down {
        return provider_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }
    if cloud != FAKE_CLOUD || upload.upload_preset != FAKE_PRESET {
        return provider_error(StatusCode::BAD_REQUEST, "Upload preset not found");
    }
    if upload.len == 0 {
        return provider_error(StatusCode::BAD_REQUEST, "Empty file");
    }

    let secure_url = format!(
        "https://res.cloudinary.test/{cloud}/image/upload/v1/{}",
        upload.file_name
    );
    recorded.uploads.push(upload);
    Json(json!({
        "public_id": "products/abc123",
        "secure_url": secure_url,
        "url": secure_url.replacen("https", "http", 1),
    }))
    .into_response()
}

//! HTTP client for the scan backend
//!
//! Endpoints: `POST /api/upload`, `GET /api/organ/{id}`, `GET /api/organs`,
//! `GET /api/health`. Organ and catalog bodies are decoded with the same
//! functions the fallback loader uses.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::organ::{catalog_from_json, CatalogEntry, Organ, UploadResult};
use crate::error::ApiError;

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
];

/// Data source the controller talks to
pub trait ScanService: Clone + Send + Sync + 'static {
    fn upload(&self, image: ImageFile) -> impl Future<Output = Result<UploadResult, ApiError>> + Send;
    fn organ(&self, id: &str) -> impl Future<Output = Result<Organ, ApiError>> + Send;
    fn catalog(&self) -> impl Future<Output = Result<Vec<CatalogEntry>, ApiError>> + Send;
    fn health(&self) -> impl Future<Output = Result<String, ApiError>> + Send;
}

/// An image read from disk, ready to be sent as the `image` form field
#[derive(Clone, Debug)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub async fn open(path: &Path) -> Result<Self, ApiError> {
        if path.as_os_str().is_empty() {
            return Err(ApiError::InvalidImage("No file selected".to_string()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let mime = IMAGE_EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| *mime)
            .ok_or_else(|| ApiError::InvalidImage(format!("{} is not an image file", path.display())))?;

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self { file_name, mime, bytes })
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    part: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get_bytes(&self, segments: &[&str]) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl ScanService for ApiClient {
    async fn upload(&self, image: ImageFile) -> Result<UploadResult, ApiError> {
        let url = self.endpoint(&["api", "upload"])?;
        tracing::debug!(url = %url, file = %image.file_name, size = image.bytes.len(), "Uploading image");

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)?;
        let form = Form::new().part("image", part);

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Failures carry a JSON body with the reason, whatever the status
        let parsed: UploadResponse = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => return Err(ApiError::Status(status.as_u16())),
            Err(e) => return Err(ApiError::Decode(e)),
        };

        if !parsed.success {
            let reason = parsed
                .error
                .unwrap_or_else(|| format!("Server returned status {}", status.as_u16()));
            return Err(ApiError::Rejected(reason));
        }

        let part = parsed
            .part
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Rejected("Response did not name an organ".to_string()))?;

        let mut result = UploadResult::detected(part, parsed.confidence.unwrap_or(0.0));
        result.message = parsed.message;
        Ok(result)
    }

    async fn organ(&self, id: &str) -> Result<Organ, ApiError> {
        let body = self.get_bytes(&["api", "organ", id]).await?;
        Ok(Organ::from_json(id, &body)?)
    }

    async fn catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
        let body = self.get_bytes(&["api", "organs"]).await?;
        Ok(catalog_from_json(&body)?)
    }

    async fn health(&self) -> Result<String, ApiError> {
        let body = self.get_bytes(&["api", "health"]).await?;
        let health: HealthResponse = serde_json::from_slice(&body)?;
        Ok(health.message.unwrap_or(health.status))
    }
}

/// Expand a leading `~/` in a typed path
pub fn expand_path(input: &str) -> PathBuf {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::io::Write;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    fn image_fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chest.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"\x89PNG fake").unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_upload_success() {
        let router = Router::new().route(
            "/api/upload",
            post(|| async { Json(json!({"success": true, "part": "lungs", "confidence": 0.87, "message": "ok"})) }),
        );
        let base = spawn_server(router).await;
        let (_dir, path) = image_fixture();

        let image = ImageFile::open(&path).await.unwrap();
        assert_eq!(image.mime, "image/png");
        let result = client(&base).upload(image).await.unwrap();

        assert_eq!(result.part, "lungs");
        assert_eq!(result.confidence_percent(), 87);
        assert_eq!(result.message.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_upload_rejection_carries_server_reason() {
        let router = Router::new().route(
            "/api/upload",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "error": "cannot identify image file"})),
                )
            }),
        );
        let base = spawn_server(router).await;
        let (_dir, path) = image_fixture();

        let err = client(&base).upload(ImageFile::open(&path).await.unwrap()).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref reason) if reason == "cannot identify image file"));
    }

    #[tokio::test]
    async fn test_upload_malformed_body() {
        let router = Router::new().route("/api/upload", post(|| async { "not json" }));
        let base = spawn_server(router).await;
        let (_dir, path) = image_fixture();

        let err = client(&base).upload(ImageFile::open(&path).await.unwrap()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_organ_and_catalog() {
        let router = Router::new()
            .route(
                "/api/organ/:id",
                get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
                    if id == "eye" {
                        (StatusCode::OK, Json(json!({"name": "Eye", "subparts": [{"name": "Retina"}]})))
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({"error": "Organ not found"})))
                    }
                }),
            )
            .route(
                "/api/organs",
                get(|| async { Json(json!([{"id": "eye", "name": "Eye", "emoji": "e", "system": "Sensory System", "description": "Vision"}])) }),
            )
            .route("/api/health", get(|| async { Json(json!({"status": "healthy", "message": "ScanSpectrum is running!"})) }));
        let base = spawn_server(router).await;
        let api = client(&base);

        let eye = api.organ("eye").await.unwrap();
        assert_eq!(eye.id, "eye");
        assert_eq!(eye.subparts[0].number, Some(1));

        assert!(matches!(api.organ("kidney").await, Err(ApiError::Status(404))));

        let catalog = api.catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].system, "Sensory System");

        assert_eq!(api.health().await.unwrap(), "ScanSpectrum is running!");
    }

    #[tokio::test]
    async fn test_image_validation() {
        let err = ImageFile::open(Path::new("")).await.unwrap_err();
        assert_eq!(err.to_string(), "No file selected");

        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "hello").unwrap();
        assert!(matches!(ImageFile::open(&notes).await, Err(ApiError::InvalidImage(_))));

        let missing = dir.path().join("missing.jpg");
        assert!(matches!(ImageFile::open(&missing).await, Err(ApiError::Io(_))));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("http://example.test/scan/");
        let url = api.endpoint(&["api", "organ", "left lung"]).unwrap();
        assert_eq!(url.as_str(), "http://example.test/scan/api/organ/left%20lung");

        assert!(ApiClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}

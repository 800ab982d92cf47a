use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::{ImageUpload, MediaUploader, UPLOAD_FOLDER};
use crate::config::MediaConfig;
use crate::utils::error::{AppError, AppResult};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Deserialize)]
struct UploadErrorBody {
    message: String,
}

/// Signed uploads to Cloudinary's image endpoint.
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: Option<MediaConfig>,
}

impl CloudinaryUploader {
    pub fn new(config: Option<MediaConfig>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

/// Hex SHA-256 over the `&`-joined, key-sorted params followed by the secret.
fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    #[tracing::instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> AppResult<String> {
        let config = self.config.as_ref().ok_or_else(|| {
            AppError::Configuration("Cloudinary credentials are not configured".to_string())
        })?;

        let signed = [
            ("folder", UPLOAD_FOLDER.to_string()),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
        ];
        let signature = sign(&signed, &config.api_secret);

        let mut file = Part::bytes(image.bytes)
            .file_name(image.file_name.unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = image.content_type.as_deref() {
            file = file
                .mime_str(content_type)
                .map_err(|e| AppError::UploadFailed(format!("invalid content type: {e}")))?;
        }

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in signed {
            form = form.text(key, value);
        }

        let url = format!("{API_BASE}/{}/image/upload", config.cloud_name);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::UploadFailed(e.to_string()))?;

        let status = response.status();
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::UploadFailed(format!("unreadable response ({status}): {e}")))?;

        if !status.is_success() {
            let reason = body
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(AppError::UploadFailed(reason));
        }

        let secure_url = body
            .secure_url
            .ok_or_else(|| AppError::UploadFailed("response missing secure_url".to_string()))?;
        tracing::info!(url = %secure_url, "Image uploaded");
        Ok(secure_url)
    }
}

//! Cloudinary media store
//!
//! Uses the signed upload API directly over HTTP. Requests are signed with
//! SHA-256 over the alphabetically sorted parameters followed by the API
//! secret.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::media::{Asset, MediaFolder, MediaStore, UploadFile};
use crate::domain::DomainError;

pub const DEFAULT_CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com";

/// Resource types `auto` uploads can land in; destroy has to name the right one
const RESOURCE_TYPES: [&str; 3] = ["image", "raw", "video"];

/// Cloudinary account settings
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: DEFAULT_CLOUDINARY_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[hidden]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Media store backed by Cloudinary
#[derive(Debug, Clone)]
pub struct CloudinaryMediaStore {
    config: CloudinaryConfig,
    http_client: Client,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self, DomainError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self, resource: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name,
            resource,
            action
        )
    }

    /// Sign a set of request parameters
    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.config.api_secret)
    }

    async fn read_error(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("Cloudinary returned status {}", status))
    }

    /// Destroy an asset under one resource type. `Ok(false)` when Cloudinary
    /// holds no asset of that type with this id.
    async fn destroy_as(
        &self,
        resource_type: &str,
        external_id: &str,
    ) -> Result<bool, DomainError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", external_id), ("timestamp", &timestamp)]);

        let params = [
            ("public_id", external_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .http_client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| DomainError::upload(format!("Cloudinary request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::upload(Self::read_error(response).await));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| DomainError::upload(format!("Invalid Cloudinary response: {}", e)))?;

        match body.result.as_str() {
            "ok" => Ok(true),
            "not found" => Ok(false),
            other => Err(DomainError::upload(format!(
                "Failed to destroy asset '{}': {}",
                external_id, other
            ))),
        }
    }
}

/// SHA-256 hex digest of `k1=v1&k2=v2...` (sorted by key) followed by the secret
fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, folder: MediaFolder, file: UploadFile) -> Result<Asset, DomainError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder.as_str()), ("timestamp", &timestamp)]);

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type())
            .map_err(|e| DomainError::upload(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.as_str())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http_client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::upload(format!("Cloudinary request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::upload(Self::read_error(response).await));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| DomainError::upload(format!("Invalid Cloudinary response: {}", e)))?;

        debug!(folder = %folder, public_id = %body.public_id, "Uploaded asset");

        Ok(Asset::new(body.public_id, body.secure_url))
    }

    async fn destroy(&self, external_id: &str) -> Result<(), DomainError> {
        for resource_type in RESOURCE_TYPES {
            if self.destroy_as(resource_type, external_id).await? {
                debug!(resource_type, public_id = %external_id, "Destroyed asset");
                return Ok(());
            }
        }

        debug!(public_id = %external_id, "Asset already absent");
        Ok(())
    }
}

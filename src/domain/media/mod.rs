//! Media domain
//!
//! Assets are binary objects (avatar images, resume documents) held by a
//! remote media host. Users only keep a reference to them.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Reference to an externally hosted binary object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Stable identifier assigned by the media host
    pub external_id: String,
    /// Public retrieval URL
    pub url: String,
}

impl Asset {
    pub fn new(external_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            url: url.into(),
        }
    }
}

/// Logical bucket an asset is uploaded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFolder {
    Avatars,
    Resume,
}

impl MediaFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatars => "AVATARS",
            Self::Resume => "RESUME",
        }
    }
}

impl fmt::Display for MediaFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file received from a client, ready to be uploaded
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Content type, falling back to a guess from the file name
    pub fn mime_type(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Remote binary storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a file into a folder and return its reference
    async fn upload(&self, folder: MediaFolder, file: UploadFile) -> Result<Asset, DomainError>;

    /// Remove a previously uploaded asset
    async fn destroy(&self, external_id: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_names() {
        assert_eq!(MediaFolder::Avatars.as_str(), "AVATARS");
        assert_eq!(MediaFolder::Resume.to_string(), "RESUME");
    }

    #[test]
    fn test_mime_type_guess() {
        let file = UploadFile::new("cv.pdf", vec![1u8, 2, 3]);
        assert_eq!(file.mime_type(), "application/pdf");

        let file = UploadFile::new("me.png", vec![1u8]).with_content_type("image/webp");
        assert_eq!(file.mime_type(), "image/webp");
    }

    #[test]
    fn test_debug_hides_payload() {
        let file = UploadFile::new("me.png", vec![0u8; 32]);
        let debug = format!("{:?}", file);
        assert!(debug.contains("size: 32"));
    }

    #[test]
    fn test_asset_serialization() {
        let asset = Asset::new("AVATARS/abc", "https://cdn.example.com/abc.png");
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["externalId"], "AVATARS/abc");
        assert_eq!(json["url"], "https://cdn.example.com/abc.png");
    }
}

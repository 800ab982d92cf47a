//! Image hosting. Uploaded files are handed to a third-party host and only
//! the resulting URL is stored on the event.

use async_trait::async_trait;

use crate::utils::error::AppResult;

pub mod cloudinary;

pub use cloudinary::CloudinaryUploader;

/// Logical folder all event images are filed under on the host.
pub const UPLOAD_FOLDER: &str = "DevEvent";

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Stores `image` and returns its hosted URL.
    async fn upload(&self, image: ImageUpload) -> AppResult<String>;
}

/// Uploads `image` unless it is missing or zero bytes long.
///
/// Browsers submit an empty file part when no file was picked, which must
/// read as "keep the current image".
pub async fn upload_if_present(
    uploader: &dyn MediaUploader,
    image: Option<ImageUpload>,
) -> AppResult<Option<String>> {
    match image {
        Some(image) if !image.is_empty() => uploader.upload(image).await.map(Some),
        _ => {
            tracing::debug!("No image payload, skipping upload");
            Ok(None)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingUploader;
    use super::*;

    fn image(bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            file_name: Some("cover.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_skips_missing_and_empty_payloads() {
        let uploader = RecordingUploader::default();
        assert_eq!(upload_if_present(&uploader, None).await.unwrap(), None);
        assert_eq!(
            upload_if_present(&uploader, Some(image(b""))).await.unwrap(),
            None
        );
        assert_eq!(uploader.call_count(), 0);
    }

    #[tokio::test]
    async fn test_uploads_non_empty_payload() {
        let uploader = RecordingUploader::default();
        let url = upload_if_present(&uploader, Some(image(b"\x89PNG")))
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://media.test/DevEvent/1-cover.png"));
        assert_eq!(uploader.call_count(), 1);
    }
}

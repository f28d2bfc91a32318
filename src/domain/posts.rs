//! The post entity as held by the client and the payloads used to mutate it.

use bytes::Bytes;
use postboard_api_types::PostRecord;
use serde::Serialize;

/// A post confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "imagePath")]
    pub image_path: String,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            image_path: record.image_path,
        }
    }
}

/// Binary image payload sent as the `image` multipart part.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: None,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Image argument of an update: a fresh upload or the stored path to keep.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Upload(ImageUpload),
    Path(String),
}

impl From<ImageUpload> for ImageInput {
    fn from(upload: ImageUpload) -> Self {
        Self::Upload(upload)
    }
}

impl From<String> for ImageInput {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

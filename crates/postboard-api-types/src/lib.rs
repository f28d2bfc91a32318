//! Wire shapes of the posts REST API (`/api/posts`).
//!
//! Field names follow the backend's JSON exactly, so records carry `_id`
//! and `imagePath` rather than Rust-style names on the wire.

use serde::{Deserialize, Serialize};

/// A post as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "imagePath", default)]
    pub image_path: String,
}

/// Envelope returned by `GET /api/posts`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostListResponse {
    #[serde(default)]
    pub message: String,
    pub posts: Vec<PostRecord>,
}

/// Server-assigned fields of a freshly created post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreatedPost {
    pub id: String,
    #[serde(rename = "imagePath", default)]
    pub image_path: String,
}

/// Envelope returned by `POST /api/posts`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostCreateResponse {
    #[serde(default)]
    pub message: String,
    pub post: CreatedPost,
}

/// JSON body of `PUT /api/posts/{id}` when no new image is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostUpdateRequest {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "imagePath")]
    pub image_path: String,
}

/// Acknowledgement of `PUT /api/posts/{id}`.
///
/// Backends are free to answer with an empty body or a bare `message`;
/// `imagePath` is only present when the server reports where an uploaded
/// image ended up.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostUpdateResponse {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "imagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

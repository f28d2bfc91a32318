//! Domain layer types.

pub mod posts;

pub use posts::{ImageInput, ImageUpload, Post};

//! Subcommand handlers for the postboard binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use postboard::client::{ApiClient, ApiError};
use postboard::config::{Command, LoadError, Settings};
use postboard::domain::{ImageInput, ImageUpload};
use postboard::store::{LogNavigator, PostStore, StoreError};
use postboard::telemetry::TelemetryError;
use postboard::view::PostListView;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to read image file {path}: {source}")]
    ImageFile {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<ApiError> for CommandError {
    fn from(err: ApiError) -> Self {
        Self::Store(StoreError::Api(err))
    }
}

pub async fn run(settings: &Settings, command: Command) -> Result<(), CommandError> {
    let api = ApiClient::new(settings.api.base_url.as_str())?;
    info!(base_url = %api.base(), "postboard starting");
    let store = Arc::new(PostStore::new(api, Arc::new(LogNavigator)));

    match command {
        Command::List => list(&store).await,
        Command::Get { id } => get(&store, &id).await,
        Command::Add {
            title,
            content,
            image,
        } => add(&store, &title, &content, &image).await,
        Command::Update {
            id,
            title,
            content,
            image,
            image_path,
        } => update(&store, &id, &title, &content, image, image_path).await,
        Command::Delete { id } => delete(&store, &id).await,
    }
}

async fn list(store: &Arc<PostStore>) -> Result<(), CommandError> {
    let mut view = PostListView::new(Arc::clone(store));
    view.activate().await?;
    print!("{}", view.render());
    view.deactivate();
    Ok(())
}

async fn get(store: &PostStore, id: &str) -> Result<(), CommandError> {
    let record = store.fetch_one(id).await?;
    print_json(&record)
}

async fn add(
    store: &PostStore,
    title: &str,
    content: &str,
    image: &Path,
) -> Result<(), CommandError> {
    let upload = read_image(image).await?;
    let post = store.add(title, content, &upload).await?;
    print_json(&post)
}

async fn update(
    store: &PostStore,
    id: &str,
    title: &str,
    content: &str,
    image: Option<PathBuf>,
    image_path: Option<String>,
) -> Result<(), CommandError> {
    store.fetch_all().await?;
    let input = match (image, image_path) {
        (Some(file), _) => ImageInput::Upload(read_image(&file).await?),
        (None, Some(path)) => ImageInput::Path(path),
        // Neither given: keep whatever the backend currently stores.
        (None, None) => ImageInput::Path(store.fetch_one(id).await?.image_path),
    };
    let post = store.update(id, title, content, input).await?;
    print_json(&post)
}

async fn delete(store: &Arc<PostStore>, id: &str) -> Result<(), CommandError> {
    let mut view = PostListView::new(Arc::clone(store));
    view.activate().await?;
    view.on_delete(id).await?;
    print!("{}", view.render());
    view.deactivate();
    Ok(())
}

async fn read_image(path: &Path) -> Result<ImageUpload, CommandError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| CommandError::ImageFile {
            path: path.display().to_string(),
            source,
        })?;
    let upload = ImageUpload::new(data);
    Ok(match mime_guess::from_path(path).first() {
        Some(mime) => upload.with_content_type(mime.essence_str()),
        None => upload,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

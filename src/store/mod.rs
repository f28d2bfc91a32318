//! Client-side post store.
//!
//! [`PostStore`] owns the canonical list of posts and mediates every call to
//! the backend. The list only changes after the server confirms an operation;
//! each change is followed by a broadcast of the full list to subscribers.

mod listeners;
pub(crate) mod lock;
pub mod navigation;

use std::sync::{Arc, Mutex};

use postboard_api_types::{
    PostCreateResponse, PostListResponse, PostRecord, PostUpdateRequest, PostUpdateResponse,
};
use reqwest::Method;
use reqwest::multipart::Form;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{ApiClient, ApiError, image_part};
use crate::domain::{ImageInput, ImageUpload, Post};

pub use listeners::{ListenerId, Snapshot, Subscription};
pub use navigation::{LogNavigator, Navigator, POST_LIST_ROUTE};

use listeners::ListenerRegistry;
use lock::mutex_lock;

const SOURCE: &str = "store";
const POSTS_PATH: &str = "api/posts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub struct PostStore {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    posts: Mutex<Vec<Post>>,
    /// Serialises "mutate, snapshot, emit" so listeners see snapshots in the
    /// order the list changed. Always taken before `posts`.
    emit_lock: Mutex<()>,
    listeners: Arc<ListenerRegistry>,
}

impl PostStore {
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            navigator,
            posts: Mutex::new(Vec::new()),
            emit_lock: Mutex::new(()),
            listeners: Arc::new(ListenerRegistry::default()),
        }
    }

    /// Owned copy of the current list.
    pub fn snapshot(&self) -> Vec<Post> {
        mutex_lock(&self.posts, SOURCE, "snapshot").clone()
    }

    /// Register `listener` for every snapshot broadcast from now on.
    pub fn subscribe_to_updates<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        let id = self.listeners.register(Arc::new(listener));
        Subscription::new(id, &self.listeners)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace the list with the backend's and broadcast it.
    pub async fn fetch_all(&self) -> Result<(), StoreError> {
        let res: PostListResponse = self.api.get(POSTS_PATH).await?;
        let posts: Vec<Post> = res.posts.into_iter().map(Post::from).collect();
        info!(count = posts.len(), "posts fetched");
        self.commit("fetch_all", |list| *list = posts);
        Ok(())
    }

    /// Fetch a single record as the backend returns it. The store's list is
    /// left alone.
    pub async fn fetch_one(&self, id: &str) -> Result<PostRecord, StoreError> {
        require_id(id)?;
        Ok(self.api.get(&post_path(id)).await?)
    }

    pub async fn add(
        &self,
        title: &str,
        content: &str,
        image: &ImageUpload,
    ) -> Result<Post, StoreError> {
        let form = Form::new()
            .text("title", title.to_string())
            .text("content", content.to_string())
            .part("image", image_part(image, title)?);
        let res: PostCreateResponse = self.api.post_multipart(POSTS_PATH, form).await?;

        let post = Post {
            id: res.post.id,
            title: title.to_string(),
            content: content.to_string(),
            image_path: res.post.image_path,
        };
        info!(post_id = %post.id, image_path = %post.image_path, "post added");
        self.commit("add", |list| list.push(post.clone()));
        self.navigator.navigate(POST_LIST_ROUTE);
        Ok(post)
    }

    /// Delete on the backend, then drop every local post with a matching id.
    /// A confirmed delete always broadcasts, even when nothing matched locally.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        require_id(id)?;
        self.api.request_no_body(Method::DELETE, &post_path(id)).await?;

        let removed = self.commit("delete", |list| {
            let before = list.len();
            list.retain(|post| post.id != id);
            before - list.len()
        });
        info!(post_id = id, removed, "post deleted");
        Ok(())
    }

    /// Update on the backend and replace the local entry.
    ///
    /// The rebuilt post keeps the path passed as [`ImageInput::Path`]; after an
    /// upload it takes the path from the acknowledgement, or stays empty when
    /// the backend does not report one. If `id` is not in the local list the
    /// list is left unchanged, but subscribers are still notified.
    pub async fn update(
        &self,
        id: &str,
        title: &str,
        content: &str,
        image: ImageInput,
    ) -> Result<Post, StoreError> {
        require_id(id)?;
        let path = post_path(id);
        let image_path = match image {
            ImageInput::Upload(upload) => {
                let form = Form::new()
                    .text("id", id.to_string())
                    .text("title", title.to_string())
                    .text("content", content.to_string())
                    .part("image", image_part(&upload, title)?);
                let ack: PostUpdateResponse = self.api.put_multipart(&path, form).await?;
                ack.image_path.unwrap_or_default()
            }
            ImageInput::Path(image_path) => {
                let body = PostUpdateRequest {
                    id: id.to_string(),
                    title: title.to_string(),
                    content: content.to_string(),
                    image_path,
                };
                let _: PostUpdateResponse = self.api.put_json(&path, &body).await?;
                body.image_path
            }
        };

        let post = Post {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            image_path,
        };
        let replaced = self.commit("update", |list| {
            match list.iter_mut().find(|existing| existing.id == post.id) {
                Some(slot) => {
                    *slot = post.clone();
                    true
                }
                None => false,
            }
        });
        if replaced {
            info!(post_id = id, "post updated");
        } else {
            warn!(post_id = id, "updated post is not in the local list");
        }
        self.navigator.navigate(POST_LIST_ROUTE);
        Ok(post)
    }

    /// Apply `mutate` to the list, then broadcast the result with the list
    /// lock released. The emit lock is held until every listener has run, so
    /// a later commit can never be overtaken by an earlier snapshot.
    fn commit<R>(&self, op: &'static str, mutate: impl FnOnce(&mut Vec<Post>) -> R) -> R {
        let _emit = mutex_lock(&self.emit_lock, SOURCE, op);
        let (out, snapshot) = {
            let mut posts = mutex_lock(&self.posts, SOURCE, op);
            let out = mutate(&mut posts);
            let snapshot: Snapshot = Arc::from(posts.as_slice());
            (out, snapshot)
        };
        self.listeners.emit(&snapshot);
        out
    }
}

fn post_path(id: &str) -> String {
    format!("{POSTS_PATH}/{id}")
}

fn require_id(id: &str) -> Result<(), StoreError> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidInput("post id must not be empty".into()));
    }
    Ok(())
}

//! List view: mirrors the store's broadcasts and relays deletions.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::domain::Post;
use crate::store::lock::mutex_lock;
use crate::store::{PostStore, Snapshot, StoreError, Subscription};

const SOURCE: &str = "view::post_list";

#[derive(Debug)]
struct ViewState {
    loading: bool,
    posts: Snapshot,
}

pub struct PostListView {
    store: Arc<PostStore>,
    state: Arc<Mutex<ViewState>>,
    subscription: Option<Subscription>,
}

impl PostListView {
    pub fn new(store: Arc<PostStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(ViewState {
                loading: false,
                posts: Arc::from(Vec::new()),
            })),
            subscription: None,
        }
    }

    /// Subscribe to the store and request the full list.
    ///
    /// The list arrives through the subscription; a failed fetch is returned
    /// and leaves the view loading.
    pub async fn activate(&mut self) -> Result<(), StoreError> {
        self.with_state(|state| state.loading = true);
        if self.subscription.is_none() {
            let state = Arc::clone(&self.state);
            let sub = self.store.subscribe_to_updates(move |posts| {
                let mut state = mutex_lock(&state, SOURCE, "on_update");
                state.loading = false;
                state.posts = posts;
            });
            debug!(listener_id = sub.id(), "post list subscribed");
            self.subscription = Some(sub);
        }
        self.store.fetch_all().await
    }

    /// Ask the store to delete `post_id`. The row disappears once the store
    /// broadcasts the confirmed deletion.
    pub async fn on_delete(&self, post_id: &str) -> Result<(), StoreError> {
        self.store.delete(post_id).await
    }

    /// Release the subscription. Later calls do nothing.
    pub fn deactivate(&mut self) {
        if let Some(sub) = self.subscription.take() {
            debug!(listener_id = sub.id(), "post list unsubscribed");
            sub.unsubscribe();
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.with_state(|state| state.loading)
    }

    pub fn posts(&self) -> Snapshot {
        self.with_state(|state| Arc::clone(&state.posts))
    }

    pub fn render(&self) -> String {
        let (loading, posts) = self.with_state(|state| (state.loading, Arc::clone(&state.posts)));
        if loading {
            return "Loading posts...\n".to_string();
        }
        if posts.is_empty() {
            return "No posts added yet!\n".to_string();
        }
        let mut out = String::new();
        for post in posts.iter() {
            render_post(&mut out, post);
        }
        out
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut state = mutex_lock(&self.state, SOURCE, "with_state");
        f(&mut state)
    }
}

fn render_post(out: &mut String, post: &Post) {
    let _ = writeln!(out, "[{}] {}", post.id, post.title);
    if !post.image_path.is_empty() {
        let _ = writeln!(out, "    image: {}", post.image_path);
    }
    for line in post.content.lines() {
        let _ = writeln!(out, "    {line}");
    }
}

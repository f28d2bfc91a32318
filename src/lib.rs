//! Client-side post synchronization for a blog backend.
//!
//! [`store::PostStore`] keeps the list of posts in step with the `/api/posts`
//! REST API and broadcasts snapshots to subscribers such as
//! [`view::PostListView`].

pub mod client;
pub mod config;
pub mod domain;
pub mod store;
pub mod telemetry;
pub mod view;

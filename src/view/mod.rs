//! Views over the post store.

pub mod post_list;

pub use post_list::PostListView;

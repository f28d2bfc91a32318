//! Navigation side effect fired after confirmed creates and updates.

use tracing::info;

/// Route of the post list view.
pub const POST_LIST_ROUTE: &str = "/";

/// Receives navigation requests from the store.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for headless front ends: records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "navigate");
    }
}

//! Application state for the gateway

use std::sync::Arc;

use crate::session::RetrievalSession;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The one retrieval session for this process
    session: Arc<dyn RetrievalSession>,
}

impl AppState {
    /// Wrap a session constructed at startup
    pub fn new(session: Arc<dyn RetrievalSession>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { session }),
        }
    }

    /// Get the retrieval session
    pub fn session(&self) -> &Arc<dyn RetrievalSession> {
        &self.inner.session
    }
}

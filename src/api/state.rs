use crate::api::email::EmailSender;
use crate::store::{EmailLocks, LocalCache, UserStore};
use std::sync::Arc;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn EmailSender>,
    cache: Arc<LocalCache>,
    locks: EmailLocks,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn EmailSender>,
        cache: Arc<LocalCache>,
    ) -> Self {
        Self {
            store,
            mailer,
            cache,
            locks: EmailLocks::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn mailer(&self) -> &dyn EmailSender {
        self.mailer.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    #[must_use]
    pub fn locks(&self) -> &EmailLocks {
        &self.locks
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache", &self.cache.path())
            .field("locks", &self.locks.len())
            .finish_non_exhaustive()
    }
}

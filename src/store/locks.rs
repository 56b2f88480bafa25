//! Per-email mutual exclusion around the write-then-resync sequence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Debug, Default)]
pub struct EmailLocks {
    inner: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

/// Held while a request mutates one email's record; releases on drop.
#[derive(Debug)]
pub struct EmailGuard {
    email: String,
    locks: EmailLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl EmailLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other request holds `email`, then take it.
    pub async fn lock(&self, email: &str) -> EmailGuard {
        let entry = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(email.to_string()).or_default().clone()
        };

        let guard = entry.lock_owned().await;

        EmailGuard {
            email: email.to_string(),
            locks: self.clone(),
            guard: Some(guard),
        }
    }

    /// Number of emails currently locked or waited on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for EmailGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut map = self
            .locks
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Only the map still references the mutex: nobody holds or waits on it.
        let idle = map
            .get(&self.email)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            map.remove(&self.email);
        }
    }
}

//! User persistence: the remote store (source of truth) and the local
//! snapshot cache mirrored from it.

pub mod cache;
pub mod locks;
pub mod postgres;

pub use self::cache::{CacheError, LocalCache};
pub use self::locks::EmailLocks;
pub use self::postgres::PgUserStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A signed-up user as stored remotely and in the cache file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub name: Option<String>,
    pub password: Option<String>,
    pub otp: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"***")
            .field("otp", &self.otp)
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no user found for email {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Remote user collection keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Replace the full record for `record.email`, creating it if absent.
    async fn upsert(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// Update only the OTP of an existing record.
    ///
    /// # Errors
    /// `StoreError::NotFound` if no record exists for `email`.
    async fn set_otp(&self, email: &str, otp: &str) -> Result<(), StoreError>;

    async fn list_all(&self) -> Result<Vec<UserRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Rebuild the local cache from every record in the remote store.
///
/// # Errors
/// Returns an error if listing the remote records or writing the cache fails.
pub async fn resync(store: &dyn UserStore, cache: &LocalCache) -> Result<usize, SyncError> {
    let records = cache.rebuild_from(store).await?;

    debug!(records, path = %cache.path().display(), "local cache synced");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let record = UserRecord {
            email: "a@x.com".to_string(),
            name: Some("A".to_string()),
            password: Some("hunter2".to_string()),
            otp: "123456".to_string(),
        };
        let debug = format!("{record:?}");
        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn missing_fields_serialize_as_null() {
        let record = UserRecord {
            email: "a@x.com".to_string(),
            name: None,
            password: None,
            otp: "123456".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap_or_default();
        assert_eq!(value["name"], serde_json::Value::Null);
        assert_eq!(value["password"], serde_json::Value::Null);
        assert_eq!(value["otp"], "123456");
    }
}

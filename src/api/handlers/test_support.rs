//! In-memory fakes for driving the router in tests.

use crate::api::email::{EmailError, EmailMessage, EmailSender};
use crate::store::{StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
pub(super) struct MemoryUserStore {
    records: Mutex<BTreeMap<String, UserRecord>>,
    fail_writes: AtomicBool,
    offline: AtomicBool,
}

impl MemoryUserStore {
    pub(super) fn with_records(records: &[UserRecord]) -> Self {
        let store = Self::default();
        if let Ok(mut map) = store.records.lock() {
            for record in records {
                map.insert(record.email.clone(), record.clone());
            }
        }
        store
    }

    pub(super) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(super) fn get(&self, email: &str) -> Option<UserRecord> {
        self.records.lock().ok()?.get(email).cloned()
    }

    pub(super) fn emails(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        self.check_online()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.check_online()?;
        Ok(self.get(email))
    }

    async fn upsert(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        if let Ok(mut map) = self.records.lock() {
            map.insert(record.email.clone(), record.clone());
        }
        Ok(())
    }

    async fn set_otp(&self, email: &str, otp: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self
            .records
            .lock()
            .map_err(|_| StoreError::NotFound(email.to_string()))?;
        match map.get_mut(email) {
            Some(record) => {
                record.otp = otp.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(email.to_string())),
        }
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.check_online()?;
        Ok(self
            .records
            .lock()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}

/// Holds back the result of its first `list_all` so a later sync can overtake it.
pub(super) struct SlowFirstListStore {
    inner: MemoryUserStore,
    delay: Duration,
    delayed: AtomicBool,
    first_listed: Notify,
}

impl SlowFirstListStore {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryUserStore::default(),
            delay,
            delayed: AtomicBool::new(false),
            first_listed: Notify::new(),
        }
    }

    pub(super) fn emails(&self) -> Vec<String> {
        self.inner.emails()
    }

    /// Resolves once the first listing has been read.
    pub(super) async fn first_listed(&self) {
        self.first_listed.notified().await;
    }
}

#[async_trait]
impl UserStore for SlowFirstListStore {
    async fn find(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.inner.find(email).await
    }

    async fn upsert(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.inner.upsert(record).await
    }

    async fn set_otp(&self, email: &str, otp: &str) -> Result<(), StoreError> {
        self.inner.set_otp(email, otp).await
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let records = self.inner.list_all().await?;
        if !self.delayed.swap(true, Ordering::SeqCst) {
            self.first_listed.notify_one();
            tokio::time::sleep(self.delay).await;
        }
        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// Records every message; optionally fails every delivery.
#[derive(Default)]
pub(super) struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingEmailSender {
    pub(super) fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(super) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        if self.fail {
            return Err(EmailError::Other("535 authentication failed".to_string()));
        }
        if message.to_email.is_empty() {
            return Err(EmailError::MissingRecipient);
        }
        Ok(())
    }
}

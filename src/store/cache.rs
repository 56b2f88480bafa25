//! Local JSON snapshot of the remote user collection.
//!
//! The file maps each email to its full record and is rebuilt from scratch on
//! every sync. Writes go to a sibling `*.tmp` file that is then renamed over the
//! target, so readers only ever observe a complete snapshot.

use super::{SyncError, UserRecord, UserStore};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::warn;

pub const DEFAULT_CACHE_PATH: &str = "data.json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to serialize cache snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct LocalCache {
    path: PathBuf,
    // Held across list-then-write so the last writer stores the newest listing.
    write_lock: Mutex<()>,
}

impl LocalCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| DEFAULT_CACHE_PATH.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replace the snapshot with exactly `records`.
    ///
    /// # Errors
    /// Returns an error if serialization or any filesystem step fails; the
    /// previous snapshot is left untouched in that case.
    pub async fn sync(&self, records: &[UserRecord]) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        self.write_snapshot(records).await
    }

    /// List every record in `store` and replace the snapshot with them.
    ///
    /// The listing happens under the writer lock, so a sync that started
    /// earlier can never overwrite a newer listing with an older one.
    ///
    /// # Errors
    /// Returns an error if listing the remote records or writing the file fails.
    pub async fn rebuild_from(&self, store: &dyn UserStore) -> Result<usize, SyncError> {
        let _guard = self.write_lock.lock().await;
        let records = store.list_all().await?;
        self.write_snapshot(&records).await?;
        Ok(records.len())
    }

    async fn write_snapshot(&self, records: &[UserRecord]) -> Result<(), CacheError> {
        let snapshot: BTreeMap<&str, &UserRecord> = records
            .iter()
            .map(|record| (record.email.as_str(), record))
            .collect();
        let bytes = to_pretty_json(&snapshot)?;
        let temp = self.temp_path();

        if let Err(source) = fs::write(&temp, &bytes).await {
            return Err(CacheError::Io { path: temp, source });
        }

        if let Err(source) = fs::rename(&temp, &self.path).await {
            if let Err(err) = fs::remove_file(&temp).await {
                warn!("failed to remove stale cache temp file {}: {err}", temp.display());
            }
            return Err(CacheError::Io {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }

    /// Read the current snapshot; a missing file is an empty snapshot.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    #[cfg(test)]
    pub(crate) async fn load(&self) -> Result<BTreeMap<String, UserRecord>, CacheError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(CacheError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer)?;
    Ok(bytes)
}

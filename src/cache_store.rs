//! Component D — ConfigurationCacheStore.
//!
//! Serializes a configuration frame to a per-adapter file, atomically, off
//! the event thread. Writes are dispatched to a background task reading
//! from a bounded queue (spec §4.D/§5); the mapper never blocks on disk.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::error::CacheError;
use crate::model::ConfigurationFrame;

struct WriteJob {
    adapter_name: String,
    frame: ConfigurationFrame,
}

pub struct ConfigurationCacheStore {
    directory: PathBuf,
    write_tx: mpsc::Sender<WriteJob>,
}

impl ConfigurationCacheStore {
    /// Spawns the background writer task and returns a handle to it.
    pub fn spawn(directory: PathBuf) -> Self {
        let (write_tx, mut write_rx) = mpsc::channel::<WriteJob>(32);
        let worker_dir = directory.clone();
        tokio::spawn(async move {
            while let Some(job) = write_rx.recv().await {
                if let Err(e) = write_atomically(&worker_dir, &job.adapter_name, &job.frame).await {
                    log::error!("cache write failed for '{}': {e}", job.adapter_name);
                }
            }
        });
        Self { directory, write_tx }
    }

    fn path_for(&self, adapter_name: &str) -> PathBuf {
        self.directory.join(format!("{adapter_name}.configuration.xml"))
    }

    /// Enqueues a write; failures to even enqueue (channel closed) are
    /// reported but never propagated to the caller.
    pub fn cache(&self, adapter_name: &str, frame: ConfigurationFrame) {
        let job = WriteJob {
            adapter_name: adapter_name.to_string(),
            frame,
        };
        if let Err(e) = self.write_tx.try_send(job) {
            log::error!("could not enqueue configuration cache write: {e}");
        }
    }

    /// Reads the cached frame for `adapter_name`. A missing file returns
    /// `Ok(None)`, not an error; a corrupt file returns `Ok(None)` and
    /// reports.
    pub async fn load(&self, adapter_name: &str) -> Result<Option<ConfigurationFrame>, CacheError> {
        let path = self.path_for(adapter_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(ConfigurationFrame { raw: bytes })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                log::error!("failed to read cache for '{adapter_name}', treating as absent: {e}");
                Ok(None)
            }
        }
    }
}

async fn write_atomically(
    directory: &std::path::Path,
    adapter_name: &str,
    frame: &ConfigurationFrame,
) -> Result<(), CacheError> {
    let final_path = directory.join(format!("{adapter_name}.configuration.xml"));
    let tmp_path = directory.join(format!("{adapter_name}.configuration.xml.tmp"));
    tokio::fs::create_dir_all(directory).await.map_err(|e| CacheError::Write {
        adapter: adapter_name.to_string(),
        source: e,
    })?;
    tokio::fs::write(&tmp_path, &frame.raw)
        .await
        .map_err(|e| CacheError::Write {
            adapter: adapter_name.to_string(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, &final_path)
        .await
        .map_err(|e| CacheError::Write {
            adapter: adapter_name.to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_returns_none() {
        let dir = std::env::temp_dir().join(format!("pmu-ingest-cache-test-{}", uuid::Uuid::new_v4()));
        let store = ConfigurationCacheStore::spawn(dir);
        assert!(store.load("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn round_trips_a_cached_frame() {
        let dir = std::env::temp_dir().join(format!("pmu-ingest-cache-test-{}", uuid::Uuid::new_v4()));
        let store = ConfigurationCacheStore::spawn(dir);
        store.cache("ADAPTER1", ConfigurationFrame { raw: vec![1, 2, 3] });
        // give the background task a turn to run
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let loaded = store.load("ADAPTER1").await.unwrap();
        assert_eq!(loaded.map(|f| f.raw), Some(vec![1, 2, 3]));
    }
}

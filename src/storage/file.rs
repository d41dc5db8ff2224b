//! File-backed session store.
//!
//! The whole key space is held in memory and rewritten to a JSON file on
//! every mutation, so CLI invocations sharing the file share a session.
//! Rewrites go to a sibling `.tmp` file that is renamed over the original,
//! so an interrupted write leaves the previous contents intact.
//!
//! The session lasts as long as the file: deleting it (or `reset`) starts
//! a fresh one.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::storage::SessionStore;

/// Session store persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: DashMap<String, String>,
    // Serializes file rewrites.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store, loading the file if it exists.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = DashMap::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let map: BTreeMap<String, String> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                inner.insert(k, v);
            }
            tracing::debug!(path = %path.display(), keys = inner.len(), "Loaded session store");
        }

        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let map: BTreeMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        if let Err(e) = self.write_atomically(&map) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist session store");
        }
    }

    fn write_atomically(&self, map: &BTreeMap<String, String>) -> std::io::Result<()> {
        let tmp = self.temp_path();

        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, map)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        fs::rename(&tmp, &self.path)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("session"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.inner.insert(key.to_string(), value);
        self.flush();
    }

    fn delete(&self, key: &str) {
        if self.inner.remove(key).is_some() {
            self.flush();
        }
    }
}

//! # ev-store-file
//! eventra/crates/ev-plugins/ev-store-file/src/lib.rs
//! Filesystem implementation of `KeyValueStore`.
//! Each key is stored as one file named by the SHA-256 of the key, sharded
//! into two directory levels so arbitrary key strings map to safe paths.

use async_trait::async_trait;
use ev_core::traits::KeyValueStore;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

pub struct FileStore {
    /// Root directory for all entries (e.g., "./data/store")
    root_path: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Generates a sharded path: "ab/cd/abcd...hash"
    fn get_sharded_path(&self, key: &str) -> PathBuf {
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(&hash);
        path
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(self.get_sharded_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file and renames it into place, so readers
    /// never observe a half-written value.
    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let target_path = self.get_sharded_path(key);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp_path = target_path.with_extension("tmp");
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &target_path).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.get_sharded_path(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

//! File store configuration.

use std::path::{Path, PathBuf};

/// Location of a collection's snapshot on disk.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Directory holding one snapshot per collection.
    pub data_dir: PathBuf,
    /// Collection name; also the snapshot file stem.
    pub collection: String,
}

impl FileStoreConfig {
    pub fn new(data_dir: impl AsRef<Path>, collection: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            collection: collection.into(),
        }
    }

    /// Path of the current snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.collection))
    }

    /// Path of the in-flight snapshot write.
    pub fn temp_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json.tmp", self.collection))
    }

    /// Path of the file locked by the handle that owns the collection.
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.lock", self.collection))
    }
}

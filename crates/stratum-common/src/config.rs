//! Configuration structures for Stratum.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage configuration for the heap file engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the heap files.
    pub data_dir: PathBuf,
    /// Sync file contents to disk after every page write.
    pub fsync_enabled: bool,
    /// Extension of heap files for tables without an explicit file name.
    pub heap_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            fsync_enabled: true,
            heap_extension: "heap".to_string(),
        }
    }
}

impl StorageConfig {
    /// Creates a configuration rooted at the given directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Returns the default heap file name for a table.
    pub fn default_file_name(&self, table_name: &str) -> String {
        format!("{}.{}", table_name, self.heap_extension)
    }

    /// Resolves a heap file name against the data directory.
    ///
    /// Absolute names are returned unchanged.
    pub fn heap_path(&self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}

//! Disk manager for page-level file I/O.
//!
//! Every call opens the target file, performs one page-aligned read or write,
//! and closes it again. No handle or page content outlives a call, so each
//! operation observes the current on-disk state.

use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use stratum_common::page::PAGE_SIZE;
use stratum_common::{Result, StorageConfig, StratumError};

/// Configuration for the disk manager.
#[derive(Debug, Clone)]
pub struct DiskManagerConfig {
    /// Base directory for heap files.
    pub data_dir: PathBuf,
    /// Enable fsync after writes.
    pub fsync_enabled: bool,
}

impl Default for DiskManagerConfig {
    fn default() -> Self {
        Self::from(&StorageConfig::default())
    }
}

impl From<&StorageConfig> for DiskManagerConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            fsync_enabled: config.fsync_enabled,
        }
    }
}

/// Reads and writes whole pages of heap files.
#[derive(Debug, Clone)]
pub struct DiskManager {
    config: DiskManagerConfig,
}

/// Returns the byte offset of a page within its file.
fn page_offset(page_num: u32) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}

impl DiskManager {
    /// Creates a new disk manager, creating the data directory if needed.
    pub fn new(config: DiskManagerConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Resolves a file name against the data directory.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.config.data_dir.join(file_name)
    }

    /// Returns true if the file exists, whatever its size.
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Returns true if the file exists and holds at least one page.
    pub fn has_pages(&self, path: &Path) -> Result<bool> {
        Ok(self.num_pages(path)? > 0)
    }

    /// Returns the number of whole pages in a file; a missing file has none.
    pub fn num_pages(&self, path: &Path) -> Result<u32> {
        let len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        if len % PAGE_SIZE as u64 != 0 {
            warn!(
                "{}: size {} is not a multiple of {}, ignoring trailing {} bytes",
                path.display(),
                len,
                PAGE_SIZE,
                len % PAGE_SIZE as u64
            );
        }
        Ok((len / PAGE_SIZE as u64) as u32)
    }

    /// Creates (or truncates) a file holding exactly the given page.
    pub fn create_file(&self, path: &Path, first_page: &[u8; PAGE_SIZE]) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(first_page)?;
        self.sync(&file)?;
        debug!("created heap file {}", path.display());
        Ok(())
    }

    /// Reads a page from disk.
    ///
    /// Fails with `ShortRead` if fewer than `PAGE_SIZE` bytes are available.
    pub fn read_page(&self, path: &Path, page_num: u32) -> Result<Box<[u8; PAGE_SIZE]>> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(page_offset(page_num)))?;

        let mut buffer = Box::new([0u8; PAGE_SIZE]);
        let mut filled = 0;
        while filled < PAGE_SIZE {
            match file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < PAGE_SIZE {
            return Err(StratumError::ShortRead {
                page_num,
                expected: PAGE_SIZE,
                actual: filled,
            });
        }
        Ok(buffer)
    }

    /// Overwrites an existing page, or extends the file by exactly one page.
    pub fn write_page(&self, path: &Path, page_num: u32, data: &[u8; PAGE_SIZE]) -> Result<()> {
        let page_count = self.num_pages(path)?;
        if page_num > page_count {
            return Err(StratumError::PageOutOfRange {
                page_num,
                page_count,
            });
        }

        let mut file = OpenOptions::new().write(true).open(path)?;
        file.seek(SeekFrom::Start(page_offset(page_num)))?;
        file.write_all(data)?;
        self.sync(&file)
    }

    /// Appends a page at the end of the file, creating the file if missing.
    ///
    /// Returns the page number of the appended page.
    pub fn append_page(&self, path: &Path, data: &[u8; PAGE_SIZE]) -> Result<u32> {
        let page_num = self.num_pages(path)?;

        let mut file = OpenOptions::new().write(true).create(true).open(path)?;
        file.seek(SeekFrom::Start(page_offset(page_num)))?;
        file.write_all(data)?;
        self.sync(&file)?;

        debug!("appended page {} to {}", page_num, path.display());
        Ok(page_num)
    }

    fn sync(&self, file: &File) -> Result<()> {
        if self.config.fsync_enabled {
            file.sync_all()?;
        }
        Ok(())
    }
}

//! HeapFile manager: an ordered sequence of slotted pages backing one table.
//!
//! Every operation goes straight to disk. Inserts re-read pages from page 0 on
//! each call and place the record on the first page with room (first-fit); no
//! free-space map or page cache is kept between calls.

use crate::disk::DiskManager;
use crate::heap::constants::MAX_RECORD_SIZE;
use crate::heap::page::HeapPage;
use crate::record::{RecordId, ScannedRecord};
use log::debug;
use std::path::{Path, PathBuf};
use stratum_common::{Result, StratumError};

/// Adds the page number to corruption errors raised by page-level code.
fn page_context(page_num: u32) -> impl Fn(StratumError) -> StratumError {
    move |err| match err {
        StratumError::PageCorrupted(reason) => {
            StratumError::PageCorrupted(format!("page {}: {}", page_num, reason))
        }
        other => other,
    }
}

/// A heap file on disk.
///
/// Assumes a single writer: the read-modify-write of an insert is not atomic.
#[derive(Debug, Clone)]
pub struct HeapFile {
    /// Disk manager for page I/O.
    disk: DiskManager,
    /// Path of the heap file.
    path: PathBuf,
}

impl HeapFile {
    /// Creates a handle for the heap file at `path`. Nothing is touched on disk.
    pub fn new(disk: DiskManager, path: impl Into<PathBuf>) -> Self {
        Self {
            disk,
            path: path.into(),
        }
    }

    /// Creates a handle for a file name inside the disk manager's data directory.
    pub fn open(disk: DiskManager, file_name: &str) -> Self {
        let path = disk.file_path(file_name);
        Self::new(disk, path)
    }

    /// Returns the heap file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates (or truncates) the file with a single empty page.
    pub fn create(&self) -> Result<()> {
        self.disk.create_file(&self.path, HeapPage::new().as_bytes())
    }

    /// Returns the number of pages in the file (0 if missing).
    pub fn num_pages(&self) -> Result<u32> {
        self.disk.num_pages(&self.path)
    }

    /// Reads one page.
    pub fn read_page(&self, page_num: u32) -> Result<HeapPage> {
        let data = self.disk.read_page(&self.path, page_num)?;
        Ok(HeapPage::from_bytes(data))
    }

    /// Writes one page at its page-aligned position.
    pub fn write_page(&self, page_num: u32, page: &HeapPage) -> Result<()> {
        self.disk.write_page(&self.path, page_num, page.as_bytes())
    }

    /// Appends a page at the end of the file and returns its page number.
    pub fn append_page(&self, page: &HeapPage) -> Result<u32> {
        self.disk.append_page(&self.path, page.as_bytes())
    }

    /// Inserts a record, returning its physical address.
    ///
    /// Creates the file if it is missing or empty, then scans pages in
    /// ascending order and uses the first one that can hold the record plus a
    /// slot entry. If none can, a new page is appended.
    pub fn insert(&self, record: &[u8]) -> Result<RecordId> {
        if record.len() > MAX_RECORD_SIZE {
            return Err(StratumError::RecordTooLarge {
                size: record.len(),
                max: MAX_RECORD_SIZE,
            });
        }

        if !self.disk.has_pages(&self.path)? {
            self.create()?;
        }

        let page_count = self.num_pages()?;
        for page_num in 0..page_count {
            let page = self.read_page(page_num)?;
            if !page.can_fit(record.len()).map_err(page_context(page_num))? {
                continue;
            }

            let (page, slot_id) = page
                .insert_record(record)
                .map_err(page_context(page_num))?;
            self.write_page(page_num, &page)?;

            debug!(
                "{}: inserted {} bytes at page {} {}",
                self.path.display(),
                record.len(),
                page_num,
                slot_id
            );
            return Ok(RecordId { page_num, slot_id });
        }

        let (page, slot_id) = HeapPage::new().insert_record(record)?;
        let page_num = self.append_page(&page)?;
        debug!(
            "{}: no page of {} had room for {} bytes, appended page {}",
            self.path.display(),
            page_count,
            record.len(),
            page_num
        );
        Ok(RecordId { page_num, slot_id })
    }

    /// Reads a single record by physical address.
    pub fn get(&self, id: RecordId) -> Result<Vec<u8>> {
        let page_count = self.num_pages()?;
        if id.page_num >= page_count {
            return Err(StratumError::PageOutOfRange {
                page_num: id.page_num,
                page_count,
            });
        }
        let page = self.read_page(id.page_num)?;
        let bytes = page
            .get_record(id.slot_id)
            .map_err(page_context(id.page_num))?;
        Ok(bytes.to_vec())
    }

    /// Returns every record in page order, then slot order within a page.
    ///
    /// A missing or empty file yields no records.
    pub fn scan_all(&self) -> Result<Vec<ScannedRecord>> {
        let page_count = self.num_pages()?;
        let mut records = Vec::new();

        for page_num in 0..page_count {
            let page = self.read_page(page_num)?;
            for entry in page.iter() {
                let (slot_id, bytes) = entry.map_err(page_context(page_num))?;
                records.push(ScannedRecord {
                    id: RecordId { page_num, slot_id },
                    data: bytes.to_vec(),
                });
            }
        }

        Ok(records)
    }
}

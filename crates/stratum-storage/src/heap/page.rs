//! Heap page implementation using a footer-based slotted page format.
//!
//! Page layout:
//! ```text
//! +------------------+  0
//! | Record Data      |  <- Grows upward
//! +------------------+  free_offset
//! |                  |
//! | Free Space       |
//! |                  |
//! +------------------+  4092 - 4 * slot_count
//! | Slot Directory   |  <- Grows downward (slot 0 nearest the footer)
//! | (4 bytes/slot)   |
//! +------------------+  4092
//! | Footer (4)       |
//! +------------------+  4096
//! ```
//!
//! All multi-byte fields are big-endian.

use super::constants::{DATA_START, FOOTER_OFFSET, INSERT_OVERHEAD, SLOT_ENTRY_SIZE};
use stratum_common::page::{PageFooter, PAGE_SIZE};
use stratum_common::{Result, StratumError};

/// Slot identifier within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u16);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

/// An entry in the slot directory pointing to record data.
///
/// Layout (4 bytes):
/// - offset: 2 bytes (offset from page start to record data)
/// - length: 2 bytes (length of record data)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotEntry {
    /// Offset from page start to record data.
    pub offset: u16,
    /// Length of record data.
    pub length: u16,
}

impl SlotEntry {
    /// Size of a slot entry in bytes.
    pub const SIZE: usize = SLOT_ENTRY_SIZE;

    /// Creates a new slot entry.
    pub fn new(offset: u16, length: u16) -> Self {
        Self { offset, length }
    }

    /// Returns the end offset of the record this slot points to.
    pub fn end(&self) -> usize {
        self.offset as usize + self.length as usize
    }

    /// Serializes the slot to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.offset.to_be_bytes());
        buf[2..4].copy_from_slice(&self.length.to_be_bytes());
        buf
    }

    /// Deserializes a slot from bytes.
    pub fn from_bytes(buf: &[u8]) -> Self {
        Self {
            offset: u16::from_be_bytes([buf[0], buf[1]]),
            length: u16::from_be_bytes([buf[2], buf[3]]),
        }
    }
}

/// A heap page storing variable-length records.
///
/// Pages are append-only: records are never moved, updated or removed, and a
/// slot index stays valid for the lifetime of the page.
#[derive(Clone)]
pub struct HeapPage {
    /// Page data buffer.
    data: Box<[u8; PAGE_SIZE]>,
}

impl HeapPage {
    /// Creates a new empty heap page (zero-filled, footer `{0, 0}`).
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    /// Creates a heap page from raw page data.
    pub fn from_bytes(data: Box<[u8; PAGE_SIZE]>) -> Self {
        Self { data }
    }

    /// Returns the raw page data.
    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    /// Returns the page footer.
    pub fn footer(&self) -> PageFooter {
        PageFooter::from_bytes(&self.data[PageFooter::OFFSET..PageFooter::OFFSET + PageFooter::SIZE])
    }

    /// Writes the footer back to the page.
    fn set_footer(&mut self, footer: PageFooter) {
        self.data[PageFooter::OFFSET..PageFooter::OFFSET + PageFooter::SIZE]
            .copy_from_slice(&footer.to_bytes());
    }

    /// Returns the number of slots in the page.
    pub fn slot_count(&self) -> u16 {
        self.footer().slot_count
    }

    /// Returns the end of the record region.
    pub fn free_offset(&self) -> u16 {
        self.footer().free_offset
    }

    /// Returns the amount of free space between the record region and the slot directory.
    ///
    /// Fails with `PageCorrupted` if the slot directory overlaps the record region.
    pub fn free_space(&self) -> Result<usize> {
        let footer = self.footer();
        let raw = footer.raw_free_space();
        if raw < 0 {
            return Err(StratumError::PageCorrupted(format!(
                "{} slots and free_offset {} overlap by {} bytes",
                footer.slot_count, footer.free_offset, -raw
            )));
        }
        Ok(raw as usize)
    }

    /// Returns the slot directory start and the end of the record region.
    ///
    /// Fails with `PageCorrupted` if either lies outside the page body.
    fn region_bounds(&self) -> Result<(usize, usize)> {
        let footer = self.footer();
        let table_start = footer.slot_table_start().ok_or_else(|| {
            StratumError::PageCorrupted(format!(
                "slot directory of {} entries does not fit in a page",
                footer.slot_count
            ))
        })?;
        let free_offset = footer.free_offset as usize;
        if free_offset > FOOTER_OFFSET {
            return Err(StratumError::PageCorrupted(format!(
                "free_offset {} is past the footer at {}",
                free_offset, FOOTER_OFFSET
            )));
        }
        Ok((table_start, free_offset))
    }

    /// Returns true if a record of the given length plus its slot entry fits.
    pub fn can_fit(&self, record_len: usize) -> Result<bool> {
        Ok(self.free_space()? >= record_len + INSERT_OVERHEAD)
    }

    /// Returns the offset of a slot entry in the page.
    fn slot_offset(slot_id: SlotId) -> usize {
        FOOTER_OFFSET - (slot_id.0 as usize + 1) * SlotEntry::SIZE
    }

    /// Reads a slot entry from the slot directory.
    pub fn get_slot(&self, slot_id: SlotId) -> Result<SlotEntry> {
        let slot_count = self.slot_count();
        if slot_id.0 >= slot_count {
            return Err(StratumError::SlotOutOfRange {
                slot: slot_id.0,
                slot_count,
            });
        }
        self.region_bounds()?;
        let offset = Self::slot_offset(slot_id);
        Ok(SlotEntry::from_bytes(&self.data[offset..offset + SlotEntry::SIZE]))
    }

    /// Writes a slot entry to the slot directory.
    fn set_slot(&mut self, slot_id: SlotId, slot: SlotEntry) {
        let offset = Self::slot_offset(slot_id);
        self.data[offset..offset + SlotEntry::SIZE].copy_from_slice(&slot.to_bytes());
    }

    /// Inserts a record into a copy of this page.
    ///
    /// Returns the new page image and the assigned slot. `self` is left untouched,
    /// so a failed attempt has no effect. Fails with `PageFull` when the record plus
    /// its slot entry does not fit.
    pub fn insert_record(&self, record: &[u8]) -> Result<(HeapPage, SlotId)> {
        let footer = self.footer();
        let available = self.free_space()?;
        let needed = record.len() + INSERT_OVERHEAD;
        if available < needed {
            return Err(StratumError::PageFull { needed, available });
        }

        let mut page = self.clone();
        let start = DATA_START + footer.free_offset as usize;
        page.data[start..start + record.len()].copy_from_slice(record);

        let slot_id = SlotId(footer.slot_count);
        page.set_slot(slot_id, SlotEntry::new(footer.free_offset, record.len() as u16));
        page.set_footer(PageFooter::new(
            footer.slot_count + 1,
            footer.free_offset + record.len() as u16,
        ));

        Ok((page, slot_id))
    }

    /// Returns the bytes of the record stored in the given slot.
    pub fn get_record(&self, slot_id: SlotId) -> Result<&[u8]> {
        let slot = self.get_slot(slot_id)?;
        let (table_start, free_offset) = self.region_bounds()?;
        if slot.end() > free_offset.min(table_start) {
            return Err(StratumError::PageCorrupted(format!(
                "{} spans [{}, {}) past the record region end {}",
                slot_id,
                slot.offset,
                slot.end(),
                free_offset.min(table_start)
            )));
        }
        Ok(&self.data[slot.offset as usize..slot.end()])
    }

    /// Iterates over all records in slot order.
    pub fn iter(&self) -> HeapPageIterator<'_> {
        HeapPageIterator {
            page: self,
            current_slot: 0,
            slot_count: self.slot_count(),
        }
    }
}

impl Default for HeapPage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeapPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let footer = self.footer();
        f.debug_struct("HeapPage")
            .field("slot_count", &footer.slot_count)
            .field("free_offset", &footer.free_offset)
            .finish()
    }
}

/// Iterator over records in a heap page.
pub struct HeapPageIterator<'a> {
    page: &'a HeapPage,
    current_slot: u16,
    slot_count: u16,
}

impl<'a> Iterator for HeapPageIterator<'a> {
    type Item = Result<(SlotId, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_slot >= self.slot_count {
            return None;
        }
        let slot_id = SlotId(self.current_slot);
        self.current_slot += 1;
        Some(self.page.get_record(slot_id).map(|bytes| (slot_id, bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::constants::MAX_RECORD_SIZE;

    #[test]
    fn test_slot_id_display() {
        assert_eq!(SlotId(5).to_string(), "slot:5");
    }

    #[test]
    fn test_slot_entry_big_endian() {
        let slot = SlotEntry::new(0x0010, 0x0203);
        assert_eq!(slot.to_bytes(), [0x00, 0x10, 0x02, 0x03]);
        assert_eq!(SlotEntry::from_bytes(&slot.to_bytes()), slot);
        assert_eq!(slot.end(), 0x0213);
    }

    #[test]
    fn test_heap_page_new() {
        let page = HeapPage::new();

        assert_eq!(page.slot_count(), 0);
        assert_eq!(page.free_offset(), 0);
        assert_eq!(page.free_space().unwrap(), 4092);
        assert!(page.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_heap_page_insert_record() {
        let page = HeapPage::new();
        let (page, slot_id) = page.insert_record(b"hello world").unwrap();

        assert_eq!(slot_id, SlotId(0));
        assert_eq!(page.slot_count(), 1);
        assert_eq!(page.free_offset(), 11);
        assert_eq!(page.get_record(slot_id).unwrap(), b"hello world");
    }

    #[test]
    fn test_heap_page_on_disk_layout() {
        let (page, _) = HeapPage::new().insert_record(&[0xAA; 20]).unwrap();
        let (page, _) = page.insert_record(&[0xBB; 8]).unwrap();
        let bytes = page.as_bytes();

        // footer: slot_count = 2, free_offset = 28
        assert_eq!(&bytes[4092..4096], &[0, 2, 0, 28]);
        // slot 0 at [4088, 4092): offset 0, length 20
        assert_eq!(&bytes[4088..4092], &[0, 0, 0, 20]);
        // slot 1 at [4084, 4088): offset 20, length 8
        assert_eq!(&bytes[4084..4088], &[0, 20, 0, 8]);
        assert_eq!(&bytes[0..20], &[0xAA; 20]);
        assert_eq!(&bytes[20..28], &[0xBB; 8]);
    }

    #[test]
    fn test_heap_page_insert_does_not_mutate_input() {
        let original = HeapPage::new();
        let (updated, _) = original.insert_record(b"data").unwrap();

        assert_eq!(original.slot_count(), 0);
        assert_eq!(updated.slot_count(), 1);
    }

    #[test]
    fn test_heap_page_multiple_records() {
        let mut page = HeapPage::new();

        for i in 0..10u16 {
            let data = format!("record {}", i).into_bytes();
            let (next, slot_id) = page.insert_record(&data).unwrap();
            assert_eq!(slot_id, SlotId(i));
            page = next;
        }

        assert_eq!(page.slot_count(), 10);

        for i in 0..10u16 {
            let record = page.get_record(SlotId(i)).unwrap();
            assert_eq!(record, format!("record {}", i).as_bytes());
        }
    }

    #[test]
    fn test_free_space_decreases_by_record_plus_slot() {
        let mut page = HeapPage::new();
        for len in [0usize, 1, 20, 100, 333] {
            let before = page.free_space().unwrap();
            let (next, _) = page.insert_record(&vec![7u8; len]).unwrap();
            assert_eq!(next.free_space().unwrap(), before - len - 4);
            page = next;
        }
    }

    #[test]
    fn test_heap_page_full() {
        let page = HeapPage::new();
        let result = page.insert_record(&vec![0u8; PAGE_SIZE]);
        assert!(matches!(result, Err(StratumError::PageFull { .. })));
    }

    #[test]
    fn test_heap_page_exact_fill() {
        let page = HeapPage::new();
        assert!(page.can_fit(MAX_RECORD_SIZE).unwrap());
        assert!(!page.can_fit(MAX_RECORD_SIZE + 1).unwrap());

        let (full, _) = page.insert_record(&vec![1u8; MAX_RECORD_SIZE]).unwrap();
        assert_eq!(full.free_space().unwrap(), 0);
        assert!(!full.can_fit(0).unwrap());
        assert!(matches!(
            full.insert_record(&[]),
            Err(StratumError::PageFull {
                needed: 4,
                available: 0
            })
        ));
    }

    #[test]
    fn test_heap_page_empty_record() {
        let (page, slot_id) = HeapPage::new().insert_record(&[]).unwrap();
        assert_eq!(page.get_record(slot_id).unwrap(), &[] as &[u8]);
        assert_eq!(page.free_space().unwrap(), 4088);
    }

    #[test]
    fn test_heap_page_get_nonexistent_slot() {
        let page = HeapPage::new();
        assert!(matches!(
            page.get_record(SlotId(0)),
            Err(StratumError::SlotOutOfRange {
                slot: 0,
                slot_count: 0
            })
        ));
    }

    #[test]
    fn test_heap_page_iterator() {
        let mut page = HeapPage::new();
        for i in 0..5u8 {
            page = page.insert_record(&[i; 3]).unwrap().0;
        }

        let records: Vec<_> = page.iter().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(records.len(), 5);
        for (i, (slot_id, bytes)) in records.iter().enumerate() {
            assert_eq!(slot_id.0 as usize, i);
            assert_eq!(*bytes, &[i as u8; 3]);
        }
    }

    #[test]
    fn test_heap_page_from_bytes() {
        let (page, slot_id) = HeapPage::new().insert_record(b"persistent data").unwrap();
        let raw = *page.as_bytes();

        let recovered = HeapPage::from_bytes(Box::new(raw));
        assert_eq!(recovered.get_record(slot_id).unwrap(), b"persistent data");
        assert_eq!(recovered.slot_count(), 1);
    }

    #[test]
    fn test_heap_page_corrupted_footer() {
        let mut raw = [0u8; PAGE_SIZE];
        // 1000 slots would start the directory at 92, below free_offset 4000
        raw[4092..4094].copy_from_slice(&1000u16.to_be_bytes());
        raw[4094..4096].copy_from_slice(&4000u16.to_be_bytes());
        let page = HeapPage::from_bytes(Box::new(raw));

        assert!(matches!(page.free_space(), Err(StratumError::PageCorrupted(_))));
        assert!(page.insert_record(b"x").is_err());
    }

    #[test]
    fn test_heap_page_corrupted_slot() {
        let (page, _) = HeapPage::new().insert_record(b"abc").unwrap();
        let mut raw = *page.as_bytes();
        // point slot 0 past the record region
        raw[4088..4092].copy_from_slice(&SlotEntry::new(2, 50).to_bytes());
        let page = HeapPage::from_bytes(Box::new(raw));

        assert!(matches!(
            page.get_record(SlotId(0)),
            Err(StratumError::PageCorrupted(_))
        ));
        assert!(page.iter().next().unwrap().is_err());
    }

    fn page_with_footer(slot_count: u16, free_offset: u16) -> [u8; PAGE_SIZE] {
        let mut raw = [0u8; PAGE_SIZE];
        raw[4092..4096].copy_from_slice(&PageFooter::new(slot_count, free_offset).to_bytes());
        raw
    }

    #[test]
    fn test_heap_page_directory_larger_than_page() {
        // 2000 slots need 8000 bytes of directory
        let page = HeapPage::from_bytes(Box::new(page_with_footer(2000, 0)));

        assert!(matches!(page.free_space(), Err(StratumError::PageCorrupted(_))));
        assert!(matches!(page.can_fit(1), Err(StratumError::PageCorrupted(_))));
        assert!(matches!(
            page.insert_record(b"x"),
            Err(StratumError::PageCorrupted(_))
        ));
        assert!(matches!(
            page.get_record(SlotId(1500)),
            Err(StratumError::PageCorrupted(_))
        ));
        assert!(page.iter().next().unwrap().is_err());
    }

    #[test]
    fn test_heap_page_free_offset_past_footer() {
        let mut raw = page_with_footer(1, 60000);
        raw[4088..4092].copy_from_slice(&SlotEntry::new(5000, 10).to_bytes());
        let page = HeapPage::from_bytes(Box::new(raw));

        assert!(matches!(
            page.get_record(SlotId(0)),
            Err(StratumError::PageCorrupted(_))
        ));
        assert!(page.iter().next().unwrap().is_err());
        assert!(page.free_space().is_err());
    }

    #[test]
    fn test_heap_page_record_overlapping_directory() {
        // free_offset is in range but the slot reaches into the directory
        let mut raw = page_with_footer(1, 4092);
        raw[4088..4092].copy_from_slice(&SlotEntry::new(4080, 12).to_bytes());
        let page = HeapPage::from_bytes(Box::new(raw));

        assert!(matches!(
            page.get_record(SlotId(0)),
            Err(StratumError::PageCorrupted(_))
        ));
    }
}

//! Page format constants and the page footer shared by all Stratum pages.

/// Page size in bytes (4 KB).
pub const PAGE_SIZE: usize = 4096;

/// Size of the page footer in bytes.
pub const FOOTER_SIZE: usize = 4;

/// Size of one slot directory entry in bytes.
pub const SLOT_ENTRY_SIZE: usize = 4;

/// Offset of the footer within a page; also the end of the slot directory.
pub const FOOTER_OFFSET: usize = PAGE_SIZE - FOOTER_SIZE;

/// Largest record an empty page can hold (one slot entry reserved).
pub const MAX_RECORD_SIZE: usize = FOOTER_OFFSET - SLOT_ENTRY_SIZE;

/// Footer stored in the last bytes of every page.
///
/// Layout (4 bytes, big-endian):
/// - slot_count: 2 bytes
/// - free_offset: 2 bytes (end of the record region)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageFooter {
    /// Number of entries in the slot directory.
    pub slot_count: u16,
    /// Offset of the first unused byte of the record region.
    pub free_offset: u16,
}

impl PageFooter {
    /// Size of the footer in bytes.
    pub const SIZE: usize = FOOTER_SIZE;

    /// Offset of the footer in a page.
    pub const OFFSET: usize = FOOTER_OFFSET;

    /// Creates a new footer.
    pub fn new(slot_count: u16, free_offset: u16) -> Self {
        Self {
            slot_count,
            free_offset,
        }
    }

    /// Returns the offset where the slot directory begins.
    ///
    /// `None` if the directory would not fit in the page.
    pub fn slot_table_start(&self) -> Option<usize> {
        FOOTER_OFFSET.checked_sub(self.slot_count as usize * SLOT_ENTRY_SIZE)
    }

    /// Returns the signed gap between the record region and the slot directory.
    ///
    /// Negative only for a corrupted page.
    pub fn raw_free_space(&self) -> isize {
        FOOTER_OFFSET as isize
            - (self.slot_count as isize) * SLOT_ENTRY_SIZE as isize
            - self.free_offset as isize
    }

    /// Serializes the footer to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.slot_count.to_be_bytes());
        buf[2..4].copy_from_slice(&self.free_offset.to_be_bytes());
        buf
    }

    /// Deserializes the footer from bytes.
    pub fn from_bytes(buf: &[u8]) -> Self {
        Self {
            slot_count: u16::from_be_bytes([buf[0], buf[1]]),
            free_offset: u16::from_be_bytes([buf[2], buf[3]]),
        }
    }
}

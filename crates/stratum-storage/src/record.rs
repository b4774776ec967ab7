//! Physical record addresses.

use crate::heap::SlotId;

/// Physical address of a stored record within a heap file.
///
/// Combines a page number with a slot index. Addresses are stable: a record
/// never moves once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    /// Page containing this record.
    pub page_num: u32,
    /// Slot index within the page.
    pub slot_id: SlotId,
}

impl RecordId {
    /// Creates a new record ID.
    pub fn new(page_num: u32, slot: u16) -> Self {
        Self {
            page_num,
            slot_id: SlotId(slot),
        }
    }

    /// Returns the slot index as a plain integer.
    pub fn slot(&self) -> u16 {
        self.slot_id.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.page_num, self.slot_id.0)
    }
}

impl From<(u32, u16)> for RecordId {
    fn from((page_num, slot): (u32, u16)) -> Self {
        Self::new(page_num, slot)
    }
}

/// A record returned by a heap file scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// Where the record lives.
    pub id: RecordId,
    /// Raw record bytes.
    pub data: Vec<u8>,
}

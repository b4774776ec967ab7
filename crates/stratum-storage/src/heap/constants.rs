//! Heap page layout constants.

pub use stratum_common::page::{FOOTER_OFFSET, MAX_RECORD_SIZE, SLOT_ENTRY_SIZE};

/// Offset where the record region begins.
pub const DATA_START: usize = 0;

/// Bytes an insert consumes beyond the record itself.
pub const INSERT_OVERHEAD: usize = SLOT_ENTRY_SIZE;

//! Storage engine for Stratum.
//!
//! This crate provides:
//! - Disk manager for page-level file I/O
//! - Heap pages for variable-length record storage
//! - HeapFile manager for first-fit inserts and sequential scans
//! - Physical record addresses

mod disk;
mod heap;
mod record;

pub use disk::{DiskManager, DiskManagerConfig};
pub use heap::constants::{INSERT_OVERHEAD, MAX_RECORD_SIZE};
pub use heap::{HeapFile, HeapPage, HeapPageIterator, SlotEntry, SlotId};
pub use record::{RecordId, ScannedRecord};

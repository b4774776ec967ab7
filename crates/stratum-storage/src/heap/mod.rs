//! Heap storage implementation.
//!
//! This module provides heap-based record storage with:
//! - HeapPage: Slotted page format with a footer-anchored slot directory
//! - HeapFile: First-fit insertion and full scans over a file of pages

pub mod constants;
mod file;
mod page;

pub use file::HeapFile;
pub use page::{HeapPage, HeapPageIterator, SlotEntry, SlotId};

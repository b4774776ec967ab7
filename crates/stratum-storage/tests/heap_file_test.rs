//! Integration tests for heap file placement and scanning.
//!
//! Covers:
//! - Lazy file creation and dense slot assignment
//! - First-fit placement across pages
//! - Multi-page scans in page-then-slot order
//! - Free space accounting across inserts

use stratum_common::PAGE_SIZE;
use stratum_storage::{
    DiskManager, DiskManagerConfig, HeapFile, RecordId, ScannedRecord, MAX_RECORD_SIZE,
};
use tempfile::tempdir;

fn setup() -> (HeapFile, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let disk = DiskManager::new(DiskManagerConfig {
        data_dir: dir.path().to_path_buf(),
        fsync_enabled: false,
    })
    .unwrap();
    (HeapFile::open(disk, "table.heap"), dir)
}

#[test]
fn test_two_records_then_overflow_page() {
    let (heap, _dir) = setup();
    let a = vec![b'A'; 20];
    let b = vec![b'B'; 20];

    assert_eq!(heap.insert(&a).unwrap(), RecordId::new(0, 0));
    assert_eq!(heap.insert(&b).unwrap(), RecordId::new(0, 1));

    let scanned = heap.scan_all().unwrap();
    assert_eq!(
        scanned,
        vec![
            ScannedRecord {
                id: RecordId::new(0, 0),
                data: a.clone()
            },
            ScannedRecord {
                id: RecordId::new(0, 1),
                data: b.clone()
            },
        ]
    );

    // page 0 has 4092 - 40 - 8 = 4044 bytes left; 4041 + 4 does not fit
    let free = heap.read_page(0).unwrap().free_space().unwrap();
    assert_eq!(free, 4044);
    let big = vec![b'C'; free - 3];
    assert_eq!(heap.insert(&big).unwrap(), RecordId::new(1, 0));
    assert_eq!(heap.num_pages().unwrap(), 2);
}

#[test]
fn test_first_fit_prefers_existing_page() {
    let (heap, _dir) = setup();

    // fill page 0 exactly
    assert_eq!(
        heap.insert(&vec![1u8; MAX_RECORD_SIZE]).unwrap(),
        RecordId::new(0, 0)
    );
    assert_eq!(heap.read_page(0).unwrap().free_space().unwrap(), 0);

    assert_eq!(heap.insert(&[2u8; 100]).unwrap(), RecordId::new(1, 0));
    assert_eq!(heap.insert(&[3u8; 50]).unwrap(), RecordId::new(1, 1));
    assert_eq!(heap.num_pages().unwrap(), 2);
}

#[test]
fn test_first_fit_returns_lowest_page_with_room() {
    let (heap, _dir) = setup();

    // page 0: leave 100 bytes free
    heap.insert(&vec![0u8; 4092 - 4 - 100]).unwrap();
    // does not fit page 0, goes to page 1
    assert_eq!(heap.insert(&[1u8; 200]).unwrap(), RecordId::new(1, 0));
    // fits page 0 again: 96 + 4 == 100
    assert_eq!(heap.insert(&[2u8; 96]).unwrap(), RecordId::new(0, 1));
    // page 0 now full, page 1 takes it
    assert_eq!(heap.insert(&[3u8; 1]).unwrap(), RecordId::new(1, 1));
}

#[test]
fn test_multi_page_scan_order() {
    let (heap, _dir) = setup();
    let record_len = 500;
    let count = 100usize;

    let mut expected = Vec::new();
    for i in 0..count {
        let data = vec![(i % 251) as u8; record_len];
        let id = heap.insert(&data).unwrap();
        expected.push(ScannedRecord { id, data });
    }

    let per_page = (PAGE_SIZE - 4) / (record_len + 4);
    let pages = heap.num_pages().unwrap() as usize;
    assert_eq!(pages, count.div_ceil(per_page));
    assert!(pages * (PAGE_SIZE - 4) >= count * (record_len + 4));

    let scanned = heap.scan_all().unwrap();
    assert_eq!(scanned, expected);

    let ids: Vec<_> = scanned.iter().map(|r| r.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn test_free_space_accounting() {
    let (heap, _dir) = setup();
    let sizes = [0usize, 7, 20, 333, 1024];

    heap.create().unwrap();
    let mut free = heap.read_page(0).unwrap().free_space().unwrap();
    for len in sizes {
        heap.insert(&vec![9u8; len]).unwrap();
        let now = heap.read_page(0).unwrap().free_space().unwrap();
        assert_eq!(now, free - len - 4);
        free = now;
    }
}

#[test]
fn test_file_size_is_page_multiple() {
    let (heap, _dir) = setup();
    for i in 0..40u8 {
        heap.insert(&[i; 300]).unwrap();
        let len = std::fs::metadata(heap.path()).unwrap().len();
        assert_eq!(len % PAGE_SIZE as u64, 0);
    }
}

#[test]
fn test_reopen_sees_existing_records() {
    let dir = tempdir().unwrap();
    let config = DiskManagerConfig {
        data_dir: dir.path().to_path_buf(),
        fsync_enabled: true,
    };

    {
        let heap = HeapFile::open(DiskManager::new(config.clone()).unwrap(), "t.heap");
        heap.insert(b"one").unwrap();
        heap.insert(b"two").unwrap();
    }

    let heap = HeapFile::open(DiskManager::new(config).unwrap(), "t.heap");
    assert_eq!(heap.insert(b"three").unwrap(), RecordId::new(0, 2));
    let data: Vec<_> = heap.scan_all().unwrap().into_iter().map(|r| r.data).collect();
    assert_eq!(data, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
}

//! Structured access to tables: records in, records out.

use crate::codec::{decode, encode};
use crate::schema::{SchemaRegistry, TableDescriptor};
use crate::value::Record;
use log::{debug, info};
use std::path::Path;
use stratum_common::{Result, StorageConfig};
use stratum_storage::{DiskManager, DiskManagerConfig, HeapFile, RecordId};

/// One table bound to its heap file.
#[derive(Debug, Clone)]
pub struct TableStore {
    descriptor: TableDescriptor,
    heap: HeapFile,
}

impl TableStore {
    /// Binds a table descriptor to its heap file under the configured directory.
    pub fn new(descriptor: TableDescriptor, disk: DiskManager, config: &StorageConfig) -> Self {
        let path = config.heap_path(&descriptor.heap_file_name(config));
        Self {
            descriptor,
            heap: HeapFile::new(disk, path),
        }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn heap(&self) -> &HeapFile {
        &self.heap
    }

    /// Encodes and appends a record, returning where it landed.
    pub fn insert_structured(&self, record: &Record) -> Result<RecordId> {
        let bytes = encode(record, &self.descriptor)?;
        let id = self.heap.insert(&bytes)?;
        debug!("{}: inserted record at {}", self.descriptor.table_name, id);
        Ok(id)
    }

    /// Decodes every record in heap scan order.
    pub fn read_all_structured(&self) -> Result<Vec<Record>> {
        Ok(self
            .scan_structured()?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Decodes every record along with its physical address.
    pub fn scan_structured(&self) -> Result<Vec<(RecordId, Record)>> {
        self.heap
            .scan_all()?
            .into_iter()
            .map(|scanned| Ok((scanned.id, decode(&scanned.data, &self.descriptor)?)))
            .collect()
    }

    /// Decodes the record at a physical address.
    pub fn get_structured(&self, id: RecordId) -> Result<Record> {
        decode(&self.heap.get(id)?, &self.descriptor)
    }
}

/// A schema registry together with the storage it describes.
#[derive(Debug, Clone)]
pub struct Database {
    config: StorageConfig,
    disk: DiskManager,
    schema: SchemaRegistry,
}

impl Database {
    /// Opens a database, creating the data directory if needed.
    pub fn open(config: StorageConfig, schema: SchemaRegistry) -> Result<Self> {
        let disk = DiskManager::new(DiskManagerConfig::from(&config))?;
        info!(
            "opened {} table(s) in {}",
            schema.len(),
            config.data_dir.display()
        );
        Ok(Self {
            config,
            disk,
            schema,
        })
    }

    /// Loads a schema file and opens a database over it.
    pub fn open_with_schema_file(config: StorageConfig, path: impl AsRef<Path>) -> Result<Self> {
        let schema = SchemaRegistry::load(path)?;
        Self::open(config, schema)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Returns the store for a table. Fails with `TableNotFound`.
    pub fn table(&self, name: &str) -> Result<TableStore> {
        let descriptor = self.schema.table(name)?.clone();
        Ok(TableStore::new(descriptor, self.disk.clone(), &self.config))
    }

    /// Encodes and inserts a record into the named table.
    pub fn insert_structured(&self, table: &str, record: &Record) -> Result<RecordId> {
        self.table(table)?.insert_structured(record)
    }

    /// Decodes every record of the named table in scan order.
    pub fn read_all_structured(&self, table: &str) -> Result<Vec<Record>> {
        self.table(table)?.read_all_structured()
    }
}

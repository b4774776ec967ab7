//! Schema registry: table name to ordered field descriptors and backing file.
//!
//! Schema documents are JSON in one of three shapes:
//! ```text
//! [ {"table_name": "Employee", "file_name": "employee.heap", "fields": [...]}, ... ]
//! {"table_name": "Employee", "fields": [...]}
//! {"Employee": {"fields": [...]}, "Dept": {...}}
//! ```
//! with fields written as `{"name": "id", "type": "int"}`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use stratum_common::{FieldType, Result, StorageConfig, StratumError, MAX_RECORD_SIZE};

/// One field of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDescriptor {
    /// Creates a new field descriptor.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A table: its name, backing heap file and ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name.
    pub table_name: String,
    /// Heap file name; defaults to `<table_name>.heap`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Fields in encoding order.
    pub fields: Vec<FieldDescriptor>,
}

impl TableDescriptor {
    /// Creates a table descriptor with the default file name.
    pub fn new(table_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            table_name: table_name.into(),
            file_name: None,
            fields,
        }
    }

    /// Sets an explicit heap file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Returns the heap file name, falling back to the configured default.
    pub fn heap_file_name(&self, config: &StorageConfig) -> String {
        match self.file_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => config.default_file_name(&self.table_name),
        }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the byte offset of a field within an encoded record.
    pub fn field_offset(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name == name {
                return Some(offset);
            }
            offset += field.field_type.encoded_width();
        }
        None
    }

    /// Returns the size of every encoded record of this table.
    pub fn record_width(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.encoded_width()).sum()
    }

    /// Checks names, field uniqueness and that a record fits in a page.
    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(StratumError::InvalidSchema(
                "table name must not be empty".to_string(),
            ));
        }
        if self.fields.is_empty() {
            return Err(StratumError::InvalidSchema(format!(
                "table {} has no fields",
                self.table_name
            )));
        }
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(StratumError::InvalidSchema(format!(
                    "table {} has a field with an empty name",
                    self.table_name
                )));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(StratumError::InvalidSchema(format!(
                    "table {} declares field {} twice",
                    self.table_name, field.name
                )));
            }
        }
        let width = self.record_width();
        if width > MAX_RECORD_SIZE {
            return Err(StratumError::InvalidSchema(format!(
                "table {} records are {} bytes, more than the {} a page can hold",
                self.table_name, width, MAX_RECORD_SIZE
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    table_name: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    fields: Vec<RawField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    List(Vec<RawTable>),
    Single(RawTable),
    Map(BTreeMap<String, RawTable>),
}

impl RawTable {
    fn into_descriptor(self, key: Option<&str>) -> Result<TableDescriptor> {
        let table_name = match (self.table_name, key) {
            (Some(name), _) => name,
            (None, Some(key)) => key.to_string(),
            (None, None) => {
                return Err(StratumError::InvalidSchema(
                    "table descriptor without table_name".to_string(),
                ))
            }
        };
        let fields = self
            .fields
            .into_iter()
            .map(|f| Ok(FieldDescriptor::new(f.name, f.field_type.parse()?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(TableDescriptor {
            table_name,
            file_name: self.file_name,
            fields,
        })
    }
}

/// Registry of table descriptors keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, TableDescriptor>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from descriptors, validating each.
    pub fn from_tables(tables: impl IntoIterator<Item = TableDescriptor>) -> Result<Self> {
        let mut registry = Self::new();
        for table in tables {
            registry.register(table)?;
        }
        Ok(registry)
    }

    /// Parses a JSON schema document.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(text)?;
        let tables = match document {
            SchemaDocument::List(tables) => tables
                .into_iter()
                .map(|t| t.into_descriptor(None))
                .collect::<Result<Vec<_>>>()?,
            SchemaDocument::Single(table) => vec![table.into_descriptor(None)?],
            SchemaDocument::Map(tables) => tables
                .into_iter()
                .map(|(key, t)| t.into_descriptor(Some(&key)))
                .collect::<Result<Vec<_>>>()?,
        };
        Self::from_tables(tables)
    }

    /// Loads a JSON schema document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let registry = Self::from_json(&text)?;
        debug!(
            "loaded {} table(s) from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Adds a table. Fails if the descriptor is invalid or the name is taken.
    pub fn register(&mut self, table: TableDescriptor) -> Result<()> {
        table.validate()?;
        if self.tables.contains_key(&table.table_name) {
            return Err(StratumError::InvalidSchema(format!(
                "table {} declared twice",
                table.table_name
            )));
        }
        self.tables.insert(table.table_name.clone(), table);
        Ok(())
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Result<&TableDescriptor> {
        self.tables
            .get(name)
            .ok_or_else(|| StratumError::TableNotFound(name.to_string()))
    }

    /// Returns true if the table is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Iterates over tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values()
    }

    /// Returns the number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

//! Typed records for Stratum heap files.
//!
//! This crate provides:
//! - Fixed-width encodings for `int`, `float`, `char(n)` and `varchar(n)`
//! - Schema registry loaded from JSON documents
//! - Record codec driven by a table descriptor
//! - Structured insert and scan over a table's heap file

pub mod codec;
pub mod primitive;
mod schema;
mod table;
mod value;

pub use codec::{decode, decode_field, encode};
pub use schema::{FieldDescriptor, SchemaRegistry, TableDescriptor};
pub use table::{Database, TableStore};
pub use value::{Record, Value};

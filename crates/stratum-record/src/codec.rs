//! Fixed-layout record codec.
//!
//! A record is the concatenation of its fields' encodings in the table's
//! declared order, with no header or separators. Every record of a table has
//! the same width.

use crate::primitive::{
    put_char, put_float, put_int, put_varchar, unpack_char, unpack_float, unpack_int,
    unpack_varchar,
};
use crate::schema::{FieldDescriptor, TableDescriptor};
use crate::value::{Record, Value};
use bytes::{Bytes, BytesMut};
use stratum_common::{FieldType, Result, StratumError};

/// Encodes a record against a table descriptor.
///
/// Fields absent from the record take their type's default. A field the table
/// does not declare, or a value whose variant does not match the declared
/// type, is rejected.
pub fn encode(record: &Record, table: &TableDescriptor) -> Result<Bytes> {
    if let Some(name) = record.names().find(|n| table.field(n).is_none()) {
        return Err(StratumError::UnknownField {
            table: table.table_name.clone(),
            field: name.to_string(),
        });
    }

    let mut buf = BytesMut::with_capacity(table.record_width());
    for field in &table.fields {
        match record.get(&field.name) {
            Some(value) => encode_field(&mut buf, field, value)?,
            None => encode_field(&mut buf, field, &Value::default_for(field.field_type))?,
        }
    }
    Ok(buf.freeze())
}

fn encode_field(buf: &mut BytesMut, field: &FieldDescriptor, value: &Value) -> Result<()> {
    match (field.field_type, value) {
        (FieldType::Int, Value::Int(v)) => put_int(buf, *v),
        (FieldType::Float, Value::Float(v)) => put_float(buf, *v),
        (FieldType::Char(n), Value::Text(s)) => put_char(buf, s, n),
        (FieldType::Varchar(n), Value::Text(s)) => put_varchar(buf, s, n),
        (expected, actual) => {
            return Err(StratumError::TypeMismatch {
                field: field.name.clone(),
                expected: expected.to_string(),
                actual: actual.type_name().to_string(),
            })
        }
    }
    Ok(())
}

/// Decodes a record against a table descriptor.
///
/// Fields are read in declared order. If the input is shorter than the table's
/// record width, each field sees whatever bytes remain: an int or float field
/// without four bytes is a format error, a char field decodes its partial
/// bytes, and a varchar field with nothing left decodes as empty.
pub fn decode(data: &[u8], table: &TableDescriptor) -> Result<Record> {
    let mut record = Record::new();
    let mut offset = 0;
    for field in &table.fields {
        let width = field.field_type.encoded_width();
        let value = decode_value(clamped(data, offset, width), field.field_type)?;
        record.insert(field.name.clone(), value);
        offset += width;
    }
    Ok(record)
}

/// Decodes a single field without materializing the rest of the record.
pub fn decode_field(data: &[u8], table: &TableDescriptor, name: &str) -> Result<Value> {
    let (field, offset) = table
        .field(name)
        .zip(table.field_offset(name))
        .ok_or_else(|| StratumError::UnknownField {
            table: table.table_name.clone(),
            field: name.to_string(),
        })?;
    let width = field.field_type.encoded_width();
    decode_value(clamped(data, offset, width), field.field_type)
}

fn clamped(data: &[u8], offset: usize, width: usize) -> &[u8] {
    let start = offset.min(data.len());
    let end = offset.saturating_add(width).min(data.len());
    &data[start..end]
}

fn decode_value(bytes: &[u8], field_type: FieldType) -> Result<Value> {
    Ok(match field_type {
        FieldType::Int => Value::Int(unpack_int(bytes)?),
        FieldType::Float => Value::Float(unpack_float(bytes)?),
        FieldType::Char(_) => Value::Text(unpack_char(bytes)?),
        FieldType::Varchar(_) => Value::Text(unpack_varchar(bytes)?),
    })
}

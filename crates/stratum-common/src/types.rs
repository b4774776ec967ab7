//! Field types supported by the record codec.

use crate::error::{Result, StratumError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Declared type of a table field.
///
/// Serialized in schema documents as `"int"`, `"float"`, `"char(N)"` or `"varchar(N)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    /// 4-byte big-endian signed integer.
    Int,
    /// 4-byte big-endian IEEE-754 single precision.
    Float,
    /// Fixed `n` bytes, zero padded.
    Char(usize),
    /// 1-byte length prefix followed by `n` reserved bytes.
    Varchar(usize),
}

impl FieldType {
    /// Returns the number of bytes this field occupies in an encoded record.
    pub fn encoded_width(&self) -> usize {
        match self {
            FieldType::Int | FieldType::Float => 4,
            FieldType::Char(n) => *n,
            FieldType::Varchar(n) => 1 + *n,
        }
    }
}

fn parse_width(inner: &str, type_str: &str) -> Result<usize> {
    inner
        .trim()
        .parse::<usize>()
        .map_err(|_| StratumError::UnknownFieldType(type_str.to_string()))
}

impl FromStr for FieldType {
    type Err = StratumError;

    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim();
        if let Some(inner) = t.strip_prefix("char(").and_then(|r| r.strip_suffix(')')) {
            return Ok(FieldType::Char(parse_width(inner, s)?));
        }
        if let Some(inner) = t.strip_prefix("varchar(").and_then(|r| r.strip_suffix(')')) {
            return Ok(FieldType::Varchar(parse_width(inner, s)?));
        }
        match t {
            "int" => Ok(FieldType::Int),
            "float" => Ok(FieldType::Float),
            _ => Err(StratumError::UnknownFieldType(s.to_string())),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = StratumError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Char(n) => write!(f, "char({})", n),
            FieldType::Varchar(n) => write!(f, "varchar({})", n),
        }
    }
}

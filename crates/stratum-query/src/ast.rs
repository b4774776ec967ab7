//! Parsed statements.

use std::fmt;

/// A literal as written in a statement, before conversion to a field type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Optional minus sign followed by digits.
    Int(i64),
    /// Anything else that parses as a number.
    Float(f64),
    /// A quoted string, or a bare word that is not a number.
    Text(String),
}

impl Literal {
    /// Classifies an unquoted token.
    pub fn from_bare(token: &str) -> Literal {
        let digits = token.strip_prefix('-').unwrap_or(token);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(v) = token.parse::<i64>() {
                return Literal::Int(v);
            }
        }
        match token.parse::<f64>() {
            Ok(v) => Literal::Float(v),
            Err(_) => Literal::Text(token.to_string()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Text(_) => "text",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Columns returned by a `SELECT`.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`: every field in declared order.
    All,
    /// Named fields in the requested order.
    Fields(Vec<String>),
}

/// `field = literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `INSERT INTO table (f1, ...) VALUES (v1, ...)`
    Insert {
        table: String,
        fields: Vec<String>,
        values: Vec<Literal>,
    },
    /// `SELECT projection FROM table [WHERE field = value]`
    Select {
        table: String,
        projection: Projection,
        condition: Option<Condition>,
    },
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Statement::Insert { table, .. } | Statement::Select { table, .. } => table,
        }
    }
}

//! Statement execution over a [`Database`].

use crate::ast::{Condition, Literal, Projection, Statement};
use crate::parser::parse;
use log::debug;
use stratum_common::{FieldType, Result, StratumError};
use stratum_record::{Database, FieldDescriptor, Record, TableDescriptor, Value};
use stratum_storage::RecordId;

/// Outcome of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Address of the inserted record.
    Inserted(RecordId),
    /// Selected rows, projected.
    Rows(Vec<Record>),
}

/// Converts a literal to the declared type of a field.
///
/// An int literal may be stored in a float field. Any other mismatch between
/// a numeric literal and a text field, or the reverse, is rejected.
pub fn coerce_literal(literal: &Literal, field: &FieldDescriptor) -> Result<Value> {
    let mismatch = || StratumError::TypeMismatch {
        field: field.name.clone(),
        expected: field.field_type.to_string(),
        actual: literal.type_name().to_string(),
    };

    match (field.field_type, literal) {
        (FieldType::Int, Literal::Int(v)) => i32::try_from(*v).map(Value::Int).map_err(|_| {
            StratumError::ParseError(format!(
                "{} is out of range for int field {}",
                v, field.name
            ))
        }),
        (FieldType::Float, Literal::Int(v)) => Ok(Value::Float(*v as f32)),
        (FieldType::Float, Literal::Float(v)) => Ok(Value::Float(*v as f32)),
        (FieldType::Char(_) | FieldType::Varchar(_), Literal::Text(s)) => {
            Ok(Value::Text(s.clone()))
        }
        _ => Err(mismatch()),
    }
}

fn lookup_field<'a>(table: &'a TableDescriptor, name: &str) -> Result<&'a FieldDescriptor> {
    table.field(name).ok_or_else(|| StratumError::UnknownField {
        table: table.table_name.clone(),
        field: name.to_string(),
    })
}

/// Runs statements against a database.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    db: Database,
}

impl QueryEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Parses and runs one statement.
    pub fn execute(&self, query: &str) -> Result<QueryResult> {
        let statement = parse(query)?;
        self.execute_statement(&statement)
    }

    pub fn execute_statement(&self, statement: &Statement) -> Result<QueryResult> {
        match statement {
            Statement::Insert {
                table,
                fields,
                values,
            } => self.insert(table, fields, values),
            Statement::Select {
                table,
                projection,
                condition,
            } => self.select(table, projection, condition.as_ref()),
        }
    }

    fn insert(&self, table: &str, fields: &[String], values: &[Literal]) -> Result<QueryResult> {
        let store = self.db.table(table)?;
        let descriptor = store.descriptor();

        let mut record = Record::new();
        for (name, literal) in fields.iter().zip(values) {
            let field = lookup_field(descriptor, name)?;
            record.insert(name.clone(), coerce_literal(literal, field)?);
        }

        let id = store.insert_structured(&record)?;
        Ok(QueryResult::Inserted(id))
    }

    fn select(
        &self,
        table: &str,
        projection: &Projection,
        condition: Option<&Condition>,
    ) -> Result<QueryResult> {
        let store = self.db.table(table)?;
        let descriptor = store.descriptor();

        // resolve names before touching the heap file
        if let Projection::Fields(names) = projection {
            for name in names {
                lookup_field(descriptor, name)?;
            }
        }
        let filter = match condition {
            Some(cond) => {
                let field = lookup_field(descriptor, &cond.field)?;
                Some((cond.field.as_str(), coerce_literal(&cond.value, field)?))
            }
            None => None,
        };

        let rows = store.read_all_structured()?;
        let total = rows.len();
        let rows: Vec<Record> = rows
            .into_iter()
            .filter(|row| match &filter {
                Some((name, value)) => row.get(name) == Some(value),
                None => true,
            })
            .map(|row| match projection {
                Projection::All => row,
                Projection::Fields(names) => names
                    .iter()
                    .filter_map(|name| row.get(name).map(|v| (name.clone(), v.clone())))
                    .collect(),
            })
            .collect();

        debug!("{}: {} of {} row(s) selected", table, rows.len(), total);
        Ok(QueryResult::Rows(rows))
    }
}

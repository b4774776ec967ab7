//! Query layer for Stratum.
//!
//! Parses `INSERT` and `SELECT` statements and runs them against the typed
//! tables of a [`stratum_record::Database`].

pub mod ast;
mod executor;
mod parser;

pub use ast::{Condition, Literal, Projection, Statement};
pub use executor::{coerce_literal, QueryEngine, QueryResult};
pub use parser::parse;

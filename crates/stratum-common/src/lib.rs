//! Stratum common types, errors, and configuration.
//!
//! This crate provides shared definitions used across all Stratum components.

pub mod config;
pub mod error;
pub mod page;
pub mod types;

pub use config::StorageConfig;
pub use error::{Result, StratumError};
pub use page::{PageFooter, MAX_RECORD_SIZE, PAGE_SIZE};
pub use types::FieldType;

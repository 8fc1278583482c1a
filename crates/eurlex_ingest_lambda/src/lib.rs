//! AWS-oriented adapters and handlers for EUR-Lex notice ingestion.
//!
//! This crate owns runtime integration details (Lambda handlers, DynamoDB,
//! S3, and the EUR-Lex HTTP source) and re-exports the contract, config, and
//! storage key primitives from `eurlex_ingest_core` under `runtime`.

pub mod adapters;
pub mod handlers;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub mod runtime {
    pub use eurlex_ingest_core::{config, contract, error, storage_keys};
}

//! Shared notice-ingestion domain primitives.
//!
//! This crate owns the invocation contracts, configuration, storage key
//! layout, and error taxonomy. It intentionally excludes AWS SDK and Lambda
//! runtime concerns.

pub mod config;
pub mod contract;
pub mod error;
pub mod storage_keys;

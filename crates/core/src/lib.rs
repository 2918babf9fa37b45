//! Domain logic for the roster candidate-ingestion service.
//!
//! This crate has no database, async, or I/O dependencies. It provides:
//!
//! - Field-level validators and the candidate record types ([`candidate`])
//! - The row validation engine, duplicate index, and roster parsing
//!   ([`ingest`])
//! - The shared domain error type ([`error`]) and id/timestamp aliases
//!   ([`types`])

pub mod candidate;
pub mod error;
pub mod ingest;
pub mod types;

//! Service layer for business logic.
//!
//! Separates the asynchronous ingestion workflow from the store and the
//! controller so each can be tested on its own.

pub mod ingest_service;

pub use ingest_service::{IngestReport, IngestService};

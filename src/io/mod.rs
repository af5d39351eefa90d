//! File I/O: CSV ingest of external series, JSON artifacts, CSV exports.
//!
//! Nothing in here does math. The fitting/projection core consumes fully
//! materialized in-memory series and does not care how they were sourced.

pub mod artifact;
pub mod curve;
pub mod export;
pub mod ingest;

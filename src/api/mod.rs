//! Sheetio API Server module
//!
//! HTTP REST API over the exporter and importer.
//! Run with `sheetio-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server};

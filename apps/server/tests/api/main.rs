//! HTTP API test suite.
//!
//! Drives the full actix app against a temporary SQLite file and upload directory.
//!
//! Run with: cargo test --test api

mod test_helpers;

mod test_predict;

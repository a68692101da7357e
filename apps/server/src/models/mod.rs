//! Domain models for the recognition server.

pub mod history;

pub use history::{DeleteResponse, PredictResult, ServiceInfo};

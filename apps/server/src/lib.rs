//! Image recognition server library.
//!
//! Accepts image uploads, runs a placeholder recognizer, keeps a history of
//! predictions in SQLite and the uploaded images on local disk.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

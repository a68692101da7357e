//! SeaORM entity definitions for the SQLite database.

pub mod history;

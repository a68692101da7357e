//! Business logic services.

pub mod blob_store;
pub mod history;
pub mod image_check;
pub mod predict;
pub mod recognizer;

pub use blob_store::{BlobDeletion, BlobStore};
pub use predict::{ImageUpload, run_predict};
pub use recognizer::{PlaceholderRecognizer, Recognition, Recognizer};

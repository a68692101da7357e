//! Image recognition seam.
//!
//! No model ships with the server. `PlaceholderRecognizer` stands in for one:
//! it waits out a fixed latency and returns a constant answer.

use std::time::Duration;

use async_trait::async_trait;

/// Label reported by the placeholder recognizer.
pub const PLACEHOLDER_LABEL: &str = "示例物体";

/// Confidence reported by the placeholder recognizer.
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.93;

/// Result of recognizing one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub label: String,
    /// Always within [0, 1].
    pub confidence: f64,
}

impl Recognition {
    /// Build a recognition, clamping confidence into [0, 1]. NaN becomes 0.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Anything that can label an image. Implementations may be slow but must
/// yield to the runtime while waiting so other requests keep being served.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Recognition;
}

/// Fixed-latency stand-in for a real model.
#[derive(Debug, Clone)]
pub struct PlaceholderRecognizer {
    delay: Duration,
}

impl PlaceholderRecognizer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Recognizer for PlaceholderRecognizer {
    async fn recognize(&self, _image: &[u8]) -> Recognition {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Recognition::new(PLACEHOLDER_LABEL, PLACEHOLDER_CONFIDENCE)
    }
}

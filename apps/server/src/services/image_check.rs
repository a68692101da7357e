//! Structural validation of uploaded images.
//!
//! The declared media type must be `image/*` and the whole file must decode.
//! PNG files are additionally walked chunk by chunk up to `IEND`.

use std::io::Cursor;

use image::{ImageFormat, ImageReader, Limits};

/// Largest width or height accepted before decoding.
const MAX_DIMENSION: u32 = 16_384;
/// Upper bound on decoder allocations.
const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

const PNG_SIGNATURE_LEN: usize = 8;

/// Why an upload was not accepted as an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidImage {
    #[error("missing content type")]
    MissingContentType,

    #[error("content type '{0}' is not an image")]
    NotImage(String),

    #[error("unrecognized image format")]
    UnknownFormat,

    #[error("corrupt image data: {0}")]
    Corrupt(String),
}

/// Facts learned from a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Accept `data` only if it declares an `image/*` type and decodes in full.
pub fn validate_image(data: &[u8], content_type: Option<&str>) -> Result<CheckedImage, InvalidImage> {
    let content_type = content_type
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .ok_or(InvalidImage::MissingContentType)?;

    if !is_image_media_type(content_type) {
        return Err(InvalidImage::NotImage(content_type.to_string()));
    }

    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| InvalidImage::Corrupt(e.to_string()))?;

    let format = reader.format().ok_or(InvalidImage::UnknownFormat)?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);

    // Decoding every pixel catches files cut off inside their image data.
    let decoded = reader
        .decode()
        .map_err(|e| InvalidImage::Corrupt(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    if width == 0 || height == 0 {
        return Err(InvalidImage::Corrupt("zero-sized image".to_string()));
    }

    if format == ImageFormat::Png {
        check_png_chunks(data)?;
    }

    Ok(CheckedImage {
        format,
        width,
        height,
    })
}

/// Walk PNG chunks from the signature to `IEND`, requiring every chunk to fit.
fn check_png_chunks(data: &[u8]) -> Result<(), InvalidImage> {
    let mut pos = PNG_SIGNATURE_LEN;

    loop {
        let header = data
            .get(pos..pos + 8)
            .ok_or_else(|| InvalidImage::Corrupt("png ends before IEND".to_string()))?;
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let kind = &header[4..8];

        // length + type + data + crc
        let end = pos
            .checked_add(12)
            .and_then(|n| n.checked_add(length))
            .filter(|end| *end <= data.len())
            .ok_or_else(|| {
                InvalidImage::Corrupt(format!(
                    "truncated {} chunk",
                    String::from_utf8_lossy(kind)
                ))
            })?;

        if kind == b"IEND" {
            return Ok(());
        }
        pos = end;
    }
}

fn is_image_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}

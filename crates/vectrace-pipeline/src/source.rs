//! Source image decoding and identity.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, GIF, WebP) and produces a
//! [`SourceImage`]: single-channel luminance pixels shared behind an
//! `Arc`, a display name, and a content-derived [`ImageId`].

use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use image::GrayImage;
use siphasher::sip::SipHasher13;

use crate::types::{Dimensions, PipelineError};

/// Stable identity of a decoded image.
///
/// Derived from the pixel content, so two uploads of the same picture
/// share an identity while any pixel change produces a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

impl ImageId {
    /// Raw digest value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    fn of(pixels: &GrayImage) -> Self {
        let mut hasher = SipHasher13::new();
        hasher.write_u32(pixels.width());
        hasher.write_u32(pixels.height());
        hasher.write(pixels.as_raw());
        Self(hasher.finish())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Handle to decoded pixel data.
///
/// Cloning is cheap; the pixels are released when the last handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct SourceImage {
    id: ImageId,
    name: Arc<str>,
    pixels: Arc<GrayImage>,
}

impl SourceImage {
    /// Decode raw image bytes and convert to luminance.
    ///
    /// `name` is the user-facing file name, kept for export naming.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
    /// Returns [`PipelineError::ImageDecode`] if the image format is
    /// unrecognized or the data is corrupt.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Self, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_luma(name, img.to_luma8()))
    }

    /// Wrap already-decoded luminance pixels.
    #[must_use]
    pub fn from_luma(name: &str, pixels: GrayImage) -> Self {
        Self {
            id: ImageId::of(&pixels),
            name: Arc::from(name),
            pixels: Arc::new(pixels),
        }
    }

    /// Content identity of this image.
    #[must_use]
    pub const fn id(&self) -> ImageId {
        self.id
    }

    /// File name the image was loaded from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Luminance pixels.
    #[must_use]
    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    /// Shared handle to the pixels, for moving work onto another thread.
    #[must_use]
    pub fn shared_pixels(&self) -> Arc<GrayImage> {
        Arc::clone(&self.pixels)
    }

    /// Image dimensions in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }
}

//! The static source raster.

use std::path::Path;

use image::{ImageReader, RgbaImage};

use crate::error::SourceImageError;

/// Source image held in memory for the lifetime of the process.
///
/// Always converted to RGBA on load so crops can be pasted onto transparent
/// canvases without a format conversion per request.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: RgbaImage,
}

impl SourceImage {
    /// Load and decode an image file. The format is guessed from content.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceImageError> {
        let path = path.as_ref();
        let load_err = |message: String| SourceImageError::Load {
            path: path.display().to_string(),
            message,
        };

        let image = ImageReader::open(path)
            .map_err(|e| load_err(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| load_err(e.to_string()))?
            .decode()
            .map_err(|e| load_err(e.to_string()))?
            .to_rgba8();

        if image.width() == 0 || image.height() == 0 {
            return Err(SourceImageError::Empty {
                path: path.display().to_string(),
                width: image.width(),
                height: image.height(),
            });
        }

        Ok(Self { image })
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

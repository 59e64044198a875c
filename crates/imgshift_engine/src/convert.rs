use std::io::Cursor;

use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use imgshift_core::{ConversionFailure, FailureKind, TargetFormat};

/// The conversion boundary: opaque bytes in, bytes in the target format out.
pub trait Converter: Send + Sync {
    fn convert(&self, input: &[u8], format: TargetFormat) -> Result<Vec<u8>, ConvertError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("{0}")]
    Decode(String),
    #[error("unsupported format: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Encode(String),
}

impl ConvertError {
    pub fn into_failure(self) -> ConversionFailure {
        let kind = match &self {
            ConvertError::Decode(_) => FailureKind::Decode,
            ConvertError::Unsupported(_) => FailureKind::UnsupportedFormat,
            ConvertError::Encode(_) => FailureKind::Encode,
        };
        ConversionFailure::new(kind, self.to_string())
    }
}

/// Default boundary backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateConverter;

impl Converter for ImageCrateConverter {
    fn convert(&self, input: &[u8], format: TargetFormat) -> Result<Vec<u8>, ConvertError> {
        let decoded = ImageReader::new(Cursor::new(input))
            .with_guessed_format()
            .map_err(|err| ConvertError::Decode(format!("failed to read image: {err}")))?
            .decode()
            .map_err(|err| ConvertError::Decode(format!("failed to decode image: {err}")))?;

        // JPEG carries no alpha; GIF and WebP encoders take 8-bit RGBA.
        let (output_format, image) = match format {
            TargetFormat::Jpg => (
                ImageFormat::Jpeg,
                DynamicImage::ImageRgb8(decoded.to_rgb8()),
            ),
            TargetFormat::Png => (ImageFormat::Png, decoded),
            TargetFormat::Webp => (
                ImageFormat::WebP,
                DynamicImage::ImageRgba8(decoded.to_rgba8()),
            ),
            TargetFormat::Gif => (
                ImageFormat::Gif,
                DynamicImage::ImageRgba8(decoded.to_rgba8()),
            ),
        };

        let mut output = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut output), output_format)
            .map_err(|err| match err {
                ImageError::Unsupported(detail) => ConvertError::Unsupported(detail.to_string()),
                other => ConvertError::Encode(format!("failed to write image: {other}")),
            })?;
        Ok(output)
    }
}

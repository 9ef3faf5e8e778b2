//! Picture handling for personal details creation.
//!
//! Pictures are normalised to 200×200 pixels. The output is stored as an
//! opaque blob; nothing downstream decodes it again.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;

/// Edge length, in pixels, of a stored picture.
pub const PICTURE_EDGE: u32 = 200;

/// Largest accepted upload.
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("picture exceeds {MAX_PICTURE_BYTES} bytes")]
    TooLarge,

    #[error("unsupported picture format")]
    UnsupportedFormat,

    #[error("picture could not be decoded or encoded: {0}")]
    Codec(String),
}

impl From<image::ImageError> for ImageError {
    fn from(e: image::ImageError) -> Self {
        ImageError::Codec(e.to_string())
    }
}

/// An upload decoded once, together with the format it arrived in.
#[derive(Debug, Clone)]
pub struct Picture {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// Image collaborator consumed by the personal tier.
#[cfg_attr(test, mockall::automock)]
pub trait ImageProcessor: Send + Sync {
    /// Check the upload limits and decode the picture.
    fn decode(&self, image: &[u8]) -> Result<Picture, ImageError>;

    /// `true` if the picture already has the stored dimensions.
    fn meets_size_requirements(&self, picture: &Picture) -> bool;

    /// The upload as-is.
    fn to_bytes(&self, image: &[u8]) -> Vec<u8>;

    /// The picture scaled to the stored dimensions, in its original format.
    fn resize_and_to_bytes(&self, picture: &Picture) -> Result<Vec<u8>, ImageError>;
}

/// Produce the blob to store for an uploaded picture.
pub fn process_picture(processor: &dyn ImageProcessor, image: &[u8]) -> Result<Vec<u8>, ImageError> {
    let picture = processor.decode(image)?;
    if processor.meets_size_requirements(&picture) {
        Ok(processor.to_bytes(image))
    } else {
        processor.resize_and_to_bytes(&picture)
    }
}

/// [`ImageProcessor`] backed by the `image` crate.
///
/// Accepts JPEG, GIF, TIFF, BMP and WebP, plus PNG. Camera RAW, SVG, HEIF and
/// PSD have no decoder here and are rejected as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortraitProcessor;

impl PortraitProcessor {
    fn detect(image: &[u8]) -> Result<ImageFormat, ImageError> {
        if image.len() > MAX_PICTURE_BYTES {
            return Err(ImageError::TooLarge);
        }
        match image::guess_format(image) {
            Ok(
                format @ (ImageFormat::Jpeg
                | ImageFormat::Gif
                | ImageFormat::Tiff
                | ImageFormat::Bmp
                | ImageFormat::WebP
                | ImageFormat::Png),
            ) => Ok(format),
            _ => Err(ImageError::UnsupportedFormat),
        }
    }
}

impl ImageProcessor for PortraitProcessor {
    fn decode(&self, image: &[u8]) -> Result<Picture, ImageError> {
        let format = Self::detect(image)?;
        Ok(Picture {
            image: image::load_from_memory_with_format(image, format)?,
            format,
        })
    }

    fn meets_size_requirements(&self, picture: &Picture) -> bool {
        picture.image.dimensions() == (PICTURE_EDGE, PICTURE_EDGE)
    }

    fn to_bytes(&self, image: &[u8]) -> Vec<u8> {
        image.to_vec()
    }

    fn resize_and_to_bytes(&self, picture: &Picture) -> Result<Vec<u8>, ImageError> {
        let resized = picture
            .image
            .resize_exact(PICTURE_EDGE, PICTURE_EDGE, FilterType::Triangle);
        let mut out = Cursor::new(Vec::new());
        resized.write_to(&mut out, picture.format)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode(DynamicImage::new_rgb8(width, height), ImageFormat::Png)
    }

    fn assert_resized_in_place(upload: &[u8], format: ImageFormat) {
        let stored = process_picture(&PortraitProcessor, upload).unwrap();
        assert_eq!(image::guess_format(&stored).unwrap(), format);
        let decoded = image::load_from_memory_with_format(&stored, format).unwrap();
        assert_eq!(decoded.dimensions(), (PICTURE_EDGE, PICTURE_EDGE));
    }

    #[test]
    fn exact_size_passes_through() {
        let original = png(PICTURE_EDGE, PICTURE_EDGE);
        let stored = process_picture(&PortraitProcessor, &original).unwrap();
        assert_eq!(stored, original);
    }

    #[test]
    fn other_sizes_are_resized() {
        assert_resized_in_place(&png(64, 48), ImageFormat::Png);
    }

    #[test]
    fn jpeg_accepted() {
        let upload = encode(DynamicImage::new_rgb8(64, 48), ImageFormat::Jpeg);
        assert_resized_in_place(&upload, ImageFormat::Jpeg);
    }

    #[test]
    fn gif_accepted() {
        let upload = encode(DynamicImage::new_rgba8(1, 1), ImageFormat::Gif);
        assert_eq!(image::guess_format(&upload).unwrap(), ImageFormat::Gif);
        assert_resized_in_place(&upload, ImageFormat::Gif);
    }

    #[test]
    fn bmp_accepted() {
        let upload = encode(DynamicImage::new_rgb8(64, 48), ImageFormat::Bmp);
        assert_resized_in_place(&upload, ImageFormat::Bmp);
    }

    #[test]
    fn tiff_accepted() {
        let upload = encode(DynamicImage::new_rgb8(64, 48), ImageFormat::Tiff);
        assert_resized_in_place(&upload, ImageFormat::Tiff);
    }

    #[test]
    fn webp_accepted() {
        let upload = encode(DynamicImage::new_rgba8(64, 48), ImageFormat::WebP);
        assert_resized_in_place(&upload, ImageFormat::WebP);
    }

    #[test]
    fn garbage_rejected() {
        let err = process_picture(&PortraitProcessor, b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat));
    }

    #[test]
    fn svg_rejected() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;
        assert!(matches!(
            process_picture(&PortraitProcessor, svg),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn oversized_upload_rejected() {
        let mut big = png(1, 1);
        big.resize(MAX_PICTURE_BYTES + 1, 0);
        assert!(matches!(
            PortraitProcessor.decode(&big),
            Err(ImageError::TooLarge)
        ));
    }

    #[test]
    fn resize_skipped_when_size_matches() {
        let mut processor = MockImageProcessor::new();
        processor.expect_decode().times(1).returning(|_| {
            Ok(Picture {
                image: DynamicImage::new_rgb8(PICTURE_EDGE, PICTURE_EDGE),
                format: ImageFormat::Png,
            })
        });
        processor.expect_meets_size_requirements().returning(|_| true);
        processor.expect_to_bytes().returning(|b| b.to_vec());
        processor.expect_resize_and_to_bytes().times(0);
        assert_eq!(process_picture(&processor, &[1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn upload_decoded_once_before_resize() {
        let mut processor = MockImageProcessor::new();
        processor.expect_decode().times(1).returning(|_| {
            Ok(Picture {
                image: DynamicImage::new_rgb8(64, 48),
                format: ImageFormat::Png,
            })
        });
        processor.expect_meets_size_requirements().times(1).returning(|_| false);
        processor.expect_to_bytes().times(0);
        processor
            .expect_resize_and_to_bytes()
            .times(1)
            .withf(|p: &Picture| p.image.dimensions() == (64, 48))
            .returning(|_| Ok(vec![9]));
        assert_eq!(process_picture(&processor, &[1, 2, 3]).unwrap(), vec![9]);
    }
}

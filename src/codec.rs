use crate::compressor::Quality;
use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, MAX_IMAGE_DIMENSION, PNG_OPTIMIZATION_PRESET, WEBP_MAX_DIMENSION,
};
use crate::error::{ConvertError, Result};
use crate::formats::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use oxipng::{Deflaters, Options};
use std::io::Cursor;

/// Encodes a decoded bitmap into one output format.
pub trait ImageEncoder {
    fn format(&self) -> OutputFormat;

    /// Formats without a quality dial are encoded once by the quality search
    fn supports_quality(&self) -> bool {
        self.format().supports_quality()
    }

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>>;
}

/// Decodes raw file bytes, guessing the container from its magic number.
///
/// # Security
/// - Rejects images wider or taller than `MAX_IMAGE_DIMENSION`
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(ConvertError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok(img)
}

/// Picks the encoder for the requested output format
pub fn encoder_for(format: OutputFormat) -> Box<dyn ImageEncoder> {
    match format {
        OutputFormat::Jpeg => Box::new(JpegCodec),
        OutputFormat::WebP => Box::new(WebpCodec),
        OutputFormat::Png => Box::new(PngCodec::default()),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl ImageEncoder for JpegCodec {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
        // JPEG has no alpha channel
        let rgb = image.to_rgb8();
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.percent());
        encoder.encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(buf)
    }
}

/// Lossy WebP through libwebp; the `image` crate only writes lossless WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpCodec;

impl ImageEncoder for WebpCodec {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(&self, image: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(ConvertError::InvalidDimensions(
                width,
                height,
                WEBP_MAX_DIMENSION,
            ));
        }

        let rgba = image.to_rgba8();
        let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
        let encoded = encoder
            .encode_simple(false, quality.percent() as f32)
            .map_err(|e| ConvertError::WebPEncoding(format!("{:?}", e)))?;
        Ok(encoded.to_vec())
    }
}

/// Lossless PNG, optimized with oxipng. Quality is ignored.
#[derive(Debug, Clone, Copy)]
pub struct PngCodec {
    pub preset: u8,
    pub deflate_level: u8,
}

impl Default for PngCodec {
    fn default() -> Self {
        Self {
            preset: PNG_OPTIMIZATION_PRESET,
            deflate_level: LIBDEFLATER_HIGH_LEVEL,
        }
    }
}

impl ImageEncoder for PngCodec {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(&self, image: &DynamicImage, _quality: Quality) -> Result<Vec<u8>> {
        let mut png_buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut png_buf), ImageFormat::Png)?;

        let mut options = Options::from_preset(self.preset);
        options.deflate = Deflaters::Libdeflater {
            compression: self.deflate_level,
        };

        oxipng::optimize_from_memory(&png_buf, &options)
            .map_err(|e| ConvertError::PngOptimization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8, 200])
        }))
    }

    #[test]
    fn test_jpeg_codec_writes_jpeg_from_rgba() {
        let bytes = JpegCodec.encode(&gradient(32, 24), Quality::MAX).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(decode_image(&bytes).unwrap().dimensions(), (32, 24));
    }

    #[test]
    fn test_jpeg_lower_quality_is_not_larger() {
        let img = gradient(64, 64);
        let high = JpegCodec.encode(&img, Quality::MAX).unwrap();
        let low = JpegCodec.encode(&img, Quality::MIN).unwrap();
        assert!(low.len() <= high.len());
    }

    #[test]
    fn test_webp_codec_writes_riff_container() {
        let bytes = WebpCodec.encode(&gradient(16, 16), Quality::MAX).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_webp_codec_rejects_oversized_side() {
        let wide = DynamicImage::new_rgb8(WEBP_MAX_DIMENSION + 1, 1);
        let result = WebpCodec.encode(&wide, Quality::MAX);
        assert!(matches!(
            result,
            Err(ConvertError::InvalidDimensions(16384, 1, 16383))
        ));
    }

    #[test]
    fn test_png_codec_is_lossless() {
        let img = gradient(20, 10);
        let bytes = PngCodec::default().encode(&img, Quality::MIN).unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_encoder_for_matches_format() {
        for format in OutputFormat::ALL {
            let encoder = encoder_for(format);
            assert_eq!(encoder.format(), format);
            assert_eq!(encoder.supports_quality(), format.supports_quality());
        }
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        let result = decode_image(b"fake image data");
        assert!(matches!(result, Err(ConvertError::ImageProcessing(_))));
    }
}

/// Quality ladder, expressed in whole percent
pub const MAX_QUALITY_PERCENT: u8 = 95;
pub const MIN_QUALITY_PERCENT: u8 = 5;
pub const QUALITY_STEP_PERCENT: u8 = 5;

pub const DEFAULT_TARGET_SIZE_KB: u64 = 200;
pub const ARCHIVE_FILE_NAME: &str = "converted_images.zip";

/// Maximum input file size in bytes (100MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16384;
/// libwebp refuses anything wider or taller
pub const WEBP_MAX_DIMENSION: u32 = 16383;

pub const PNG_OPTIMIZATION_PRESET: u8 = 2;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Raster formats accepted on ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Gif,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::Png,
        SourceFormat::Jpeg,
        SourceFormat::WebP,
        SourceFormat::Bmp,
        SourceFormat::Gif,
    ];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "webp" => Some(SourceFormat::WebP),
            "bmp" => Some(SourceFormat::Bmp),
            "gif" => Some(SourceFormat::Gif),
            _ => None,
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.mime_type() == mime_type)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::WebP => "image/webp",
            SourceFormat::Bmp => "image/bmp",
            SourceFormat::Gif => "image/gif",
        }
    }
}

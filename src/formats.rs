/// Output format handling
///
/// Output formats are identified by MIME type on the settings boundary
/// (`image/jpeg`, `image/webp`, `image/png`). The file extension written
/// for each format is the MIME subtype, so JPEG output ends in `.jpeg`.
use crate::error::{ConvertError, Result};
use std::fmt;
use std::str::FromStr;

/// Supported output image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// JPEG with a quality dial
    #[default]
    Jpeg,
    /// Lossy WebP with a quality dial
    WebP,
    /// Lossless PNG, no quality dial
    Png,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpeg, OutputFormat::WebP, OutputFormat::Png];

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Png => "image/png",
        }
    }

    /// Extension used for derived output names
    pub fn extension(&self) -> &'static str {
        let mime = self.mime_type();
        &mime[mime.find('/').map_or(0, |slash| slash + 1)..]
    }

    /// Human label, e.g. for "Image to JPG/JPEG Converter"
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPG/JPEG",
            OutputFormat::WebP => "WEBP",
            OutputFormat::Png => "PNG",
        }
    }

    pub fn supports_quality(&self) -> bool {
        !matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let name = lowered.strip_prefix("image/").unwrap_or(&lowered);
        match name {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            "png" => Ok(OutputFormat::Png),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

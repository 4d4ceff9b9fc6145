use crate::constants::DEFAULT_TARGET_SIZE_KB;
use crate::formats::OutputFormat;
use std::fmt;

/// Desired maximum output size in kilobytes (1 KB = 1024 bytes).
///
/// User input is parsed leniently: the leading integer is taken and the rest
/// ignored. Text without a leading integer produces a target that no
/// encoding can satisfy, as do zero and negative values, so the quality
/// search runs down to its floor instead of failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSize {
    kilobytes: f64,
}

impl TargetSize {
    pub fn from_kb(kilobytes: u64) -> Self {
        Self {
            kilobytes: kilobytes as f64,
        }
    }

    /// Integer-prefix parse: `"200"`, `" 200kb"` and `"+200"` all give 200,
    /// `"-5"` gives -5 and `"abc"` gives an unsatisfiable target.
    pub fn parse_lenient(input: &str) -> Self {
        let trimmed = input.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Self {
                kilobytes: f64::NAN,
            };
        }

        // Overlong digit strings still parse as a (huge) f64
        let magnitude = digits.parse::<f64>().unwrap_or(f64::INFINITY);
        Self {
            kilobytes: if negative { -magnitude } else { magnitude },
        }
    }

    /// Kilobyte budget, or `None` when the input was not a number
    pub fn kilobytes(&self) -> Option<f64> {
        (!self.kilobytes.is_nan()).then_some(self.kilobytes)
    }

    /// Whether any encoding could ever satisfy this target
    pub fn is_valid(&self) -> bool {
        self.kilobytes > 0.0
    }

    pub fn is_satisfied_by(&self, encoded_len: usize) -> bool {
        // NaN compares false, which keeps the search going to the floor
        (encoded_len as f64 / 1024.0) <= self.kilobytes
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self::from_kb(DEFAULT_TARGET_SIZE_KB)
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kilobytes() {
            Some(kb) => write!(f, "{} KB", kb),
            None => write!(f, "NaN KB"),
        }
    }
}

/// Settings read by every conversion. Passed by value or reference into each
/// call; the library keeps no ambient copy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConversionSettings {
    pub output_format: OutputFormat,
    pub target_size: TargetSize,
}

impl ConversionSettings {
    pub fn new(output_format: OutputFormat, target_size: TargetSize) -> Self {
        Self {
            output_format,
            target_size,
        }
    }
}

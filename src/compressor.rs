/// Size-targeted quality search.
///
/// Encodes the image at quality 0.95 and steps down by 0.05 until the output
/// fits the target or the 0.05 floor is reached. The floor encoding is
/// returned even when it is still too large.
use crate::codec::ImageEncoder;
use crate::constants::{MAX_QUALITY_PERCENT, MIN_QUALITY_PERCENT, QUALITY_STEP_PERCENT};
use crate::error::Result;
use crate::settings::TargetSize;
use image::DynamicImage;
use std::fmt;

/// Encoder quality on the 95, 90, ..., 5 percent ladder.
///
/// Kept as whole percent so repeated stepping never drifts off the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Quality = Quality(MAX_QUALITY_PERCENT);
    pub const MIN: Quality = Quality(MIN_QUALITY_PERCENT);

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Quality in (0, 0.95]
    pub fn as_fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }

    pub fn is_floor(self) -> bool {
        self <= Quality::MIN
    }

    pub fn next_lower(self) -> Option<Quality> {
        if self.is_floor() {
            None
        } else {
            Some(Quality(self.0 - QUALITY_STEP_PERCENT))
        }
    }

    /// Every quality the search may try, highest first
    pub fn ladder() -> impl Iterator<Item = Quality> {
        std::iter::successors(Some(Quality::MAX), |q| q.next_lower())
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub bytes: Vec<u8>,
    pub quality: Quality,
    pub attempts: u32,
    /// Whether the returned encoding fits the target
    pub fits_target: bool,
}

impl CompressionOutcome {
    pub fn floor_reached(&self) -> bool {
        !self.fits_target && self.quality.is_floor()
    }
}

/// Runs the quality search for one decoded image.
///
/// Encoders without a quality dial are encoded once and reported at
/// `Quality::MAX`.
pub fn compress_to_target(
    image: &DynamicImage,
    encoder: &dyn ImageEncoder,
    target: TargetSize,
) -> Result<CompressionOutcome> {
    let mut quality = Quality::MAX;
    let mut attempts = 0;

    loop {
        let bytes = encoder.encode(image, quality)?;
        attempts += 1;

        let fits_target = target.is_satisfied_by(bytes.len());
        crate::verbose!(
            "{} at quality {}: {} bytes (target {})",
            encoder.format(),
            quality,
            bytes.len(),
            target
        );

        match quality.next_lower() {
            Some(lower) if !fits_target && encoder.supports_quality() => quality = lower,
            _ => {
                return Ok(CompressionOutcome {
                    bytes,
                    quality,
                    attempts,
                    fits_target,
                })
            }
        }
    }
}

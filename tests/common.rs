#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_fit::SourceImage;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Deterministic noisy image; noise keeps encoders from shrinking it to nothing
pub fn noise_image(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let img = RgbImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let n = (state >> 24) as u8;
        Rgb([n, (x as u8).wrapping_add(n / 2), (y as u8) ^ n])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

pub fn png_source(name: &str, width: u32, height: u32, seed: u32) -> SourceImage {
    let bytes = encode(&noise_image(width, height, seed), ImageFormat::Png);
    SourceImage::new(name, bytes, "image/png")
}

pub fn write_image_file(dir: &Path, name: &str, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, encode(&noise_image(48, 32, 7), format)).unwrap();
    path
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

//! Intake of decoded pixel buffers.
//!
//! Everything downstream works on 8-bit rasters with either one channel
//! (`ImageLuma8`) or three (`ImageRgb8`). Decoders hand us whatever they
//! produced; this module checks and normalizes it.

use image::{DynamicImage, GrayImage, RgbImage};
use log::warn;

use crate::error::{ContourError, Result};

/// Byte layout of a raw interleaved buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Gray,
    Rgb,
    Bgr,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Bgr => 3,
        }
    }
}

/// Build a raster from a raw row-major buffer.
///
/// BGR buffers are swizzled to RGB so every later stage sees one color order.
pub fn from_raw(
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
) -> Result<DynamicImage> {
    check_area(width, height)?;

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(layout.channels()))
        .ok_or_else(|| {
            ContourError::InvalidInput(format!("raster {width}x{height} is too large"))
        })?;
    if data.len() != expected {
        warn!("rejecting raw buffer: expected {expected} bytes, got {}", data.len());
        return Err(ContourError::InvalidInput(format!(
            "buffer holds {} bytes, {width}x{height} {layout:?} needs {expected}",
            data.len()
        )));
    }

    let image = match layout {
        PixelLayout::Gray => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        PixelLayout::Rgb => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        PixelLayout::Bgr => {
            let mut data = data;
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
    };

    image.ok_or_else(|| {
        ContourError::InvalidInput("buffer does not match raster dimensions".into())
    })
}

/// Reduce any decoded image to 8-bit gray or 8-bit RGB.
///
/// Alpha is dropped and wider sample types are scaled down to 8 bits.
pub fn normalize(image: &DynamicImage) -> Result<DynamicImage> {
    check_area(image.width(), image.height())?;

    let normalized = match image {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(gray.clone()),
        DynamicImage::ImageRgb8(rgb) => DynamicImage::ImageRgb8(rgb.clone()),
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    };
    Ok(normalized)
}

fn check_area(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        warn!("rejecting raster with zero area ({width}x{height})");
        return Err(ContourError::InvalidInput(format!(
            "raster has zero area ({width}x{height})"
        )));
    }
    Ok(())
}

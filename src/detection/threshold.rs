use image::{GrayImage, Luma};
use log::debug;

use crate::config::ThresholdMode;
use crate::detection::preprocessing::{gaussian_mean, round_u8};
use crate::error::{ContourError, Result};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Split a grayscale image into foreground (255) and background (0).
///
/// Global marks pixels brighter than the cutoff; adaptive marks pixels at
/// least `offset` darker than their Gaussian-weighted neighbourhood. The two
/// polarities are deliberately different.
pub fn binarize(gray: &GrayImage, mode: &ThresholdMode) -> Result<GrayImage> {
    if gray.width() == 0 || gray.height() == 0 {
        return Err(ContourError::InvalidInput(format!(
            "cannot binarize a {}x{} raster",
            gray.width(),
            gray.height()
        )));
    }

    let binary = match *mode {
        ThresholdMode::Global { threshold } => global_threshold(gray, threshold),
        ThresholdMode::Adaptive { block_size, offset } => {
            if block_size < 3 || block_size % 2 == 0 {
                return Err(ContourError::Configuration(format!(
                    "block size {block_size} must be odd and at least 3"
                )));
            }
            adaptive_threshold(gray, block_size, offset)
        }
    };

    debug!(
        "binarize {:?}: {} of {} pixels foreground",
        mode,
        foreground_count(&binary),
        binary.width() as u64 * binary.height() as u64
    );
    Ok(binary)
}

fn global_threshold(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        classify(gray.get_pixel(x, y)[0] > threshold)
    })
}

fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let local_mean = gaussian_mean(gray, block_size);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let reference = round_u8(local_mean.get_pixel(x, y)[0]) as i32;
        let value = gray.get_pixel(x, y)[0] as i32;
        classify(value <= reference - offset)
    })
}

fn classify(foreground: bool) -> Luma<u8> {
    if foreground {
        Luma([FOREGROUND])
    } else {
        Luma([BACKGROUND])
    }
}

/// Number of foreground pixels in a binary raster.
pub fn foreground_count(binary: &GrayImage) -> usize {
    binary.pixels().filter(|p| p[0] != BACKGROUND).count()
}

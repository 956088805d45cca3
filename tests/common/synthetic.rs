//! Synthetic rasters for the integration tests.

use contourlab::{BinarizationMode, DetectionConfig, HierarchyMode};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

/// Black canvas with one filled ellipse of the given intensity.
pub fn ellipse_image(size: u32, center: (i32, i32), radii: (i32, i32), value: u8) -> GrayImage {
    let mut img = GrayImage::new(size, size);
    draw_filled_ellipse_mut(&mut img, center, radii.0, radii.1, Luma([value]));
    img
}

/// Filled square of side `outer` with an empty square of side `inner` centred inside it.
pub fn square_with_hole(size: u32, outer: u32, inner: u32) -> GrayImage {
    assert!(inner + 2 < outer && outer + 2 < size, "shapes must nest with margins");
    let mut img = GrayImage::new(size, size);
    let o = ((size - outer) / 2) as i32;
    let i = ((size - inner) / 2) as i32;
    draw_filled_rect_mut(&mut img, Rect::at(o, o).of_size(outer, outer), Luma([255]));
    draw_filled_rect_mut(&mut img, Rect::at(i, i).of_size(inner, inner), Luma([0]));
    img
}

/// One `side` x `side` foreground square at `at`.
pub fn square(size: u32, at: (i32, i32), side: u32) -> GrayImage {
    let mut img = GrayImage::new(size, size);
    draw_filled_rect_mut(&mut img, Rect::at(at.0, at.1).of_size(side, side), Luma([255]));
    img
}

/// Horizontal brightness ramp with a small disc darker than its surroundings.
pub fn gradient_with_dark_spot(size: u32, spot: (i32, i32), radius: i32, darken: u8) -> GrayImage {
    let mut img = GrayImage::from_fn(size, size, |x, _| Luma([ramp_value(x, size)]));
    let (cx, cy) = spot;
    for y in (cy - radius).max(0)..=(cy + radius).min(size as i32 - 1) {
        for x in (cx - radius).max(0)..=(cx + radius).min(size as i32 - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius * radius {
                let base = ramp_value(x as u32, size);
                img.put_pixel(x as u32, y as u32, Luma([base.saturating_sub(darken)]));
            }
        }
    }
    img
}

fn ramp_value(x: u32, size: u32) -> u8 {
    (60 + x * 160 / size) as u8
}

/// Deterministic pseudo-random binary raster (xorshift), about `density` percent foreground.
pub fn noise_raster(width: u32, height: u32, seed: u64, density: u64) -> GrayImage {
    let mut state = seed.max(1);
    GrayImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        Luma([if state % 100 < density { 255 } else { 0 }])
    })
}

/// Two bright blocks on a dark blue background.
pub fn two_blocks_rgb(width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([10, 10, 60]));
    draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(10, 8), Rgb([250, 250, 250]));
    draw_filled_rect_mut(&mut img, Rect::at(25, 12).of_size(6, 6), Rgb([240, 240, 240]));
    img
}

/// Global cutoff at 128 without blur or simplification.
pub fn raw_global(hierarchy: HierarchyMode) -> DetectionConfig {
    DetectionConfig {
        mode: BinarizationMode::Global,
        threshold: 128,
        hierarchy,
        simplify: false,
        blur: false,
        ..Default::default()
    }
}

pub fn gray(img: GrayImage) -> DynamicImage {
    DynamicImage::ImageLuma8(img)
}

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

/// Fixed smoothing window applied before binarization.
pub const BLUR_KERNEL_SIZE: u32 = 5;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Sigma used for a Gaussian window of `size` taps when none is given.
pub fn sigma_for_size(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian kernel with `size` taps (`size` odd).
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = sigma_for_size(size);
    let half = (size / 2) as i32;
    let weights: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Gaussian-weighted local mean over a `size` x `size` window, border pixels replicated.
pub fn gaussian_mean(img: &GrayImage, size: u32) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let kernel = gaussian_kernel(size);
    let widened: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
            Luma([img.get_pixel(x, y)[0] as f32])
        });
    separable_filter_equal(&widened, &kernel)
}

/// Apply the fixed 5x5 Gaussian blur to suppress sensor noise
pub fn gaussian_blur_5x5(img: &GrayImage) -> GrayImage {
    let smoothed = gaussian_mean(img, BLUR_KERNEL_SIZE);
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([round_u8(smoothed.get_pixel(x, y)[0])])
    })
}

pub(crate) fn round_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

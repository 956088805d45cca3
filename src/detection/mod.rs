pub mod preprocessing;
pub mod threshold;
pub mod contours;
pub mod simplify;

use image::{DynamicImage, GrayImage};
use log::debug;

use crate::config::{DetectionConfig, HierarchyMode, RenderStyle};
use crate::error::Result;
use crate::models::{ContourForest, DetectionReport, SerializedContour};
use crate::raster::{self, PixelLayout};
use crate::render::{self, Stages, VisualizationSet};

/// Everything produced for one image.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Serialized contours in forest order.
    pub contours: Vec<SerializedContour>,
    pub forest: ContourForest,
    pub visualizations: VisualizationSet,
}

impl DetectionResult {
    pub fn count(&self) -> usize {
        self.contours.len()
    }

    pub fn report(&self) -> DetectionReport {
        DetectionReport::new(self.contours.clone())
    }
}

/// Runs the contour pipeline for one image at a time.
///
/// Holds only configuration, so one detector can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct ContourDetector {
    config: DetectionConfig,
    style: RenderStyle,
}

impl ContourDetector {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            style: RenderStyle::default(),
        })
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run the full pipeline on an image
    pub fn detect(&self, img: &DynamicImage) -> Result<DetectionResult> {
        let original = raster::normalize(img)?;
        debug!(
            "detect: {}x{} {:?}, config {:?}",
            original.width(),
            original.height(),
            original.color(),
            self.config
        );

        let grayscale = preprocessing::to_grayscale(&original);
        let binary = self.binarize(&grayscale)?;

        let mut forest = contours::trace(&binary, self.config.hierarchy)?;
        if self.config.simplify {
            let before: usize = forest.iter().map(|c| c.len()).sum();
            forest.simplify();
            let after: usize = forest.iter().map(|c| c.len()).sum();
            debug!("simplify: {before} -> {after} points");
        }

        let stages = Stages {
            original,
            grayscale,
            binary,
        };
        let (contours, visualizations) = render::assemble(&forest, &stages, &self.style)?;

        Ok(DetectionResult {
            contours,
            forest,
            visualizations,
        })
    }

    /// Run the pipeline on a raw decoded buffer.
    pub fn detect_raw(
        &self,
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<DetectionResult> {
        let image = raster::from_raw(width, height, layout, data)?;
        self.detect(&image)
    }

    /// Binary raster for an image (for debugging)
    pub fn threshold_image(&self, img: &DynamicImage) -> Result<GrayImage> {
        let original = raster::normalize(img)?;
        self.binarize(&preprocessing::to_grayscale(&original))
    }

    /// All borders with their nesting, regardless of the configured hierarchy (for debugging)
    pub fn contour_tree(&self, img: &DynamicImage) -> Result<ContourForest> {
        let binary = self.threshold_image(img)?;
        contours::trace(&binary, HierarchyMode::Tree)
    }

    fn binarize(&self, gray: &GrayImage) -> Result<GrayImage> {
        let mode = self.config.threshold_mode()?;
        if self.config.blur {
            threshold::binarize(&preprocessing::gaussian_blur_5x5(gray), &mode)
        } else {
            threshold::binarize(gray, &mode)
        }
    }
}

pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod output;
pub mod raster;
pub mod render;

pub use config::{BinarizationMode, DetectionConfig, HierarchyMode, RenderStyle, ThresholdMode};
pub use detection::{ContourDetector, DetectionResult};
pub use error::{ContourError, Result};
pub use models::{BorderKind, Contour, ContourForest, DetectionReport, Point, SerializedContour};
pub use raster::PixelLayout;
pub use render::{Visualization, VisualizationSet};

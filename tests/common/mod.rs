#![allow(dead_code, unused_imports)]

mod synthetic;
pub use synthetic::*;

// Re-export commonly used types from contourlab for tests
pub use contourlab::{
    BinarizationMode, BorderKind, ContourDetector, ContourForest, DetectionConfig, HierarchyMode,
    Visualization,
};

/// Route library logs through the test harness; `RUST_LOG=debug` shows stage logs.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

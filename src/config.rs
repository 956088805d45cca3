use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ContourError, Result};

/// How the grayscale image is split into foreground and background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinarizationMode {
    /// One cutoff for the whole image; brighter pixels are foreground.
    Global,
    /// Gaussian-weighted local mean; darker-than-surroundings is foreground.
    #[default]
    Adaptive,
}

impl FromStr for BinarizationMode {
    type Err = ContourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "adaptive" => Ok(Self::Adaptive),
            other => Err(ContourError::Configuration(format!(
                "unknown binarization mode '{other}' (expected 'global' or 'adaptive')"
            ))),
        }
    }
}

/// Which borders the tracer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyMode {
    /// Outermost region boundaries only.
    #[default]
    External,
    /// Every outer and hole border, with parent links.
    Tree,
}

impl FromStr for HierarchyMode {
    type Err = ContourError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "external" => Ok(Self::External),
            "tree" => Ok(Self::Tree),
            other => Err(ContourError::Configuration(format!(
                "unknown hierarchy mode '{other}' (expected 'external' or 'tree')"
            ))),
        }
    }
}

/// Validated binarization parameters, ready for the binarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    Global { threshold: u8 },
    Adaptive { block_size: u32, offset: i32 },
}

/// Detection parameters for one request.
///
/// `threshold` is kept as a wide integer so out-of-range values coming from
/// JSON or the command line are reported instead of silently wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub mode: BinarizationMode,
    pub threshold: i64,
    /// Adaptive window size; must be odd and at least 3.
    pub block_size: u32,
    /// Subtracted from the adaptive local mean.
    pub offset: i32,
    pub hierarchy: HierarchyMode,
    pub simplify: bool,
    /// Smooth with the fixed 5x5 Gaussian before binarizing.
    pub blur: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            mode: BinarizationMode::Adaptive,
            threshold: 128,
            block_size: 21,
            offset: 5,
            hierarchy: HierarchyMode::External,
            simplify: true,
            blur: true,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        self.global_threshold()?;
        self.threshold_mode().map(|_| ())
    }

    fn global_threshold(&self) -> Result<u8> {
        u8::try_from(self.threshold).map_err(|_| {
            ContourError::Configuration(format!("threshold {} is outside 0..=255", self.threshold))
        })
    }

    /// Resolve the binarization parameters, checking their ranges.
    pub fn threshold_mode(&self) -> Result<ThresholdMode> {
        match self.mode {
            BinarizationMode::Global => Ok(ThresholdMode::Global {
                threshold: self.global_threshold()?,
            }),
            BinarizationMode::Adaptive => {
                if self.block_size < 3 || self.block_size % 2 == 0 {
                    return Err(ContourError::Configuration(format!(
                        "block size {} must be odd and at least 3",
                        self.block_size
                    )));
                }
                Ok(ThresholdMode::Adaptive {
                    block_size: self.block_size,
                    offset: self.offset,
                })
            }
        }
    }

    /// Load a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: DetectionConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}

/// Overlay colors. Purely presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub outer_fill: [u8; 3],
    pub hole_fill: [u8; 3],
    pub outline: [u8; 3],
    pub highlight: [u8; 3],
    pub background: [u8; 3],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            outer_fill: [0, 255, 0],
            hole_fill: [0, 255, 0],
            outline: [255, 0, 0],
            highlight: [0, 200, 175],
            background: [1, 1, 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_adaptive_setup() {
        let config = DetectionConfig::default();
        assert_eq!(
            config.threshold_mode().unwrap(),
            ThresholdMode::Adaptive { block_size: 21, offset: 5 }
        );
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let config = DetectionConfig {
            mode: BinarizationMode::Global,
            threshold: 256,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ContourError::Configuration(_))));

        let config = DetectionConfig { threshold: -1, ..config };
        assert!(matches!(config.validate(), Err(ContourError::Configuration(_))));
    }

    #[test]
    fn out_of_range_threshold_is_rejected_in_adaptive_mode() {
        let config = DetectionConfig { threshold: 999, ..Default::default() };
        assert_eq!(config.mode, BinarizationMode::Adaptive);
        assert!(matches!(config.validate(), Err(ContourError::Configuration(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "mode": "adaptive", "threshold": 999 }}"#).unwrap();
        assert!(matches!(
            DetectionConfig::load(file.path()),
            Err(ContourError::Configuration(_))
        ));
    }

    #[test]
    fn even_block_size_is_rejected() {
        let config = DetectionConfig { block_size: 20, ..Default::default() };
        assert!(matches!(config.validate(), Err(ContourError::Configuration(_))));
    }

    #[test]
    fn unknown_mode_names() {
        assert_eq!("Global".parse::<BinarizationMode>().unwrap(), BinarizationMode::Global);
        assert_eq!("tree".parse::<HierarchyMode>().unwrap(), HierarchyMode::Tree);
        assert!(matches!(
            "otsu".parse::<BinarizationMode>(),
            Err(ContourError::Configuration(_))
        ));
        assert!(matches!(
            "list".parse::<HierarchyMode>(),
            Err(ContourError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_mode_in_json_fails_to_parse() {
        let parsed: std::result::Result<DetectionConfig, _> =
            serde_json::from_str(r#"{ "mode": "otsu" }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn load_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "mode": "global", "threshold": 90, "hierarchy": "tree" }}"#).unwrap();

        let config = DetectionConfig::load(file.path()).unwrap();
        assert_eq!(config.mode, BinarizationMode::Global);
        assert_eq!(config.threshold, 90);
        assert_eq!(config.hierarchy, HierarchyMode::Tree);
        assert!(config.simplify);
        assert_eq!(config.block_size, 21);
    }
}

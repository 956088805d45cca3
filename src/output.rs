//! Writing detection results to disk and reading reports back.
//!
//! - `prepare_output_dir`: create a directory, refusing one that already has files.
//! - `write_result`: one `<key>.png` per visualization plus `contours.json`.
//! - `read_report`: parse a `contours.json` written by `write_result`.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::Serialize;

use crate::detection::DetectionResult;
use crate::error::{ContourError, Result};
use crate::models::DetectionReport;

pub const REPORT_FILE: &str = "contours.json";

/// Create `dir`, or accept it if it exists and is empty.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if fs::read_dir(dir)?.next().is_some() {
            return Err(ContourError::InvalidInput(format!(
                "output directory is not empty: {}",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Write every visualization as PNG and the contour report as JSON.
///
/// Returns the paths written, report last.
pub fn write_result(dir: &Path, result: &DetectionResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(result.visualizations.len() + 1);

    for (which, image) in result.visualizations.iter() {
        let path = dir.join(format!("{}.png", which.key()));
        image.save_with_format(&path, ImageFormat::Png)?;
        written.push(path);
    }

    let report_path = dir.join(REPORT_FILE);
    write_json_file(&report_path, &result.report())?;
    written.push(report_path);
    Ok(written)
}

/// Pretty-print a serializable value to disk.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn read_report(path: &Path) -> Result<DetectionReport> {
    let data = fs::read_to_string(path)?;
    let report: DetectionReport = serde_json::from_str(&data)?;
    if report.count != report.contours.len() {
        return Err(ContourError::InvalidInput(format!(
            "report count {} does not match {} contours",
            report.count,
            report.contours.len()
        )));
    }
    Ok(report)
}

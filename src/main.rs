use clap::Parser;
use image::ImageReader;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use contourlab::detection::DetectionResult;
use contourlab::{
    BinarizationMode, ContourDetector, ContourError, DetectionConfig, HierarchyMode, output,
};

#[derive(Parser)]
#[command(name = "contourlab")]
#[command(about = "Trace region contours in images and render diagnostic views")]
struct Cli {
    /// Input image files, processed independently
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// JSON detection config; flags below override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Binarization mode: global or adaptive
    #[arg(long)]
    mode: Option<BinarizationMode>,

    /// Global cutoff (0-255)
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// Adaptive window size (odd, >= 3)
    #[arg(long)]
    block_size: Option<u32>,

    /// Adaptive offset subtracted from the local mean
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i32>,

    /// Contours to report: external or tree
    #[arg(long)]
    hierarchy: Option<HierarchyMode>,

    /// Keep every boundary pixel instead of collapsing straight runs
    #[arg(long)]
    no_simplify: bool,

    /// Skip the 5x5 Gaussian blur before binarization
    #[arg(long)]
    no_blur: bool,

    /// Write visualizations and contours.json here (must be empty)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Enable verbose output and debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn detection_config(&self) -> anyhow::Result<DetectionConfig> {
        let mut config = match &self.config {
            Some(path) => DetectionConfig::load(path)?,
            None => DetectionConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if let Some(hierarchy) = self.hierarchy {
            config.hierarchy = hierarchy;
        }
        if self.no_simplify {
            config.simplify = false;
        }
        if self.no_blur {
            config.blur = false;
        }
        Ok(config)
    }
}

/// Decode, detect and optionally write one image.
fn process_image(
    detector: &ContourDetector,
    path: &Path,
    out_dir: Option<&Path>,
) -> Result<DetectionResult, ContourError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let result = detector.detect(&img)?;
    if let Some(dir) = out_dir {
        output::write_result(dir, &result)?;
    }
    Ok(result)
}

fn output_subdir(root: &Path, index: usize, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    root.join(format!("{:02}_{}", index + 1, stem))
}

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);
    let config = args.detection_config()?;

    if args.verbose {
        println!("Config: {:?}", config);
    }

    let detector = Arc::new(ContourDetector::new(config)?);
    if let Some(out) = &args.out {
        output::prepare_output_dir(out)?;
    }

    // Each image is an independent request; nothing is shared but the detector.
    let mut handles = Vec::with_capacity(args.images.len());
    for (index, path) in args.images.iter().enumerate() {
        let detector = Arc::clone(&detector);
        let path = path.clone();
        let out_dir = args.out.as_deref().map(|root| output_subdir(root, index, &path));
        if args.verbose {
            println!("Queued {:?}", path);
        }
        let handle = tokio::task::spawn_blocking(move || {
            process_image(&detector, &path, out_dir.as_deref())
        });
        handles.push(handle);
    }

    let mut failures = 0;
    for (path, handle) in args.images.iter().zip(handles) {
        match handle.await? {
            Ok(result) => {
                println!("{}: {} contours", path.display(), result.count());
                if args.verbose {
                    for (i, contour) in result.forest.iter().enumerate() {
                        if let Some((min_x, min_y, max_x, max_y)) = contour.bounding_box() {
                            println!(
                                "  Contour {}: {:?}, {} points, bbox ({}, {})-({}, {}), \
                                 parent {:?}",
                                i + 1,
                                contour.kind,
                                contour.len(),
                                min_x,
                                min_y,
                                max_x,
                                max_y,
                                contour.parent
                            );
                        }
                    }
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", path.display(), e.to_json());
            }
        }
    }

    if let (Some(out), true) = (&args.out, args.verbose) {
        println!("Results written to {}", out.display());
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, args.images.len());
    }
    Ok(())
}

//! Assembly of the detection output: serialized contours and the set of
//! diagnostic rasters drawn from them.

use std::collections::BTreeMap;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{Canvas, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;
use log::debug;

use crate::config::RenderStyle;
use crate::error::{ContourError, Result};
use crate::models::{BorderKind, Contour, ContourForest, SerializedContour};

/// Names of the rasters in a [`VisualizationSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visualization {
    Original,
    Grayscale,
    Threshold,
    /// Every contour filled over the original, later contours on top.
    DetectedContours,
    /// Contour outlines over the original.
    Contour,
    /// External regions filled with the highlight color on a flat background.
    ColorContours,
    Mask,
    /// Original pixels inside external regions, zero elsewhere.
    ExtractContours,
}

impl Visualization {
    pub const ALL: [Visualization; 8] = [
        Self::Original,
        Self::Grayscale,
        Self::Threshold,
        Self::DetectedContours,
        Self::Contour,
        Self::ColorContours,
        Self::Mask,
        Self::ExtractContours,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Grayscale => "grayscale",
            Self::Threshold => "threshold",
            Self::DetectedContours => "detected_contours",
            Self::Contour => "contour",
            Self::ColorContours => "color_contours",
            Self::Mask => "mask",
            Self::ExtractContours => "extract_contours",
        }
    }
}

/// Independently owned rasters keyed by [`Visualization`].
#[derive(Debug, Clone, Default)]
pub struct VisualizationSet {
    images: BTreeMap<Visualization, DynamicImage>,
}

impl VisualizationSet {
    pub fn get(&self, which: Visualization) -> Option<&DynamicImage> {
        self.images.get(&which)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Visualization, &DynamicImage)> {
        self.images.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Intermediate rasters of one detection, as the assembler needs them.
#[derive(Debug, Clone)]
pub struct Stages {
    /// Normalized input, 8-bit gray or 8-bit RGB.
    pub original: DynamicImage,
    pub grayscale: GrayImage,
    pub binary: GrayImage,
}

/// Serialize the forest and draw every visualization from it.
///
/// The mask, the highlight image and the extracted foreground use only the
/// outermost contours; the filled and outlined overlays use all of them.
pub fn assemble(
    forest: &ContourForest,
    stages: &Stages,
    style: &RenderStyle,
) -> Result<(Vec<SerializedContour>, VisualizationSet)> {
    let (width, height) = (stages.original.width(), stages.original.height());
    if stages.grayscale.dimensions() != (width, height)
        || stages.binary.dimensions() != (width, height)
    {
        return Err(ContourError::InvalidInput(format!(
            "stage rasters do not match the {width}x{height} original"
        )));
    }

    let external = forest.external_only();
    let mask = mask(&external, width, height);

    let mut images = BTreeMap::new();
    images.insert(Visualization::Original, stages.original.clone());
    images.insert(Visualization::Grayscale, DynamicImage::ImageLuma8(stages.grayscale.clone()));
    images.insert(Visualization::Threshold, DynamicImage::ImageLuma8(stages.binary.clone()));
    images.insert(
        Visualization::DetectedContours,
        DynamicImage::ImageRgb8(filled_overlay(forest, &stages.original, style)),
    );
    images.insert(
        Visualization::Contour,
        DynamicImage::ImageRgb8(outline_overlay(forest, &stages.original, style)),
    );
    images.insert(
        Visualization::ColorContours,
        DynamicImage::ImageRgb8(highlight(&external, width, height, style)),
    );
    images.insert(Visualization::ExtractContours, extract(&stages.original, &mask));
    images.insert(Visualization::Mask, DynamicImage::ImageLuma8(mask));

    debug!(
        "assembled {} contours ({} external) into {} visualizations",
        forest.len(),
        external.len(),
        images.len()
    );
    Ok((forest.to_serialized(), VisualizationSet { images }))
}

/// Copy of `original` with each contour's footprint painted in forest order.
pub fn filled_overlay(
    forest: &ContourForest,
    original: &DynamicImage,
    style: &RenderStyle,
) -> RgbImage {
    let mut canvas = original.to_rgb8();
    for contour in forest {
        let color = match contour.kind {
            BorderKind::Outer => style.outer_fill,
            BorderKind::Hole => style.hole_fill,
        };
        fill_contour(&mut canvas, contour, Rgb(color));
    }
    canvas
}

/// Copy of `original` with 1 px contour outlines.
pub fn outline_overlay(
    forest: &ContourForest,
    original: &DynamicImage,
    style: &RenderStyle,
) -> RgbImage {
    let mut canvas = original.to_rgb8();
    for contour in forest {
        stroke_contour(&mut canvas, contour, Rgb(style.outline));
    }
    canvas
}

/// External regions in the highlight color over a flat background.
pub fn highlight(
    external: &ContourForest,
    width: u32,
    height: u32,
    style: &RenderStyle,
) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, Rgb(style.background));
    for contour in external {
        fill_contour(&mut canvas, contour, Rgb(style.highlight));
    }
    canvas
}

/// Black raster with the given contours filled white.
pub fn mask(contours: &ContourForest, width: u32, height: u32) -> GrayImage {
    let mut canvas = GrayImage::new(width, height);
    for contour in contours {
        fill_contour(&mut canvas, contour, Luma([255]));
    }
    canvas
}

/// Keep `original` where `mask` is set, zero elsewhere.
pub fn extract(original: &DynamicImage, mask: &GrayImage) -> DynamicImage {
    let inside = |x: u32, y: u32| mask.get_pixel(x, y)[0] != 0;
    match original {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
                if inside(x, y) {
                    *gray.get_pixel(x, y)
                } else {
                    Luma([0])
                }
            }))
        }
        other => {
            let rgb = other.to_rgb8();
            DynamicImage::ImageRgb8(RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                if inside(x, y) {
                    *rgb.get_pixel(x, y)
                } else {
                    Rgb([0, 0, 0])
                }
            }))
        }
    }
}

/// Paint the polygon interior and its boundary pixels.
fn fill_contour<C>(canvas: &mut C, contour: &Contour, color: C::Pixel)
where
    C: Canvas,
{
    let mut poly: Vec<PixelPoint<i32>> = contour
        .points
        .iter()
        .map(|p| PixelPoint::new(p.x as i32, p.y as i32))
        .collect();
    poly.dedup();
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }

    match poly.len() {
        0 => {}
        1 | 2 => stroke_contour(canvas, contour, color),
        _ => draw_polygon_mut(canvas, &poly, color),
    }
}

fn stroke_contour<C>(canvas: &mut C, contour: &Contour, color: C::Pixel)
where
    C: Canvas,
{
    let points = &contour.points;
    match points.len() {
        0 => {}
        1 => {
            let p = points[0];
            let (width, height) = canvas.dimensions();
            if p.x < width && p.y < height {
                canvas.draw_pixel(p.x, p.y, color);
            }
        }
        n => {
            for i in 0..n {
                let a = points[i];
                let b = points[(i + 1) % n];
                draw_line_segment_mut(
                    canvas,
                    (a.x as f32, a.y as f32),
                    (b.x as f32, b.y as f32),
                    color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn rect(
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        kind: BorderKind,
        parent: Option<usize>,
    ) -> Contour {
        Contour {
            points: vec![
                Point::new(x0, y0),
                Point::new(x0, y1),
                Point::new(x1, y1),
                Point::new(x1, y0),
            ],
            kind,
            parent,
        }
    }

    fn stages(original: DynamicImage) -> Stages {
        let grayscale = original.to_luma8();
        let binary = GrayImage::new(original.width(), original.height());
        Stages { original, grayscale, binary }
    }

    #[test]
    fn later_contour_wins_on_overlap() {
        let mut forest = ContourForest::new();
        forest.push(rect(2, 2, 12, 12, BorderKind::Outer, None)).unwrap();
        forest.push(rect(5, 5, 9, 9, BorderKind::Hole, Some(0))).unwrap();
        let style = RenderStyle {
            outer_fill: [0, 255, 0],
            hole_fill: [0, 0, 255],
            ..RenderStyle::default()
        };
        let original = DynamicImage::ImageRgb8(RgbImage::new(16, 16));

        let overlay = filled_overlay(&forest, &original, &style);
        assert_eq!(overlay.get_pixel(7, 7).0, [0, 0, 255]);
        assert_eq!(overlay.get_pixel(3, 3).0, [0, 255, 0]);
        assert_eq!(overlay.get_pixel(14, 14).0, [0, 0, 0]);
    }

    #[test]
    fn mask_and_extract_use_external_regions() {
        let mut forest = ContourForest::new();
        forest.push(rect(2, 2, 12, 12, BorderKind::Outer, None)).unwrap();
        forest.push(rect(5, 5, 9, 9, BorderKind::Hole, Some(0))).unwrap();
        let original = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([10, 20, 30])));

        let (serialized, set) =
            assemble(&forest, &stages(original), &RenderStyle::default()).unwrap();
        assert_eq!(serialized.len(), 2);
        assert_eq!(serialized[1].parent, Some(0));

        let mask = set.get(Visualization::Mask).unwrap().as_luma8().unwrap();
        assert_eq!(mask.get_pixel(7, 7)[0], 255);
        assert_eq!(mask.get_pixel(2, 2)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);

        let extracted = set.get(Visualization::ExtractContours).unwrap().as_rgb8().unwrap();
        assert_eq!(extracted.get_pixel(7, 7).0, [10, 20, 30]);
        assert_eq!(extracted.get_pixel(14, 1).0, [0, 0, 0]);

        let colored = set.get(Visualization::ColorContours).unwrap().as_rgb8().unwrap();
        assert_eq!(colored.get_pixel(7, 7).0, [0, 200, 175]);
        assert_eq!(colored.get_pixel(0, 15).0, [1, 1, 1]);
    }

    #[test]
    fn every_visualization_is_present_and_sized() {
        let mut forest = ContourForest::new();
        forest.push(rect(1, 1, 3, 3, BorderKind::Outer, None)).unwrap();
        let original = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 6, Luma([50])));

        let (_, set) = assemble(&forest, &stages(original), &RenderStyle::default()).unwrap();
        assert_eq!(set.len(), Visualization::ALL.len());
        for which in Visualization::ALL {
            let image = set.get(which).unwrap();
            assert_eq!((image.width(), image.height()), (8, 6), "{}", which.key());
        }
        // Gray originals stay single channel through extraction.
        assert!(set.get(Visualization::ExtractContours).unwrap().as_luma8().is_some());
    }

    #[test]
    fn visualizations_do_not_alias_the_original() {
        let forest = {
            let mut f = ContourForest::new();
            f.push(rect(0, 0, 3, 3, BorderKind::Outer, None)).unwrap();
            f
        };
        let stages = stages(DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([9, 9, 9]))));
        let (_, set) = assemble(&forest, &stages, &RenderStyle::default()).unwrap();

        let mut copy = set.get(Visualization::Original).unwrap().clone();
        if let DynamicImage::ImageRgb8(ref mut rgb) = copy {
            rgb.put_pixel(4, 4, Rgb([200, 0, 0]));
        }
        assert_eq!(stages.original.as_rgb8().unwrap().get_pixel(4, 4).0, [9, 9, 9]);
        assert_eq!(
            set.get(Visualization::Original).unwrap().as_rgb8().unwrap().get_pixel(4, 4).0,
            [9, 9, 9]
        );
        assert_eq!(
            set.get(Visualization::DetectedContours).unwrap().as_rgb8().unwrap().get_pixel(4, 4).0,
            [9, 9, 9]
        );
    }

    #[test]
    fn single_pixel_contour_is_painted() {
        let mut forest = ContourForest::new();
        forest
            .push(Contour {
                points: vec![Point::new(3, 2)],
                kind: BorderKind::Outer,
                parent: None,
            })
            .unwrap();
        let mask = mask(&forest, 6, 6);
        assert_eq!(mask.get_pixel(3, 2)[0], 255);
        assert_eq!(mask.pixels().filter(|p| p[0] != 0).count(), 1);
    }

    #[test]
    fn outline_leaves_interior_untouched() {
        let mut forest = ContourForest::new();
        forest.push(rect(2, 2, 8, 8, BorderKind::Outer, None)).unwrap();
        let original = DynamicImage::ImageRgb8(RgbImage::new(12, 12));
        let outline = outline_overlay(&forest, &original, &RenderStyle::default());
        assert_eq!(outline.get_pixel(2, 5).0, [255, 0, 0]);
        assert_eq!(outline.get_pixel(5, 5).0, [0, 0, 0]);
    }

    #[test]
    fn mismatched_stages_are_rejected() {
        let stages = Stages {
            original: DynamicImage::ImageLuma8(GrayImage::new(4, 4)),
            grayscale: GrayImage::new(4, 4),
            binary: GrayImage::new(3, 4),
        };
        let err = assemble(&ContourForest::new(), &stages, &RenderStyle::default()).unwrap_err();
        assert!(matches!(err, ContourError::InvalidInput(_)));
    }
}

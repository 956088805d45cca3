//! Topological border following (Suzuki & Abe, 1985).
//!
//! One raster scan over a padded label buffer. Every border start found by
//! the scan is followed to completion and its pixels are relabelled with the
//! border's number, so later scan positions can tell which region they are
//! in. The parent of a new border is derived from the last border label
//! seen on the current row.

use image::GrayImage;
use log::debug;

use crate::config::HierarchyMode;
use crate::error::{ContourError, Result};
use crate::models::{BorderKind, Contour, ContourForest, Point};

/// 8-neighbourhood offsets, clockwise on screen (y grows downwards), starting east.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const EAST: usize = 0;

/// Label of the virtual border around the image.
const FRAME: i32 = 1;

type Pos = (usize, usize);

/// Binary image copied into an i32 buffer with a one-pixel zero frame.
///
/// 0 is background, 1 is unvisited foreground, +n/-n mark pixels on border n.
struct LabelGrid {
    width: usize,
    cells: Vec<i32>,
}

impl LabelGrid {
    fn from_binary(binary: &GrayImage) -> Self {
        let width = binary.width() as usize + 2;
        let height = binary.height() as usize + 2;
        let mut cells = vec![0; width * height];
        for (x, y, px) in binary.enumerate_pixels() {
            if px[0] != 0 {
                cells[(y as usize + 1) * width + x as usize + 1] = 1;
            }
        }
        Self { width, cells }
    }

    #[inline]
    fn get(&self, (x, y): Pos) -> i32 {
        self.cells[y * self.width + x]
    }

    #[inline]
    fn set(&mut self, (x, y): Pos, value: i32) {
        self.cells[y * self.width + x] = value;
    }
}

#[inline]
fn neighbor((x, y): Pos, dir: usize) -> Pos {
    let (dx, dy) = DIRECTIONS[dir];
    // Callers only step from interior cells, the frame keeps this in range.
    ((x as i32 + dx) as usize, (y as i32 + dy) as usize)
}

fn direction(from: Pos, to: Pos) -> Result<usize> {
    let delta = (to.0 as i32 - from.0 as i32, to.1 as i32 - from.1 as i32);
    DIRECTIONS.iter().position(|&d| d == delta).ok_or_else(|| {
        ContourError::InternalInvariant(format!("{to:?} is not adjacent to {from:?}"))
    })
}

/// What the tracer remembers about a border once it has been followed.
#[derive(Debug, Clone, Copy)]
struct BorderRecord {
    kind: BorderKind,
    /// Index into the record table; `None` only for the frame.
    parent: Option<usize>,
    /// Index of the emitted contour, if this border was reported.
    output: Option<usize>,
}

/// Trace all region borders of a binary image.
///
/// Any nonzero sample is foreground. The input is not modified.
pub fn trace(binary: &GrayImage, mode: HierarchyMode) -> Result<ContourForest> {
    let (width, height) = (binary.width() as usize, binary.height() as usize);
    let mut forest = ContourForest::new();
    if width == 0 || height == 0 {
        return Ok(forest);
    }

    let mut grid = LabelGrid::from_binary(binary);
    // Record of border label n lives at index n - 1; the frame is label 1.
    let mut borders = vec![BorderRecord {
        kind: BorderKind::Hole,
        parent: None,
        output: None,
    }];
    let max_steps = 4 * grid.cells.len() + 8;
    let mut nbd = FRAME;

    for y in 1..=height {
        let mut lnbd = FRAME;
        for x in 1..=width {
            let pos = (x, y);
            let value = grid.get(pos);
            if value == 0 {
                continue;
            }

            let start = if value == 1 && grid.get((x - 1, y)) == 0 {
                Some((BorderKind::Outer, (x - 1, y)))
            } else if value >= 1 && grid.get((x + 1, y)) == 0 {
                if value > 1 {
                    lnbd = value;
                }
                Some((BorderKind::Hole, (x + 1, y)))
            } else {
                None
            };

            if let Some((kind, from)) = start {
                nbd = nbd.checked_add(1).ok_or_else(|| {
                    ContourError::InternalInvariant("border label overflow".into())
                })?;

                let last_index = (lnbd - 1) as usize;
                let last = borders.get(last_index).copied().ok_or_else(|| {
                    ContourError::InternalInvariant(format!("no record for border label {lnbd}"))
                })?;
                let parent = if kind == last.kind {
                    last.parent
                } else {
                    Some(last_index)
                };

                let report = match mode {
                    HierarchyMode::Tree => true,
                    HierarchyMode::External => kind == BorderKind::Outer && parent == Some(0),
                };
                let points = follow_border(&mut grid, pos, from, nbd, report, max_steps)?;

                let output = if report {
                    let contour_parent = match mode {
                        HierarchyMode::Tree => parent.and_then(|p| borders[p].output),
                        HierarchyMode::External => None,
                    };
                    Some(forest.push(Contour {
                        points,
                        kind,
                        parent: contour_parent,
                    })?)
                } else {
                    None
                };
                borders.push(BorderRecord { kind, parent, output });
            }

            let label = grid.get(pos);
            if label != 0 && label != 1 {
                lnbd = label.abs();
            }
        }
    }

    debug!(
        "trace {:?}: followed {} borders, reporting {}",
        mode,
        borders.len() - 1,
        forest.len()
    );
    Ok(forest)
}

/// Follow one border from `start`, entering from the zero pixel `from`.
///
/// Returns the border pixels in image coordinates when `record` is set.
fn follow_border(
    grid: &mut LabelGrid,
    start: Pos,
    from: Pos,
    nbd: i32,
    record: bool,
    max_steps: usize,
) -> Result<Vec<Point>> {
    let to_point = |(x, y): Pos| Point::new((x - 1) as u32, (y - 1) as u32);

    // Clockwise from the entry pixel for the first nonzero neighbour.
    let entry = direction(start, from)?;
    let first = (0..8)
        .map(|k| neighbor(start, (entry + k) % 8))
        .find(|&p| grid.get(p) != 0);

    let Some(first) = first else {
        grid.set(start, -nbd);
        let points = if record {
            vec![to_point(start)]
        } else {
            Vec::new()
        };
        return Ok(points);
    };

    let mut points = Vec::new();
    let mut previous = first;
    let mut current = start;

    for _ in 0..max_steps {
        if record {
            points.push(to_point(current));
        }

        // Counter-clockwise from just past the previous pixel.
        let back = direction(current, previous)?;
        let mut east_is_background = false;
        let mut next = None;
        for k in 1..=8 {
            let dir = (back + 8 - k) % 8;
            let candidate = neighbor(current, dir);
            if grid.get(candidate) != 0 {
                next = Some(candidate);
                break;
            }
            if dir == EAST {
                east_is_background = true;
            }
        }
        let next = next.ok_or_else(|| {
            let message = format!("border {nbd} lost its neighbour at {current:?}");
            ContourError::InternalInvariant(message)
        })?;

        if east_is_background {
            grid.set(current, -nbd);
        } else if grid.get(current) == 1 {
            grid.set(current, nbd);
        }

        if next == start && current == first {
            return Ok(points);
        }
        previous = current;
        current = next;
    }

    Err(ContourError::InternalInvariant(format!(
        "border {nbd} did not close within {max_steps} steps"
    )))
}

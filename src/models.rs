use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Which side of a region a border separates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderKind {
    /// Boundary between a foreground region and the background around it.
    Outer,
    /// Boundary between a foreground region and a hole inside it.
    Hole,
}

/// A closed boundary curve. The last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point>,
    pub kind: BorderKind,
    /// Index of the enclosing contour in the owning forest.
    pub parent: Option<usize>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_hole(&self) -> bool {
        self.kind == BorderKind::Hole
    }

    /// Inclusive bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn bounding_box(&self) -> Option<(u32, u32, u32, u32)> {
        let first = self.points.first()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(self.points.iter().fold(init, |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        }))
    }
}

/// All contours found in one trace, in raster-scan discovery order.
///
/// Parents always precede their children, so a forward walk visits every
/// outer border before the holes it encloses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContourForest {
    contours: Vec<Contour>,
}

impl ContourForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contour, returning its index. The parent must already exist.
    pub fn push(&mut self, contour: Contour) -> Result<usize> {
        let index = self.contours.len();
        if let Some(parent) = contour.parent {
            if parent >= index {
                return Err(ContourError::InvalidInput(format!(
                    "contour {index} refers to parent {parent}, which does not precede it"
                )));
            }
        }
        self.contours.push(contour);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contour> {
        self.contours.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    pub fn as_slice(&self) -> &[Contour] {
        &self.contours
    }

    /// Indices of the top-level contours.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.contours
            .iter()
            .enumerate()
            .filter(|(_, c)| c.parent.is_none())
            .map(|(i, _)| i)
    }

    /// Indices of the direct children of `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.contours
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.parent == Some(index))
            .map(|(i, _)| i)
    }

    /// Nesting depth; roots are at depth 0.
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.contours.get(index).and_then(|c| c.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.contours[parent].parent;
        }
        depth
    }

    /// Only the outermost borders, re-indexed, without parent links.
    pub fn external_only(&self) -> ContourForest {
        let contours = self
            .contours
            .iter()
            .filter(|c| c.parent.is_none() && c.kind == BorderKind::Outer)
            .cloned()
            .collect();
        ContourForest { contours }
    }

    /// Replace every contour's points with its simplified polyline.
    pub fn simplify(&mut self) {
        for contour in &mut self.contours {
            *contour = crate::detection::simplify::simplify(contour);
        }
    }

    pub fn to_serialized(&self) -> Vec<SerializedContour> {
        self.contours.iter().map(SerializedContour::from).collect()
    }

    /// Rebuild a forest from serialized records, validating parent links.
    ///
    /// The border kind is not part of the wire format; it is recovered from
    /// the nesting depth (even depths are outer borders).
    pub fn from_serialized(records: &[SerializedContour]) -> Result<Self> {
        let mut forest = ContourForest::new();
        for (index, record) in records.iter().enumerate() {
            if !record.closed {
                return Err(ContourError::InvalidInput(format!(
                    "contour {index} is not closed"
                )));
            }
            let kind = match record.parent {
                Some(parent) if parent < index => match forest.contours[parent].kind {
                    BorderKind::Outer => BorderKind::Hole,
                    BorderKind::Hole => BorderKind::Outer,
                },
                _ => BorderKind::Outer,
            };
            forest.push(Contour {
                points: record.points.clone(),
                kind,
                parent: record.parent,
            })?;
        }
        Ok(forest)
    }
}

impl<'a> IntoIterator for &'a ContourForest {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}

/// Portable point-list form of one contour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedContour {
    pub points: Vec<Point>,
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

impl From<&Contour> for SerializedContour {
    fn from(contour: &Contour) -> Self {
        Self {
            points: contour.points.clone(),
            closed: true,
            parent: contour.parent,
        }
    }
}

/// Contour list plus count, as written to `contours.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub contours: Vec<SerializedContour>,
    pub count: usize,
}

impl DetectionReport {
    pub fn new(contours: Vec<SerializedContour>) -> Self {
        let count = contours.len();
        Self { contours, count }
    }
}

use crate::models::{Contour, Point};

/// Drop the interior points of straight runs, keeping every direction change.
///
/// The contour is treated as closed, so the step from the last point back to
/// the first counts too. Contours with fewer than three points are returned
/// as they are.
pub fn simplify(contour: &Contour) -> Contour {
    let points = &contour.points;
    let n = points.len();
    if n < 3 {
        return contour.clone();
    }

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        return contour.clone();
    }

    Contour {
        points: kept,
        kind: contour.kind,
        parent: contour.parent,
    }
}

/// Unit direction between two points; collinear runs of any length compare equal.
fn step(from: Point, to: Point) -> (i64, i64) {
    (
        (to.x as i64 - from.x as i64).signum(),
        (to.y as i64 - from.y as i64).signum(),
    )
}

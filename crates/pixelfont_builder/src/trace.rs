//! Outline tracing for blocky rasters
//!
//! Every unit edge between an ink pixel and a background pixel becomes a directed edge
//! with the ink on its right-hand side (screen coordinates, y pointing down). Linking
//! those edges gives closed contours that run clockwise around ink and counter-clockwise
//! around holes, which is the TrueType convention once the y axis is flipped. For a
//! pixelated glyph this is an exact vectorization: no curve fitting is needed, only the
//! removal of collinear vertices.

use image::GrayImage;
use pixelfont_shared::types::Point;
use std::collections::BTreeMap;

/// A closed polygon on the pixel grid. The last vertex connects back to the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Twice the shoelace area in screen coordinates. Positive means clockwise on screen.
    pub fn doubled_area(&self) -> i64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
            })
            .sum()
    }

    pub fn is_clockwise(&self) -> bool {
        self.doubled_area() > 0
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Even-odd containment test for a point that does not lie on the grid lines
    fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.points.len();
        let mut inside = false;

        for i in 0..n {
            let a = self.points[i].f64();
            let b = self.points[(i + 1) % n].f64();
            if (a.y > y) != (b.y > y) {
                let cross_x = a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x);
                if x < cross_x {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// A point just inside the ink side of the first edge. Both coordinates are off the
    /// integer grid, so it never lies on an edge of another contour.
    fn probe(&self) -> (f64, f64) {
        let a = self.points[0].f64();
        let b = self.points[1 % self.points.len()].f64();
        let (dx, dy) = ((b.x - a.x).signum(), (b.y - a.y).signum());
        // right-hand normal of (dx, dy) in screen coordinates
        let (nx, ny) = (-dy, dx);
        (a.x + dx * 0.5 + nx * 0.25, a.y + dy * 0.5 + ny * 0.25)
    }
}

/// Traces all ink of `img`. Pixels with a value below `threshold` are ink.
pub fn trace(img: &GrayImage, threshold: u8) -> Vec<Contour> {
    let mut edges = collect_edges(img, threshold);
    let mut contours = Vec::new();

    while let Some(start) = edges.keys().next().copied() {
        let mut points = vec![start];
        let mut current = start;
        let mut heading: Option<Point<i32>> = None;

        loop {
            let Some(next) = take_edge(&mut edges, current, heading) else {
                break;
            };
            heading = Some(Point::new(next.x - current.x, next.y - current.y));
            current = next;
            if current == start {
                break;
            }
            points.push(current);
        }

        contours.push(simplify(Contour::new(points)));
    }

    contours
}

/// Outgoing edges keyed by their start vertex
type EdgeMap = BTreeMap<Point<i32>, Vec<Point<i32>>>;

fn collect_edges(img: &GrayImage, threshold: u8) -> EdgeMap {
    let (width, height) = img.dimensions();
    let is_ink = |x: i64, y: i64| -> bool {
        x >= 0
            && y >= 0
            && x < i64::from(width)
            && y < i64::from(height)
            && img.get_pixel(x as u32, y as u32).0[0] < threshold
    };

    let mut edges = EdgeMap::new();
    let mut add = |from: (i64, i64), to: (i64, i64)| {
        edges
            .entry(Point::new(from.0 as i32, from.1 as i32))
            .or_default()
            .push(Point::new(to.0 as i32, to.1 as i32));
    };

    for y in 0..i64::from(height) {
        for x in 0..i64::from(width) {
            if !is_ink(x, y) {
                continue;
            }
            if !is_ink(x, y - 1) {
                add((x, y), (x + 1, y));
            }
            if !is_ink(x + 1, y) {
                add((x + 1, y), (x + 1, y + 1));
            }
            if !is_ink(x, y + 1) {
                add((x + 1, y + 1), (x, y + 1));
            }
            if !is_ink(x - 1, y) {
                add((x, y + 1), (x, y));
            }
        }
    }

    edges
}

/// Removes and returns the end of an edge leaving `from`. Where two edges leave the same
/// vertex (diagonally touching pixels) the right turn is taken, which keeps the two
/// pixels in separate contours.
fn take_edge(edges: &mut EdgeMap, from: Point<i32>, heading: Option<Point<i32>>) -> Option<Point<i32>> {
    let outgoing = edges.get_mut(&from)?;

    let idx = heading
        .map(|h| Point::new(from.x - h.y, from.y + h.x))
        .and_then(|right| outgoing.iter().position(|&to| to == right))
        .unwrap_or(0);
    let to = outgoing.swap_remove(idx);

    if outgoing.is_empty() {
        edges.remove(&from);
    }

    Some(to)
}

/// Drops vertices that lie on a straight line between their neighbours
pub fn simplify(contour: Contour) -> Contour {
    let points = contour.points;
    let n = points.len();
    if n < 3 {
        return Contour::new(points);
    }

    let kept = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let cross = i64::from(cur.x - prev.x) * i64::from(next.y - cur.y)
                - i64::from(cur.y - prev.y) * i64::from(next.x - cur.x);
            cross != 0
        })
        .map(|i| points[i])
        .collect();

    Contour::new(kept)
}

/// Makes filled contours clockwise and holes counter-clockwise (on screen). A contour
/// enclosed by an odd number of other contours is a hole.
pub fn correct_direction(contours: &mut [Contour]) {
    let depths: Vec<usize> = contours
        .iter()
        .enumerate()
        .map(|(i, contour)| {
            let (x, y) = contour.probe();
            contours
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && other.contains(x, y))
                .count()
        })
        .collect();

    for (contour, depth) in contours.iter_mut().zip(depths) {
        let is_hole = depth % 2 == 1;
        if contour.is_clockwise() == is_hole {
            contour.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Builds an image from rows of '#' (ink) and '.' (background)
    fn raster(rows: &[&str]) -> GrayImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        GrayImage::from_fn(width, height, |x, y| {
            let ink = rows[y as usize].as_bytes()[x as usize] == b'#';
            Luma([if ink { 0 } else { 255 }])
        })
    }

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn empty_image_has_no_contours() {
        assert!(trace(&raster(&["...", "..."]), 128).is_empty());
    }

    #[test]
    fn single_pixel() {
        let contours = trace(&raster(&["...", ".#.", "..."]), 128);
        assert_eq!(contours, vec![Contour::new(pts(&[(1, 1), (2, 1), (2, 2), (1, 2)]))]);
        assert!(contours[0].is_clockwise());
    }

    #[test]
    fn block_is_simplified_to_four_corners() {
        let contours = trace(&raster(&["....", ".##.", ".##.", "...."]), 128);
        assert_eq!(contours, vec![Contour::new(pts(&[(1, 1), (3, 1), (3, 3), (1, 3)]))]);
        assert_eq!(contours[0].doubled_area(), 8);
    }

    #[test]
    fn ring_has_counter_clockwise_hole() {
        let contours = trace(&raster(&["###", "#.#", "###"]), 128);
        assert_eq!(contours.len(), 2);

        let outer = &contours[0];
        let hole = &contours[1];
        assert!(outer.is_clockwise());
        assert!(!hole.is_clockwise());
        assert_eq!(outer.doubled_area(), 18);
        assert_eq!(hole.doubled_area(), -2);
    }

    #[test]
    fn diagonal_pixels_stay_separate() {
        let contours = trace(&raster(&["#.", ".#"]), 128);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| c.points.len() == 4 && c.is_clockwise()));
    }

    #[test]
    fn l_shape() {
        let contours = trace(&raster(&["#.", "##"]), 128);
        assert_eq!(
            contours,
            vec![Contour::new(pts(&[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2), (0, 2)]))]
        );
    }

    #[test]
    fn threshold_decides_ink() {
        let img = GrayImage::from_pixel(2, 2, Luma([100]));
        assert_eq!(trace(&img, 128).len(), 1);
        assert!(trace(&img, 100).is_empty());
    }

    #[test]
    fn simplify_keeps_corners_only() {
        let contour = Contour::new(pts(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)]));
        assert_eq!(simplify(contour), Contour::new(pts(&[(0, 0), (2, 0), (2, 2), (0, 2)])));
    }

    #[test]
    fn correct_direction_fixes_reversed_contours() {
        let mut contours = trace(&raster(&["#####", "#...#", "#.#.#", "#...#", "#####"]), 128);
        assert_eq!(contours.len(), 3);
        let expected = contours.clone();

        for contour in &mut contours {
            contour.reverse();
        }
        correct_direction(&mut contours);

        let winding: Vec<bool> = contours.iter().map(Contour::is_clockwise).collect();
        assert_eq!(winding, vec![true, false, true]);
        assert_eq!(
            contours.iter().map(Contour::doubled_area).collect::<Vec<_>>(),
            expected.iter().map(Contour::doubled_area).collect::<Vec<_>>()
        );
    }

    #[test]
    fn correct_direction_keeps_traced_contours() {
        let mut contours = trace(&raster(&["###", "#.#", "###", "...", "#.."]), 128);
        let expected = contours.clone();
        correct_direction(&mut contours);
        assert_eq!(contours, expected);
    }
}

//! Error results that can be returned from the pipeline

use thiserror::Error;

/// Errors raised while loading or writing a font
#[derive(Debug, Error)]
pub enum Error {
    #[error("font error: {0}")]
    Font(String),
}

/// Result that can be returned which holds either T or an Error
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// A point on a grid. Ordering is row-major (y first), which is the order in which the
/// tracer visits vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Copy + Ord> PartialOrd for Point<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Copy + Ord> Ord for Point<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl Point<i32> {
    pub fn f64(&self) -> Point<f64> {
        Point::new(self.x as f64, self.y as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_order_is_row_major() {
        let mut points = vec![Point::new(3, 1), Point::new(0, 2), Point::new(1, 1), Point::new(0, 0)];
        points.sort();
        assert_eq!(
            points,
            vec![Point::new(0, 0), Point::new(1, 1), Point::new(3, 1), Point::new(0, 2)]
        );
    }
}

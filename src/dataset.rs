use crate::error::{KMeansError, Result};
use ndarray::{stack, Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// Default dataset size when the caller does not pick one
pub const DEFAULT_NUM_POINTS: usize = 100;

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<ArrayView1<'_, f64>> for Point {
    fn from(row: ArrayView1<'_, f64>) -> Self {
        Self {
            x: row[0],
            y: row[1],
        }
    }
}

/// Axis-aligned coordinate domain, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::square(0.0, 100.0)
    }
}

impl Bounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Same range on both axes
    pub fn square(min: f64, max: f64) -> Self {
        Self::new(min, max, min, max)
    }

    /// Smallest bounds containing every row of `points`. `points` must be non-empty.
    fn enclosing(points: &ArrayView2<f64>) -> Self {
        let fold = |col: ArrayView1<f64>| {
            col.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        let (x_min, x_max) = fold(points.column(0));
        let (y_min, y_max) = fold(points.column(1));
        Self::new(x_min, x_max, y_min, y_max)
    }

    pub fn contains(&self, p: &Point) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }

    pub fn is_valid(&self) -> bool {
        [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite())
            && self.x_min <= self.x_max
            && self.y_min <= self.y_max
    }
}

/// An immutable set of 2D points stored as an `(n, 2)` array.
///
/// A dataset is never edited after creation; generating a new one replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    points: Array2<f64>,
    bounds: Bounds,
}

impl Dataset {
    /// Sample `num_points` points uniformly from `bounds`.
    pub fn generate<R: Rng + ?Sized>(num_points: usize, bounds: Bounds, rng: &mut R) -> Result<Self> {
        if num_points == 0 {
            return Err(KMeansError::InvalidNumPoints(
                "number of points must be at least 1".to_string(),
            ));
        }
        if !bounds.is_valid() {
            return Err(KMeansError::InvalidConfig(format!(
                "invalid coordinate bounds {:?}",
                bounds
            )));
        }

        let xs = Array1::random_using(num_points, Uniform::new_inclusive(bounds.x_min, bounds.x_max), rng);
        let ys = Array1::random_using(num_points, Uniform::new_inclusive(bounds.y_min, bounds.y_max), rng);
        let points = stack![Axis(1), xs, ys];

        Ok(Self { points, bounds })
    }

    /// Build a dataset from explicit points. The domain is their bounding box.
    pub fn from_points<P: Into<Point> + Copy>(points: &[P]) -> Result<Self> {
        if points.is_empty() {
            return Err(KMeansError::InvalidNumPoints(
                "a dataset needs at least one point".to_string(),
            ));
        }

        let mut data = Array2::zeros((points.len(), 2));
        for (i, &p) in points.iter().enumerate() {
            let p: Point = p.into();
            if !p.is_finite() {
                return Err(KMeansError::InvalidNumPoints(format!(
                    "point {} has non-finite coordinates",
                    i
                )));
            }
            data[[i, 0]] = p.x;
            data[[i, 1]] = p.y;
        }

        let bounds = Bounds::enclosing(&data.view());
        Ok(Self {
            points: data,
            bounds,
        })
    }

    /// Replace the coordinate domain. Every point must lie inside the new bounds.
    pub fn with_bounds(mut self, bounds: Bounds) -> Result<Self> {
        if !bounds.is_valid() {
            return Err(KMeansError::InvalidConfig(format!(
                "invalid coordinate bounds {:?}",
                bounds
            )));
        }
        if let Some(i) = self.iter().position(|p| !bounds.contains(&p)) {
            return Err(KMeansError::InvalidConfig(format!(
                "point {} lies outside {:?}",
                i, bounds
            )));
        }
        self.bounds = bounds;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn point(&self, i: usize) -> Point {
        Point::from(self.points.row(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.outer_iter().map(Point::from)
    }

    pub fn to_points(&self) -> Vec<Point> {
        self.iter().collect()
    }

    /// Raw `(n, 2)` view of the coordinates
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }
}

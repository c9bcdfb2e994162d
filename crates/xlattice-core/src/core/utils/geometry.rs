use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Axes in the fixed processing order used by tessellation.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two remaining axes, in cyclic order (X -> Y, Z; Y -> Z, X; Z -> X, Y).
    pub fn transverse(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    pub fn unit_vector(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    #[inline]
    pub fn of(self, point: &Point3<f64>) -> f64 {
        point[self.index()]
    }

    #[inline]
    pub fn of_vector(self, vector: &Vector3<f64>) -> f64 {
        vector[self.index()]
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid axis selector '{0}'. Expected one of 'x', 'y' or 'z'.")]
pub struct ParseAxisError(pub String);

impl FromStr for Axis {
    type Err = ParseAxisError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        )
    }
}

/// Which of the two opposing boundary faces along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Min,
    Max,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Min => Side::Max,
            Side::Max => Side::Min,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Min => "min",
                Side::Max => "max",
            }
        )
    }
}

/// One of the six axis-aligned boundary faces of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceSelector {
    pub axis: Axis,
    pub side: Side,
}

impl FaceSelector {
    pub fn new(axis: Axis, side: Side) -> Self {
        Self { axis, side }
    }

    pub fn max(axis: Axis) -> Self {
        Self::new(axis, Side::Max)
    }

    pub fn min(axis: Axis) -> Self {
        Self::new(axis, Side::Min)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid face selector '{0}'. Expected an axis with optional sign, e.g. '+x', '-y' or 'z'.")]
pub struct ParseFaceError(pub String);

impl FromStr for FaceSelector {
    type Err = ParseFaceError;

    /// Accepts `+x`, `-x`, `x+`, `x-` and a bare `x` (meaning the max face).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseFaceError(s.to_string());
        let (side, axis_str) = if let Some(rest) = trimmed.strip_prefix('+') {
            (Side::Max, rest)
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            (Side::Min, rest)
        } else if let Some(rest) = trimmed.strip_suffix('+') {
            (Side::Max, rest)
        } else if let Some(rest) = trimmed.strip_suffix('-') {
            (Side::Min, rest)
        } else {
            (Side::Max, trimmed)
        };
        let axis = axis_str.parse::<Axis>().map_err(|_| err())?;
        Ok(Self { axis, side })
    }
}

impl fmt::Display for FaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.side {
            Side::Min => '-',
            Side::Max => '+',
        };
        write!(f, "{}{}", sign, self.axis)
    }
}

/// Axis-aligned bounding box of a node cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Default for Extents {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }
}

impl Extents {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Bounding box of `points`, or `None` when the iterator is empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut extents = Self::new(first, first);
        for p in iter {
            for i in 0..3 {
                extents.min[i] = extents.min[i].min(p[i]);
                extents.max[i] = extents.max[i].max(p[i]);
            }
        }
        Some(extents)
    }

    #[inline]
    pub fn min_of(&self, axis: Axis) -> f64 {
        axis.of(&self.min)
    }

    #[inline]
    pub fn max_of(&self, axis: Axis) -> f64 {
        axis.of(&self.max)
    }

    pub fn extreme(&self, axis: Axis, side: Side) -> f64 {
        match side {
            Side::Min => self.min_of(axis),
            Side::Max => self.max_of(axis),
        }
    }

    pub fn length(&self, axis: Axis) -> f64 {
        self.max_of(axis) - self.min_of(axis)
    }

    pub fn lengths(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn midpoint(&self, axis: Axis) -> f64 {
        0.5 * (self.min_of(axis) + self.max_of(axis))
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn translated(&self, delta: &Vector3<f64>) -> Self {
        Self::new(self.min + delta, self.max + delta)
    }

    /// Componentwise scaling about the origin. Factors must be positive.
    pub fn scaled(&self, factors: &Vector3<f64>) -> Self {
        Self::new(
            Point3::from(self.min.coords.component_mul(factors)),
            Point3::from(self.max.coords.component_mul(factors)),
        )
    }

    pub fn approx_eq(&self, other: &Extents, epsilon: f64) -> bool {
        (self.min - other.min).amax() <= epsilon && (self.max - other.max).amax() <= epsilon
    }
}

impl fmt::Display for Extents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x:[{}, {}] y:[{}, {}] z:[{}, {}]",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}

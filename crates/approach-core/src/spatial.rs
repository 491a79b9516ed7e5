//! 3D geometry used by the flight model.
//!
//! Coordinates are plain Cartesian values in the same distance unit as
//! aircraft speeds (distance units per hour).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::error::ApproachError;

/// A point (or displacement) in 3D space.
///
/// Serialized as a `[x, y, z]` array, matching the roster file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const ORIGIN: Point3D = Point3D::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length of the vector from the origin.
    pub fn norm(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2) + self.z.powi(2)).sqrt()
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3D) -> f64 {
        (*self - *other).norm()
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Point3D) -> Point3D {
        (*self + *other) * 0.5
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point3D {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3D> for [f64; 3] {
    fn from(p: Point3D) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Parses `"x,y,z"`, as used on command lines and in environment variables.
impl FromStr for Point3D {
    type Err = ApproachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ApproachError::InvalidParameter(format!("expected \"x,y,z\", got {s:?}"));
        let values: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect::<Option<_>>()
            .ok_or_else(invalid)?;
        match values.as_slice() {
            [x, y, z] => Ok(Point3D::new(*x, *y, *z)),
            _ => Err(invalid()),
        }
    }
}

impl Add for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3D {
    type Output = Point3D;

    fn mul(self, rhs: f64) -> Point3D {
        Point3D::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for Point3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_euclidean() {
        let a = Point3D::new(1.0, 2.0, 2.0);
        assert!((a.norm() - 3.0).abs() < 1e-12);
        assert!((a.distance_to(&Point3D::ORIGIN) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint() {
        let a = Point3D::new(0.0, 0.0, 10.0);
        let b = Point3D::new(4.0, -2.0, 0.0);
        assert_eq!(a.midpoint(&b), Point3D::new(2.0, -1.0, 5.0));
    }

    #[test]
    fn test_serializes_as_array() {
        let p: Point3D = serde_json::from_str("[1.5, -2, 3]").unwrap();
        assert_eq!(p, Point3D::new(1.5, -2.0, 3.0));
        assert_eq!(serde_json::to_string(&p).unwrap(), "[1.5,-2.0,3.0]");
        assert!(serde_json::from_str::<Point3D>("[1, 2]").is_err());
    }

    #[test]
    fn test_parse_from_text() {
        assert_eq!("1, 2.5,-3".parse::<Point3D>().unwrap(), Point3D::new(1.0, 2.5, -3.0));
        assert!("1,2".parse::<Point3D>().is_err());
        assert!("a,b,c".parse::<Point3D>().is_err());
    }
}

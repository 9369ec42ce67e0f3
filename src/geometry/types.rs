//! Core geometric types

use nalgebra::{Point2, Point3, Vector3};

/// 3D point type
pub type Point = Point3<f64>;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// 2D point in a face's local plane frame
pub type Point2d = Point2<f64>;

/// Axis-aligned bounding box in 3D
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point,

    /// Maximum corner
    pub max: Point,
}

impl Aabb {
    /// Create an AABB from min and max corners
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion
    pub fn empty() -> Self {
        Self {
            min: Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Build the AABB of a set of points, `None` when the set is empty
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb.is_valid().then_some(aabb)
    }

    /// Whether min <= max on every axis
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Expand this AABB to include a point
    pub fn include_point(&mut self, p: &Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Merge another AABB into this one
    pub fn include_aabb(&mut self, other: &Aabb) {
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Return a copy expanded by `padding` on all sides
    pub fn padded(&self, padding: f64) -> Self {
        let pad = Vec3::new(padding, padding, padding);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Test if two AABBs overlap (touching counts as overlap)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y
            || self.max.z < other.min.z
            || other.max.z < self.min.z)
    }

    /// Size along each axis
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three extents
    pub fn max_extent(&self) -> f64 {
        let e = self.extents();
        e.x.max(e.y).max(e.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_from_points() {
        let points = vec![
            Point::new(1.0, -2.0, 0.0),
            Point::new(-1.0, 4.0, 3.0),
            Point::new(0.5, 0.5, -1.0),
        ];
        let aabb = Aabb::from_points(&points).unwrap();

        assert_eq!(aabb.min, Point::new(-1.0, -2.0, -1.0));
        assert_eq!(aabb.max, Point::new(1.0, 4.0, 3.0));
        assert_relative_eq!(aabb.max_extent(), 6.0);
    }

    #[test]
    fn test_aabb_empty_input() {
        let points: Vec<Point> = Vec::new();
        assert!(Aabb::from_points(&points).is_none());
    }

    #[test]
    fn test_aabb_overlap_and_padding() {
        let a = Aabb::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point::new(1.5, 0.0, 0.0), Point::new(2.0, 1.0, 1.0));
        let touching = Aabb::new(Point::new(1.0, 0.0, 0.0), Point::new(2.0, 1.0, 1.0));

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&touching));
        assert!(a.padded(0.25).overlaps(&b.padded(0.25)));
    }
}

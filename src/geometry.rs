//! Geometry primitives shared by every engine.
//!
//! [`Vector`] is a plain 2D point/offset and [`Rect`] an axis-aligned rectangle stored as two corners.
//! Both are `Copy` and serializable so they can live inside pane snapshots.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D vector in either canvas or viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component
    pub x: f32,
    /// Vertical component
    pub y: f32,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    /// Creates a vector from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product.
    pub fn dot(self, other: Vector) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length.
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared distance to another point.
    pub fn distance_squared(self, other: Vector) -> f32 {
        (self - other).length_squared()
    }

    /// Returns the unit vector in the same direction, or zero for the zero vector.
    pub fn normalized(self) -> Vector {
        let length = self.length();
        if length == 0.0 {
            Vector::ZERO
        } else {
            self / length
        }
    }

    /// Perpendicular vector rotated a quarter turn counter-clockwise.
    pub fn perpendicular(self) -> Vector {
        Vector::new(-self.y, self.x)
    }

    /// Linear interpolation between `self` and `other`.
    pub fn lerp(self, other: Vector, t: f32) -> Vector {
        self + (other - self) * t
    }

    /// Rounds both components to the nearest integer.
    pub fn round(self) -> Vector {
        Vector::new(self.x.round(), self.y.round())
    }

    /// Component-wise minimum.
    pub fn min(self, other: Vector) -> Vector {
        Vector::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Vector) -> Vector {
        Vector::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Vector {
        Vector::new(self.x.abs(), self.y.abs())
    }

    /// Returns true if both components are within `epsilon` of `other`.
    pub fn approx_eq(self, other: Vector, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vector {
    type Output = Vector;

    fn div(self, rhs: f32) -> Vector {
        Vector::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

/// An axis-aligned rectangle defined by two corners.
///
/// The corners may be given in any order; the accessors normalize them, which lets a
/// box-select rectangle be built straight from a drag start and the current pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// First corner
    pub a: Vector,
    /// Opposite corner
    pub b: Vector,
}

impl Rect {
    /// Creates a rectangle from two opposite corners.
    pub fn from_corners(a: Vector, b: Vector) -> Self {
        Self { a, b }
    }

    /// Creates a rectangle from its top-left position and size.
    pub fn from_position_and_size(position: Vector, size: Vector) -> Self {
        Self {
            a: position,
            b: position + size,
        }
    }

    /// Left edge.
    pub fn left(&self) -> f32 {
        self.a.x.min(self.b.x)
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.a.x.max(self.b.x)
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.a.y.min(self.b.y)
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.a.y.max(self.b.y)
    }

    /// Top-left corner.
    pub fn top_left(&self) -> Vector {
        Vector::new(self.left(), self.top())
    }

    /// Bottom-right corner.
    pub fn bottom_right(&self) -> Vector {
        Vector::new(self.right(), self.bottom())
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.right() - self.left()
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.bottom() - self.top()
    }

    /// Size as a vector.
    pub fn size(&self) -> Vector {
        Vector::new(self.width(), self.height())
    }

    /// Center point.
    pub fn center(&self) -> Vector {
        Vector::new(
            (self.left() + self.right()) / 2.0,
            (self.top() + self.bottom()) / 2.0,
        )
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, point: Vector) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Returns true if the point lies strictly inside.
    pub fn strictly_contains_point(&self, point: Vector) -> bool {
        point.x > self.left()
            && point.x < self.right()
            && point.y > self.top()
            && point.y < self.bottom()
    }

    /// Returns true if `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Overlapping region of two rectangles. Rectangles that only share an edge do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());
        if left < right && top < bottom {
            Some(Rect::from_corners(
                Vector::new(left, top),
                Vector::new(right, bottom),
            ))
        } else {
            None
        }
    }

    /// Returns true if the rectangles overlap with positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.top_left().min(other.top_left()),
            self.bottom_right().max(other.bottom_right()),
        )
    }

    /// Returns the rectangle moved by `offset`.
    pub fn translate(&self, offset: Vector) -> Rect {
        Rect::from_corners(self.a + offset, self.b + offset)
    }
}

//! Planar device positions.

use std::ops::{Add, Neg, Sub};

/// A position in the deployment plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Origin of the plane.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Position {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Position {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for Position {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = Position::new(-12.5, 7.25);
        assert_eq!(p.distance(&p), 0.0);
    }

    #[test]
    fn addition_subtraction() {
        let a = Position::new(1.0, 2.0);
        let b = Position::new(4.0, -1.0);

        assert_eq!(a + b, Position::new(5.0, 1.0));
        assert_eq!(a - b, Position::new(-3.0, 3.0));
        assert_eq!(a + (-b), a - b);
    }

    #[test]
    fn non_finite_detected() {
        assert!(Position::ORIGIN.is_finite());
        assert!(!Position::new(f64::NAN, 0.0).is_finite());
        assert!(!Position::new(0.0, f64::INFINITY).is_finite());
    }
}

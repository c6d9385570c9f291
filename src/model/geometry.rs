// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas geometry.
//!
//! Coordinates are screen coordinates: `x` grows to the right and `y` grows downwards. Angles are
//! expressed in degrees and measured counter-clockwise as seen on screen, so the y axis is
//! inverted when converting to and from polar form.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Angle in degrees, in `[0, 360)`, of the ray from `self` towards `other`.
    pub fn theta(self, other: Point) -> f64 {
        let y = -(other.y - self.y);
        let x = other.x - self.x;
        let degrees = y.atan2(x).to_degrees();
        if degrees < 0.0 {
            degrees + 360.0
        } else {
            degrees
        }
    }

    /// The point at `distance` from `origin` along `angle` degrees.
    pub fn from_polar(distance: f64, angle: f64, origin: Point) -> Point {
        let radians = angle.to_radians();
        Point::new(
            origin.x + distance * radians.cos(),
            origin.y - distance * radians.sin(),
        )
    }

    /// Moves `self` towards `origin` by `distance`. Returns `self` unchanged when both points
    /// coincide.
    pub fn pulled_towards(self, origin: Point, distance: f64) -> Point {
        let length = self.distance(origin);
        if length <= f64::EPSILON {
            return self;
        }
        let ratio = distance / length;
        Point::new(
            self.x + (origin.x - self.x) * ratio,
            self.y + (origin.y - self.y) * ratio,
        )
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Stable textual form used to compare point sets.
    pub fn key(self) -> String {
        format!("{}@{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Resizes the rectangle so that it grows (or shrinks) towards `direction`, keeping the
    /// opposite corner or edge midpoint fixed.
    pub fn resized(&self, size: Size, direction: ResizeDirection) -> Rect {
        let dx = size.width - self.size.width;
        let dy = size.height - self.size.height;
        let (fx, fy) = direction.shift_factors();
        Rect::new(self.origin.offset(-dx * fx, -dy * fy), size)
    }
}

/// The direction a node grows towards while one of its resize handles is dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeDirection {
    Top,
    TopRight,
    Right,
    #[default]
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl ResizeDirection {
    /// How much of the size delta moves the origin, per axis.
    fn shift_factors(self) -> (f64, f64) {
        match self {
            Self::Top => (0.5, 1.0),
            Self::TopRight => (0.0, 1.0),
            Self::Right => (0.0, 0.5),
            Self::BottomRight => (0.0, 0.0),
            Self::Bottom => (0.5, 0.0),
            Self::BottomLeft => (1.0, 0.0),
            Self::Left => (1.0, 0.5),
            Self::TopLeft => (1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, ResizeDirection, Size};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn theta_inverts_the_screen_y_axis() {
        let origin = Point::new(0.0, 0.0);
        assert_close(origin.theta(Point::new(10.0, 0.0)), 0.0);
        assert_close(origin.theta(Point::new(0.0, -10.0)), 90.0);
        assert_close(origin.theta(Point::new(-10.0, 0.0)), 180.0);
        assert_close(origin.theta(Point::new(0.0, 10.0)), 270.0);
    }

    #[test]
    fn from_polar_matches_theta() {
        let origin = Point::new(5.0, 5.0);
        let p = Point::from_polar(10.0, 90.0, origin);
        assert_close(p.x, 5.0);
        assert_close(p.y, -5.0);
        assert_close(origin.theta(p), 90.0);
    }

    #[test]
    fn pulled_towards_shortens_the_segment() {
        let p = Point::new(100.0, 0.0).pulled_towards(Point::new(0.0, 0.0), 10.0);
        assert_close(p.x, 90.0);
        assert_close(p.y, 0.0);

        let same = Point::new(3.0, 3.0);
        assert_eq!(same.pulled_towards(same, 10.0), same);
    }

    #[test]
    fn resize_keeps_the_opposite_corner_fixed() {
        let rect = Rect::new(Point::new(100.0, 100.0), Size::new(40.0, 20.0));
        let grown = rect.resized(Size::new(60.0, 50.0), ResizeDirection::TopLeft);
        assert_eq!(grown.origin, Point::new(80.0, 70.0));

        let bottom_right = Point::new(
            grown.origin.x + grown.size.width,
            grown.origin.y + grown.size.height,
        );
        assert_eq!(bottom_right, Point::new(140.0, 120.0));

        let restored = grown.resized(rect.size, ResizeDirection::TopLeft);
        assert_eq!(restored, rect);
    }
}

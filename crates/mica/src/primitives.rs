//! Geometry primitives shared across the toolkit

use glam::Vec2;

/// A 2D point in scene space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a point at the origin (0, 0)
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Convert to a glam vector
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<[f32; 2]> for Point {
    fn from(arr: [f32; 2]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
        }
    }
}

/// Axis-aligned rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    pub fn from_min_size(min: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            min,
            max: [min[0] + size[0], min[1] + size[1]],
        }
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min[0]
            && point.x <= self.max[0]
            && point.y >= self.min[1]
            && point.y <= self.max[1]
    }

    /// Smallest rectangle covering both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    /// Get the intersection of this rect with another
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let min_x = self.min[0].max(other.min[0]);
        let min_y = self.min[1].max(other.min[1]);
        let max_x = self.max[0].min(other.max[0]);
        let max_y = self.max[1].min(other.max[1]);

        if min_x <= max_x && min_y <= max_y {
            Some(Rect {
                min: [min_x, min_y],
                max: [max_x, max_y],
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::from_min_size([10.0, 10.0], [20.0, 20.0]);
        assert!(rect.contains(Point::new(15.0, 15.0)));
        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(!rect.contains(Point::new(31.0, 15.0)));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::from_min_size([0.0, 0.0], [10.0, 10.0]);
        let b = Rect::from_min_size([5.0, 5.0], [10.0, 10.0]);
        let u = a.union(&b);
        assert_eq!(u.min, [0.0, 0.0]);
        assert_eq!(u.max, [15.0, 15.0]);
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::from_min_size([0.0, 0.0], [10.0, 10.0]);
        let b = Rect::from_min_size([20.0, 20.0], [10.0, 10.0]);
        assert!(a.intersect(&b).is_none());
    }
}

//! Geometric types for capture regions and annotation coordinates
//!
//! Coordinates are carried as f64 and rounded to integer pixels immediately
//! before any capture, crop, or compositing operation.

/// A point in pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point
    pub fn distance_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Position and size of a rectangle
///
/// Width and height may be negative while a drag is in progress; call
/// [`Rect::normalized`] before storing or using the rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Coerce negative width/height so `(x, y)` is the top-left corner.
    /// The covered pixels are unchanged.
    pub fn normalized(&self) -> Rect {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Round all fields to integer pixels
    pub fn rounded(&self) -> Rect {
        Rect {
            x: self.x.round(),
            y: self.y.round(),
            width: self.width.round(),
            height: self.height.round(),
        }
    }

    /// Check if this rectangle contains a point (normalizes first)
    pub fn contains(&self, p: Point) -> bool {
        let r = self.normalized();
        p.x >= r.x && p.x < r.x + r.width && p.y >= r.y && p.y < r.y + r.height
    }
}

/// Squared distance from a point to the segment `a`-`b`
pub fn point_segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let len_sq = a.distance_sq(b);
    if len_sq == 0.0 {
        return p.distance_sq(a);
    }
    let t = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    p.distance_sq(closest)
}

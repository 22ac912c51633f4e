//! Integer rectangles and screen-space headings
//!
//! Every collision test in the client is built from these, in integer pixels.

/// Axis-aligned integer rectangle. The right and bottom edges are exclusive,
/// so two rectangles that merely touch do not intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A square of side `size` centered on `(cx, cy)`.
    pub fn centered_square(cx: i32, cy: i32, size: i32) -> Self {
        Self::new(cx - size / 2, cy - size / 2, size, size)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        // Strict on both sides: shared edges do not count
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.x <= x && x < self.right() && self.y <= y && y < self.bottom()
    }
}

/// Unit step along `angle_degrees` in screen coordinates, where y grows
/// downwards and angles are counter-clockwise.
pub fn heading(angle_degrees: f32) -> (f32, f32) {
    let radians = angle_degrees.to_radians();
    // Screen y points down, so a positive angle moves up
    (radians.cos(), -radians.sin())
}

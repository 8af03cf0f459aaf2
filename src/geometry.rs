//! Box model and pixel rectangles
//!
//! `NodeBox` holds what a document declares about a node's geometry and what
//! the layout pass resolved from it. `Rect` is the integer pixel rectangle
//! used for hit regions, dirty tracking and partial presents.

/// Declared and resolved geometry of a node.
///
/// Declared values of zero mean "unset, derive during layout".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeBox {
    pub x: f32,
    pub y: f32,
    pub rel_x: f32,
    pub rel_y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeBox {
    /// Resolved box in whole pixels, as used for drawing and hit testing.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.rel_x as i32,
            self.rel_y as i32,
            self.width.max(0.0) as u32,
            self.height.max(0.0) as u32,
        )
    }

    /// Point containment against the resolved box. Coordinates are truncated
    /// to whole pixels and the right/bottom edges are exclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.bounds().contains(x as i32, y as i32)
    }
}

/// Integer pixel rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge, saturating at `i32::MAX`.
    pub fn right(&self) -> i32 {
        saturate(self.x as i64 + self.width as i64)
    }

    pub fn bottom(&self) -> i32 {
        saturate(self.y as i64 + self.height as i64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, span(x0, x1), span(y0, y1))
    }

    /// Overlap of both rectangles, or `None` when they don't touch.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, span(x0, x1), span(y0, y1)))
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Distance from `from` to `to`, zero when `to` lies before `from`.
pub(crate) fn span(from: i32, to: i32) -> u32 {
    (to as i64 - from as i64).max(0) as u32
}

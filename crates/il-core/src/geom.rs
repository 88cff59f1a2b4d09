use serde::{Deserialize, Serialize};

/// Extents of an image or window, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn area(self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel position. Origin `(0, 0)` is the top-left corner; `x` grows to the
/// right, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, offset plus extents.
///
/// Unsigned coordinates encode the non-negativity invariant in the type.
/// An "entire image" region is spelled `Rect::of_size(image_size)`; APIs
/// that accept "no rect = whole image" take `Option<Rect>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering `size` with its origin at `(0, 0)`.
    pub const fn of_size(size: Size) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    pub const fn origin(self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub const fn size(self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// One past the rightmost column.
    pub const fn right(self) -> usize {
        self.x + self.width
    }

    /// One past the bottom row.
    pub const fn bottom(self) -> usize {
        self.y + self.height
    }

    pub const fn area(self) -> usize {
        self.width * self.height
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub const fn contains_rect(self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x >= right || y >= bottom {
            return None;
        }

        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Shrinks the rectangle by `bx` columns on the left and right and `by`
    /// rows on the top and bottom. Returns `None` when nothing is left.
    pub fn shrink(self, bx: usize, by: usize) -> Option<Rect> {
        if self.width <= 2 * bx || self.height <= 2 * by {
            return None;
        }

        Some(Rect::new(
            self.x + bx,
            self.y + by,
            self.width - 2 * bx,
            self.height - 2 * by,
        ))
    }
}

//! ROI-aware walks over a channel plane.
//!
//! A plane is addressed as `(slice, stride, roi)` where `stride` is the
//! full image width in elements. The walk is row-major inside the ROI and
//! jumps the `stride - roi.width` gap between ROI rows.
//!
//! None of these types check against the *image* bounds beyond what the
//! ROI rect guarantees: neighborhood access assumes the caller has already
//! shrunk the ROI by half the window extent (see `il-filter`'s shared
//! protocol), so every window read stays inside the original ROI.

use crate::geom::{Point, Rect, Size};

/// Explicit cursor over a ROI, for algorithms that need the current
/// position (neighborhood windows) alongside the value.
#[derive(Debug, Clone)]
pub struct RoiCursor<'a, T> {
    data: &'a [T],
    stride: usize,
    roi: Rect,
    idx: usize,
    row_end: usize,
    end: usize,
    col: usize,
    row: usize,
}

impl<'a, T: Copy> RoiCursor<'a, T> {
    /// Cursor positioned on the first ROI element.
    ///
    /// The ROI must be non-empty and lie inside the plane described by
    /// `(data, stride)`.
    pub fn new(data: &'a [T], stride: usize, roi: Rect) -> Self {
        debug_assert!(stride >= roi.right(), "roi exceeds plane stride");
        debug_assert!(
            (roi.bottom() - 1) * stride + roi.right() <= data.len(),
            "roi exceeds plane length"
        );

        let idx = roi.y * stride + roi.x;
        Self {
            data,
            stride,
            roi,
            idx,
            row_end: idx + roi.width,
            end: (roi.bottom() - 1) * stride + roi.right(),
            col: 0,
            row: 0,
        }
    }

    /// True while the cursor points at a ROI element.
    pub fn in_region(&self) -> bool {
        self.idx < self.end
    }

    /// Value under the cursor.
    pub fn value(&self) -> T {
        self.data[self.idx]
    }

    /// Current position in image coordinates.
    pub fn pos(&self) -> Point {
        Point::new(self.roi.x + self.col, self.roi.y + self.row)
    }

    /// Steps to the next ROI element, jumping the stride gap at row ends.
    pub fn advance(&mut self) {
        self.idx += 1;
        self.col += 1;
        if self.idx == self.row_end {
            self.idx += self.stride - self.roi.width;
            self.row_end += self.stride;
            self.col = 0;
            self.row += 1;
        }
    }

    /// Iterator over a `size` window anchored on the current position:
    /// the window's `anchor` cell coincides with `pos()`.
    ///
    /// The window must stay inside the plane; with the ROI pre-shrunk by
    /// half the window extent that holds for every cursor position.
    pub fn window(&self, size: Size, anchor: Point) -> RoiIter<'a, T> {
        let p = self.pos();
        let win = Rect::new(p.x - anchor.x, p.y - anchor.y, size.width, size.height);
        RoiIter::new(self.data, self.stride, win)
    }
}

/// Row-major iterator over the ROI elements of a borrowed plane.
#[derive(Debug, Clone)]
pub struct RoiIter<'a, T> {
    data: &'a [T],
    idx: usize,
    gap: usize,
    width: usize,
    col: usize,
    remaining: usize,
}

impl<'a, T> RoiIter<'a, T> {
    pub fn new(data: &'a [T], stride: usize, roi: Rect) -> Self {
        debug_assert!(stride >= roi.right(), "roi exceeds plane stride");
        Self {
            data,
            idx: roi.y * stride + roi.x,
            gap: stride - roi.width,
            width: roi.width,
            col: 0,
            remaining: roi.area(),
        }
    }
}

impl<'a, T> Iterator for RoiIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = &self.data[self.idx];
        self.remaining -= 1;
        self.col += 1;
        if self.col == self.width {
            self.col = 0;
            self.idx += self.gap + 1;
        } else {
            self.idx += 1;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for RoiIter<'_, T> {}

/// Mutable counterpart of [`RoiIter`].
#[derive(Debug)]
pub struct RoiIterMut<'a, T> {
    rest: &'a mut [T],
    gap: usize,
    width: usize,
    col: usize,
    remaining: usize,
}

impl<'a, T> RoiIterMut<'a, T> {
    pub fn new(data: &'a mut [T], stride: usize, roi: Rect) -> Self {
        debug_assert!(stride >= roi.right(), "roi exceeds plane stride");
        let start = roi.y * stride + roi.x;
        Self {
            rest: &mut data[start..],
            gap: stride - roi.width,
            width: roi.width,
            col: 0,
            remaining: roi.area(),
        }
    }
}

impl<'a, T> Iterator for RoiIterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let rest = std::mem::take(&mut self.rest);
        let (item, tail) = rest.split_first_mut()?;
        self.remaining -= 1;
        self.col += 1;
        if self.col == self.width && self.remaining > 0 {
            self.col = 0;
            self.rest = &mut tail[self.gap..];
        } else {
            self.rest = tail;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for RoiIterMut<'_, T> {}

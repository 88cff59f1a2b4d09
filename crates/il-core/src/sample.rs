//! Plane-level resampling used by the scaled-copy operations.
//!
//! The per-axis sampling step is `(src_extent - 1) / dst_extent`.
//! Nearest-neighbor reads the source at `round(i * step)`; bilinear blends
//! the four neighbors around `(x * step_x, y * step_y)` with fractional
//! weights `(1-t)(1-u)`, `t(1-u)`, `tu`, `(1-t)u`.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geom::Rect;
use crate::pixel::Pixel;

/// Resampling mode for scaled copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    Nearest,
    Bilinear,
    /// Area averaging; reserved, currently rejected as unsupported.
    RegionAverage,
}

/// Resamples `src_roi` of the source plane into `dst_roi` of the
/// destination plane. Strides are the full image widths.
pub fn scale_plane<T: Pixel>(
    src: &[T],
    src_stride: usize,
    src_roi: Rect,
    dst: &mut [T],
    dst_stride: usize,
    dst_roi: Rect,
    mode: ScaleMode,
) -> Result<(), Error> {
    match mode {
        ScaleMode::Nearest => {
            scale_nearest(src, src_stride, src_roi, dst, dst_stride, dst_roi);
            Ok(())
        }
        ScaleMode::Bilinear => {
            scale_bilinear(src, src_stride, src_roi, dst, dst_stride, dst_roi);
            Ok(())
        }
        ScaleMode::RegionAverage => Err(Error::UnsupportedScaleMode(mode)),
    }
}

fn steps(src_roi: Rect, dst_roi: Rect) -> (f32, f32) {
    (
        (src_roi.width - 1) as f32 / dst_roi.width as f32,
        (src_roi.height - 1) as f32 / dst_roi.height as f32,
    )
}

fn scale_nearest<T: Pixel>(
    src: &[T],
    src_stride: usize,
    src_roi: Rect,
    dst: &mut [T],
    dst_stride: usize,
    dst_roi: Rect,
) {
    let (step_x, step_y) = steps(src_roi, dst_roi);

    for y in 0..dst_roi.height {
        let sy = src_roi.y + (y as f32 * step_y).round() as usize;
        let drow = (dst_roi.y + y) * dst_stride + dst_roi.x;
        for x in 0..dst_roi.width {
            let sx = src_roi.x + (x as f32 * step_x).round() as usize;
            dst[drow + x] = src[sy * src_stride + sx];
        }
    }
}

fn scale_bilinear<T: Pixel>(
    src: &[T],
    src_stride: usize,
    src_roi: Rect,
    dst: &mut [T],
    dst_stride: usize,
    dst_roi: Rect,
) {
    let (step_x, step_y) = steps(src_roi, dst_roi);

    for y in 0..dst_roi.height {
        let fy = y as f32 * step_y;
        let y0 = fy.floor() as usize;
        let u = fy - y0 as f32;
        let y1 = (y0 + 1).min(src_roi.height - 1);

        let drow = (dst_roi.y + y) * dst_stride + dst_roi.x;
        for x in 0..dst_roi.width {
            let fx = x as f32 * step_x;
            let x0 = fx.floor() as usize;
            let t = fx - x0 as f32;
            let x1 = (x0 + 1).min(src_roi.width - 1);

            let at = |xx: usize, yy: usize| -> f32 {
                src[(src_roi.y + yy) * src_stride + src_roi.x + xx].to_f32()
            };

            let v = at(x0, y0) * (1.0 - t) * (1.0 - u)
                + at(x1, y0) * t * (1.0 - u)
                + at(x1, y1) * t * u
                + at(x0, y1) * (1.0 - t) * u;
            dst[drow + x] = T::from_f32(v);
        }
    }
}

use thiserror::Error;

use crate::geom::{Point, Rect, Size};
use crate::params::Format;
use crate::pixel::Depth;
use crate::sample::ScaleMode;

/// Errors shared by the container, iterator and filter layers.
///
/// The parameter layer (`ImageParams`, kernels) is strictly `Result`-based
/// and safe to wrap in validate/retry loops. Container and filter entry
/// points validate shapes up front and return one of these; on error the
/// destination is left as already prepared, never rolled back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("buffer length mismatch: expected {expected} elements, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("image size mismatch: {a:?} vs {b:?}")]
    ShapeMismatch { a: Size, b: Size },

    #[error("channel count mismatch: {a} vs {b}")]
    ChannelCountMismatch { a: usize, b: usize },

    #[error("image size must be non-zero")]
    EmptyImage,

    #[error("roi {roi:?} exceeds image bounds {size:?}")]
    RoiOutOfBounds { roi: Rect, size: Size },

    #[error("roi must cover at least one pixel")]
    EmptyRoi,

    #[error("roi size mismatch: source {src:?}, destination {dst:?}")]
    RoiSizeMismatch { src: Size, dst: Size },

    #[error("roi {roi:?} too small for mask {mask:?}")]
    RoiTooSmall { roi: Rect, mask: Size },

    #[error("channel index {index} out of range for {count} channels")]
    ChannelOutOfRange { index: usize, count: usize },

    #[error("format {format:?} requires {expected} channels, got {actual}")]
    FormatChannelMismatch {
        format: Format,
        expected: usize,
        actual: usize,
    },

    #[error("an image must keep at least one channel")]
    ZeroChannels,

    #[error("depth mismatch: expected {expected:?}, got {actual:?}")]
    DepthMismatch { expected: Depth, actual: Depth },

    #[error("source and destination alias the same channel buffer")]
    AliasedBuffers,

    #[error("scaling mode {0:?} has no implementation")]
    UnsupportedScaleMode(ScaleMode),

    #[error("value range is degenerate (old min equals old max)")]
    DegenerateRange,

    #[error("kernel expects {expected} coefficients, got {actual}")]
    KernelSizeMismatch { expected: usize, actual: usize },

    #[error("kernel anchor {anchor:?} outside kernel of size {size:?}")]
    AnchorOutOfKernel { anchor: Point, size: Size },

    #[error("kernel normalization factor must be non-zero")]
    ZeroNormFactor,
}

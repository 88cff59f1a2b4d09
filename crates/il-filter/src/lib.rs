//! Neighborhood and pointwise filters over `il-core` images.
//!
//! Every sliding-window operator follows the same protocol: the working
//! region is the source ROI eroded so the window fits at every output
//! pixel (half the mask extent for centered masks, the anchor offsets
//! for anchored kernels), the destination is reshaped to the source size
//! with its ROI set to that region, and the mask therefore never samples
//! outside the original ROI.
//!
//! Entry points validate shapes, depths and aliasing up front and return
//! `Err` after logging; on error the destination is whatever preparation
//! left behind — there is no rollback. Inner loops assume validated
//! preconditions and do no further checking.

pub mod compare;
pub mod conv;
pub mod kernel;
pub mod logical;
pub mod median;
pub mod morph;
pub mod neighborhood;

pub use compare::{CmpOp, compare, compare_const};
pub use conv::{convolve, convolve_dyn};
pub use kernel::Kernel;
pub use logical::{and, and_const, not, or, or_const, xor, xor_const};
pub use median::median;
pub use morph::{close, dilate, erode, open};
pub use neighborhood::{eroded_roi, eroded_roi_anchored, prepare_dst};

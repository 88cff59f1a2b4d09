//! Depth-polymorphic, multi-channel image container with ROI-aware
//! iteration.
//!
//! ## Channel ownership
//! A channel is one reference-counted plane ([`ChannelBuffer`]); image
//! copies and channel composition (`append`, `replace_channel`) share
//! planes, and exclusivity is only ever established by an explicit
//! [`Img::detach`]. Sharing is single-threaded (`Rc`); crossing a thread
//! boundary requires detaching first and is enforced by the type system.
//!
//! ## Depths
//! Two pixel representations are supported, `u8` and `f32`, closed over by
//! the sealed [`Pixel`] trait. Algorithms are written once as generic
//! bodies; the depth-erased [`DynImg`] handle dispatches over the tag.
//!
//! ## ROI
//! Every image carries a region of interest, always contained in the full
//! rect and at least one pixel. Iteration honors the stride gap between
//! the ROI width and the image width; neighborhood access assumes the
//! caller shrank the ROI by half the window extent first.

mod channel;
mod dynimage;
mod error;
mod geom;
mod image;
mod iter;
mod params;
mod pixel;
mod sample;

pub use channel::ChannelBuffer;
pub use dynimage::DynImg;
pub use error::Error;
pub use geom::{Point, Rect, Size};
pub use image::Img;
pub use iter::{RoiCursor, RoiIter, RoiIterMut};
pub use params::{Format, ImageParams};
pub use pixel::{Depth, Pixel};
pub use sample::{ScaleMode, scale_plane};

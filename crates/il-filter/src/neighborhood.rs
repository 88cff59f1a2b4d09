//! Shared protocol for sliding-window operators.
//!
//! Before an operator with mask size `(kw, kh)` runs, the working region
//! is the source ROI shrunk so that the window fits inside it at every
//! output pixel: by `(kw/2, kh/2)` per side for centered masks, or by the
//! anchor offsets for anchored kernels. The destination is reshaped to
//! the source size with its ROI set to that shrunk rect. The mask
//! therefore never reads outside the original ROI. The source ROI itself
//! is never mutated.

use log::warn;

use il_core::{Error, Img, Pixel, Point, Rect, Size};

/// Source ROI shrunk by half the mask extent per side, for centered
/// windows.
pub fn eroded_roi(roi: Rect, mask: Size) -> Result<Rect, Error> {
    roi.shrink(mask.width / 2, mask.height / 2).ok_or_else(|| {
        warn!("roi {roi:?} too small for mask {mask:?}");
        Error::RoiTooSmall { roi, mask }
    })
}

/// Source ROI shrunk for a window anchored at `anchor`: `anchor.x`
/// columns on the left and `mask.width - 1 - anchor.x` on the right, and
/// likewise vertically. For a centered anchor on an odd mask this matches
/// [`eroded_roi`]. The anchor must lie inside the mask.
pub fn eroded_roi_anchored(roi: Rect, mask: Size, anchor: Point) -> Result<Rect, Error> {
    if roi.width < mask.width || roi.height < mask.height {
        warn!("roi {roi:?} too small for mask {mask:?}");
        return Err(Error::RoiTooSmall { roi, mask });
    }
    Ok(Rect::new(
        roi.x + anchor.x,
        roi.y + anchor.y,
        roi.width - (mask.width - 1),
        roi.height - (mask.height - 1),
    ))
}

/// Reshapes `dst` for a window operator on `src`: source size, format and
/// channel count, ROI set to `region`. Rejects destinations that alias a
/// source plane.
pub fn prepare_dst<T: Pixel>(src: &Img<T>, dst: &mut Img<T>, region: Rect) -> Result<(), Error> {
    if src.aliases(dst) {
        warn!("window operator: source and destination alias");
        return Err(Error::AliasedBuffers);
    }

    if dst.size() != src.size() || dst.channel_count() != src.channel_count() {
        *dst = Img::from_params(src.params().clone());
    }
    dst.set_channel_count(src.channel_count())?;
    dst.set_roi(Some(region))?;
    Ok(())
}

/// Validates a pointwise operand pair: equal image sizes, equal ROI sizes,
/// equal channel counts.
pub fn check_operands<T: Pixel, U: Pixel>(a: &Img<T>, b: &Img<U>, op: &str) -> Result<(), Error> {
    if a.size() != b.size() {
        warn!("{op}: image size mismatch ({:?} vs {:?})", a.size(), b.size());
        return Err(Error::ShapeMismatch {
            a: a.size(),
            b: b.size(),
        });
    }
    if a.roi().size() != b.roi().size() {
        warn!(
            "{op}: roi size mismatch ({:?} vs {:?})",
            a.roi().size(),
            b.roi().size()
        );
        return Err(Error::RoiSizeMismatch {
            src: a.roi().size(),
            dst: b.roi().size(),
        });
    }
    if a.channel_count() != b.channel_count() {
        warn!(
            "{op}: channel count mismatch ({} vs {})",
            a.channel_count(),
            b.channel_count()
        );
        return Err(Error::ChannelCountMismatch {
            a: a.channel_count(),
            b: b.channel_count(),
        });
    }
    Ok(())
}

//! Pointwise comparisons producing a binary `u8` mask (0 or 255).

use log::warn;

use il_core::{Error, Img, Pixel, RoiCursor, RoiIterMut};

use crate::neighborhood::check_operands;

/// Relation applied per pixel pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    fn holds<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            CmpOp::Eq => a == b,
            CmpOp::NotEq => a != b,
            CmpOp::Lt => a < b,
            CmpOp::LtEq => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::GtEq => a >= b,
        }
    }
}

/// Per-pixel `a op b` over the operand ROIs; the mask's ROI matches `a`'s.
pub fn compare<T: Pixel>(
    a: &Img<T>,
    b: &Img<T>,
    op: CmpOp,
    dst: &mut Img<u8>,
) -> Result<(), Error> {
    check_operands(a, b, "compare")?;
    if aliases_mask(a, dst) || aliases_mask(b, dst) {
        warn!("compare: mask aliases an operand plane");
        return Err(Error::AliasedBuffers);
    }
    prepare_mask(a, dst)?;

    for ch in 0..a.channel_count() {
        let adata = a.channel(ch).read();
        let bdata = b.channel(ch).read();
        let mut ddata = dst.channel(ch).write();

        let mut ca = RoiCursor::new(&adata, a.width(), a.roi());
        let mut cb = RoiCursor::new(&bdata, b.width(), b.roi());
        for o in RoiIterMut::new(&mut ddata, dst.width(), dst.roi()) {
            *o = if op.holds(ca.value(), cb.value()) { 255 } else { 0 };
            ca.advance();
            cb.advance();
        }
    }
    Ok(())
}

/// Per-pixel `src op value`.
pub fn compare_const<T: Pixel>(
    src: &Img<T>,
    value: T,
    op: CmpOp,
    dst: &mut Img<u8>,
) -> Result<(), Error> {
    if aliases_mask(src, dst) {
        warn!("compare_const: mask aliases a source plane");
        return Err(Error::AliasedBuffers);
    }
    prepare_mask(src, dst)?;

    for ch in 0..src.channel_count() {
        let sdata = src.channel(ch).read();
        let mut ddata = dst.channel(ch).write();

        let mut cur = RoiCursor::new(&sdata, src.width(), src.roi());
        for o in RoiIterMut::new(&mut ddata, dst.width(), dst.roi()) {
            *o = if op.holds(cur.value(), value) { 255 } else { 0 };
            cur.advance();
        }
    }
    Ok(())
}

/// Allocation-address alias check; catches mask/operand sharing even
/// across pixel depths, where `ChannelBuffer::ptr_eq` cannot be used.
fn aliases_mask<T: Pixel>(img: &Img<T>, mask: &Img<u8>) -> bool {
    (0..img.channel_count()).any(|i| {
        (0..mask.channel_count()).any(|j| img.channel(i).data_ptr() == mask.channel(j).data_ptr())
    })
}

fn prepare_mask<T: Pixel>(src: &Img<T>, dst: &mut Img<u8>) -> Result<(), Error> {
    if dst.size() != src.size() || dst.channel_count() != src.channel_count() {
        *dst = Img::with_format_channels(src.size(), src.format(), src.channel_count())?;
    }
    dst.set_roi(Some(src.roi()))?;
    Ok(())
}

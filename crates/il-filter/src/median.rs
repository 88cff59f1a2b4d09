//! Median filter over the neighborhood-iterator protocol.

use il_core::{Error, Img, Pixel, Point, RoiCursor, RoiIterMut, Size};

use crate::neighborhood::{eroded_roi, prepare_dst};

/// Replaces each ROI pixel by the median of its centered `window`
/// neighborhood. The window values are gathered into a scratch buffer,
/// sorted, and the middle element taken; floats use their total order.
pub fn median<T: Pixel>(src: &Img<T>, dst: &mut Img<T>, window: Size) -> Result<(), Error> {
    let region = eroded_roi(src.roi(), window)?;
    prepare_dst(src, dst, region)?;
    let anchor = Point::new(window.width / 2, window.height / 2);

    let mut scratch: Vec<T> = Vec::with_capacity(window.area());
    for ch in 0..src.channel_count() {
        let sdata = src.channel(ch).read();
        let mut ddata = dst.channel(ch).write();

        let mut cur = RoiCursor::new(&sdata, src.width(), region);
        for o in RoiIterMut::new(&mut ddata, dst.width(), region) {
            scratch.clear();
            scratch.extend(cur.window(window, anchor).copied());
            scratch.sort_unstable_by(|a, b| a.to_f32().total_cmp(&b.to_f32()));
            *o = scratch[scratch.len() / 2];
            cur.advance();
        }
    }
    Ok(())
}

//! Grayscale morphology: window minimum (erode) and maximum (dilate) with
//! a rectangular structuring element, plus the open/close compositions.
//! Runs under the same ROI-erosion protocol as convolution.

use il_core::{Error, Img, Pixel, Point, RoiCursor, RoiIterMut, Size};

use crate::neighborhood::{eroded_roi, prepare_dst};

/// Window minimum over a centered `mask`-sized structuring element.
pub fn erode<T: Pixel>(src: &Img<T>, dst: &mut Img<T>, mask: Size) -> Result<(), Error> {
    window_extremum(src, dst, mask, |acc, v| if v < acc { v } else { acc }, T::MAX_VALUE)
}

/// Window maximum over a centered `mask`-sized structuring element.
pub fn dilate<T: Pixel>(src: &Img<T>, dst: &mut Img<T>, mask: Size) -> Result<(), Error> {
    window_extremum(src, dst, mask, |acc, v| if acc < v { v } else { acc }, T::MIN_VALUE)
}

/// Erosion followed by dilation; removes bright specks smaller than the
/// mask. Both stages erode the working region, so the final ROI shrinks by
/// the full mask extent.
pub fn open<T: Pixel>(src: &Img<T>, dst: &mut Img<T>, mask: Size) -> Result<(), Error> {
    let mut tmp = Img::from_params(src.params().clone());
    erode(src, &mut tmp, mask)?;
    dilate(&tmp, dst, mask)
}

/// Dilation followed by erosion; fills dark holes smaller than the mask.
pub fn close<T: Pixel>(src: &Img<T>, dst: &mut Img<T>, mask: Size) -> Result<(), Error> {
    let mut tmp = Img::from_params(src.params().clone());
    dilate(src, &mut tmp, mask)?;
    erode(&tmp, dst, mask)
}

fn window_extremum<T: Pixel>(
    src: &Img<T>,
    dst: &mut Img<T>,
    mask: Size,
    pick: impl Fn(T, T) -> T,
    seed: T,
) -> Result<(), Error> {
    let region = eroded_roi(src.roi(), mask)?;
    prepare_dst(src, dst, region)?;
    let anchor = Point::new(mask.width / 2, mask.height / 2);

    for ch in 0..src.channel_count() {
        let sdata = src.channel(ch).read();
        let mut ddata = dst.channel(ch).write();

        let mut cur = RoiCursor::new(&sdata, src.width(), region);
        for o in RoiIterMut::new(&mut ddata, dst.width(), region) {
            let mut acc = seed;
            for &v in cur.window(mask, anchor) {
                acc = pick(acc, v);
            }
            *o = acc;
            cur.advance();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{close, dilate, erode, open};
    use il_core::{Img, Rect, Size};

    fn speck() -> Img<u8> {
        // 5x5, zero except a single bright center pixel.
        let mut data = vec![0u8; 25];
        data[12] = 200;
        Img::from_planes(Size::new(5, 5), vec![data]).expect("valid image")
    }

    #[test]
    fn dilate_spreads_the_maximum() {
        let src = speck();
        let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");

        dilate(&src, &mut dst, Size::new(3, 3)).expect("dilate");
        assert_eq!(dst.roi(), Rect::new(1, 1, 3, 3));
        let out = dst.channel(0).to_vec();
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(out[y * 5 + x], 200, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn erode_removes_the_speck() {
        let src = speck();
        let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");

        erode(&src, &mut dst, Size::new(3, 3)).expect("erode");
        let out = dst.channel(0).to_vec();
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(out[y * 5 + x], 0, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn open_kills_speck_close_keeps_plateau() {
        let src = speck();
        let mut opened = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");
        open(&src, &mut opened, Size::new(3, 3)).expect("open");
        assert_eq!(opened.roi(), Rect::new(2, 2, 1, 1));
        assert_eq!(opened.channel(0).read()[12], 0);

        // A flat bright image survives closing unchanged.
        let mut flat = Img::<u8>::with_channels(Size::new(5, 5), 1).expect("valid image");
        flat.clear(None, 128).expect("fill");
        let mut closed = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");
        close(&flat, &mut closed, Size::new(3, 3)).expect("close");
        assert_eq!(closed.channel(0).read()[12], 128);
    }

    #[test]
    fn morphology_works_on_floats() {
        let src = Img::from_planes(
            Size::new(3, 3),
            vec![vec![0.5f32, 0.5, 0.5, 0.5, -1.0, 0.5, 0.5, 0.5, 0.5]],
        )
        .expect("valid image");
        let mut dst = Img::<f32>::with_channels(Size::new(1, 1), 1).expect("valid image");

        erode(&src, &mut dst, Size::new(3, 3)).expect("erode");
        assert_eq!(dst.channel(0).read()[4], -1.0);
    }
}

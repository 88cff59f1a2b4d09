//! Pointwise logical operators over ROI pixels.
//!
//! Exact bitwise logic for `u8`; `f32` values go through the pixel
//! trait's cast-to-integer fallback (`Pixel::bit_*`), since no native
//! floating bitwise operation exists.

use il_core::{Error, Img, Pixel, RoiCursor, RoiIterMut};

use crate::neighborhood::{check_operands, prepare_dst};

pub fn and<T: Pixel>(a: &Img<T>, b: &Img<T>, dst: &mut Img<T>) -> Result<(), Error> {
    binary_op(a, b, dst, "and", T::bit_and)
}

pub fn or<T: Pixel>(a: &Img<T>, b: &Img<T>, dst: &mut Img<T>) -> Result<(), Error> {
    binary_op(a, b, dst, "or", T::bit_or)
}

pub fn xor<T: Pixel>(a: &Img<T>, b: &Img<T>, dst: &mut Img<T>) -> Result<(), Error> {
    binary_op(a, b, dst, "xor", T::bit_xor)
}

pub fn and_const<T: Pixel>(src: &Img<T>, value: T, dst: &mut Img<T>) -> Result<(), Error> {
    unary_op(src, dst, |v| v.bit_and(value))
}

pub fn or_const<T: Pixel>(src: &Img<T>, value: T, dst: &mut Img<T>) -> Result<(), Error> {
    unary_op(src, dst, |v| v.bit_or(value))
}

pub fn xor_const<T: Pixel>(src: &Img<T>, value: T, dst: &mut Img<T>) -> Result<(), Error> {
    unary_op(src, dst, |v| v.bit_xor(value))
}

/// Bitwise complement; on floats this is the complement of the integer
/// cast.
pub fn not<T: Pixel>(src: &Img<T>, dst: &mut Img<T>) -> Result<(), Error> {
    unary_op(src, dst, T::bit_not)
}

fn binary_op<T: Pixel>(
    a: &Img<T>,
    b: &Img<T>,
    dst: &mut Img<T>,
    name: &str,
    f: impl Fn(T, T) -> T,
) -> Result<(), Error> {
    check_operands(a, b, name)?;
    if b.aliases(dst) {
        log::warn!("{name}: operand and destination alias");
        return Err(Error::AliasedBuffers);
    }
    prepare_dst(a, dst, a.roi())?;

    for ch in 0..a.channel_count() {
        let adata = a.channel(ch).read();
        let bdata = b.channel(ch).read();
        let mut ddata = dst.channel(ch).write();

        let mut ca = RoiCursor::new(&adata, a.width(), a.roi());
        let mut cb = RoiCursor::new(&bdata, b.width(), b.roi());
        for o in RoiIterMut::new(&mut ddata, dst.width(), dst.roi()) {
            *o = f(ca.value(), cb.value());
            ca.advance();
            cb.advance();
        }
    }
    Ok(())
}

fn unary_op<T: Pixel>(
    src: &Img<T>,
    dst: &mut Img<T>,
    f: impl Fn(T) -> T,
) -> Result<(), Error> {
    prepare_dst(src, dst, src.roi())?;

    for ch in 0..src.channel_count() {
        let sdata = src.channel(ch).read();
        let mut ddata = dst.channel(ch).write();

        let mut cur = RoiCursor::new(&sdata, src.width(), src.roi());
        for o in RoiIterMut::new(&mut ddata, dst.width(), dst.roi()) {
            *o = f(cur.value());
            cur.advance();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{and, not, or_const, xor};
    use il_core::{Error, Img, Rect, Size};

    fn pair() -> (Img<u8>, Img<u8>) {
        let a = Img::from_planes(Size::new(2, 2), vec![vec![2u8, 3, 4, 5]])
            .expect("valid image");
        let b = Img::from_planes(Size::new(2, 2), vec![vec![2u8, 4, 6, 8]])
            .expect("valid image");
        (a, b)
    }

    #[test]
    fn and_matches_bit_patterns() {
        let (a, b) = pair();
        let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");
        and(&a, &b, &mut dst).expect("and");

        // Expected output computed from the operands' bit patterns rather
        // than assumed as a table.
        let expected: Vec<u8> = a
            .channel(0)
            .to_vec()
            .iter()
            .zip(b.channel(0).to_vec())
            .map(|(&x, y)| x & y)
            .collect();
        assert_eq!(dst.channel(0).to_vec(), expected);
        assert_eq!(expected, vec![2, 0, 4, 0]);
    }

    #[test]
    fn xor_respects_differing_roi_offsets() {
        let (mut a, mut b) = pair();
        a.set_roi(Some(Rect::new(0, 0, 1, 2))).expect("valid roi");
        b.set_roi(Some(Rect::new(1, 0, 1, 2))).expect("valid roi");

        let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");
        xor(&a, &b, &mut dst).expect("xor");

        // a roi column {2, 4} against b roi column {4, 8}.
        assert_eq!(dst.roi(), Rect::new(0, 0, 1, 2));
        let out = dst.channel(0).to_vec();
        assert_eq!(out[0], 2 ^ 4);
        assert_eq!(out[2], 4 ^ 8);
    }

    #[test]
    fn roi_size_mismatch_is_an_error() {
        let (mut a, b) = pair();
        a.set_roi(Some(Rect::new(0, 0, 1, 1))).expect("valid roi");
        let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");

        assert!(matches!(
            and(&a, &b, &mut dst),
            Err(Error::RoiSizeMismatch { .. })
        ));
    }

    #[test]
    fn not_and_const_variants() {
        let (a, _) = pair();
        let mut dst = Img::<u8>::with_channels(Size::new(1, 1), 1).expect("valid image");

        not(&a, &mut dst).expect("not");
        assert_eq!(dst.channel(0).to_vec(), vec![253, 252, 251, 250]);

        or_const(&a, 0xF0, &mut dst).expect("or_const");
        assert_eq!(dst.channel(0).to_vec(), vec![0xF2, 0xF3, 0xF4, 0xF5]);
    }

    #[test]
    fn float_logic_casts_through_integers() {
        let a = Img::from_planes(Size::new(2, 1), vec![vec![6.0f32, 5.0]])
            .expect("valid image");
        let b = Img::from_planes(Size::new(2, 1), vec![vec![3.0f32, 3.0]])
            .expect("valid image");
        let mut dst = Img::<f32>::with_channels(Size::new(1, 1), 1).expect("valid image");

        and(&a, &b, &mut dst).expect("and");
        assert_eq!(dst.channel(0).to_vec(), vec![2.0, 1.0]);
    }
}

//! 2D convolution over the container's ROI protocol.
//!
//! For each output pixel the accumulator is
//! `sum(kernel[i, j] * src[x + i - anchor.x, y + j - anchor.y])`. The
//! integer path divides by the kernel's normalization factor with rounding
//! and clamps into the pixel range; the float path uses the pre-normalized
//! coefficients as-is.

use log::debug;

use il_core::{Depth, DynImg, Error, Img, Pixel, RoiCursor, RoiIterMut};

use crate::kernel::Kernel;
use crate::neighborhood::{eroded_roi_anchored, prepare_dst};

/// Convolves every channel of `src` into `dst` under the ROI-erosion
/// protocol. The working region follows the kernel anchor, so off-center
/// anchors erode asymmetrically and the window stays inside the source
/// ROI. The path (integer vs float accumulation) is chosen per the source
/// depth and the kernel's representations.
pub fn convolve<T: Pixel>(src: &Img<T>, dst: &mut Img<T>, kernel: &Kernel) -> Result<(), Error> {
    let region = eroded_roi_anchored(src.roi(), kernel.size(), kernel.anchor())?;
    prepare_dst(src, dst, region)?;

    let use_int = T::DEPTH == Depth::U8 && kernel.has_int();
    for ch in 0..src.channel_count() {
        let sdata = src.channel(ch).read();
        let mut ddata = dst.channel(ch).write();

        let mut cur = RoiCursor::new(&sdata, src.width(), region);
        let out = RoiIterMut::new(&mut ddata, dst.width(), region);

        if use_int {
            let coeffs = kernel.coeffs_i32().expect("integer form present");
            let norm = kernel.norm();
            for o in out {
                let mut acc = 0i32;
                for (&s, &c) in cur.window(kernel.size(), kernel.anchor()).zip(coeffs) {
                    acc += c * s.to_i32();
                }
                *o = T::from_i32(round_div(acc, norm));
                cur.advance();
            }
        } else {
            let coeffs = kernel.coeffs_f32();
            for o in out {
                let mut acc = 0f32;
                for (&s, &c) in cur.window(kernel.size(), kernel.anchor()).zip(coeffs) {
                    acc += c * s.to_f32();
                }
                *o = T::from_f32(acc);
                cur.advance();
            }
        }
    }
    Ok(())
}

/// Depth-dispatched convolution. Same-depth pairs run directly; mismatched
/// pairs fall back through an explicit depth conversion.
pub fn convolve_dyn(src: &DynImg, dst: &mut DynImg, kernel: &Kernel) -> Result<(), Error> {
    match (src, dst) {
        (DynImg::U8(s), DynImg::U8(d)) => convolve(s, d, kernel),
        (DynImg::F32(s), DynImg::F32(d)) => convolve(s, d, kernel),
        (DynImg::U8(s), DynImg::F32(d)) => {
            debug!("convolve_dyn: converting u8 source to f32");
            let tmp: Img<f32> = s.convert();
            convolve(&tmp, d, kernel)
        }
        (DynImg::F32(s), DynImg::U8(d)) => {
            debug!("convolve_dyn: f32 convolution, converting result to u8");
            let mut tmp = Img::<f32>::from_params(s.params().clone());
            convolve(s, &mut tmp, kernel)?;
            *d = tmp.convert();
            Ok(())
        }
    }
}

/// Integer division rounding half away from zero, matching the narrow
/// pixel path's "accumulate, divide by norm, round" contract.
fn round_div(acc: i32, norm: i32) -> i32 {
    let half = norm.abs() / 2;
    if (acc < 0) != (norm < 0) {
        (acc - half) / norm
    } else {
        (acc + half) / norm
    }
}

#[cfg(test)]
mod tests {
    use super::{convolve, convolve_dyn, round_div};
    use crate::kernel::Kernel;
    use il_core::{DynImg, Error, Format, Img, Point, Rect, RoiIter, Size};

    fn ramp(size: Size) -> Img<u8> {
        let data: Vec<u8> = (0..size.area() as u8).collect();
        Img::from_planes(size, vec![data]).expect("valid image")
    }

    #[test]
    fn identity_kernel_preserves_interior_pixels() {
        let src = ramp(Size::new(6, 6));
        let mut dst = Img::<u8>::new(Size::new(1, 1), Format::Gray).expect("valid image");

        convolve(&src, &mut dst, &Kernel::identity(Size::new(3, 3)).expect("kernel"))
            .expect("convolve");

        assert_eq!(dst.roi(), Rect::new(1, 1, 4, 4));
        let sdata = src.channel(0).read();
        let ddata = dst.channel(0).read();
        let s: Vec<u8> = RoiIter::new(&sdata, 6, dst.roi()).copied().collect();
        let d: Vec<u8> = RoiIter::new(&ddata, 6, dst.roi()).copied().collect();
        assert_eq!(s, d);
    }

    #[test]
    fn box_blur_averages_with_rounding() {
        let src = Img::from_planes(
            Size::new(3, 3),
            vec![vec![0u8, 0, 0, 0, 9, 0, 0, 0, 0]],
        )
        .expect("valid image");
        let mut dst = Img::<u8>::new(Size::new(3, 3), Format::Gray).expect("valid image");

        convolve(&src, &mut dst, &Kernel::box_blur(Size::new(3, 3)).expect("kernel"))
            .expect("convolve");

        // Single output pixel: sum 9 over 9 taps = 1.
        assert_eq!(dst.roi(), Rect::new(1, 1, 1, 1));
        assert_eq!(dst.channel(0).read()[4], 1);
    }

    #[test]
    fn float_kernel_runs_float_path_on_u8() {
        // Non-integral coefficients: forced float path, result rounded.
        let k = Kernel::from_f32(
            Size::new(3, 1),
            Point::new(1, 0),
            vec![0.25, 0.5, 0.25],
        )
        .expect("kernel");
        assert!(!k.has_int());

        let src = Img::from_planes(Size::new(5, 1), vec![vec![0u8, 4, 8, 4, 0]])
            .expect("valid image");
        let mut dst = Img::<u8>::new(Size::new(1, 1), Format::Gray).expect("valid image");
        convolve(&src, &mut dst, &k).expect("convolve");

        let out = dst.channel(0).to_vec();
        assert_eq!(&out[1..4], &[4, 6, 4]);
    }

    #[test]
    fn corner_anchored_kernels_erode_toward_the_anchor() {
        // Weight 1 at the anchor: output equals input over the working
        // region, so any out-of-region sampling would show up as a
        // mismatch (or an out-of-bounds panic at the image edge).
        let src = ramp(Size::new(5, 5));
        let mut dst = Img::<u8>::new(Size::new(1, 1), Format::Gray).expect("valid image");

        let top_left = Kernel::from_i32(
            Size::new(3, 3),
            Point::new(0, 0),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0],
            1,
        )
        .expect("kernel");
        convolve(&src, &mut dst, &top_left).expect("convolve");
        assert_eq!(dst.roi(), Rect::new(0, 0, 3, 3));
        {
            let sdata = src.channel(0).read();
            let ddata = dst.channel(0).read();
            let s: Vec<u8> = RoiIter::new(&sdata, 5, dst.roi()).copied().collect();
            let d: Vec<u8> = RoiIter::new(&ddata, 5, dst.roi()).copied().collect();
            assert_eq!(s, d);
        }

        let bottom_right = Kernel::from_i32(
            Size::new(3, 3),
            Point::new(2, 2),
            vec![0, 0, 0, 0, 0, 0, 0, 0, 1],
            1,
        )
        .expect("kernel");
        convolve(&src, &mut dst, &bottom_right).expect("convolve");
        assert_eq!(dst.roi(), Rect::new(2, 2, 3, 3));
        let sdata = src.channel(0).read();
        let ddata = dst.channel(0).read();
        let s: Vec<u8> = RoiIter::new(&sdata, 5, dst.roi()).copied().collect();
        let d: Vec<u8> = RoiIter::new(&ddata, 5, dst.roi()).copied().collect();
        assert_eq!(s, d);
    }

    #[test]
    fn roi_too_small_is_rejected() {
        let mut src = ramp(Size::new(6, 6));
        src.set_roi(Some(Rect::new(0, 0, 2, 2))).expect("valid roi");
        let mut dst = Img::<u8>::new(Size::new(1, 1), Format::Gray).expect("valid image");

        assert!(matches!(
            convolve(&src, &mut dst, &Kernel::gauss3()),
            Err(Error::RoiTooSmall { .. })
        ));
    }

    #[test]
    fn dyn_dispatch_converts_mismatched_depths() {
        let src = DynImg::from(ramp(Size::new(6, 6)));
        let mut dst = DynImg::F32(
            Img::<f32>::with_channels(Size::new(1, 1), 1).expect("valid image"),
        );

        convolve_dyn(&src, &mut dst, &Kernel::identity(Size::new(3, 3)).expect("kernel"))
            .expect("convolve");
        let out = dst.as_f32().expect("f32 result");
        assert_eq!(out.roi(), Rect::new(1, 1, 4, 4));
        assert_eq!(out.channel(0).read()[1 * 6 + 1], 7.0);
    }

    #[test]
    fn rounding_division_is_symmetric() {
        assert_eq!(round_div(7, 2), 4);
        assert_eq!(round_div(-7, 2), -4);
        assert_eq!(round_div(6, 4), 2);
        assert_eq!(round_div(5, 16), 0);
        assert_eq!(round_div(8, 16), 1);
    }
}

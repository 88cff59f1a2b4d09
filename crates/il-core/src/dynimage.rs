use log::debug;

use crate::error::Error;
use crate::geom::{Rect, Size};
use crate::image::Img;
use crate::params::{Format, ImageParams};
use crate::pixel::{Depth, Pixel};
use crate::sample::ScaleMode;

/// Depth-erased image handle: a tagged union over the supported depths.
///
/// This replaces unchecked reinterpretation with a closed sum type —
/// callers match on [`DynImg::depth`] (or use the checked downcasts) and
/// an impossible depth simply does not exist. The depth-crossing copy and
/// scale operations route through an explicit conversion, never through a
/// reinterpreted buffer.
#[derive(Debug, Clone)]
pub enum DynImg {
    U8(Img<u8>),
    F32(Img<f32>),
}

impl From<Img<u8>> for DynImg {
    fn from(img: Img<u8>) -> Self {
        DynImg::U8(img)
    }
}

impl From<Img<f32>> for DynImg {
    fn from(img: Img<f32>) -> Self {
        DynImg::F32(img)
    }
}

impl DynImg {
    /// Zero-filled image of the given depth, matching `params`.
    pub fn from_params(depth: Depth, params: ImageParams) -> Self {
        match depth {
            Depth::U8 => DynImg::U8(Img::from_params(params)),
            Depth::F32 => DynImg::F32(Img::from_params(params)),
        }
    }

    pub fn depth(&self) -> Depth {
        match self {
            DynImg::U8(_) => Depth::U8,
            DynImg::F32(_) => Depth::F32,
        }
    }

    pub fn params(&self) -> &ImageParams {
        match self {
            DynImg::U8(img) => img.params(),
            DynImg::F32(img) => img.params(),
        }
    }

    pub fn size(&self) -> Size {
        self.params().size()
    }

    pub fn format(&self) -> Format {
        self.params().format()
    }

    pub fn channel_count(&self) -> usize {
        self.params().channels()
    }

    pub fn roi(&self) -> Rect {
        self.params().roi()
    }

    pub fn set_roi(&mut self, roi: Option<Rect>) -> Result<(), Error> {
        match self {
            DynImg::U8(img) => img.set_roi(roi),
            DynImg::F32(img) => img.set_roi(roi),
        }
    }

    pub fn as_u8(&self) -> Option<&Img<u8>> {
        match self {
            DynImg::U8(img) => Some(img),
            DynImg::F32(_) => None,
        }
    }

    pub fn as_u8_mut(&mut self) -> Option<&mut Img<u8>> {
        match self {
            DynImg::U8(img) => Some(img),
            DynImg::F32(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<&Img<f32>> {
        match self {
            DynImg::F32(img) => Some(img),
            DynImg::U8(_) => None,
        }
    }

    pub fn as_f32_mut(&mut self) -> Option<&mut Img<f32>> {
        match self {
            DynImg::F32(img) => Some(img),
            DynImg::U8(_) => None,
        }
    }

    /// Fully independent copy at the same depth.
    pub fn deep_copy(&self) -> Self {
        match self {
            DynImg::U8(img) => DynImg::U8(img.deep_copy()),
            DynImg::F32(img) => DynImg::F32(img.deep_copy()),
        }
    }

    /// Independent copy at `depth`, converting when the depths differ.
    pub fn convert_to(&self, depth: Depth) -> Self {
        match (self, depth) {
            (DynImg::U8(img), Depth::U8) => DynImg::U8(img.deep_copy()),
            (DynImg::F32(img), Depth::F32) => DynImg::F32(img.deep_copy()),
            (DynImg::U8(img), Depth::F32) => DynImg::F32(img.convert()),
            (DynImg::F32(img), Depth::U8) => DynImg::U8(img.convert()),
        }
    }

    /// Whole-image copy into `dst`, keeping the destination's depth. A
    /// depth mismatch routes through [`DynImg::convert_to`] first.
    pub fn deep_copy_into(&self, dst: &mut DynImg) {
        match (self, dst) {
            (DynImg::U8(src), DynImg::U8(out)) => src.deep_copy_into(out),
            (DynImg::F32(src), DynImg::F32(out)) => src.deep_copy_into(out),
            (src, out) => {
                debug!(
                    "deep_copy_into: converting {:?} -> {:?}",
                    src.depth(),
                    out.depth()
                );
                match (src.convert_to(out.depth()), out) {
                    (DynImg::U8(tmp), DynImg::U8(out)) => tmp.deep_copy_into(out),
                    (DynImg::F32(tmp), DynImg::F32(out)) => tmp.deep_copy_into(out),
                    _ => unreachable!("convert_to matches the destination depth"),
                }
            }
        }
    }

    /// Whole-image resample into `dst`. When the depths differ the source
    /// is scaled into a same-depth temporary of the destination's geometry
    /// and then depth-converted — the documented two-step fallback.
    pub fn scaled_copy_into(&self, dst: &mut DynImg, mode: ScaleMode) -> Result<(), Error> {
        match (self, dst) {
            (DynImg::U8(src), DynImg::U8(out)) => src.scaled_copy_into(out, mode),
            (DynImg::F32(src), DynImg::F32(out)) => src.scaled_copy_into(out, mode),
            (src, out) => {
                debug!(
                    "scaled_copy_into: two-step fallback {:?} -> {:?}",
                    src.depth(),
                    out.depth()
                );
                let mut tmp = DynImg::from_params(src.depth(), out.params().clone());
                src.scaled_copy_into(&mut tmp, mode)?;
                tmp.convert_to(out.depth()).deep_copy_into(out);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DynImg;
    use crate::geom::Size;
    use crate::image::Img;
    use crate::pixel::Depth;
    use crate::sample::ScaleMode;

    fn ramp_u8() -> Img<u8> {
        Img::from_planes(Size::new(4, 4), vec![(0..16).collect()]).expect("valid image")
    }

    #[test]
    fn downcasts_are_depth_checked() {
        let dyn_img = DynImg::from(ramp_u8());

        assert_eq!(dyn_img.depth(), Depth::U8);
        assert!(dyn_img.as_u8().is_some());
        assert!(dyn_img.as_f32().is_none());
    }

    #[test]
    fn convert_to_changes_depth_without_rescaling_values() {
        let dyn_img = DynImg::from(ramp_u8());
        let as_f32 = dyn_img.convert_to(Depth::F32);

        let img = as_f32.as_f32().expect("f32 image");
        assert_eq!(img.channel(0).read()[5], 5.0);
    }

    #[test]
    fn cross_depth_deep_copy_round_trips() {
        let src = DynImg::from(ramp_u8());
        let mut dst = DynImg::F32(
            Img::<f32>::with_channels(Size::new(2, 2), 1).expect("valid image"),
        );

        src.deep_copy_into(&mut dst);
        let out = dst.as_f32().expect("f32 image");
        assert_eq!(out.size(), Size::new(4, 4));
        assert_eq!(out.channel(0).read()[15], 15.0);
    }

    #[test]
    fn cross_depth_scaled_copy_uses_two_step_fallback() {
        let src = DynImg::from(ramp_u8());
        let mut dst = DynImg::F32(
            Img::<f32>::with_channels(Size::new(2, 2), 1).expect("valid image"),
        );

        src.scaled_copy_into(&mut dst, ScaleMode::Nearest)
            .expect("cross-depth scaling");
        let out = dst.as_f32().expect("f32 image");
        assert_eq!(out.channel(0).to_vec(), vec![0.0, 2.0, 8.0, 10.0]);
    }
}

use log::warn;

use crate::channel::ChannelBuffer;
use crate::error::Error;
use crate::geom::{Rect, Size};
use crate::iter::RoiIter;
use crate::params::{Format, ImageParams};
use crate::pixel::Pixel;
use crate::sample::{ScaleMode, scale_plane};

/// Depth-templated multi-channel image.
///
/// Holds validated [`ImageParams`] plus one [`ChannelBuffer`] per channel;
/// channel order is significant (channel 0/1/2 of an `Rgb` image are
/// R/G/B). All channel buffers have the image's size at all times, and the
/// params stay self-consistent after every mutating call.
///
/// `Clone` is shallow: the clone shares every channel buffer with the
/// original. Pixel independence is established per channel with
/// [`Img::detach`].
#[derive(Debug, Clone)]
pub struct Img<T> {
    params: ImageParams,
    channels: Vec<ChannelBuffer<T>>,
}

impl<T: Pixel> Img<T> {
    /// Zero-filled image with a fixed-channel format.
    pub fn new(size: Size, format: Format) -> Result<Self, Error> {
        Ok(Self::from_params(ImageParams::new(size, format)?))
    }

    /// Zero-filled `Matrix` image with `channels` planes.
    pub fn with_channels(size: Size, channels: usize) -> Result<Self, Error> {
        Ok(Self::from_params(ImageParams::with_channels(
            size, channels,
        )?))
    }

    pub fn with_format_channels(
        size: Size,
        format: Format,
        channels: usize,
    ) -> Result<Self, Error> {
        Ok(Self::from_params(ImageParams::with_format_channels(
            size, format, channels,
        )?))
    }

    /// Zero-filled image matching `params` exactly (including its ROI).
    pub fn from_params(params: ImageParams) -> Self {
        let channels = (0..params.channels())
            .map(|_| ChannelBuffer::new(params.size()))
            .collect();
        Self { params, channels }
    }

    /// Adopts caller-provided planes as a `Matrix` image; every plane must
    /// hold exactly `size.area()` elements.
    pub fn from_planes(size: Size, planes: Vec<Vec<T>>) -> Result<Self, Error> {
        let params = ImageParams::with_channels(size, planes.len())?;
        let channels = planes
            .into_iter()
            .map(|p| ChannelBuffer::from_vec(size, p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { params, channels })
    }

    pub fn params(&self) -> &ImageParams {
        &self.params
    }

    pub fn size(&self) -> Size {
        self.params.size()
    }

    pub fn width(&self) -> usize {
        self.params.size().width
    }

    pub fn height(&self) -> usize {
        self.params.size().height
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn format(&self) -> Format {
        self.params.format()
    }

    pub fn roi(&self) -> Rect {
        self.params.roi()
    }

    pub fn set_roi(&mut self, roi: Option<Rect>) -> Result<(), Error> {
        self.params.set_roi(roi)
    }

    /// Channel handle; panics when `index` is out of range.
    pub fn channel(&self, index: usize) -> &ChannelBuffer<T> {
        &self.channels[index]
    }

    pub fn try_channel(&self, index: usize) -> Option<&ChannelBuffer<T>> {
        self.channels.get(index)
    }

    /// True when `self` and `other` share at least one channel buffer.
    pub fn aliases(&self, other: &Img<T>) -> bool {
        self.channels
            .iter()
            .any(|a| other.channels.iter().any(|b| ChannelBuffer::ptr_eq(a, b)))
    }

    // ── deep copies ──────────────────────────────────────────────────────

    /// Fully independent pixel-for-pixel copy of the whole image.
    pub fn deep_copy(&self) -> Self {
        Self {
            params: self.params.clone(),
            channels: self.channels.iter().map(|c| c.duplicate()).collect(),
        }
    }

    /// Whole-image copy into `dst`, reshaping it on demand. `dst` adopts
    /// the source geometry, format and ROI. Existing destination buffers of
    /// matching size are written in place, so holders sharing them observe
    /// the copy.
    pub fn deep_copy_into(&self, dst: &mut Self) {
        // Cross-index aliasing (dst channel j sharing src channel i, i != j)
        // would deadlock the guards below; those destinations get fresh
        // planes instead.
        let cross_alias = self.channels.iter().enumerate().any(|(i, s)| {
            dst.channels
                .iter()
                .enumerate()
                .any(|(j, d)| i != j && ChannelBuffer::ptr_eq(s, d))
        });
        let reuse = !cross_alias
            && dst.size() == self.size()
            && dst.channel_count() == self.channel_count();
        if !reuse {
            dst.channels = (0..self.channel_count())
                .map(|_| ChannelBuffer::new(self.size()))
                .collect();
        }

        for (s, d) in self.channels.iter().zip(&dst.channels) {
            if ChannelBuffer::ptr_eq(s, d) {
                continue;
            }
            d.write().copy_from_slice(&s.read());
        }
        dst.params = self.params.clone();
    }

    /// Copies the source ROI into the destination ROI. The two ROIs must
    /// have equal size and the channel counts must match; on error the
    /// destination is untouched.
    pub fn deep_copy_roi_into(&self, dst: &mut Self) -> Result<(), Error> {
        if self.channel_count() != dst.channel_count() {
            warn!(
                "deep_copy_roi_into: channel count mismatch ({} vs {})",
                self.channel_count(),
                dst.channel_count()
            );
            return Err(Error::ChannelCountMismatch {
                a: self.channel_count(),
                b: dst.channel_count(),
            });
        }

        let sroi = self.roi();
        let droi = dst.roi();
        if sroi.size() != droi.size() {
            warn!(
                "deep_copy_roi_into: roi size mismatch ({:?} vs {:?})",
                sroi.size(),
                droi.size()
            );
            return Err(Error::RoiSizeMismatch {
                src: sroi.size(),
                dst: droi.size(),
            });
        }
        if self.aliases(dst) {
            warn!("deep_copy_roi_into: source and destination alias");
            return Err(Error::AliasedBuffers);
        }

        let sw = self.width();
        let dw = dst.width();
        for (s, d) in self.channels.iter().zip(&dst.channels) {
            let src = s.read();
            let mut out = d.write();
            for row in 0..sroi.height {
                let ss = (sroi.y + row) * sw + sroi.x;
                let ds = (droi.y + row) * dw + droi.x;
                out[ds..ds + sroi.width].copy_from_slice(&src[ss..ss + sroi.width]);
            }
        }
        Ok(())
    }

    // ── scaled copies ────────────────────────────────────────────────────

    /// Resamples the whole source into the whole destination. The
    /// destination keeps its size (that is the scaling target); its channel
    /// count is adapted to the source.
    pub fn scaled_copy_into(&self, dst: &mut Self, mode: ScaleMode) -> Result<(), Error> {
        if self.aliases(dst) {
            warn!("scaled_copy_into: source and destination alias");
            return Err(Error::AliasedBuffers);
        }
        dst.set_channel_count(self.channel_count())?;
        dst.params.set_format(self.format());

        let (sfull, dfull) = (
            Rect::of_size(self.size()),
            Rect::of_size(dst.size()),
        );
        for (s, d) in self.channels.iter().zip(&dst.channels) {
            scale_plane(
                &s.read(),
                self.width(),
                sfull,
                &mut d.write(),
                dst.width(),
                dfull,
                mode,
            )?;
        }
        Ok(())
    }

    /// ROI-restricted variant of [`Img::scaled_copy_into`]: resamples the
    /// source ROI into the destination ROI.
    pub fn scaled_copy_roi_into(&self, dst: &mut Self, mode: ScaleMode) -> Result<(), Error> {
        if self.aliases(dst) {
            warn!("scaled_copy_roi_into: source and destination alias");
            return Err(Error::AliasedBuffers);
        }
        if self.channel_count() != dst.channel_count() {
            warn!(
                "scaled_copy_roi_into: channel count mismatch ({} vs {})",
                self.channel_count(),
                dst.channel_count()
            );
            return Err(Error::ChannelCountMismatch {
                a: self.channel_count(),
                b: dst.channel_count(),
            });
        }

        for (s, d) in self.channels.iter().zip(&dst.channels) {
            scale_plane(
                &s.read(),
                self.width(),
                self.roi(),
                &mut d.write(),
                dst.width(),
                dst.roi(),
                mode,
            )?;
        }
        Ok(())
    }

    // ── channel composition ─────────────────────────────────────────────

    /// Replaces shared channel references with private deep copies; one
    /// channel, or all of them when `channel` is `None`. Always copies.
    pub fn detach(&mut self, channel: Option<usize>) -> Result<(), Error> {
        match channel {
            None => {
                for c in &mut self.channels {
                    c.detach();
                }
                Ok(())
            }
            Some(i) => {
                let count = self.channels.len();
                self.channels
                    .get_mut(i)
                    .ok_or(Error::ChannelOutOfRange { index: i, count })?
                    .detach();
                Ok(())
            }
        }
    }

    /// Grows with zero-filled planes or shrinks by dropping trailing ones.
    /// Refuses to shrink to zero channels.
    pub fn set_channel_count(&mut self, count: usize) -> Result<(), Error> {
        if count == 0 {
            return Err(Error::ZeroChannels);
        }
        if count == self.channels.len() {
            return Ok(());
        }

        self.params.set_channels(count)?;
        let size = self.size();
        self.channels.resize_with(count, || ChannelBuffer::new(size));
        Ok(())
    }

    /// Appends every channel of `other`, sharing its buffers. Both images
    /// must have equal size; on mismatch nothing changes.
    pub fn append(&mut self, other: &Img<T>) -> Result<(), Error> {
        self.check_same_size(other, "append")?;
        self.params
            .set_channels(self.channels.len() + other.channels.len())?;
        self.channels.extend(other.channels.iter().cloned());
        Ok(())
    }

    /// Appends channel `index` of `other`, sharing its buffer.
    pub fn append_channel(&mut self, other: &Img<T>, index: usize) -> Result<(), Error> {
        self.check_same_size(other, "append_channel")?;
        let donor = other
            .try_channel(index)
            .ok_or(Error::ChannelOutOfRange {
                index,
                count: other.channel_count(),
            })?
            .clone();
        self.params.set_channels(self.channels.len() + 1)?;
        self.channels.push(donor);
        Ok(())
    }

    pub fn swap_channels(&mut self, a: usize, b: usize) -> Result<(), Error> {
        let count = self.channels.len();
        if a >= count {
            return Err(Error::ChannelOutOfRange { index: a, count });
        }
        if b >= count {
            return Err(Error::ChannelOutOfRange { index: b, count });
        }
        self.channels.swap(a, b);
        Ok(())
    }

    /// Replaces channel `index` with a shared reference to channel
    /// `other_index` of `other`.
    pub fn replace_channel(
        &mut self,
        index: usize,
        other: &Img<T>,
        other_index: usize,
    ) -> Result<(), Error> {
        self.check_same_size(other, "replace_channel")?;
        let count = self.channels.len();
        if index >= count {
            return Err(Error::ChannelOutOfRange { index, count });
        }
        let donor = other
            .try_channel(other_index)
            .ok_or(Error::ChannelOutOfRange {
                index: other_index,
                count: other.channel_count(),
            })?
            .clone();
        self.channels[index] = donor;
        Ok(())
    }

    fn check_same_size(&self, other: &Img<T>, op: &str) -> Result<(), Error> {
        if self.size() != other.size() {
            warn!(
                "{op}: image size mismatch ({:?} vs {:?})",
                self.size(),
                other.size()
            );
            return Err(Error::ShapeMismatch {
                a: self.size(),
                b: other.size(),
            });
        }
        Ok(())
    }

    // ── statistics and value remapping ──────────────────────────────────

    /// Minimum over the whole channel buffer (not ROI-restricted; see
    /// [`Img::min_max_roi`] for the ROI-aware scan).
    pub fn min(&self, channel: usize) -> Result<T, Error> {
        self.min_max(channel).map(|(lo, _)| lo)
    }

    /// Maximum over the whole channel buffer.
    pub fn max(&self, channel: usize) -> Result<T, Error> {
        self.min_max(channel).map(|(_, hi)| hi)
    }

    /// Whole-buffer min/max scan of one channel.
    pub fn min_max(&self, channel: usize) -> Result<(T, T), Error> {
        let c = self.try_channel(channel).ok_or(Error::ChannelOutOfRange {
            index: channel,
            count: self.channel_count(),
        })?;
        Ok(min_max_of(c.read().iter().copied()))
    }

    /// ROI-restricted min/max scan of one channel.
    pub fn min_max_roi(&self, channel: usize) -> Result<(T, T), Error> {
        let c = self.try_channel(channel).ok_or(Error::ChannelOutOfRange {
            index: channel,
            count: self.channel_count(),
        })?;
        let data = c.read();
        Ok(min_max_of(
            RoiIter::new(&data, self.width(), self.roi()).copied(),
        ))
    }

    /// Fills one channel, or all channels when `channel` is `None`.
    pub fn clear(&mut self, channel: Option<usize>, value: T) -> Result<(), Error> {
        match channel {
            None => {
                for c in &self.channels {
                    c.fill(value);
                }
                Ok(())
            }
            Some(i) => {
                self.try_channel(i)
                    .ok_or(Error::ChannelOutOfRange {
                        index: i,
                        count: self.channel_count(),
                    })?
                    .fill(value);
                Ok(())
            }
        }
    }

    /// Affine remap of the whole buffer(s) into `[new_min, new_max]`:
    /// `v' = clamp(v * scale + shift)` with
    /// `scale = (new_max - new_min) / (old_max - old_min)`. When the old
    /// bounds are omitted they are taken from the whole-buffer min/max of
    /// the selected channel(s), computed jointly for `None`.
    pub fn scale_range(
        &mut self,
        new_min: f32,
        new_max: f32,
        old: Option<(f32, f32)>,
        channel: Option<usize>,
    ) -> Result<(), Error> {
        let indices: Vec<usize> = match channel {
            None => (0..self.channel_count()).collect(),
            Some(i) => {
                if i >= self.channel_count() {
                    return Err(Error::ChannelOutOfRange {
                        index: i,
                        count: self.channel_count(),
                    });
                }
                vec![i]
            }
        };

        let (old_min, old_max) = match old {
            Some(bounds) => bounds,
            None => {
                let mut lo = f32::INFINITY;
                let mut hi = f32::NEG_INFINITY;
                for &i in &indices {
                    let (c_lo, c_hi) = self.min_max(i)?;
                    lo = lo.min(c_lo.to_f32());
                    hi = hi.max(c_hi.to_f32());
                }
                (lo, hi)
            }
        };

        if old_min == old_max {
            return Err(Error::DegenerateRange);
        }

        let scale = (new_max - new_min) / (old_max - old_min);
        let shift = (old_max * new_min - old_min * new_max) / (old_max - old_min);
        let (lo, hi) = if new_min <= new_max {
            (new_min, new_max)
        } else {
            (new_max, new_min)
        };

        for &i in &indices {
            for v in self.channels[i].write().iter_mut() {
                *v = T::from_f32((v.to_f32() * scale + shift).clamp(lo, hi));
            }
        }
        Ok(())
    }

    /// Depth conversion; `u8` values map to `0.0..=255.0` unscaled, floats
    /// convert back with rounding and clamping.
    pub fn convert<U: Pixel>(&self) -> Img<U> {
        let channels = self
            .channels
            .iter()
            .map(|c| {
                let data: Vec<U> = c.read().iter().map(|v| U::from_f32(v.to_f32())).collect();
                ChannelBuffer::from_vec(self.size(), data).expect("plane length preserved")
            })
            .collect();
        Img {
            params: self.params.clone(),
            channels,
        }
    }

    /// Reshapes `self` in place so its params match `desired` exactly.
    /// Newly allocated planes are zero-filled; planes kept across the call
    /// retain their pixels. This is the primitive external frame producers
    /// use to fit a caller-supplied destination.
    pub fn ensure_compatible(&mut self, desired: &ImageParams) {
        if self.params == *desired {
            return;
        }

        if self.size() != desired.size() {
            self.channels = (0..desired.channels())
                .map(|_| ChannelBuffer::new(desired.size()))
                .collect();
        } else {
            let size = self.size();
            self.channels
                .resize_with(desired.channels(), || ChannelBuffer::new(size));
        }
        self.params = desired.clone();
    }
}

fn min_max_of<T: Pixel>(mut iter: impl Iterator<Item = T>) -> (T, T) {
    let first = iter.next().expect("non-empty plane");
    iter.fold((first, first), |(lo, hi), v| {
        (if v < lo { v } else { lo }, if hi < v { v } else { hi })
    })
}

#[cfg(test)]
mod tests {
    use super::Img;
    use crate::channel::ChannelBuffer;
    use crate::error::Error;
    use crate::geom::{Rect, Size};
    use crate::params::Format;
    use crate::sample::ScaleMode;

    fn ramp_u8(size: Size) -> Img<u8> {
        let data: Vec<u8> = (0..size.area() as u8).collect();
        Img::from_planes(size, vec![data]).expect("valid image")
    }

    #[test]
    fn shallow_clone_aliases_deep_copy_does_not() {
        let img = ramp_u8(Size::new(4, 4));
        let shallow = img.clone();
        let deep = img.deep_copy();

        img.channel(0).write()[0] = 99;
        assert_eq!(shallow.channel(0).read()[0], 99);
        assert_eq!(deep.channel(0).read()[0], 0);
    }

    #[test]
    fn deep_copy_is_idempotent() {
        let mut img = ramp_u8(Size::new(4, 4));
        img.set_roi(Some(Rect::new(1, 1, 2, 2))).expect("valid roi");

        let once = img.deep_copy();
        let twice = once.deep_copy();
        assert_eq!(once.channel(0).to_vec(), twice.channel(0).to_vec());
        assert_eq!(once.params(), twice.params());
    }

    #[test]
    fn detach_isolates_prior_shallow_copy() {
        let mut img = ramp_u8(Size::new(2, 2));
        let before = img.clone();

        img.detach(None).expect("detach all");
        img.channel(0).write()[0] = 42;
        assert_eq!(before.channel(0).read()[0], 0);
    }

    #[test]
    fn deep_copy_roi_requires_equal_roi_sizes() {
        let mut src = ramp_u8(Size::new(4, 4));
        src.set_roi(Some(Rect::new(0, 0, 2, 2))).expect("valid roi");

        let mut dst = Img::<u8>::new(Size::new(5, 5), Format::Gray).expect("valid image");
        dst.set_roi(Some(Rect::new(1, 1, 3, 3))).expect("valid roi");
        assert!(matches!(
            src.deep_copy_roi_into(&mut dst),
            Err(Error::RoiSizeMismatch { .. })
        ));

        dst.set_roi(Some(Rect::new(2, 2, 2, 2))).expect("valid roi");
        src.deep_copy_roi_into(&mut dst).expect("roi copy");
        let out = dst.channel(0).to_vec();
        assert_eq!(out[2 * 5 + 2], 0);
        assert_eq!(out[2 * 5 + 3], 1);
        assert_eq!(out[3 * 5 + 2], 4);
        assert_eq!(out[3 * 5 + 3], 5);
    }

    #[test]
    fn scaled_copy_nearest_halves_a_ramp() {
        let src = ramp_u8(Size::new(4, 4));
        let mut dst = Img::<u8>::with_channels(Size::new(2, 2), 1).expect("valid image");

        src.scaled_copy_into(&mut dst, ScaleMode::Nearest)
            .expect("nearest scaling");
        assert_eq!(dst.channel(0).to_vec(), vec![0, 2, 8, 10]);
    }

    #[test]
    fn append_shares_the_donor_buffer() {
        let mut a = Img::<u8>::new(Size::new(3, 3), Format::Gray).expect("valid image");
        let b = ramp_u8(Size::new(3, 3));

        a.append_channel(&b, 0).expect("append channel");
        assert_eq!(a.channel_count(), 2);
        assert_eq!(a.format(), Format::Matrix);
        assert!(ChannelBuffer::ptr_eq(a.channel(1), b.channel(0)));

        // Mutation through `a` is visible through `b` until detach.
        a.channel(1).write()[0] = 77;
        assert_eq!(b.channel(0).read()[0], 77);
        a.detach(Some(1)).expect("detach appended channel");
        a.channel(1).write()[0] = 78;
        assert_eq!(b.channel(0).read()[0], 77);
    }

    #[test]
    fn append_rejects_size_mismatch_and_leaves_image_unchanged() {
        let mut a = Img::<u8>::new(Size::new(3, 3), Format::Gray).expect("valid image");
        let b = ramp_u8(Size::new(2, 2));

        assert!(matches!(a.append(&b), Err(Error::ShapeMismatch { .. })));
        assert_eq!(a.channel_count(), 1);
        assert_eq!(a.format(), Format::Gray);
    }

    #[test]
    fn min_max_whole_buffer_vs_roi() {
        let mut img = ramp_u8(Size::new(4, 4));
        img.set_roi(Some(Rect::new(1, 1, 2, 2))).expect("valid roi");

        assert_eq!(img.min_max(0).expect("stats"), (0, 15));
        // ROI covers values {5, 6, 9, 10}.
        assert_eq!(img.min_max_roi(0).expect("stats"), (5, 10));
    }

    #[test]
    fn scale_range_round_trips_within_rounding() {
        let mut img = Img::from_planes(Size::new(2, 2), vec![vec![10.0f32, 20.0, 30.0, 40.0]])
            .expect("valid image");

        img.scale_range(0.0, 255.0, None, None).expect("remap");
        img.scale_range(10.0, 40.0, Some((0.0, 255.0)), None)
            .expect("remap back");

        let out = img.channel(0).to_vec();
        for (v, expected) in out.iter().zip([10.0f32, 20.0, 30.0, 40.0]) {
            assert!((v - expected).abs() < 1e-4, "{v} vs {expected}");
        }
    }

    #[test]
    fn scale_range_rejects_flat_input() {
        let mut img = Img::<u8>::new(Size::new(2, 2), Format::Gray).expect("valid image");
        assert_eq!(
            img.scale_range(0.0, 255.0, None, None),
            Err(Error::DegenerateRange)
        );
    }

    #[test]
    fn set_channel_count_grows_and_refuses_zero() {
        let mut img = Img::<u8>::new(Size::new(2, 2), Format::Rgb).expect("valid image");

        img.set_channel_count(5).expect("grow");
        assert_eq!(img.channel_count(), 5);
        assert_eq!(img.format(), Format::Matrix);
        assert_eq!(img.channel(4).to_vec(), vec![0; 4]);

        img.set_channel_count(2).expect("shrink");
        assert_eq!(img.channel_count(), 2);
        assert_eq!(img.set_channel_count(0), Err(Error::ZeroChannels));
    }

    #[test]
    fn convert_round_trip_u8_f32() {
        let img = ramp_u8(Size::new(2, 2));
        let f = img.convert::<f32>();
        assert_eq!(f.channel(0).to_vec(), vec![0.0, 1.0, 2.0, 3.0]);

        let back = f.convert::<u8>();
        assert_eq!(back.channel(0).to_vec(), img.channel(0).to_vec());
    }

    #[test]
    fn ensure_compatible_reshapes_in_place() {
        use crate::params::ImageParams;

        let mut img = ramp_u8(Size::new(2, 2));
        let desired = ImageParams::with_format_channels(Size::new(4, 3), Format::Rgb, 3)
            .expect("valid params");

        img.ensure_compatible(&desired);
        assert_eq!(img.params(), &desired);
        assert_eq!(img.channel_count(), 3);
        assert_eq!(img.channel(0).len(), 12);

        // Matching params are a no-op that keeps the pixels.
        img.channel(0).write()[0] = 9;
        let same = desired.clone();
        img.ensure_compatible(&same);
        assert_eq!(img.channel(0).read()[0], 9);
    }
}

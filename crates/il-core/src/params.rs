use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geom::{Rect, Size};

/// Color interpretation of an image's channel stack.
///
/// Fixed-channel tags pin the channel count (`Gray` is 1, the color
/// triples are 3); `Matrix` means "arbitrary channel count, no color
/// semantics".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Gray,
    Rgb,
    Hls,
    Lab,
    Yuv,
    Matrix,
}

impl Format {
    /// Channel count pinned by the tag; `None` for `Matrix`.
    pub const fn channel_count(self) -> Option<usize> {
        match self {
            Format::Gray => Some(1),
            Format::Rgb | Format::Hls | Format::Lab | Format::Yuv => Some(3),
            Format::Matrix => None,
        }
    }
}

/// Validated bundle of size, channel count, color format and ROI.
///
/// This is the single place where the format/channel-count and
/// ROI-containment invariants are enforced; every container operation can
/// assume after it runs:
///
/// - `channels >= 1`;
/// - `format.channel_count()` is either `None` or equal to `channels`;
/// - `roi` is non-empty and contained in the full image rect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageParams {
    size: Size,
    channels: usize,
    format: Format,
    roi: Rect,
}

impl ImageParams {
    /// Params for a fixed-channel format; `Matrix` defaults to one channel.
    pub fn new(size: Size, format: Format) -> Result<Self, Error> {
        let channels = format.channel_count().unwrap_or(1);
        Self::with_format_channels(size, format, channels)
    }

    /// Params for an arbitrary channel count (`Matrix` format).
    pub fn with_channels(size: Size, channels: usize) -> Result<Self, Error> {
        Self::with_format_channels(size, Format::Matrix, channels)
    }

    /// Params from an explicit format/channel-count pair; the pair must be
    /// consistent.
    pub fn with_format_channels(
        size: Size,
        format: Format,
        channels: usize,
    ) -> Result<Self, Error> {
        if size.is_empty() {
            return Err(Error::EmptyImage);
        }
        if channels == 0 {
            return Err(Error::ZeroChannels);
        }
        if let Some(expected) = format.channel_count()
            && expected != channels
        {
            return Err(Error::FormatChannelMismatch {
                format,
                expected,
                actual: channels,
            });
        }

        Ok(Self {
            size,
            channels,
            format,
            roi: Rect::of_size(size),
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn roi(&self) -> Rect {
        self.roi
    }

    pub fn roi_size(&self) -> Size {
        self.roi.size()
    }

    /// Rect covering the whole image.
    pub fn full_rect(&self) -> Rect {
        Rect::of_size(self.size)
    }

    pub fn has_full_roi(&self) -> bool {
        self.roi == self.full_rect()
    }

    /// Sets the format tag. A fixed-channel tag forces the channel count.
    pub fn set_format(&mut self, format: Format) {
        if let Some(n) = format.channel_count() {
            self.channels = n;
        }
        self.format = format;
    }

    /// Sets the channel count directly. Unless the count happens to match
    /// the current fixed-channel tag, the format falls back to `Matrix`.
    pub fn set_channels(&mut self, channels: usize) -> Result<(), Error> {
        if channels == 0 {
            return Err(Error::ZeroChannels);
        }
        if self.format.channel_count() != Some(channels) {
            self.format = Format::Matrix;
        }
        self.channels = channels;
        Ok(())
    }

    /// Sets the ROI; `None` resets it to the whole image.
    pub fn set_roi(&mut self, roi: Option<Rect>) -> Result<(), Error> {
        match roi {
            None => {
                self.roi = self.full_rect();
                Ok(())
            }
            Some(r) => {
                if r.is_empty() {
                    return Err(Error::EmptyRoi);
                }
                if !self.full_rect().contains_rect(&r) {
                    return Err(Error::RoiOutOfBounds {
                        roi: r,
                        size: self.size,
                    });
                }
                self.roi = r;
                Ok(())
            }
        }
    }

    /// Resizes the image extent; the ROI resets to the new full rect.
    pub fn set_size(&mut self, size: Size) -> Result<(), Error> {
        if size.is_empty() {
            return Err(Error::EmptyImage);
        }
        self.size = size;
        self.roi = Rect::of_size(size);
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

/// Numeric representation of one pixel element.
///
/// Every depth-erased handle carries this tag; typed access goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Depth {
    /// Narrow unsigned 8-bit pixels.
    U8,
    /// 32-bit floating point pixels.
    F32,
}

impl Depth {
    /// Element size in bytes, as seen by planar codecs.
    pub const fn size_of(self) -> usize {
        match self {
            Depth::U8 => 1,
            Depth::F32 => 4,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for f32 {}
}

/// Pixel element type of a channel buffer.
///
/// Sealed over the two supported depths so every algorithm is written once
/// as a generic body and instantiated for the closed set `{u8, f32}`.
/// Conversions define the depth-crossing semantics used throughout the
/// container and the filter engine:
///
/// - `from_f32` rounds and clamps for `u8`, is the identity for `f32`;
/// - `from_i32` clamps for `u8`, casts for `f32`;
/// - the `bit_*` family operates on the raw integer value after a cast,
///   which for `u8` is exact bitwise logic and for `f32` is the generic
///   complement-after-cast fallback.
pub trait Pixel:
    sealed::Sealed + Copy + PartialOrd + PartialEq + Default + std::fmt::Debug + 'static
{
    const DEPTH: Depth;
    const MIN_VALUE: Self;
    const MAX_VALUE: Self;

    fn to_f32(self) -> f32;
    fn from_f32(v: f32) -> Self;
    fn to_i32(self) -> i32;
    fn from_i32(v: i32) -> Self;

    fn bit_and(self, rhs: Self) -> Self;
    fn bit_or(self, rhs: Self) -> Self;
    fn bit_xor(self, rhs: Self) -> Self;
    fn bit_not(self) -> Self;
}

impl Pixel for u8 {
    const DEPTH: Depth = Depth::U8;
    const MIN_VALUE: Self = u8::MIN;
    const MAX_VALUE: Self = u8::MAX;

    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(v: f32) -> Self {
        v.round().clamp(0.0, 255.0) as u8
    }

    fn to_i32(self) -> i32 {
        self as i32
    }

    fn from_i32(v: i32) -> Self {
        v.clamp(0, 255) as u8
    }

    fn bit_and(self, rhs: Self) -> Self {
        self & rhs
    }

    fn bit_or(self, rhs: Self) -> Self {
        self | rhs
    }

    fn bit_xor(self, rhs: Self) -> Self {
        self ^ rhs
    }

    fn bit_not(self) -> Self {
        !self
    }
}

impl Pixel for f32 {
    const DEPTH: Depth = Depth::F32;
    const MIN_VALUE: Self = f32::MIN;
    const MAX_VALUE: Self = f32::MAX;

    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(v: f32) -> Self {
        v
    }

    fn to_i32(self) -> i32 {
        self as i32
    }

    fn from_i32(v: i32) -> Self {
        v as f32
    }

    fn bit_and(self, rhs: Self) -> Self {
        ((self as i32) & (rhs as i32)) as f32
    }

    fn bit_or(self, rhs: Self) -> Self {
        ((self as i32) | (rhs as i32)) as f32
    }

    fn bit_xor(self, rhs: Self) -> Self {
        ((self as i32) ^ (rhs as i32)) as f32
    }

    fn bit_not(self) -> Self {
        !(self as i32) as f32
    }
}
